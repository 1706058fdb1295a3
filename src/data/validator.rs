use crate::data::model::League;
use crate::data::snapshot::LeagueSnapshot;
use crate::error::{Result, SchedulerError};
use std::collections::{BTreeSet, HashSet};

pub struct DomainValidator;

impl DomainValidator {
    /// Structural checks on raw input: ids, references, minimum size.
    ///
    /// Collects every defect before failing so the loader can fix them in one go.
    pub fn validate_snapshot(snapshot: &LeagueSnapshot) -> Result<()> {
        let mut errors = Vec::new();

        if snapshot.teams.len() < 2 {
            errors.push(format!(
                "A league needs at least 2 teams, got {}",
                snapshot.teams.len()
            ));
        }

        Self::collect_unique("team", snapshot.teams.iter().map(|t| t.id), &mut errors);
        let stadium_ids =
            Self::collect_unique("stadium", snapshot.stadiums.iter().map(|s| s.id), &mut errors);
        let slot_ids =
            Self::collect_unique("slot", snapshot.slots.iter().map(|s| s.id), &mut errors);

        for team in &snapshot.teams {
            if !stadium_ids.contains(&team.home_stadium) {
                errors.push(format!(
                    "Team {} references unknown home stadium {}",
                    team.id, team.home_stadium
                ));
            }
            for alternate in &team.alternate_stadiums {
                if !stadium_ids.contains(alternate) {
                    errors.push(format!(
                        "Team {} references unknown alternate stadium {}",
                        team.id, alternate
                    ));
                }
            }
            for (stadium, km) in &team.travel_km {
                if !stadium_ids.contains(stadium) {
                    errors.push(format!(
                        "Team {} has a travel distance to unknown stadium {}",
                        team.id, stadium
                    ));
                }
                if !km.is_finite() || *km < 0.0 {
                    errors.push(format!(
                        "Team {} has an invalid travel distance {} to stadium {}",
                        team.id, km, stadium
                    ));
                }
            }
        }

        for stadium in &snapshot.stadiums {
            for slot in &stadium.available_slots {
                if !slot_ids.contains(slot) {
                    errors.push(format!(
                        "Stadium {} lists unknown slot {} as available",
                        stadium.id, slot
                    ));
                }
            }
            if stadium.capacity == 0 {
                log::warn!("Stadium {} ({}) has no declared capacity", stadium.id, stadium.name);
            }
            if !stadium.has_lighting {
                log::warn!(
                    "Stadium {} ({}) has no lighting, evening slots are excluded",
                    stadium.id,
                    stadium.name
                );
            }
        }

        Self::finish(errors)
    }

    /// Checks that the calendar can host the season at all.
    pub fn validate_calendar(league: &League) -> Result<()> {
        let mut errors = Vec::new();
        let per_team = league.matches_per_team();

        let mut team_slots: Vec<(u32, HashSet<u32>)> =
            league.team_ids().into_iter().map(|id| (id, HashSet::new())).collect();
        let mut places: BTreeSet<(u32, u32)> = BTreeSet::new();

        for pairing in league.required_pairings() {
            let mut has_option = false;
            for (home, away) in pairing.orientations() {
                for (stadium, slot) in league.eligible_venues(home) {
                    has_option = true;
                    places.insert((stadium, slot));
                    for (team, slots) in team_slots.iter_mut() {
                        if *team == home || *team == away {
                            slots.insert(slot);
                        }
                    }
                }
            }
            if !has_option {
                errors.push(format!(
                    "No eligible stadium and slot for {} vs {}",
                    pairing.first, pairing.second
                ));
            }
        }

        for (team, slots) in &team_slots {
            if slots.len() < per_team {
                errors.push(format!(
                    "Team {} plays {} matches but can only be scheduled in {} distinct slots",
                    team,
                    per_team,
                    slots.len()
                ));
            }
        }

        let required = league.required_pairings().len();
        if places.len() < required {
            errors.push(format!(
                "Calendar offers {} stadium slots for {} required matches",
                places.len(),
                required
            ));
        }

        Self::finish(errors)
    }

    fn collect_unique(
        kind: &str,
        ids: impl Iterator<Item = u32>,
        errors: &mut Vec<String>,
    ) -> HashSet<u32> {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                errors.push(format!("Duplicate {} id {}", kind, id));
            }
        }
        seen
    }

    fn finish(errors: Vec<String>) -> Result<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchedulerError::InvalidDomainData(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::snapshot::tests::four_team_snapshot;
    use crate::types::RoundRobin;

    #[test]
    fn test_validate_good_snapshot() {
        assert!(DomainValidator::validate_snapshot(&four_team_snapshot()).is_ok());
    }

    #[test]
    fn test_unknown_references_reported_together() {
        let mut snapshot = four_team_snapshot();
        snapshot.teams[0].home_stadium = 99;
        snapshot.stadiums[1].available_slots.insert(999);

        let err = DomainValidator::validate_snapshot(&snapshot).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown home stadium 99"));
        assert!(message.contains("unknown slot 999"));
    }

    #[test]
    fn test_single_team_rejected() {
        let mut snapshot = four_team_snapshot();
        snapshot.teams.truncate(1);
        assert!(DomainValidator::validate_snapshot(&snapshot).is_err());
    }

    #[test]
    fn test_insufficient_calendar_rejected() {
        let mut snapshot = four_team_snapshot();
        // Double round-robin needs six dates per team; keep two rounds only.
        snapshot.slots.retain(|s| s.round <= 2);
        for stadium in snapshot.stadiums.iter_mut() {
            stadium.available_slots.retain(|id| *id < 30);
        }
        let err = League::new(snapshot, RoundRobin::Double).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidDomainData(_)));
        assert!(err.to_string().contains("distinct slots"));
    }
}
