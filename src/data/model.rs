use crate::data::snapshot::LeagueSnapshot;
use crate::data::validator::DomainValidator;
use crate::error::Result;
use crate::types::{Round, RoundRobin, SlotId, StadiumId, TeamId};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Kick-off hour from which a slot needs floodlights
pub const NIGHT_KICKOFF_HOUR: u32 = 18;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub home_stadium: StadiumId,
    #[serde(default)]
    pub alternate_stadiums: Vec<StadiumId>,
    #[serde(default)]
    pub region: String,
    /// Minimum days between two consecutive matches
    #[serde(default)]
    pub rest_days: u32,
    /// Distance from the team's base to each stadium, in kilometres
    #[serde(default)]
    pub travel_km: BTreeMap<StadiumId, f64>,
}

impl Team {
    /// Home stadium first, then alternates in declaration order
    pub fn eligible_stadiums(&self) -> Vec<StadiumId> {
        let mut stadiums = vec![self.home_stadium];
        for id in &self.alternate_stadiums {
            if !stadiums.contains(id) {
                stadiums.push(*id);
            }
        }
        stadiums
    }

    pub fn distance_to(&self, stadium: StadiumId) -> f64 {
        self.travel_km.get(&stadium).copied().unwrap_or(0.0)
    }
}

fn default_lighting() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stadium {
    pub id: StadiumId,
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default = "default_lighting")]
    pub has_lighting: bool,
    pub available_slots: BTreeSet<SlotId>,
}

impl Stadium {
    pub fn is_available(&self, slot: SlotId) -> bool {
        self.available_slots.contains(&slot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub starts_at: NaiveDateTime,
    pub round: Round,
}

impl TimeSlot {
    pub fn is_night(&self) -> bool {
        self.starts_at.hour() >= NIGHT_KICKOFF_HOUR
    }
}

/// A fixture the season must contain exactly once.
///
/// Double round-robin pairings have a fixed home side; single round-robin
/// pairings may be played in either orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    pub first: TeamId,
    pub second: TeamId,
    pub fixed_home: bool,
}

impl Pairing {
    /// Allowed (home, away) orientations
    pub fn orientations(&self) -> Vec<(TeamId, TeamId)> {
        if self.fixed_home {
            vec![(self.first, self.second)]
        } else {
            vec![(self.first, self.second), (self.second, self.first)]
        }
    }

    pub fn covers(&self, home: TeamId, away: TeamId) -> bool {
        if self.fixed_home {
            self.first == home && self.second == away
        } else {
            (self.first == home && self.second == away)
                || (self.first == away && self.second == home)
        }
    }
}

/// Validated, immutable description of a league season.
///
/// Entities live in id-keyed maps; everything else refers to them by id.
#[derive(Debug, Clone)]
pub struct League {
    format: RoundRobin,
    teams: BTreeMap<TeamId, Team>,
    stadiums: BTreeMap<StadiumId, Stadium>,
    slots: BTreeMap<SlotId, TimeSlot>,
    slot_order: Vec<SlotId>,
    slot_ordinals: HashMap<SlotId, usize>,
    rounds: BTreeMap<Round, Vec<SlotId>>,
    pairings: Vec<Pairing>,
}

impl League {
    /// Validate a snapshot and build the league, failing with
    /// `InvalidDomainData` on any structural defect.
    pub fn new(snapshot: LeagueSnapshot, format: RoundRobin) -> Result<Self> {
        DomainValidator::validate_snapshot(&snapshot)?;

        let teams: BTreeMap<TeamId, Team> =
            snapshot.teams.into_iter().map(|t| (t.id, t)).collect();
        let stadiums: BTreeMap<StadiumId, Stadium> =
            snapshot.stadiums.into_iter().map(|s| (s.id, s)).collect();
        let slots: BTreeMap<SlotId, TimeSlot> =
            snapshot.slots.into_iter().map(|s| (s.id, s)).collect();

        let mut slot_order: Vec<SlotId> = slots.keys().copied().collect();
        slot_order.sort_by_key(|id| (slots[id].starts_at, *id));
        let slot_ordinals = slot_order
            .iter()
            .enumerate()
            .map(|(ordinal, id)| (*id, ordinal))
            .collect();

        let mut rounds: BTreeMap<Round, Vec<SlotId>> = BTreeMap::new();
        for id in &slot_order {
            rounds.entry(slots[id].round).or_default().push(*id);
        }

        let pairings = Self::derive_pairings(&teams, format);

        let league = Self {
            format,
            teams,
            stadiums,
            slots,
            slot_order,
            slot_ordinals,
            rounds,
            pairings,
        };
        DomainValidator::validate_calendar(&league)?;

        log::info!(
            "League ready: {} teams, {} stadiums, {} slots, {} required matches ({:?} round-robin)",
            league.teams.len(),
            league.stadiums.len(),
            league.slots.len(),
            league.pairings.len(),
            format
        );
        Ok(league)
    }

    fn derive_pairings(teams: &BTreeMap<TeamId, Team>, format: RoundRobin) -> Vec<Pairing> {
        let ids: Vec<TeamId> = teams.keys().copied().collect();
        let mut pairings = Vec::with_capacity(format.total_matches(ids.len()));
        match format {
            RoundRobin::Single => {
                for (i, a) in ids.iter().enumerate() {
                    for b in &ids[i + 1..] {
                        pairings.push(Pairing {
                            first: *a,
                            second: *b,
                            fixed_home: false,
                        });
                    }
                }
            }
            RoundRobin::Double => {
                for a in &ids {
                    for b in &ids {
                        if a != b {
                            pairings.push(Pairing {
                                first: *a,
                                second: *b,
                                fixed_home: true,
                            });
                        }
                    }
                }
            }
        }
        pairings
    }

    pub fn format(&self) -> RoundRobin {
        self.format
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    pub fn stadium(&self, id: StadiumId) -> Option<&Stadium> {
        self.stadiums.get(&id)
    }

    pub fn slot(&self, id: SlotId) -> Option<&TimeSlot> {
        self.slots.get(&id)
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.keys().copied().collect()
    }

    pub fn stadiums(&self) -> impl Iterator<Item = &Stadium> {
        self.stadiums.values()
    }

    /// Slots in chronological order
    pub fn slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slot_order.iter().map(move |id| &self.slots[id])
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Position of a slot in the chronological calendar
    pub fn slot_ordinal(&self, id: SlotId) -> Option<usize> {
        self.slot_ordinals.get(&id).copied()
    }

    pub fn rounds(&self) -> Vec<Round> {
        self.rounds.keys().copied().collect()
    }

    pub fn slots_in_round(&self, round: Round) -> &[SlotId] {
        self.rounds.get(&round).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn required_pairings(&self) -> &[Pairing] {
        &self.pairings
    }

    pub fn matches_per_team(&self) -> usize {
        self.format.matches_per_team(self.teams.len())
    }

    pub fn eligible_stadiums(&self, team: TeamId) -> Vec<StadiumId> {
        self.teams
            .get(&team)
            .map(Team::eligible_stadiums)
            .unwrap_or_default()
    }

    /// Whether `home` may host a match at `stadium` in `slot`
    pub fn is_eligible(&self, home: TeamId, stadium: StadiumId, slot: SlotId) -> bool {
        let (Some(team), Some(venue), Some(time)) =
            (self.teams.get(&home), self.stadiums.get(&stadium), self.slots.get(&slot))
        else {
            return false;
        };
        let own_venue = team.home_stadium == stadium || team.alternate_stadiums.contains(&stadium);
        own_venue && venue.is_available(slot) && (venue.has_lighting || !time.is_night())
    }

    /// Every (stadium, slot) where `home` may host, chronological then by stadium
    pub fn eligible_venues(&self, home: TeamId) -> Vec<(StadiumId, SlotId)> {
        let mut venues = Vec::new();
        for slot in &self.slot_order {
            for stadium in self.eligible_stadiums(home) {
                if self.is_eligible(home, stadium, *slot) {
                    venues.push((stadium, *slot));
                }
            }
        }
        venues.sort_by_key(|(stadium, slot)| (self.slot_ordinals[slot], *stadium));
        venues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::snapshot::tests::four_team_snapshot;
    use crate::error::SchedulerError;

    #[test]
    fn test_required_pairings_follow_format() {
        let single = League::new(four_team_snapshot(), RoundRobin::Single).unwrap();
        assert_eq!(single.required_pairings().len(), 6);
        assert!(single.required_pairings().iter().all(|p| !p.fixed_home));

        let double = League::new(four_team_snapshot(), RoundRobin::Double).unwrap();
        assert_eq!(double.required_pairings().len(), 12);
        assert_eq!(double.matches_per_team(), 6);
    }

    #[test]
    fn test_slots_sorted_chronologically() {
        let league = League::new(four_team_snapshot(), RoundRobin::Single).unwrap();
        let starts: Vec<_> = league.slots().map(|s| s.starts_at).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(league.slot_ordinal(league.slots().next().unwrap().id), Some(0));
    }

    #[test]
    fn test_night_slot_needs_lighting() {
        let mut snapshot = four_team_snapshot();
        snapshot.stadiums[0].has_lighting = false;
        let night = snapshot
            .slots
            .iter()
            .find(|s| s.is_night())
            .map(|s| s.id)
            .unwrap();
        let league = League::new(snapshot, RoundRobin::Single).unwrap();
        let home = league.teams().find(|t| t.home_stadium == 1).unwrap().id;
        assert!(!league.is_eligible(home, 1, night));
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let mut snapshot = four_team_snapshot();
        let copy = snapshot.teams[0].clone();
        snapshot.teams.push(copy);
        let err = League::new(snapshot, RoundRobin::Single).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidDomainData(_)));
    }

    #[test]
    fn test_pairing_orientation() {
        let single = Pairing {
            first: 1,
            second: 2,
            fixed_home: false,
        };
        assert!(single.covers(2, 1));
        assert_eq!(single.orientations().len(), 2);
        let double = Pairing {
            first: 1,
            second: 2,
            fixed_home: true,
        };
        assert!(!double.covers(2, 1));
    }
}
