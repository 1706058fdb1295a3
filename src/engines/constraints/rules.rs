use super::Constraint;
use crate::config::constraints::RuleKind;
use crate::data::{League, Schedule};
use crate::types::{Match, Round, TeamId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

/// Instantiate the built-in rule for a configured kind
pub fn build_rule(kind: &RuleKind) -> Arc<dyn Constraint> {
    match kind {
        RuleKind::TeamSlotClash => Arc::new(TeamSlotClash),
        RuleKind::StadiumSlotClash => Arc::new(StadiumSlotClash),
        RuleKind::TeamRoundClash => Arc::new(TeamRoundClash),
        RuleKind::StadiumRoundClash => Arc::new(StadiumRoundClash),
        RuleKind::ConsecutiveOpponent => Arc::new(ConsecutiveOpponent),
        RuleKind::MinimumRest { min_days } => Arc::new(MinimumRest::new(*min_days)),
        RuleKind::HomeStadium => Arc::new(HomeStadium),
        RuleKind::HomeAwayStreak { max_streak } => Arc::new(HomeAwayStreak::new(*max_streak)),
        RuleKind::TravelDistance { unit_km } => Arc::new(TravelDistance::new(*unit_km)),
        RuleKind::RegionClustering { window } => Arc::new(RegionClustering::new(*window)),
        RuleKind::DerbySpacing { pairs, min_round_gap } => {
            Arc::new(DerbySpacing::new(pairs, *min_round_gap))
        }
        RuleKind::RoundGaps => Arc::new(RoundGaps),
    }
}

/// For every key seen k times, k - 1
fn excess<K: Eq + Hash>(keys: impl Iterator<Item = K>) -> u64 {
    let mut counts: HashMap<K, u64> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts.values().map(|c| c - 1).sum()
}

fn team_keys<'a, K: 'a>(
    schedule: &'a Schedule,
    key: impl Fn(&Match) -> K + 'a,
) -> impl Iterator<Item = (TeamId, K)> + 'a {
    schedule
        .iter()
        .flat_map(move |m| [(m.home, key(m)), (m.away, key(m))])
}

pub struct TeamSlotClash;

impl Constraint for TeamSlotClash {
    fn kind(&self) -> &'static str {
        "team_slot_clash"
    }

    fn evaluate(&self, schedule: &Schedule, _league: &League) -> u64 {
        excess(team_keys(schedule, |m| m.slot))
    }
}

pub struct StadiumSlotClash;

impl Constraint for StadiumSlotClash {
    fn kind(&self) -> &'static str {
        "stadium_slot_clash"
    }

    fn evaluate(&self, schedule: &Schedule, _league: &League) -> u64 {
        excess(schedule.iter().map(|m| (m.stadium, m.slot)))
    }
}

pub struct TeamRoundClash;

impl Constraint for TeamRoundClash {
    fn kind(&self) -> &'static str {
        "team_round_clash"
    }

    fn evaluate(&self, schedule: &Schedule, _league: &League) -> u64 {
        excess(team_keys(schedule, |m| m.round))
    }
}

/// Two teams sharing a ground may not both host in the same round
pub struct StadiumRoundClash;

impl Constraint for StadiumRoundClash {
    fn kind(&self) -> &'static str {
        "stadium_round_clash"
    }

    fn evaluate(&self, schedule: &Schedule, _league: &League) -> u64 {
        excess(schedule.iter().map(|m| (m.stadium, m.round)))
    }
}

/// The same two teams meeting in back-to-back rounds
pub struct ConsecutiveOpponent;

impl Constraint for ConsecutiveOpponent {
    fn kind(&self) -> &'static str {
        "consecutive_opponent"
    }

    fn evaluate(&self, schedule: &Schedule, _league: &League) -> u64 {
        let mut by_round: BTreeMap<Round, HashSet<(TeamId, TeamId)>> = BTreeMap::new();
        for m in schedule {
            by_round.entry(m.round).or_default().insert(m.matchup());
        }
        by_round
            .iter()
            .map(|(round, matchups)| match by_round.get(&(round + 1)) {
                Some(next) => matchups.intersection(next).count() as u64,
                None => 0,
            })
            .sum()
    }
}

/// Consecutive matches of a team closer than its required rest days
pub struct MinimumRest {
    min_days: u32,
}

impl MinimumRest {
    pub fn new(min_days: u32) -> Self {
        Self { min_days }
    }
}

impl Constraint for MinimumRest {
    fn kind(&self) -> &'static str {
        "minimum_rest"
    }

    fn evaluate(&self, schedule: &Schedule, league: &League) -> u64 {
        let mut violations = 0;
        for team in league.teams() {
            let required = team.rest_days.max(self.min_days) as i64;
            if required == 0 {
                continue;
            }
            let days: Vec<_> = schedule
                .team_matches(team.id)
                .filter_map(|m| league.slot(m.slot))
                .map(|s| s.starts_at.date())
                .collect();
            violations += days
                .windows(2)
                .filter(|pair| (pair[1] - pair[0]).num_days() < required)
                .count() as u64;
        }
        violations
    }
}

/// Matches not played at the home team's own ground
pub struct HomeStadium;

impl Constraint for HomeStadium {
    fn kind(&self) -> &'static str {
        "home_stadium"
    }

    fn evaluate(&self, schedule: &Schedule, league: &League) -> u64 {
        schedule
            .iter()
            .filter(|m| {
                league
                    .team(m.home)
                    .map(|t| t.home_stadium != m.stadium)
                    .unwrap_or(false)
            })
            .count() as u64
    }
}

/// Runs of home (or away) matches longer than `max_streak`
pub struct HomeAwayStreak {
    max_streak: usize,
}

impl HomeAwayStreak {
    pub fn new(max_streak: usize) -> Self {
        Self { max_streak }
    }
}

impl Constraint for HomeAwayStreak {
    fn kind(&self) -> &'static str {
        "home_away_streak"
    }

    fn evaluate(&self, schedule: &Schedule, league: &League) -> u64 {
        let mut violations = 0u64;
        for team in league.team_ids() {
            let mut run = 0usize;
            let mut last_home: Option<bool> = None;
            for m in schedule.team_matches(team) {
                let at_home = m.home == team;
                run = if last_home == Some(at_home) { run + 1 } else { 1 };
                last_home = Some(at_home);
                if run > self.max_streak {
                    violations += 1;
                }
            }
        }
        violations
    }
}

/// Away travel, in units of `unit_km` per team
pub struct TravelDistance {
    unit_km: f64,
}

impl TravelDistance {
    pub fn new(unit_km: f64) -> Self {
        Self { unit_km }
    }
}

impl Constraint for TravelDistance {
    fn kind(&self) -> &'static str {
        "travel_distance"
    }

    fn evaluate(&self, schedule: &Schedule, league: &League) -> u64 {
        league
            .teams()
            .map(|team| {
                let km: f64 = schedule
                    .iter()
                    .filter(|m| m.away == team.id)
                    .map(|m| team.distance_to(m.stadium))
                    .sum();
                (km / self.unit_km).floor() as u64
            })
            .sum()
    }
}

/// `window` consecutive opponents all from one region
pub struct RegionClustering {
    window: usize,
}

impl RegionClustering {
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

impl Constraint for RegionClustering {
    fn kind(&self) -> &'static str {
        "region_clustering"
    }

    fn evaluate(&self, schedule: &Schedule, league: &League) -> u64 {
        if self.window < 2 {
            return 0;
        }
        let mut violations = 0u64;
        for team in league.team_ids() {
            let regions: Vec<&str> = schedule
                .team_matches(team)
                .filter_map(|m| m.opponent_of(team))
                .filter_map(|opponent| league.team(opponent))
                .map(|t| t.region.as_str())
                .collect();
            violations += regions
                .windows(self.window)
                .filter(|w| !w[0].is_empty() && w.iter().all(|r| *r == w[0]))
                .count() as u64;
        }
        violations
    }
}

/// Derby matches bunched closer than `min_round_gap` rounds
pub struct DerbySpacing {
    pairs: HashSet<(TeamId, TeamId)>,
    min_round_gap: u32,
}

impl DerbySpacing {
    pub fn new(pairs: &[(TeamId, TeamId)], min_round_gap: u32) -> Self {
        let pairs = pairs
            .iter()
            .map(|&(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        Self {
            pairs,
            min_round_gap,
        }
    }
}

impl Constraint for DerbySpacing {
    fn kind(&self) -> &'static str {
        "derby_spacing"
    }

    fn evaluate(&self, schedule: &Schedule, _league: &League) -> u64 {
        let mut rounds: Vec<Round> = schedule
            .iter()
            .filter(|m| self.pairs.contains(&m.matchup()))
            .map(|m| m.round)
            .collect();
        rounds.sort_unstable();
        rounds
            .windows(2)
            .filter(|w| w[1] - w[0] < self.min_round_gap)
            .count() as u64
    }
}

/// Rounds a team sits out between two of its matches
pub struct RoundGaps;

impl Constraint for RoundGaps {
    fn kind(&self) -> &'static str {
        "round_gaps"
    }

    fn evaluate(&self, schedule: &Schedule, league: &League) -> u64 {
        let mut skipped = 0u64;
        for team in league.team_ids() {
            let mut rounds: Vec<Round> = schedule.team_matches(team).map(|m| m.round).collect();
            rounds.sort_unstable();
            rounds.dedup();
            skipped += rounds
                .windows(2)
                .map(|w| (w[1] - w[0]).saturating_sub(1) as u64)
                .sum::<u64>();
        }
        skipped
    }
}
