use serde::{Deserialize, Serialize};

pub type TeamId = u32;
pub type StadiumId = u32;
pub type SlotId = u32;
pub type Round = u32;

/// Tournament format: every team meets every other team once or twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundRobin {
    Single,
    #[default]
    Double,
}

impl RoundRobin {
    /// Number of matches each team plays over the season
    pub fn matches_per_team(&self, team_count: usize) -> usize {
        match self {
            RoundRobin::Single => team_count.saturating_sub(1),
            RoundRobin::Double => 2 * team_count.saturating_sub(1),
        }
    }

    pub fn total_matches(&self, team_count: usize) -> usize {
        match self {
            RoundRobin::Single => team_count * team_count.saturating_sub(1) / 2,
            RoundRobin::Double => team_count * team_count.saturating_sub(1),
        }
    }
}

/// A fixture: who plays whom, where and when
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub home: TeamId,
    pub away: TeamId,
    pub stadium: StadiumId,
    pub slot: SlotId,
    pub round: Round,
}

impl Match {
    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }

    /// The other side of the fixture, if `team` plays in it
    pub fn opponent_of(&self, team: TeamId) -> Option<TeamId> {
        if self.home == team {
            Some(self.away)
        } else if self.away == team {
            Some(self.home)
        } else {
            None
        }
    }

    /// Unordered team pair, smaller id first
    pub fn matchup(&self) -> (TeamId, TeamId) {
        if self.home < self.away {
            (self.home, self.away)
        } else {
            (self.away, self.home)
        }
    }
}
