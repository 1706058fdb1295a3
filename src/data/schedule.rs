use crate::data::model::League;
use crate::types::{Match, Round, TeamId};
use serde::Serialize;
use std::collections::BTreeSet;

/// A season calendar, kept in canonical chronological order.
///
/// Matches are sorted by slot time, then stadium, home and away team, so two
/// schedules with the same fixtures compare equal regardless of how they were
/// assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    matches: Vec<Match>,
}

impl Schedule {
    pub fn from_matches(mut matches: Vec<Match>, league: &League) -> Self {
        matches.sort_by_key(|m| {
            (
                league.slot_ordinal(m.slot).unwrap_or(usize::MAX),
                m.stadium,
                m.home,
                m.away,
            )
        });
        Self { matches }
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter()
    }

    /// A team's matches in the order they are played
    pub fn team_matches(&self, team: TeamId) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.involves(team))
    }

    pub fn round_matches(&self, round: Round) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    pub fn home_count(&self, team: TeamId) -> usize {
        self.matches.iter().filter(|m| m.home == team).count()
    }

    pub fn away_count(&self, team: TeamId) -> usize {
        self.matches.iter().filter(|m| m.away == team).count()
    }

    pub fn rounds(&self) -> BTreeSet<Round> {
        self.matches.iter().map(|m| m.round).collect()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
