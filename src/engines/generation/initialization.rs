use crate::data::League;
use crate::engines::generation::genome::{GeneSpace, Genome};
use crate::types::{RoundRobin, SlotId, StadiumId, TeamId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Builds the starting population: round-robin seeded genomes, caller
/// supplied genomes, then uniform random ones.
pub struct PopulationInitializer<'a> {
    league: &'a League,
    space: &'a GeneSpace,
    positions: HashMap<(TeamId, TeamId), usize>,
}

impl<'a> PopulationInitializer<'a> {
    pub fn new(league: &'a League, space: &'a GeneSpace) -> Self {
        let positions = space
            .pairings()
            .iter()
            .enumerate()
            .map(|(position, p)| ((p.first, p.second), position))
            .collect();
        Self {
            league,
            space,
            positions,
        }
    }

    /// `size` genomes. The first `seeded_fraction` share follows the circle
    /// method, then `seeds` are taken in order, the rest is random.
    pub fn build<R: Rng>(
        &self,
        size: usize,
        seeded_fraction: f64,
        seeds: &[Genome],
        rng: &mut R,
    ) -> Vec<Genome> {
        let seeded = ((size as f64 * seeded_fraction).round() as usize).min(size);
        let mut genomes = Vec::with_capacity(size);

        for _ in 0..seeded {
            genomes.push(self.round_robin_genome(rng));
        }
        for seed in seeds.iter().take(size - genomes.len()) {
            genomes.push(seed.clone());
        }
        while genomes.len() < size {
            genomes.push(self.space.random_genome(rng));
        }

        log::debug!(
            "Initial population: {} round-robin, {} supplied, {} random",
            seeded,
            seeds.len().min(size - seeded),
            size - seeded - seeds.len().min(size - seeded)
        );
        genomes
    }

    /// Circle-method fixture list mapped onto the league's rounds. Team order
    /// is shuffled so repeated calls give different genomes.
    pub fn round_robin_genome<R: Rng>(&self, rng: &mut R) -> Genome {
        let mut teams = self.league.team_ids();
        teams.shuffle(rng);
        let fixtures = circle_rounds(&teams, self.league.format());
        let league_rounds = self.league.rounds();

        let mut genome = self.space.random_genome(rng);
        for (index, round_fixtures) in fixtures.iter().enumerate() {
            let Some(round) = league_rounds.get(index).copied() else {
                break;
            };
            let mut used: HashSet<(StadiumId, SlotId)> = HashSet::new();
            for &(home, away) in round_fixtures {
                let Some(position) = self.position_of(home, away) else {
                    continue;
                };
                if let Some(gene) = self.pick_in_round(position, home, round, &used) {
                    if let Some(option) = self.space.option(position, gene) {
                        used.insert((option.stadium, option.slot));
                    }
                    genome[position] = gene;
                }
            }
        }
        genome
    }

    fn position_of(&self, home: TeamId, away: TeamId) -> Option<usize> {
        match self.league.format() {
            RoundRobin::Double => self.positions.get(&(home, away)).copied(),
            RoundRobin::Single => self.positions.get(&(home.min(away), home.max(away))).copied(),
        }
    }

    /// Option in `round`, preferring the requested home side and a free venue
    fn pick_in_round(
        &self,
        position: usize,
        home: TeamId,
        round: u32,
        used: &HashSet<(StadiumId, SlotId)>,
    ) -> Option<u32> {
        let in_round: Vec<u32> = self
            .space
            .options(position)
            .iter()
            .enumerate()
            .filter(|(_, o)| self.league.slot(o.slot).map(|s| s.round) == Some(round))
            .map(|(gene, _)| gene as u32)
            .collect();
        let free = |gene: &&u32| {
            self.space
                .option(position, **gene)
                .is_some_and(|o| !used.contains(&(o.stadium, o.slot)))
        };
        let at_home = |gene: &&u32| {
            self.space
                .option(position, **gene)
                .is_some_and(|o| o.home == home)
        };

        in_round
            .iter()
            .find(|g| free(g) && at_home(g))
            .or_else(|| in_round.iter().find(free))
            .or_else(|| in_round.first())
            .copied()
    }
}

/// Fixtures per round using the circle method. Odd team counts get a bye.
/// Double round-robin appends the mirrored second leg.
pub fn circle_rounds(teams: &[TeamId], format: RoundRobin) -> Vec<Vec<(TeamId, TeamId)>> {
    let mut slots: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }

    let mut first_leg = Vec::with_capacity(n - 1);
    for round in 0..n - 1 {
        let mut fixtures = Vec::with_capacity(n / 2);
        for i in 0..n / 2 {
            if let (Some(a), Some(b)) = (slots[i], slots[n - 1 - i]) {
                if (round + i) % 2 == 0 {
                    fixtures.push((a, b));
                } else {
                    fixtures.push((b, a));
                }
            }
        }
        first_leg.push(fixtures);
        slots[1..].rotate_right(1);
    }

    match format {
        RoundRobin::Single => first_leg,
        RoundRobin::Double => {
            let second_leg: Vec<Vec<(TeamId, TeamId)>> = first_leg
                .iter()
                .map(|fixtures| fixtures.iter().map(|&(h, a)| (a, h)).collect())
                .collect();
            first_leg.into_iter().chain(second_leg).collect()
        }
    }
}
