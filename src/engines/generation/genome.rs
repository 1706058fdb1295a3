use crate::data::{League, Pairing};
use crate::types::{SlotId, StadiumId, TeamId};
use rand::Rng;

/// Genome representation of a schedule
///
/// Position `i` stands for the league's `i`-th required pairing; the value is
/// an index into that pairing's list of eligible options. Operators keep every
/// gene below its position's option count, so any genome they produce decodes.
pub type Genome = Vec<u32>;

/// A concrete way to play one pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneOption {
    pub home: TeamId,
    pub away: TeamId,
    pub stadium: StadiumId,
    pub slot: SlotId,
}

/// Eligible options for every genome position
#[derive(Debug, Clone)]
pub struct GeneSpace {
    pairings: Vec<Pairing>,
    options: Vec<Vec<GeneOption>>,
}

impl GeneSpace {
    pub fn new(league: &League) -> Self {
        let pairings = league.required_pairings().to_vec();
        let options = pairings
            .iter()
            .map(|pairing| {
                let mut choices: Vec<GeneOption> = pairing
                    .orientations()
                    .into_iter()
                    .flat_map(|(home, away)| {
                        league
                            .eligible_venues(home)
                            .into_iter()
                            .map(move |(stadium, slot)| GeneOption {
                                home,
                                away,
                                stadium,
                                slot,
                            })
                    })
                    .collect();
                choices.sort_by_key(|o| {
                    (league.slot_ordinal(o.slot).unwrap_or(usize::MAX), o.stadium, o.home)
                });
                choices
            })
            .collect();
        Self { pairings, options }
    }

    /// Genome length
    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    pub fn pairing(&self, position: usize) -> &Pairing {
        &self.pairings[position]
    }

    pub fn pairings(&self) -> &[Pairing] {
        &self.pairings
    }

    pub fn options(&self, position: usize) -> &[GeneOption] {
        &self.options[position]
    }

    pub fn option_count(&self, position: usize) -> u32 {
        self.options[position].len() as u32
    }

    pub fn option(&self, position: usize, gene: u32) -> Option<&GeneOption> {
        self.options.get(position)?.get(gene as usize)
    }

    /// Index of the first option at `position` matching `predicate`
    pub fn find(&self, position: usize, predicate: impl Fn(&GeneOption) -> bool) -> Option<u32> {
        self.options[position]
            .iter()
            .position(predicate)
            .map(|i| i as u32)
    }

    pub fn is_valid(&self, genome: &Genome) -> bool {
        genome.len() == self.len()
            && genome
                .iter()
                .enumerate()
                .all(|(position, gene)| *gene < self.option_count(position))
    }

    /// Uniform random genome within every position's bounds
    pub fn random_genome<R: Rng>(&self, rng: &mut R) -> Genome {
        (0..self.len())
            .map(|position| rng.gen_range(0..self.option_count(position)))
            .collect()
    }
}
