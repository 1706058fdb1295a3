use crate::data::{League, Schedule};
use crate::engines::generation::genome::{GeneOption, GeneSpace, Genome};
use crate::error::{Result, SchedulerError};
use crate::types::Match;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps genomes to schedules and back.
///
/// Decoding is deterministic: the same genome and league always give the same
/// canonical schedule, and `decode(encode(s)) == s` for any schedule built
/// from eligible fixtures covering every pairing once.
#[derive(Debug, Clone)]
pub struct ScheduleCodec {
    league: Arc<League>,
    space: GeneSpace,
    lookup: HashMap<GeneOption, (usize, u32)>,
}

impl ScheduleCodec {
    pub fn new(league: Arc<League>) -> Self {
        let space = GeneSpace::new(&league);
        let mut lookup = HashMap::new();
        for position in 0..space.len() {
            for (index, option) in space.options(position).iter().enumerate() {
                lookup.insert(*option, (position, index as u32));
            }
        }
        Self {
            league,
            space,
            lookup,
        }
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    pub fn space(&self) -> &GeneSpace {
        &self.space
    }

    pub fn decode(&self, genome: &Genome) -> Result<Schedule> {
        if genome.len() != self.space.len() {
            return Err(SchedulerError::Encoding(format!(
                "Genome has {} genes, league needs {}",
                genome.len(),
                self.space.len()
            )));
        }

        let mut matches = Vec::with_capacity(genome.len());
        for (position, gene) in genome.iter().enumerate() {
            let option = self.space.option(position, *gene).ok_or_else(|| {
                SchedulerError::Encoding(format!(
                    "Gene {} at position {} is outside its {} options",
                    gene,
                    position,
                    self.space.option_count(position)
                ))
            })?;
            matches.push(self.to_match(option));
        }
        Ok(Schedule::from_matches(matches, &self.league))
    }

    pub fn encode(&self, schedule: &Schedule) -> Result<Genome> {
        let mut genome: Vec<Option<u32>> = vec![None; self.space.len()];
        for m in schedule {
            let option = GeneOption {
                home: m.home,
                away: m.away,
                stadium: m.stadium,
                slot: m.slot,
            };
            let &(position, index) = self.lookup.get(&option).ok_or_else(|| {
                SchedulerError::Encoding(format!(
                    "Match {} vs {} at stadium {} in slot {} is not an eligible fixture",
                    m.home, m.away, m.stadium, m.slot
                ))
            })?;
            if genome[position].replace(index).is_some() {
                return Err(SchedulerError::Encoding(format!(
                    "Pairing {} vs {} appears more than once",
                    m.home, m.away
                )));
            }
        }

        genome
            .into_iter()
            .enumerate()
            .map(|(position, gene)| {
                gene.ok_or_else(|| {
                    let pairing = self.space.pairing(position);
                    SchedulerError::Encoding(format!(
                        "Pairing {} vs {} is missing from the schedule",
                        pairing.first, pairing.second
                    ))
                })
            })
            .collect()
    }

    fn to_match(&self, option: &GeneOption) -> Match {
        let round = self
            .league
            .slot(option.slot)
            .map(|s| s.round)
            .unwrap_or_default();
        Match {
            home: option.home,
            away: option.away,
            stadium: option.stadium,
            slot: option.slot,
            round,
        }
    }
}
