use crate::engines::generation::evaluator::EvaluationContext;
use crate::engines::generation::genome::{GeneSpace, Genome};
use crate::engines::generation::operators::reassign_gene;
use crate::error::Result;
use crate::types::{Round, SlotId, StadiumId, TeamId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// What a repair pass tries to lower
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairObjective {
    /// Hard violation count; used on offspring
    HardOnly,
    /// Full fitness value; used for periodic local search on the best
    Full,
}

/// Bounded single-gene local search.
///
/// Each attempt reassigns one gene, preferring positions involved in a
/// team or stadium clash, and keeps the change only if the objective strictly
/// improves. Feasibility is not guaranteed.
#[derive(Debug, Clone, Copy)]
pub struct Repairer {
    max_attempts: usize,
}

impl Repairer {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    /// Repair `genome` in place. Returns the number of accepted moves.
    pub fn repair<R: Rng>(
        &self,
        genome: &mut Genome,
        objective: RepairObjective,
        context: &EvaluationContext,
        rng: &mut R,
    ) -> Result<usize> {
        let space = context.codec().space();
        let mut current = objective_value(genome, objective, context)?;
        let mut accepted = 0;

        for _ in 0..self.max_attempts {
            if current <= 0.0 {
                break;
            }

            let candidates = clash_positions(genome, space, context);
            let position = match candidates.choose(rng) {
                Some(position) => *position,
                None => rng.gen_range(0..genome.len().max(1)),
            };
            if position >= genome.len() {
                break;
            }

            let previous = genome[position];
            if !reassign_gene(genome, position, space, rng) {
                continue;
            }

            let candidate = objective_value(genome, objective, context)?;
            if candidate < current {
                current = candidate;
                accepted += 1;
            } else {
                genome[position] = previous;
            }
        }

        Ok(accepted)
    }
}

fn objective_value(
    genome: &Genome,
    objective: RepairObjective,
    context: &EvaluationContext,
) -> Result<f64> {
    match objective {
        RepairObjective::HardOnly => Ok(context.hard_violations(genome)? as f64),
        RepairObjective::Full => Ok(context.evaluate(genome)?.fitness.value),
    }
}

/// Positions sharing a slot or round with another match of the same team,
/// or a slot with another match at the same stadium. Sorted, deduplicated.
pub fn clash_positions(
    genome: &Genome,
    space: &GeneSpace,
    context: &EvaluationContext,
) -> Vec<usize> {
    let league = context.league();
    let mut team_slot: HashMap<(TeamId, SlotId), Vec<usize>> = HashMap::new();
    let mut team_round: HashMap<(TeamId, Round), Vec<usize>> = HashMap::new();
    let mut stadium_slot: HashMap<(StadiumId, SlotId), Vec<usize>> = HashMap::new();

    for (position, gene) in genome.iter().enumerate() {
        let Some(option) = space.option(position, *gene) else {
            continue;
        };
        let round = league.slot(option.slot).map(|s| s.round).unwrap_or_default();
        for team in [option.home, option.away] {
            team_slot.entry((team, option.slot)).or_default().push(position);
            team_round.entry((team, round)).or_default().push(position);
        }
        stadium_slot.entry((option.stadium, option.slot)).or_default().push(position);
    }

    let mut clashing: Vec<usize> = team_slot
        .into_values()
        .chain(team_round.into_values())
        .chain(stadium_slot.into_values())
        .filter(|positions| positions.len() > 1)
        .flatten()
        .collect();
    clashing.sort_unstable();
    clashing.dedup();
    clashing
}
