use crate::data::Schedule;
use crate::engines::constraints::ViolationReport;
use crate::engines::generation::fitness::Fitness;
use crate::engines::generation::genome::Genome;
use std::cmp::Ordering;

/// Decoded schedule, report and fitness of one genome
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub schedule: Schedule,
    pub report: ViolationReport,
    pub fitness: Fitness,
}

#[derive(Debug, Clone)]
pub struct Individual {
    id: u64,
    genome: Genome,
    evaluation: Option<Evaluation>,
}

impl Individual {
    pub fn new(id: u64, genome: Genome) -> Self {
        Self {
            id,
            genome,
            evaluation: None,
        }
    }

    /// Copy under a new id, keeping the cached evaluation
    pub fn clone_as(&self, id: u64) -> Self {
        Self {
            id,
            genome: self.genome.clone(),
            evaluation: self.evaluation.clone(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Mutable genome access; drops the cached evaluation
    pub fn genome_mut(&mut self) -> &mut Genome {
        self.evaluation = None;
        &mut self.genome
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    pub fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.evaluation = Some(evaluation);
    }

    pub fn fitness(&self) -> Option<&Fitness> {
        self.evaluation.as_ref().map(|e| &e.fitness)
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    /// Ranking used everywhere: fitness order, then lowest id.
    /// Unevaluated individuals sort after evaluated ones.
    pub fn rank_cmp(&self, other: &Individual) -> Ordering {
        let by_fitness = match (self.fitness(), other.fitness()) {
            (Some(a), Some(b)) => a.compare(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_fitness.then_with(|| self.id.cmp(&other.id))
    }
}

/// Indices of `individuals` sorted best first
pub fn ranked_indices(individuals: &[Individual]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..individuals.len()).collect();
    order.sort_by(|&a, &b| individuals[a].rank_cmp(&individuals[b]));
    order
}

/// Fraction of distinct genomes in the population
pub fn genome_diversity(individuals: &[Individual]) -> f64 {
    if individuals.is_empty() {
        return 0.0;
    }
    let distinct: std::collections::HashSet<&Genome> =
        individuals.iter().map(|i| i.genome()).collect();
    distinct.len() as f64 / individuals.len() as f64
}
