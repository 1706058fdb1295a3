use crate::engines::generation::population::{genome_diversity, Individual};
use serde::{Deserialize, Serialize};

/// Per-generation summary of the population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    /// Best fitness in this generation's population
    pub best_fitness: f64,
    /// Best fitness seen so far in the run
    pub best_so_far: f64,
    pub mean_fitness: f64,
    pub worst_fitness: f64,
    pub best_hard_violations: u64,
    pub feasible_count: usize,
    pub diversity: f64,
}

impl GenerationStats {
    /// Summarise an evaluated population. Unevaluated individuals are skipped.
    pub fn collect(generation: usize, population: &[Individual], best_so_far: f64) -> Self {
        let fitnesses: Vec<_> = population.iter().filter_map(|i| i.fitness()).collect();

        let best = fitnesses.iter().min_by(|a, b| a.compare(b));
        let best_fitness = best.map(|f| f.value).unwrap_or(f64::INFINITY);
        let worst_fitness = fitnesses
            .iter()
            .map(|f| f.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let mean_fitness = if fitnesses.is_empty() {
            f64::INFINITY
        } else {
            fitnesses.iter().map(|f| f.value).sum::<f64>() / fitnesses.len() as f64
        };

        Self {
            generation,
            best_fitness,
            best_so_far: best_so_far.min(best_fitness),
            mean_fitness,
            worst_fitness,
            best_hard_violations: best.map(|f| f.hard_violations).unwrap_or(u64::MAX),
            feasible_count: fitnesses.iter().filter(|f| f.is_feasible()).count(),
            diversity: genome_diversity(population),
        }
    }
}

/// Run history, optionally recorded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunHistory {
    enabled: bool,
    generations: Vec<GenerationStats>,
}

impl RunHistory {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            generations: Vec::new(),
        }
    }

    pub fn record(&mut self, stats: GenerationStats) {
        if self.enabled {
            self.generations.push(stats);
        }
    }

    pub fn generations(&self) -> &[GenerationStats] {
        &self.generations
    }

    pub fn into_generations(self) -> Vec<GenerationStats> {
        self.generations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::snapshot::tests::four_team_snapshot;
    use crate::data::{League, Schedule};
    use crate::engines::constraints::ViolationReport;
    use crate::engines::generation::fitness::Fitness;
    use crate::engines::generation::population::Evaluation;
    use crate::types::RoundRobin;

    fn individual(id: u64, value: f64, hard: u64) -> Individual {
        let league = League::new(four_team_snapshot(), RoundRobin::Single).unwrap();
        let mut individual = Individual::new(id, vec![id as u32]);
        individual.set_evaluation(Evaluation {
            schedule: Schedule::from_matches(Vec::new(), &league),
            report: ViolationReport::new(Vec::new()),
            fitness: Fitness {
                value,
                hard_violations: hard,
                soft_penalty: 0.0,
            },
        });
        individual
    }

    #[test]
    fn test_collect_summarises_population() {
        let population = vec![
            individual(1, 4.0, 0),
            individual(2, 2.0, 0),
            individual(3, 2_000_000.0, 2),
        ];
        let stats = GenerationStats::collect(5, &population, 1.0);
        assert_eq!(stats.best_fitness, 2.0);
        assert_eq!(stats.best_so_far, 1.0);
        assert_eq!(stats.worst_fitness, 2_000_000.0);
        assert_eq!(stats.feasible_count, 2);
        assert_eq!(stats.best_hard_violations, 0);
        assert_eq!(stats.diversity, 1.0);
    }

    #[test]
    fn test_disabled_history_records_nothing() {
        let mut history = RunHistory::new(false);
        history.record(GenerationStats::collect(0, &[individual(1, 1.0, 0)], f64::INFINITY));
        assert!(history.generations().is_empty());
    }
}
