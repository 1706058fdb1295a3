use super::traits::{config_error, ConfigSection};
use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub max_generations: usize,
    /// Per-gene mutation probability
    pub mutation_rate: f64,
    /// Share of gene mutations that swap two matches' venues instead of reassigning one
    pub swap_share: f64,
    pub crossover_rate: f64,
    pub crossover_method: CrossoverMethod,
    pub selection_method: SelectionMethod,
    pub elitism_count: usize,
    pub tournament_size: usize,
    /// Generations without improvement before stopping
    pub stagnation_window: usize,
    /// Smallest best-fitness drop that counts as improvement
    pub min_improvement: f64,
    /// Stop once a feasible schedule's soft penalty is at or below this
    pub soft_penalty_threshold: f64,
    pub time_budget_ms: Option<u64>,
    pub seed: Option<u64>,
    pub hard_penalty: f64,
    /// Probability that an offspring goes through repair
    pub repair_rate: f64,
    pub max_repair_attempts: usize,
    /// Run local search on the best individual every N generations
    pub local_search_interval: Option<usize>,
    /// Share of the initial population built by the circle method
    pub seeded_fraction: f64,
    /// Evaluation worker threads (rayon default when unset)
    pub workers: Option<usize>,
    pub log_frequency: usize,
    pub save_history: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    Tournament,
    Roulette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverMethod {
    SinglePoint,
    TwoPoint,
    Uniform,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            max_generations: 1000,
            mutation_rate: 0.02,
            swap_share: 0.3,
            crossover_rate: 0.8,
            crossover_method: CrossoverMethod::TwoPoint,
            selection_method: SelectionMethod::Tournament,
            elitism_count: 2,
            tournament_size: 3,
            stagnation_window: 100,
            min_improvement: 0.01,
            soft_penalty_threshold: 0.0,
            time_budget_ms: None,
            seed: None,
            hard_penalty: 1_000_000.0,
            repair_rate: 0.5,
            max_repair_attempts: 20,
            local_search_interval: None,
            seeded_fraction: 0.2,
            workers: None,
            log_frequency: 10,
            save_history: true,
        }
    }
}

impl EvolutionConfig {
    /// Small population and short horizon for smoke runs
    pub fn quick_test() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            stagnation_window: 30,
            log_frequency: 10,
            ..Self::default()
        }
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), SchedulerError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(config_error(
            EvolutionConfig::section_name(),
            format!("{} must be between 0 and 1, got {}", name, value),
        ));
    }
    Ok(())
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), SchedulerError> {
        let section = Self::section_name();
        if self.population_size < 2 {
            return Err(config_error(section, "Population size must be at least 2"));
        }
        if self.max_generations == 0 {
            return Err(config_error(section, "Max generations must be at least 1"));
        }
        check_probability("Mutation rate", self.mutation_rate)?;
        check_probability("Swap share", self.swap_share)?;
        check_probability("Crossover rate", self.crossover_rate)?;
        check_probability("Repair rate", self.repair_rate)?;
        check_probability("Seeded fraction", self.seeded_fraction)?;
        if self.elitism_count >= self.population_size {
            return Err(config_error(
                section,
                format!(
                    "Elitism count {} must be smaller than population size {}",
                    self.elitism_count, self.population_size
                ),
            ));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(config_error(
                section,
                format!(
                    "Tournament size must be between 1 and {}, got {}",
                    self.population_size, self.tournament_size
                ),
            ));
        }
        if self.stagnation_window == 0 {
            return Err(config_error(section, "Stagnation window must be at least 1"));
        }
        if !self.min_improvement.is_finite() || self.min_improvement < 0.0 {
            return Err(config_error(section, "Min improvement must be a non-negative number"));
        }
        if !self.soft_penalty_threshold.is_finite() || self.soft_penalty_threshold < 0.0 {
            return Err(config_error(
                section,
                "Soft penalty threshold must be a non-negative number",
            ));
        }
        if !self.hard_penalty.is_finite() || self.hard_penalty <= 0.0 {
            return Err(config_error(section, "Hard penalty must be a positive number"));
        }
        if self.time_budget_ms == Some(0) {
            return Err(config_error(section, "Time budget must be positive when set"));
        }
        if self.local_search_interval == Some(0) {
            return Err(config_error(
                section,
                "Local search interval must be positive when set",
            ));
        }
        if self.workers == Some(0) {
            return Err(config_error(section, "Worker count must be positive when set"));
        }
        if self.log_frequency == 0 {
            return Err(config_error(section, "Log frequency must be at least 1"));
        }
        Ok(())
    }
}
