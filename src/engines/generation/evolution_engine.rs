use crate::config::evolution::{EvolutionConfig, SelectionMethod};
use crate::config::{ConfigSection, SchedulerConfig};
use crate::data::League;
use crate::engines::constraints::ConstraintSet;
use crate::engines::generation::{
    encoding::ScheduleCodec,
    evaluator::{EvaluationContext, ParallelEvaluator},
    fitness::{Fitness, FitnessFunction},
    genome::Genome,
    history::{GenerationStats, RunHistory},
    initialization::PopulationInitializer,
    operators::{crossover, mutate, roulette_selection, tournament_selection},
    population::{ranked_indices, Individual},
    repair::{RepairObjective, Repairer},
};
use crate::engines::postprocess::{PostProcessor, RunOutcome};
use crate::error::{Result, SchedulerError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, stats: &GenerationStats);
    fn on_terminated(&mut self, reason: TerminationReason);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    MaxGenerations,
    Stagnation,
    Threshold,
    TimeBudget,
    Cancelled,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TerminationReason::MaxGenerations => "generation limit reached",
            TerminationReason::Stagnation => "no improvement within the stagnation window",
            TerminationReason::Threshold => "feasible schedule under the soft penalty threshold",
            TerminationReason::TimeBudget => "time budget exhausted",
            TerminationReason::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Steps of one run. Termination is checked right after every evaluation so
/// the final population is always scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Evaluate,
    CheckTermination,
    Select,
    Reproduce,
    Repair,
    Replace,
    Terminated(TerminationReason),
}

struct RunState {
    generation: usize,
    population: Vec<Individual>,
    parents: Vec<(usize, usize)>,
    offspring: Vec<Individual>,
    best: Option<Individual>,
    /// Best fitness at the last counted improvement
    reference: Option<Fitness>,
    last_improvement: usize,
    history: RunHistory,
    started: Instant,
}

impl RunState {
    fn new(save_history: bool) -> Self {
        Self {
            generation: 0,
            population: Vec::new(),
            parents: Vec::new(),
            offspring: Vec::new(),
            best: None,
            reference: None,
            last_improvement: 0,
            history: RunHistory::new(save_history),
            started: Instant::now(),
        }
    }

    fn best_value(&self) -> f64 {
        self.best
            .as_ref()
            .and_then(|b| b.fitness())
            .map(|f| f.value)
            .unwrap_or(f64::INFINITY)
    }
}

/// Generational GA over schedule genomes.
///
/// The engine owns the RNG (seeded once) and every operator; evaluation is
/// the only work handed to the worker pool.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    context: Arc<EvaluationContext>,
    evaluator: ParallelEvaluator,
    repairer: Repairer,
    seed: u64,
    rng: StdRng,
    seed_genomes: Vec<Genome>,
    cancel: Arc<AtomicBool>,
    next_id: u64,
}

impl EvolutionEngine {
    /// Engine for `league` using the configured constraint catalog
    pub fn new(league: Arc<League>, config: &SchedulerConfig) -> Result<Self> {
        config.validate()?;
        if league.format() != config.tournament.format {
            return Err(SchedulerError::Configuration(format!(
                "League was built as {:?} round-robin but the tournament section asks for {:?}",
                league.format(),
                config.tournament.format
            )));
        }
        let constraints = ConstraintSet::from_config(&config.constraints)?;
        Self::with_constraints(league, config.evolution.clone(), constraints)
    }

    /// Engine with a caller-built constraint set
    pub fn with_constraints(
        league: Arc<League>,
        config: EvolutionConfig,
        constraints: ConstraintSet,
    ) -> Result<Self> {
        config.validate()?;
        if !constraints.has_hard() {
            log::warn!("No hard constraints configured; every schedule counts as feasible");
        }

        let fitness = FitnessFunction::new(config.hard_penalty);
        let context = Arc::new(EvaluationContext::new(
            ScheduleCodec::new(league),
            constraints,
            fitness,
        ));
        let evaluator = ParallelEvaluator::new(Arc::clone(&context), config.workers)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!(
            "Evolution seed {} (population {}, up to {} generations, {} workers)",
            seed,
            config.population_size,
            config.max_generations,
            evaluator.worker_count()
        );

        Ok(Self {
            repairer: Repairer::new(config.max_repair_attempts),
            config,
            context,
            evaluator,
            seed,
            rng: StdRng::seed_from_u64(seed),
            seed_genomes: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            next_id: 0,
        })
    }

    /// Genomes placed in the initial population after the round-robin seeds.
    /// Genomes that do not decode are replaced by random ones.
    pub fn with_seed_genomes(mut self, seeds: Vec<Genome>) -> Self {
        self.seed_genomes = seeds;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    /// Setting the flag stops the run at the next generation boundary
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the evolution process
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<RunOutcome> {
        let mut state = RunState::new(self.config.save_history);
        let mut phase = Phase::Init;

        loop {
            log::trace!("Generation {}: {:?}", state.generation, phase);
            phase = match phase {
                Phase::Init => {
                    self.initialize(&mut state);
                    callback.on_generation_start(state.generation);
                    Phase::Evaluate
                }
                Phase::Evaluate => {
                    self.evaluate(&mut state)?;
                    let stats = self.record(&mut state);
                    callback.on_generation_complete(&stats);
                    Phase::CheckTermination
                }
                Phase::CheckTermination => match self.check_termination(&state) {
                    Some(reason) => Phase::Terminated(reason),
                    None => {
                        state.generation += 1;
                        callback.on_generation_start(state.generation);
                        Phase::Select
                    }
                },
                Phase::Select => {
                    self.select(&mut state);
                    Phase::Reproduce
                }
                Phase::Reproduce => {
                    self.reproduce(&mut state);
                    Phase::Repair
                }
                Phase::Repair => {
                    self.repair(&mut state)?;
                    Phase::Replace
                }
                Phase::Replace => {
                    self.replace(&mut state);
                    Phase::Evaluate
                }
                Phase::Terminated(reason) => {
                    callback.on_terminated(reason);
                    return self.finish(state, reason);
                }
            };
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn initialize(&mut self, state: &mut RunState) {
        let initializer =
            PopulationInitializer::new(self.context.league(), self.context.codec().space());
        let genomes = initializer.build(
            self.config.population_size,
            self.config.seeded_fraction,
            &self.seed_genomes,
            &mut self.rng,
        );
        state.population = genomes
            .into_iter()
            .map(|genome| Individual::new(self.next_id(), genome))
            .collect();
    }

    /// Score every individual without a cached evaluation
    fn evaluate(&mut self, state: &mut RunState) -> Result<()> {
        let jobs: Vec<(usize, Genome)> = state
            .population
            .iter()
            .enumerate()
            .filter(|(_, individual)| !individual.is_evaluated())
            .map(|(index, individual)| (index, individual.genome().clone()))
            .collect();
        if jobs.is_empty() {
            return Ok(());
        }

        for (index, result) in self.evaluator.evaluate(&jobs) {
            let evaluation = match result {
                Ok(evaluation) => evaluation,
                Err(SchedulerError::Encoding(reason)) => {
                    log::warn!(
                        "Individual {} does not decode ({}); replacing it with a random genome",
                        state.population[index].id(),
                        reason
                    );
                    let genome = self.context.codec().space().random_genome(&mut self.rng);
                    *state.population[index].genome_mut() = genome;
                    self.context.evaluate(state.population[index].genome())?
                }
                Err(e) => return Err(e),
            };
            state.population[index].set_evaluation(evaluation);
        }
        Ok(())
    }

    /// Update best-so-far, stagnation tracking and history
    fn record(&self, state: &mut RunState) -> GenerationStats {
        if let Some(leader) = state.population.iter().min_by(|a, b| a.rank_cmp(b)) {
            let improves = match (&state.best, leader.fitness()) {
                (None, _) => true,
                (Some(best), Some(candidate)) => best
                    .fitness()
                    .map_or(true, |current| candidate.compare(current).is_lt()),
                (Some(_), None) => false,
            };
            if improves {
                state.best = Some(leader.clone());
            }
        }

        let best_fitness = state.best.as_ref().and_then(|b| b.fitness()).copied();
        if let Some(best) = best_fitness {
            if self.improves_on_reference(state.reference.as_ref(), &best) {
                state.reference = Some(best);
                state.last_improvement = state.generation;
            }
        }

        let best_value = state.best_value();

        let stats = GenerationStats::collect(state.generation, &state.population, best_value);
        state.history.record(stats.clone());
        stats
    }

    /// A lower hard count, or the same hard count with a value drop that is
    /// strictly positive and at least `min_improvement`
    fn improves_on_reference(&self, reference: Option<&Fitness>, best: &Fitness) -> bool {
        let Some(reference) = reference else {
            return true;
        };
        if best.hard_violations != reference.hard_violations {
            return best.hard_violations < reference.hard_violations;
        }
        let gain = reference.value - best.value;
        gain > 0.0 && gain >= self.config.min_improvement
    }

    fn check_termination(&self, state: &RunState) -> Option<TerminationReason> {
        if self.cancel.load(Ordering::Relaxed) {
            return Some(TerminationReason::Cancelled);
        }
        if let Some(fitness) = state.best.as_ref().and_then(|b| b.fitness()) {
            if fitness.is_feasible() && fitness.soft_penalty <= self.config.soft_penalty_threshold {
                return Some(TerminationReason::Threshold);
            }
        }
        if state.generation + 1 >= self.config.max_generations {
            return Some(TerminationReason::MaxGenerations);
        }
        if state.generation - state.last_improvement >= self.config.stagnation_window {
            return Some(TerminationReason::Stagnation);
        }
        if let Some(budget) = self.config.time_budget() {
            if state.started.elapsed() >= budget {
                return Some(TerminationReason::TimeBudget);
            }
        }
        None
    }

    fn offspring_needed(&self) -> usize {
        self.config.population_size - self.config.elitism_count
    }

    fn select_one(&mut self, population: &[Individual]) -> usize {
        match self.config.selection_method {
            SelectionMethod::Tournament => {
                tournament_selection(population, self.config.tournament_size, &mut self.rng)
            }
            SelectionMethod::Roulette => roulette_selection(population, &mut self.rng),
        }
    }

    fn select(&mut self, state: &mut RunState) {
        let pairs = self.offspring_needed().div_ceil(2);
        state.parents = (0..pairs)
            .map(|_| {
                let first = self.select_one(&state.population);
                let second = self.select_one(&state.population);
                (first, second)
            })
            .collect();
    }

    fn reproduce(&mut self, state: &mut RunState) {
        let needed = self.offspring_needed();
        let mut offspring = Vec::with_capacity(needed);

        for (a, b) in std::mem::take(&mut state.parents) {
            let (parent1, parent2) = (&state.population[a], &state.population[b]);
            let (mut child1, mut child2) = if self.rng.gen::<f64>() < self.config.crossover_rate {
                let (genome1, genome2) = crossover(
                    self.config.crossover_method,
                    parent1.genome(),
                    parent2.genome(),
                    &mut self.rng,
                );
                (Individual::new(self.next_id(), genome1), Individual::new(self.next_id(), genome2))
            } else {
                // Reproduction (copy); cached evaluation survives unless mutated
                (parent1.clone_as(self.next_id()), parent2.clone_as(self.next_id()))
            };

            self.mutate_child(&mut child1);
            self.mutate_child(&mut child2);

            offspring.push(child1);
            if offspring.len() < needed {
                offspring.push(child2);
            }
        }

        offspring.truncate(needed);
        state.offspring = offspring;
    }

    fn mutate_child(&mut self, child: &mut Individual) {
        let mut genome = child.genome().clone();
        let touched = mutate(
            &mut genome,
            self.config.mutation_rate,
            self.config.swap_share,
            self.context.codec().space(),
            &mut self.rng,
        );
        if touched > 0 {
            *child.genome_mut() = genome;
        }
    }

    fn repair(&mut self, state: &mut RunState) -> Result<()> {
        let context = Arc::clone(&self.context);

        for child in state.offspring.iter_mut() {
            if self.rng.gen::<f64>() >= self.config.repair_rate {
                continue;
            }
            if child.fitness().is_some_and(|f| f.is_feasible()) {
                continue;
            }
            let mut genome = child.genome().clone();
            if self
                .repairer
                .repair(&mut genome, RepairObjective::HardOnly, &context, &mut self.rng)?
                > 0
            {
                *child.genome_mut() = genome;
            }
        }

        let due = self
            .config
            .local_search_interval
            .is_some_and(|interval| interval > 0 && state.generation % interval == 0);
        if due {
            if let Some(best) = &state.best {
                let mut genome = best.genome().clone();
                let moves = self
                    .repairer
                    .repair(&mut genome, RepairObjective::Full, &context, &mut self.rng)?;
                if moves > 0 {
                    log::debug!("Local search improved the best schedule with {} moves", moves);
                    let improved = Individual::new(self.next_id(), genome);
                    match state.offspring.last_mut() {
                        Some(last) => *last = improved,
                        None => state.offspring.push(improved),
                    }
                }
            }
        }
        Ok(())
    }

    /// Elites survive unmodified, offspring fill the rest
    fn replace(&mut self, state: &mut RunState) {
        let mut next: Vec<Individual> = ranked_indices(&state.population)
            .into_iter()
            .take(self.config.elitism_count)
            .map(|index| state.population[index].clone())
            .collect();
        next.append(&mut state.offspring);
        state.population = next;
    }

    fn finish(&self, state: RunState, reason: TerminationReason) -> Result<RunOutcome> {
        let best = state.best.as_ref().ok_or_else(|| {
            SchedulerError::Configuration("Run ended without an evaluated individual".to_string())
        })?;
        let stagnated = reason == TerminationReason::Stagnation
            || state.generation - state.last_improvement >= self.config.stagnation_window;

        let result = PostProcessor::new(&self.context).finalize(best.genome(), stagnated)?;
        let elapsed_ms = state.started.elapsed().as_millis() as u64;
        log::info!(
            "Finished after {} generations in {} ms ({}): best fitness {:.2}",
            state.generation + 1,
            elapsed_ms,
            reason,
            state.best_value()
        );

        Ok(RunOutcome {
            result,
            generations: state.generation + 1,
            elapsed_ms,
            termination: reason,
            seed: self.seed,
            history: state.history.into_generations(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConstraintsConfig, TournamentConfig};
    use crate::data::snapshot::tests::four_team_snapshot;
    use crate::data::Schedule;
    use crate::engines::constraints::{Constraint, ConstraintSpec};
    use crate::engines::generation::progress::{
        ChannelProgressCallback, NoopProgressCallback, ProgressMessage,
    };
    use crate::types::RoundRobin;
    use std::sync::mpsc::channel;

    /// One soft violation per match, so every schedule carries the same penalty
    struct EveryMatch;

    impl Constraint for EveryMatch {
        fn kind(&self) -> &'static str {
            "every_match"
        }

        fn evaluate(&self, schedule: &Schedule, _league: &League) -> u64 {
            schedule.len() as u64
        }
    }

    fn config(seed: u64) -> SchedulerConfig {
        SchedulerConfig {
            evolution: EvolutionConfig {
                population_size: 30,
                max_generations: 60,
                seed: Some(seed),
                workers: Some(2),
                ..EvolutionConfig::quick_test()
            },
            tournament: TournamentConfig { format: RoundRobin::Single },
            constraints: ConstraintsConfig::clashes_only(),
        }
    }

    fn engine(config: &SchedulerConfig) -> EvolutionEngine {
        let league = Arc::new(League::new(four_team_snapshot(), config.tournament.format).unwrap());
        EvolutionEngine::new(league, config).unwrap()
    }

    /// Clash rules plus a penalty no schedule can avoid, so the threshold is never met
    fn constant_penalty_engine(config: &SchedulerConfig) -> EvolutionEngine {
        let league = Arc::new(League::new(four_team_snapshot(), config.tournament.format).unwrap());
        let mut constraints =
            ConstraintSet::from_config(&ConstraintsConfig::clashes_only()).unwrap();
        constraints
            .insert(ConstraintSpec::soft("every_match", 1.0, Arc::new(EveryMatch)))
            .unwrap();
        EvolutionEngine::with_constraints(league, config.evolution.clone(), constraints).unwrap()
    }

    #[test]
    fn test_small_league_reaches_threshold() {
        let outcome = engine(&config(1)).run(NoopProgressCallback).unwrap();
        assert_eq!(outcome.termination, TerminationReason::Threshold);
        assert!(outcome.result.is_feasible());
        assert_eq!(outcome.result.schedule().len(), 6);
        assert_eq!(outcome.seed, 1);
    }

    #[test]
    fn test_best_so_far_never_regresses() {
        let mut config = config(3);
        config.constraints = ConstraintsConfig::default();
        config.evolution.max_generations = 25;
        let outcome = engine(&config).run(NoopProgressCallback).unwrap();
        assert_eq!(outcome.history.len(), outcome.generations);
        for pair in outcome.history.windows(2) {
            assert!(pair[1].best_so_far <= pair[0].best_so_far);
            assert!(pair[1].best_fitness <= pair[0].best_fitness);
        }
    }

    #[test]
    fn test_cancelled_before_start_stops_after_first_evaluation() {
        let mut engine = engine(&config(5));
        engine.cancel_handle().store(true, Ordering::Relaxed);
        let (sender, receiver) = channel();
        let outcome = engine.run(ChannelProgressCallback::new(sender)).unwrap();

        assert_eq!(outcome.termination, TerminationReason::Cancelled);
        assert_eq!(outcome.generations, 1);
        let messages: Vec<ProgressMessage> = receiver.try_iter().collect();
        assert_eq!(messages.first(), Some(&ProgressMessage::GenerationStart(0)));
        assert_eq!(
            messages.last(),
            Some(&ProgressMessage::Terminated(TerminationReason::Cancelled))
        );
    }

    #[test]
    fn test_undecodable_seed_genome_is_replaced() {
        let mut config = config(9);
        config.evolution.seeded_fraction = 0.0;
        let mut engine = engine(&config).with_seed_genomes(vec![vec![999; 6], vec![0; 2]]);
        let outcome = engine.run(NoopProgressCallback).unwrap();
        assert_eq!(outcome.result.schedule().len(), 6);
    }

    #[test]
    fn test_format_mismatch_is_configuration_error() {
        let config = config(1);
        let league = Arc::new(League::new(four_team_snapshot(), RoundRobin::Double).unwrap());
        let err = EvolutionEngine::new(league, &config).err().unwrap();
        assert!(matches!(err, SchedulerError::Configuration(_)));
    }

    #[test]
    fn test_local_search_runs_without_breaking_invariants() {
        let mut config = config(12);
        config.constraints = ConstraintsConfig::default();
        config.evolution.local_search_interval = Some(2);
        config.evolution.max_generations = 10;
        let outcome = engine(&config).run(NoopProgressCallback).unwrap();
        assert_eq!(outcome.result.schedule().len(), 6);
        assert!(outcome.generations <= 10);
    }

    #[test]
    fn test_unchanged_best_counts_as_stagnation_with_zero_min_improvement() {
        let mut config = config(21);
        config.evolution.min_improvement = 0.0;
        config.evolution.stagnation_window = 5;
        config.evolution.max_generations = 300;
        let outcome = constant_penalty_engine(&config).run(NoopProgressCallback).unwrap();

        assert_eq!(outcome.termination, TerminationReason::Stagnation);
        assert!(outcome.generations < 300);
        let last = outcome.history.last().unwrap();
        assert_eq!(last.best_so_far, outcome.history[outcome.generations - 6].best_so_far);
    }

    #[test]
    fn test_stagnation_stops_run_with_diagnostic() {
        let mut config = config(22);
        config.evolution.stagnation_window = 4;
        config.evolution.max_generations = 500;
        let outcome = constant_penalty_engine(&config).run(NoopProgressCallback).unwrap();

        assert_eq!(outcome.termination, TerminationReason::Stagnation);
        assert!(outcome.generations < 500);
        assert_eq!(outcome.result.schedule().len(), 6);
    }

    #[test]
    fn test_time_budget_stops_long_run() {
        let mut config = config(23);
        config.evolution.max_generations = 1_000_000;
        config.evolution.stagnation_window = 1_000_000;
        config.evolution.time_budget_ms = Some(1);
        let outcome = constant_penalty_engine(&config).run(NoopProgressCallback).unwrap();

        assert_eq!(outcome.termination, TerminationReason::TimeBudget);
        assert!(outcome.elapsed_ms >= 1);
        assert!(outcome.generations < 1_000_000);
    }

    #[test]
    fn test_roulette_selection_run() {
        let mut config = config(24);
        config.evolution.selection_method = SelectionMethod::Roulette;
        config.evolution.max_generations = 8;
        let outcome = constant_penalty_engine(&config).run(NoopProgressCallback).unwrap();

        assert_eq!(outcome.termination, TerminationReason::MaxGenerations);
        assert_eq!(outcome.generations, 8);
        assert_eq!(outcome.result.schedule().len(), 6);
        for pair in outcome.history.windows(2) {
            assert!(pair[1].best_so_far <= pair[0].best_so_far);
        }
    }
}
