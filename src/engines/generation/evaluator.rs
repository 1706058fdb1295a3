use crate::data::League;
use crate::engines::constraints::ConstraintSet;
use crate::engines::generation::encoding::ScheduleCodec;
use crate::engines::generation::fitness::FitnessFunction;
use crate::engines::generation::genome::Genome;
use crate::engines::generation::population::Evaluation;
use crate::error::Result;
use std::sync::mpsc;
use std::sync::Arc;

/// Read-only state every evaluation needs: codec, constraint set, fitness
pub struct EvaluationContext {
    codec: ScheduleCodec,
    constraints: ConstraintSet,
    fitness: FitnessFunction,
}

impl EvaluationContext {
    pub fn new(codec: ScheduleCodec, constraints: ConstraintSet, fitness: FitnessFunction) -> Self {
        Self {
            codec,
            constraints,
            fitness,
        }
    }

    pub fn codec(&self) -> &ScheduleCodec {
        &self.codec
    }

    pub fn league(&self) -> &League {
        self.codec.league()
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn fitness_function(&self) -> &FitnessFunction {
        &self.fitness
    }

    /// Decode, check every constraint and score
    pub fn evaluate(&self, genome: &Genome) -> Result<Evaluation> {
        let schedule = self.codec.decode(genome)?;
        let report = self.constraints.evaluate(&schedule, self.codec.league());
        let fitness = self.fitness.score(&report);
        Ok(Evaluation {
            schedule,
            report,
            fitness,
        })
    }

    /// Hard violation count only; cheaper objective for repair
    pub fn hard_violations(&self, genome: &Genome) -> Result<u64> {
        let schedule = self.codec.decode(genome)?;
        Ok(self.constraints.evaluate_hard(&schedule, self.codec.league()))
    }
}

/// Scores genomes on a bounded rayon pool.
///
/// Each call splits the pending genomes into chunks, spawns one scoped task
/// per chunk and collects `(index, result)` pairs from a channel. The call
/// returns only after every task has finished.
pub struct ParallelEvaluator {
    pool: rayon::ThreadPool,
    context: Arc<EvaluationContext>,
}

impl ParallelEvaluator {
    pub fn new(context: Arc<EvaluationContext>, workers: Option<usize>) -> Result<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("league-eval-{}", i));
        if let Some(workers) = workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder.build()?;
        log::debug!("Evaluation pool ready with {} workers", pool.current_num_threads());
        Ok(Self { pool, context })
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Evaluate `jobs` (caller index, genome). Results come back sorted by index.
    pub fn evaluate(&self, jobs: &[(usize, Genome)]) -> Vec<(usize, Result<Evaluation>)> {
        if jobs.is_empty() {
            return Vec::new();
        }

        let workers = self.worker_count().max(1);
        let chunk_size = jobs.len().div_ceil(workers);
        let (sender, receiver) = mpsc::channel();
        let context = &self.context;

        self.pool.scope(|scope| {
            for chunk in jobs.chunks(chunk_size) {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    for (index, genome) in chunk {
                        // Receiver outlives the scope
                        let _ = sender.send((*index, context.evaluate(genome)));
                    }
                });
            }
        });
        drop(sender);

        let mut results: Vec<(usize, Result<Evaluation>)> = receiver.into_iter().collect();
        results.sort_by_key(|(index, _)| *index);
        results
    }
}
