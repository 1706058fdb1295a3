pub mod encoding;
pub mod evaluator;
pub mod evolution_engine;
pub mod fitness;
pub mod genome;
pub mod history;
pub mod initialization;
pub mod operators;
pub mod population;
pub mod progress;
pub mod repair;

pub use encoding::ScheduleCodec;
pub use evaluator::{EvaluationContext, ParallelEvaluator};
pub use evolution_engine::{EvolutionEngine, Phase, ProgressCallback, TerminationReason};
pub use fitness::{Fitness, FitnessFunction};
pub use genome::{GeneOption, GeneSpace, Genome};
pub use history::{GenerationStats, RunHistory};
pub use initialization::PopulationInitializer;
pub use population::{Evaluation, Individual};
pub use progress::{
    ChannelProgressCallback, ConsoleProgressCallback, NoopProgressCallback, ProgressMessage,
};
pub use repair::{RepairObjective, Repairer};
