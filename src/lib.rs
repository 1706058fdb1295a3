//! Sports-league calendar generation with a genetic algorithm.
//!
//! Load a [`LeagueSnapshot`], build a [`League`], configure a run with
//! [`SchedulerConfig`] and drive it with [`EvolutionEngine`]. The run ends in a
//! [`RunOutcome`] holding either a feasible schedule or the best effort found.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use config::{
    ConfigManager, ConstraintsConfig, CrossoverMethod, EvolutionConfig, SchedulerConfig,
    SelectionMethod, TournamentConfig,
};
pub use data::{League, LeagueSnapshot, Schedule};
pub use engines::generation::{
    ChannelProgressCallback, ConsoleProgressCallback, EvolutionEngine, ProgressCallback,
    ProgressMessage, TerminationReason,
};
pub use engines::{RunOutcome, ScheduleResult};
pub use error::{Result, SchedulerError};
pub use types::{Match, RoundRobin};
