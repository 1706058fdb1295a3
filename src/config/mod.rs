pub mod constraints;
pub mod evolution;
pub mod manager;
pub mod tournament;
pub mod traits;

pub use constraints::{ConstraintDefinition, ConstraintsConfig, RuleKind};
pub use evolution::{CrossoverMethod, EvolutionConfig, SelectionMethod};
pub use manager::{ConfigManager, SchedulerConfig};
pub use tournament::TournamentConfig;
pub use traits::ConfigSection;
