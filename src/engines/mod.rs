pub mod constraints;
pub mod generation;
pub mod postprocess;

pub use constraints::{Constraint, ConstraintSet, ConstraintSpec, ViolationReport};
pub use postprocess::{InfeasibilityDiagnostic, PostProcessor, RunOutcome, ScheduleResult};
