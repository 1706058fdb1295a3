use super::traits::ConfigSection;
use crate::error::SchedulerError;
use crate::types::RoundRobin;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    pub format: RoundRobin,
}

impl ConfigSection for TournamentConfig {
    fn section_name() -> &'static str {
        "tournament"
    }

    fn validate(&self) -> Result<(), SchedulerError> {
        Ok(())
    }
}
