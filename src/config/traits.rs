use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), SchedulerError>;
}

pub(crate) fn config_error(section: &str, message: impl Into<String>) -> SchedulerError {
    SchedulerError::Configuration(format!("[{}] {}", section, message.into()))
}
