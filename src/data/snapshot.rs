use crate::data::model::{Stadium, Team, TimeSlot};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw teams, stadiums and slots as supplied by an external loader.
///
/// Nothing here is validated; `League::new` does that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub teams: Vec<Team>,
    pub stadiums: Vec<Stadium>,
    pub slots: Vec<TimeSlot>,
}

impl LeagueSnapshot {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
