use super::{
    constraints::ConstraintsConfig, evolution::EvolutionConfig, tournament::TournamentConfig,
    traits::ConfigSection,
};
use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Prefix for environment overrides, e.g. `LEAGUE__EVOLUTION__SEED=7`
pub const ENV_PREFIX: &str = "LEAGUE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub evolution: EvolutionConfig,
    pub tournament: TournamentConfig,
    pub constraints: ConstraintsConfig,
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), SchedulerError> {
        self.evolution.validate()?;
        self.tournament.validate()?;
        self.constraints.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<SchedulerConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(SchedulerConfig::default())),
        }
    }

    /// Load a TOML or JSON file, then apply `LEAGUE__`-prefixed environment overrides.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SchedulerError> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: SchedulerConfig = settings.try_deserialize()?;
        loaded.validate()?;

        log::info!("Loaded configuration from {}", path.display());
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = loaded;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SchedulerError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> SchedulerConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply an edit; the previous configuration is kept if the result is invalid.
    pub fn update<F>(&self, f: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&mut SchedulerConfig),
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constraints::RuleKind;
    use crate::types::RoundRobin;

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("league.toml");

        let manager = ConfigManager::new();
        manager
            .update(|c| {
                c.evolution.seed = Some(42);
                c.evolution.population_size = 64;
                c.tournament.format = RoundRobin::Single;
            })
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let reloaded = ConfigManager::new();
        reloaded.load_from_file(&path).unwrap();
        assert_eq!(reloaded.get(), manager.get());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            r#"
            [evolution]
            population_size = 30
            max_generations = 50

            [[constraints.definitions]]
            id = "rest"
            hard = true
            rule = { kind = "minimum_rest", min_days = 3 }
            "#,
        )
        .unwrap();

        let manager = ConfigManager::new();
        manager.load_from_file(&path).unwrap();
        let config = manager.get();
        assert_eq!(config.evolution.population_size, 30);
        assert_eq!(config.evolution.tournament_size, EvolutionConfig::default().tournament_size);
        assert_eq!(config.constraints.definitions.len(), 1);
        assert_eq!(
            config.constraints.definitions[0].rule,
            RuleKind::MinimumRest { min_days: 3 }
        );
    }

    #[test]
    fn test_invalid_update_is_rolled_back() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.evolution.population_size = 0);
        assert!(result.is_err());
        assert_eq!(manager.get(), SchedulerConfig::default());
    }
}
