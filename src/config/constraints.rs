use super::traits::{config_error, ConfigSection};
use crate::error::SchedulerError;
use crate::types::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One configured rule: identifier, hard/soft flag, weight and rule kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    pub id: String,
    #[serde(default)]
    pub hard: bool,
    /// Penalty per violation; ignored for hard constraints
    #[serde(default)]
    pub weight: f64,
    pub rule: RuleKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    TeamSlotClash,
    StadiumSlotClash,
    TeamRoundClash,
    StadiumRoundClash,
    ConsecutiveOpponent,
    MinimumRest {
        #[serde(default)]
        min_days: u32,
    },
    HomeStadium,
    HomeAwayStreak {
        #[serde(default = "default_max_streak")]
        max_streak: usize,
    },
    TravelDistance {
        #[serde(default = "default_unit_km")]
        unit_km: f64,
    },
    RegionClustering {
        #[serde(default = "default_window")]
        window: usize,
    },
    DerbySpacing {
        #[serde(default)]
        pairs: Vec<(TeamId, TeamId)>,
        #[serde(default = "default_min_round_gap")]
        min_round_gap: u32,
    },
    RoundGaps,
}

fn default_max_streak() -> usize {
    3
}

fn default_unit_km() -> f64 {
    100.0
}

fn default_window() -> usize {
    3
}

fn default_min_round_gap() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintsConfig {
    pub definitions: Vec<ConstraintDefinition>,
}

impl ConstraintsConfig {
    pub fn hard(id: &str, rule: RuleKind) -> ConstraintDefinition {
        ConstraintDefinition {
            id: id.to_string(),
            hard: true,
            weight: 0.0,
            rule,
        }
    }

    pub fn soft(id: &str, weight: f64, rule: RuleKind) -> ConstraintDefinition {
        ConstraintDefinition {
            id: id.to_string(),
            hard: false,
            weight,
            rule,
        }
    }

    /// Structural clashes only, no preferences
    pub fn clashes_only() -> Self {
        Self {
            definitions: vec![
                Self::hard("team_slot_clash", RuleKind::TeamSlotClash),
                Self::hard("stadium_slot_clash", RuleKind::StadiumSlotClash),
                Self::hard("team_round_clash", RuleKind::TeamRoundClash),
            ],
        }
    }
}

impl Default for ConstraintsConfig {
    fn default() -> Self {
        let mut definitions = Self::clashes_only().definitions;
        definitions.extend([
            Self::hard("consecutive_opponent", RuleKind::ConsecutiveOpponent),
            Self::hard("minimum_rest", RuleKind::MinimumRest { min_days: 0 }),
            Self::soft("stadium_round_clash", 4.0, RuleKind::StadiumRoundClash),
            Self::soft("home_stadium", 3.0, RuleKind::HomeStadium),
            Self::soft(
                "home_away_streak",
                5.0,
                RuleKind::HomeAwayStreak { max_streak: default_max_streak() },
            ),
            Self::soft(
                "travel_distance",
                1.0,
                RuleKind::TravelDistance { unit_km: default_unit_km() },
            ),
            Self::soft(
                "region_clustering",
                2.0,
                RuleKind::RegionClustering { window: default_window() },
            ),
            Self::soft("round_gaps", 1.0, RuleKind::RoundGaps),
        ]);
        Self { definitions }
    }
}

impl ConfigSection for ConstraintsConfig {
    fn section_name() -> &'static str {
        "constraints"
    }

    fn validate(&self) -> Result<(), SchedulerError> {
        let section = Self::section_name();
        let mut seen = HashSet::new();
        for definition in &self.definitions {
            if definition.id.trim().is_empty() {
                return Err(config_error(section, "Constraint id must not be empty"));
            }
            if !seen.insert(definition.id.as_str()) {
                return Err(config_error(
                    section,
                    format!("Duplicate constraint id '{}'", definition.id),
                ));
            }
            if !definition.weight.is_finite() || definition.weight < 0.0 {
                return Err(config_error(
                    section,
                    format!(
                        "Constraint '{}' has invalid weight {}",
                        definition.id, definition.weight
                    ),
                ));
            }
            if !definition.hard && definition.weight == 0.0 {
                log::warn!(
                    "Soft constraint '{}' has zero weight and will not affect fitness",
                    definition.id
                );
            }
            match &definition.rule {
                RuleKind::TravelDistance { unit_km }
                    if !(unit_km.is_finite() && *unit_km > 0.0) =>
                {
                    return Err(config_error(
                        section,
                        format!("Constraint '{}' needs a positive unit_km", definition.id),
                    ));
                }
                RuleKind::RegionClustering { window } if *window < 2 => {
                    return Err(config_error(
                        section,
                        format!("Constraint '{}' needs a window of at least 2", definition.id),
                    ));
                }
                RuleKind::HomeAwayStreak { max_streak } if *max_streak == 0 => {
                    return Err(config_error(
                        section,
                        format!("Constraint '{}' needs max_streak of at least 1", definition.id),
                    ));
                }
                RuleKind::DerbySpacing { pairs, .. } if pairs.iter().any(|(a, b)| a == b) => {
                    return Err(config_error(
                        section,
                        format!("Constraint '{}' pairs a team with itself", definition.id),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let config = ConstraintsConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.definitions.iter().any(|d| d.hard));
        assert!(config.definitions.iter().any(|d| !d.hard));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut config = ConstraintsConfig::clashes_only();
        config
            .definitions
            .push(ConstraintsConfig::hard("team_slot_clash", RuleKind::TeamRoundClash));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rule_parses_from_toml() {
        let definition: ConstraintDefinition = toml::from_str(
            r#"
            id = "rest"
            hard = true
            rule = { kind = "minimum_rest", min_days = 2 }
            "#,
        )
        .unwrap();
        assert_eq!(definition.rule, RuleKind::MinimumRest { min_days: 2 });
        assert_eq!(definition.weight, 0.0);
    }
}
