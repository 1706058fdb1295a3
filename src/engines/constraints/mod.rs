//! Constraint catalog and evaluator.
//!
//! A constraint is a pure capability `evaluate(schedule, league) -> count`.
//! The set maps identifiers to specs (capability plus hard flag and weight)
//! and always scores every constraint so the search keeps a useful gradient.

pub mod report;
pub mod rules;

pub use report::{ConstraintOutcome, ViolationReport};

use crate::config::constraints::{ConstraintDefinition, ConstraintsConfig};
use crate::data::{League, Schedule};
use crate::error::{Result, SchedulerError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A rule over a whole schedule. Implementations must be free of interior
/// mutability: they are called concurrently from evaluation workers.
pub trait Constraint: Send + Sync {
    fn kind(&self) -> &'static str;

    /// Number of violations in `schedule`
    fn evaluate(&self, schedule: &Schedule, league: &League) -> u64;
}

#[derive(Clone)]
pub struct ConstraintSpec {
    pub id: String,
    pub hard: bool,
    pub weight: f64,
    pub rule: Arc<dyn Constraint>,
}

impl ConstraintSpec {
    pub fn hard(id: impl Into<String>, rule: Arc<dyn Constraint>) -> Self {
        Self {
            id: id.into(),
            hard: true,
            weight: 0.0,
            rule,
        }
    }

    pub fn soft(id: impl Into<String>, weight: f64, rule: Arc<dyn Constraint>) -> Self {
        Self {
            id: id.into(),
            hard: false,
            weight,
            rule,
        }
    }

    fn from_definition(definition: &ConstraintDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            hard: definition.hard,
            weight: definition.weight,
            rule: rules::build_rule(&definition.rule),
        }
    }
}

impl fmt::Debug for ConstraintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSpec")
            .field("id", &self.id)
            .field("hard", &self.hard)
            .field("weight", &self.weight)
            .field("kind", &self.rule.kind())
            .finish()
    }
}

/// Identifier-keyed constraint set, loaded once per run and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    specs: BTreeMap<String, ConstraintSpec>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ConstraintsConfig) -> Result<Self> {
        let mut set = Self::new();
        for definition in &config.definitions {
            set.insert(ConstraintSpec::from_definition(definition))?;
        }
        log::debug!(
            "Constraint set: {} hard, {} soft",
            set.specs.values().filter(|s| s.hard).count(),
            set.specs.values().filter(|s| !s.hard).count()
        );
        Ok(set)
    }

    pub fn insert(&mut self, spec: ConstraintSpec) -> Result<()> {
        if self.specs.contains_key(&spec.id) {
            return Err(SchedulerError::Configuration(format!(
                "Constraint '{}' is already registered",
                spec.id
            )));
        }
        if !spec.weight.is_finite() || spec.weight < 0.0 {
            return Err(SchedulerError::Configuration(format!(
                "Constraint '{}' has invalid weight {}",
                spec.id, spec.weight
            )));
        }
        self.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ConstraintSpec> {
        self.specs.get(id)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn has_hard(&self) -> bool {
        self.specs.values().any(|s| s.hard)
    }

    /// Score every constraint, in identifier order
    pub fn evaluate(&self, schedule: &Schedule, league: &League) -> ViolationReport {
        let outcomes = self
            .specs
            .values()
            .map(|spec| ConstraintOutcome {
                id: spec.id.clone(),
                hard: spec.hard,
                weight: spec.weight,
                violations: spec.rule.evaluate(schedule, league),
            })
            .collect();
        ViolationReport::new(outcomes)
    }

    /// Total hard violations only, skipping soft rules
    pub fn evaluate_hard(&self, schedule: &Schedule, league: &League) -> u64 {
        self.specs
            .values()
            .filter(|spec| spec.hard)
            .map(|spec| spec.rule.evaluate(schedule, league))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::snapshot::tests::four_team_snapshot;
    use crate::types::{Match, RoundRobin};

    struct EveryMatch;

    impl Constraint for EveryMatch {
        fn kind(&self) -> &'static str {
            "every_match"
        }

        fn evaluate(&self, schedule: &Schedule, _league: &League) -> u64 {
            schedule.len() as u64
        }
    }

    fn sample() -> (League, Schedule) {
        let league = League::new(four_team_snapshot(), RoundRobin::Double).unwrap();
        let matches = vec![
            Match {
                home: 1,
                away: 2,
                stadium: 1,
                slot: 10,
                round: 1,
            },
            Match {
                home: 3,
                away: 1,
                stadium: 2,
                slot: 10,
                round: 1,
            },
        ];
        let schedule = Schedule::from_matches(matches, &league);
        (league, schedule)
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let (league, schedule) = sample();
        let set = ConstraintSet::from_config(&ConstraintsConfig::default()).unwrap();
        let first = set.evaluate(&schedule, &league);
        for _ in 0..5 {
            assert_eq!(set.evaluate(&schedule, &league), first);
        }
        assert_eq!(first.outcomes().len(), set.len());
    }

    #[test]
    fn test_custom_capability_and_no_short_circuit() {
        let (league, schedule) = sample();
        let mut set = ConstraintSet::from_config(&ConstraintsConfig::clashes_only()).unwrap();
        set.insert(ConstraintSpec::soft("volume", 2.5, Arc::new(EveryMatch)))
            .unwrap();

        let report = set.evaluate(&schedule, &league);
        // Team 1 double-booked in slot 10 and round 1
        assert_eq!(report.violations_of("team_slot_clash"), Some(1));
        assert_eq!(report.violations_of("team_round_clash"), Some(1));
        assert_eq!(report.hard_violations(), 2);
        assert_eq!(report.soft_penalty(), 5.0);
        assert_eq!(set.evaluate_hard(&schedule, &league), 2);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut set = ConstraintSet::new();
        set.insert(ConstraintSpec::hard("x", Arc::new(EveryMatch))).unwrap();
        assert!(set.insert(ConstraintSpec::hard("x", Arc::new(EveryMatch))).is_err());
    }
}
