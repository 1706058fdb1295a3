use serde::Serialize;

/// Result of one constraint on one schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintOutcome {
    pub id: String,
    pub hard: bool,
    pub weight: f64,
    pub violations: u64,
}

impl ConstraintOutcome {
    /// Contribution to the soft penalty (zero for hard constraints)
    pub fn penalty(&self) -> f64 {
        if self.hard {
            0.0
        } else {
            self.violations as f64 * self.weight
        }
    }
}

/// Per-constraint violation counts with hard and soft totals.
///
/// Built once per evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationReport {
    outcomes: Vec<ConstraintOutcome>,
    hard_violations: u64,
    soft_penalty: f64,
}

impl ViolationReport {
    /// Totals are accumulated in `outcomes` order, keep it stable for bit-identical reports.
    pub fn new(outcomes: Vec<ConstraintOutcome>) -> Self {
        let mut hard_violations = 0u64;
        let mut soft_penalty = 0.0f64;
        for outcome in &outcomes {
            if outcome.hard {
                hard_violations += outcome.violations;
            } else {
                soft_penalty += outcome.penalty();
            }
        }
        Self {
            outcomes,
            hard_violations,
            soft_penalty,
        }
    }

    pub fn outcomes(&self) -> &[ConstraintOutcome] {
        &self.outcomes
    }

    pub fn hard_violations(&self) -> u64 {
        self.hard_violations
    }

    pub fn soft_penalty(&self) -> f64 {
        self.soft_penalty
    }

    pub fn is_feasible(&self) -> bool {
        self.hard_violations == 0
    }

    pub fn violations_of(&self, id: &str) -> Option<u64> {
        self.outcomes
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.violations)
    }

    /// Hard constraints with at least one violation
    pub fn violated_hard(&self) -> impl Iterator<Item = &ConstraintOutcome> {
        self.outcomes.iter().filter(|o| o.hard && o.violations > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, hard: bool, weight: f64, violations: u64) -> ConstraintOutcome {
        ConstraintOutcome {
            id: id.to_string(),
            hard,
            weight,
            violations,
        }
    }

    #[test]
    fn test_totals_split_hard_and_soft() {
        let report = ViolationReport::new(vec![
            outcome("clash", true, 0.0, 2),
            outcome("streak", false, 5.0, 3),
            outcome("travel", false, 0.5, 4),
        ]);
        assert_eq!(report.hard_violations(), 2);
        assert_eq!(report.soft_penalty(), 17.0);
        assert!(!report.is_feasible());
        assert_eq!(report.violations_of("streak"), Some(3));
        assert_eq!(report.violated_hard().count(), 1);
    }

    #[test]
    fn test_hard_weight_is_ignored() {
        let report = ViolationReport::new(vec![outcome("clash", true, 100.0, 1)]);
        assert_eq!(report.soft_penalty(), 0.0);
    }
}
