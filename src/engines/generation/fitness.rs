use crate::engines::constraints::ViolationReport;
use serde::Serialize;
use std::cmp::Ordering;

/// Scalar score of a schedule (lower is better) with the parts it was built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fitness {
    pub value: f64,
    pub hard_violations: u64,
    pub soft_penalty: f64,
}

impl Fitness {
    /// Total order: hard violations, then value, then soft penalty.
    ///
    /// Fewer hard violations always rank first, whatever the soft penalty.
    pub fn compare(&self, other: &Fitness) -> Ordering {
        self.hard_violations
            .cmp(&other.hard_violations)
            .then_with(|| self.value.total_cmp(&other.value))
            .then_with(|| self.soft_penalty.total_cmp(&other.soft_penalty))
    }

    pub fn is_feasible(&self) -> bool {
        self.hard_violations == 0
    }
}

/// `hard_violations * hard_penalty + soft_penalty`
#[derive(Debug, Clone, Copy)]
pub struct FitnessFunction {
    hard_penalty: f64,
}

impl FitnessFunction {
    pub fn new(hard_penalty: f64) -> Self {
        Self { hard_penalty }
    }

    pub fn hard_penalty(&self) -> f64 {
        self.hard_penalty
    }

    pub fn score(&self, report: &ViolationReport) -> Fitness {
        let hard_violations = report.hard_violations();
        let soft_penalty = report.soft_penalty();
        Fitness {
            value: hard_violations as f64 * self.hard_penalty + soft_penalty,
            hard_violations,
            soft_penalty,
        }
    }
}
