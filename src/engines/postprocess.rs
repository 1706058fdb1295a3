use crate::data::Schedule;
use crate::engines::constraints::ViolationReport;
use crate::engines::generation::evaluator::EvaluationContext;
use crate::engines::generation::evolution_engine::TerminationReason;
use crate::engines::generation::genome::Genome;
use crate::engines::generation::history::GenerationStats;
use crate::error::Result;
use serde::Serialize;

/// Why the best schedule is not feasible
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfeasibilityDiagnostic {
    /// Hard constraints with at least one violation, in id order
    pub violated_hard: Vec<String>,
    pub hard_violations: u64,
    /// Whether the search stopped improving before it ended
    pub stagnated: bool,
}

/// Final schedule. Both variants are normal outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleResult {
    Feasible {
        schedule: Schedule,
        report: ViolationReport,
    },
    BestEffort {
        schedule: Schedule,
        report: ViolationReport,
        diagnostic: InfeasibilityDiagnostic,
    },
}

impl ScheduleResult {
    pub fn schedule(&self) -> &Schedule {
        match self {
            ScheduleResult::Feasible { schedule, .. }
            | ScheduleResult::BestEffort { schedule, .. } => schedule,
        }
    }

    pub fn report(&self) -> &ViolationReport {
        match self {
            ScheduleResult::Feasible { report, .. } | ScheduleResult::BestEffort { report, .. } => {
                report
            }
        }
    }

    pub fn is_feasible(&self) -> bool {
        matches!(self, ScheduleResult::Feasible { .. })
    }

    pub fn diagnostic(&self) -> Option<&InfeasibilityDiagnostic> {
        match self {
            ScheduleResult::BestEffort { diagnostic, .. } => Some(diagnostic),
            ScheduleResult::Feasible { .. } => None,
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub result: ScheduleResult,
    /// Generations evaluated, the initial population included
    pub generations: usize,
    pub elapsed_ms: u64,
    pub termination: TerminationReason,
    pub seed: u64,
    pub history: Vec<GenerationStats>,
}

impl RunOutcome {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Re-checks the best genome against the full constraint set
pub struct PostProcessor<'a> {
    context: &'a EvaluationContext,
}

impl<'a> PostProcessor<'a> {
    pub fn new(context: &'a EvaluationContext) -> Self {
        Self { context }
    }

    pub fn finalize(&self, genome: &Genome, stagnated: bool) -> Result<ScheduleResult> {
        let evaluation = self.context.evaluate(genome)?;
        let report = evaluation.report;
        let schedule = evaluation.schedule;

        if report.is_feasible() {
            log::info!(
                "Feasible schedule: {} matches, soft penalty {:.2}",
                schedule.len(),
                report.soft_penalty()
            );
            return Ok(ScheduleResult::Feasible { schedule, report });
        }

        let diagnostic = InfeasibilityDiagnostic {
            violated_hard: report.violated_hard().map(|o| o.id.clone()).collect(),
            hard_violations: report.hard_violations(),
            stagnated,
        };
        log::warn!(
            "No feasible schedule found: {} hard violations in {:?}",
            diagnostic.hard_violations,
            diagnostic.violated_hard
        );
        Ok(ScheduleResult::BestEffort {
            schedule,
            report,
            diagnostic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstraintsConfig;
    use crate::data::snapshot::tests::four_team_snapshot;
    use crate::data::League;
    use crate::engines::constraints::ConstraintSet;
    use crate::engines::generation::encoding::ScheduleCodec;
    use crate::engines::generation::fitness::FitnessFunction;
    use crate::types::RoundRobin;
    use std::sync::Arc;

    fn context() -> EvaluationContext {
        let league = Arc::new(League::new(four_team_snapshot(), RoundRobin::Single).unwrap());
        EvaluationContext::new(
            ScheduleCodec::new(league),
            ConstraintSet::from_config(&ConstraintsConfig::clashes_only()).unwrap(),
            FitnessFunction::new(1_000_000.0),
        )
    }

    #[test]
    fn test_clashing_genome_is_best_effort() {
        let context = context();
        let genome = vec![0; context.codec().space().len()];
        let result = PostProcessor::new(&context).finalize(&genome, true).unwrap();

        assert!(!result.is_feasible());
        let diagnostic = result.diagnostic().unwrap();
        assert!(diagnostic.stagnated);
        assert!(diagnostic.violated_hard.contains(&"team_slot_clash".to_string()));
        assert_eq!(result.schedule().len(), 6);
    }

    #[test]
    fn test_result_serializes_with_status_tag() {
        let context = context();
        let genome = vec![0; context.codec().space().len()];
        let result = PostProcessor::new(&context).finalize(&genome, false).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "best_effort");
        assert!(json["schedule"]["matches"].is_array());
    }
}
