use serde::Serialize;

use super::capabilities::{CapabilityError, ReasoningService};

pub(crate) const NO_STEPS_SUMMARY: &str = "No solution steps found";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SolutionInput {
    Steps(Vec<String>),
    Raw(String),
}

impl SolutionInput {
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Self::Steps(steps) => steps.iter().all(|step| step.trim().is_empty()),
            Self::Raw(text) => text.trim().is_empty(),
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Steps(steps) => steps
                .iter()
                .filter(|step| !step.trim().is_empty())
                .enumerate()
                .map(|(index, step)| format!("Step {}: {}", index + 1, step.trim()))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Raw(text) => text.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct LogicVerdict {
    pub(crate) logical_score: f64,
    pub(crate) step_count: i32,
    pub(crate) valid_steps: i32,
    /// Zero-based; `0` also stands for "no error" when `error_summary` is empty.
    pub(crate) first_error_step_index: i32,
    pub(crate) error_summary: Option<String>,
}

impl LogicVerdict {
    fn no_steps() -> Self {
        Self {
            logical_score: 0.0,
            step_count: 0,
            valid_steps: 0,
            first_error_step_index: 0,
            error_summary: Some(NO_STEPS_SUMMARY.to_string()),
        }
    }
}

pub(crate) async fn verify_logic(
    reasoning: &dyn ReasoningService,
    solution: &SolutionInput,
    reference_solution: &str,
    correct_answer: &str,
) -> Result<LogicVerdict, CapabilityError> {
    if solution.is_empty() {
        return Ok(LogicVerdict::no_steps());
    }

    let report =
        reasoning.evaluate_logic(&solution.render(), reference_solution, correct_answer).await?;

    let (first_error_step_index, error_summary) = if report.first_error_step_index < 0 {
        (0, None)
    } else {
        (saturate(report.first_error_step_index), report.error_summary)
    };

    Ok(LogicVerdict {
        logical_score: report.logical_score,
        step_count: saturate(report.step_count),
        valid_steps: saturate(report.valid_steps),
        first_error_step_index,
        error_summary,
    })
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value.max(0)).unwrap_or(i32::MAX)
}
