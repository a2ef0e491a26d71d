use super::capabilities::{CapabilityError, FeedbackRequest, ReasoningService};
use crate::db::models::ReferenceProblem;

const FALLBACK_PREFIX: &str = "[Automatic feedback unavailable]";

#[derive(Debug, Clone)]
pub(crate) struct FeedbackContext<'a> {
    pub(crate) problem: &'a ReferenceProblem,
    pub(crate) student_answer: &'a str,
    pub(crate) student_solution: &'a str,
    pub(crate) is_correct: bool,
    pub(crate) similar_examples: &'a [ReferenceProblem],
}

impl<'a> FeedbackContext<'a> {
    fn request(&self) -> FeedbackRequest<'a> {
        FeedbackRequest {
            problem: &self.problem.problem,
            student_answer: self.student_answer,
            correct_answer: &self.problem.answer,
            student_solution: self.student_solution,
            reference_solution: &self.problem.solution,
            is_correct: self.is_correct,
            similar_examples: self.similar_examples,
        }
    }
}

/// Asks the feedback capability for an explanation. Runs for correct answers too.
pub(crate) async fn generate_feedback(
    reasoning: &dyn ReasoningService,
    context: &FeedbackContext<'_>,
) -> Result<String, CapabilityError> {
    let text = reasoning.generate_feedback(context.request()).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(CapabilityError::Malformed {
            capability: "feedback",
            detail: "empty feedback text".to_string(),
        });
    }
    Ok(text.to_string())
}

pub(crate) fn fallback_message(is_correct: bool) -> String {
    let verdict = if is_correct {
        "Your answer was marked correct."
    } else {
        "Your answer was marked incorrect."
    };
    format!(
        "{FALLBACK_PREFIX} {verdict} Compare your steps with the reference solution, \
         and ask for a review if something is unclear."
    )
}

pub(crate) fn irrelevant_message(reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        return "This submission does not appear to address the assigned problem, \
                so it was not graded."
            .to_string();
    }
    format!(
        "This submission does not appear to address the assigned problem, \
         so it was not graded. Reason: {reason}"
    )
}
