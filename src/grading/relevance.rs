use serde::Serialize;

use super::capabilities::{CapabilityError, ReasoningService};

pub(crate) const EMPTY_SUBMISSION_REASON: &str = "empty submission";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct RelevanceVerdict {
    pub(crate) is_relevant: bool,
    pub(crate) reason: String,
}

impl RelevanceVerdict {
    pub(crate) fn fail_open(error: &CapabilityError) -> Self {
        let reason = format!("relevance check failed ({error}); assumed relevant");
        Self { is_relevant: true, reason }
    }
}

/// Blank text is rejected without consulting the classifier.
pub(crate) async fn check_relevance(
    reasoning: &dyn ReasoningService,
    text: &str,
    problem_text: &str,
) -> Result<RelevanceVerdict, CapabilityError> {
    if text.trim().is_empty() {
        return Ok(RelevanceVerdict {
            is_relevant: false,
            reason: EMPTY_SUBMISSION_REASON.to_string(),
        });
    }

    let report = reasoning.classify_relevance(text, problem_text).await?;
    Ok(RelevanceVerdict { is_relevant: report.is_relevant, reason: report.reason })
}
