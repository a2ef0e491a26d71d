use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "submissionstatus", rename_all = "lowercase")]
pub(crate) enum SubmissionStatus {
    Processing,
    Graded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("submission cannot move from {from:?} to {to:?}")]
pub(crate) struct TransitionError {
    pub(crate) from: SubmissionStatus,
    pub(crate) to: SubmissionStatus,
}

impl SubmissionStatus {
    /// Grading-side moves. Leaving `Graded` goes through `reopen`.
    pub(crate) fn transition(
        self,
        to: SubmissionStatus,
    ) -> Result<SubmissionStatus, TransitionError> {
        match (self, to) {
            (Self::Processing, Self::Processing)
            | (Self::Processing, Self::Graded)
            | (Self::Graded, Self::Graded) => Ok(to),
            (Self::Graded, Self::Processing) => Err(TransitionError { from: self, to }),
        }
    }

    pub(crate) fn reopen(self) -> SubmissionStatus {
        Self::Processing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "answermatchtype", rename_all = "snake_case")]
pub(crate) enum MatchType {
    Exact,
    EquivalenceChecked,
}
