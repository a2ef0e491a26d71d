use async_trait::async_trait;
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::db::models::{GradingResult, ProblemSubmission, ReferenceProblem};
use crate::db::types::TransitionError;

#[derive(Debug, Clone)]
pub(crate) struct ProblemWork {
    pub(crate) submission: ProblemSubmission,
    pub(crate) problem: ReferenceProblem,
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("submission {0} disappeared while grading")]
    MissingSubmission(String),
}

#[async_trait]
pub(crate) trait GradingStore: Send + Sync {
    /// Problem submissions to grade, ordered by problem id.
    async fn load_work(
        &self,
        submission_id: &str,
        problem_id: Option<i64>,
    ) -> Result<Vec<ProblemWork>, StoreError>;

    /// Atomically drops every result of the submission, inserts `results`
    /// and marks the submission graded.
    async fn replace_results(
        &self,
        submission_id: &str,
        results: &[GradingResult],
        graded_at: PrimitiveDateTime,
    ) -> Result<(), StoreError>;

    async fn list_results(&self, submission_id: &str) -> Result<Vec<GradingResult>, StoreError>;
}
