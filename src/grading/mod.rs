pub(crate) mod answer;
pub(crate) mod capabilities;
pub(crate) mod feedback;
pub(crate) mod logic;
pub(crate) mod normalize;
pub(crate) mod orchestrator;
pub(crate) mod policy;
pub(crate) mod relevance;
pub(crate) mod score;
pub(crate) mod store;
pub(crate) mod structure;

use thiserror::Error;

pub(crate) use capabilities::{CapabilityError, ReasoningService, SimilarProblemSource};
pub(crate) use orchestrator::{GradeOutcome, GradingPipeline, ProblemStage};
pub(crate) use policy::Capability;
pub(crate) use store::{GradingStore, ProblemWork, StoreError};

#[derive(Debug, Error)]
pub(crate) enum GradingError {
    #[error("no problem submissions for submission {submission_id} (problem: {problem_id:?})")]
    NotFound { submission_id: String, problem_id: Option<i64> },
    #[error("{capability} verification failed")]
    Verification {
        capability: Capability,
        #[source]
        source: CapabilityError,
    },
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("problem {problem_id} cannot move from {from:?} to {to:?}")]
    Stage { problem_id: i64, from: ProblemStage, to: ProblemStage },
}
