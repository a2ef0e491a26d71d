use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::GradingResult;
use crate::db::types::MatchType;
use crate::grading::GradeOutcome;

#[derive(Debug, Deserialize)]
pub(crate) struct GradeQuery {
    #[serde(default)]
    pub(crate) problem_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeResponse {
    pub(crate) submission_id: String,
    pub(crate) message: String,
    pub(crate) problems_graded: usize,
}

impl From<GradeOutcome> for GradeResponse {
    fn from(outcome: GradeOutcome) -> Self {
        Self {
            submission_id: outcome.submission_id,
            message: outcome.message,
            problems_graded: outcome.problems_graded,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerVerdictResponse {
    pub(crate) is_correct: bool,
    pub(crate) confidence: f64,
    pub(crate) reasoning: String,
    pub(crate) match_type: Option<MatchType>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LogicVerdictResponse {
    pub(crate) logical_score: f64,
    pub(crate) step_count: i32,
    pub(crate) valid_steps: i32,
    pub(crate) first_error_step_index: i32,
    pub(crate) error_summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradingResultResponse {
    pub(crate) id: String,
    pub(crate) submission_id: String,
    pub(crate) problem_id: i64,
    pub(crate) is_relevant: bool,
    pub(crate) relevance_reason: String,
    pub(crate) is_proof: bool,
    pub(crate) answer: AnswerVerdictResponse,
    pub(crate) logic: LogicVerdictResponse,
    pub(crate) final_score: f64,
    pub(crate) percentage: f64,
    pub(crate) feedback: Option<String>,
    pub(crate) created_at: String,
}

impl From<GradingResult> for GradingResultResponse {
    fn from(result: GradingResult) -> Self {
        Self {
            id: result.id,
            submission_id: result.submission_id,
            problem_id: result.problem_id,
            is_relevant: result.is_relevant,
            relevance_reason: result.relevance_reason,
            is_proof: result.is_proof,
            answer: AnswerVerdictResponse {
                is_correct: result.answer_is_correct,
                confidence: result.answer_confidence,
                reasoning: result.answer_reasoning,
                match_type: result.match_type,
            },
            logic: LogicVerdictResponse {
                logical_score: result.logical_score,
                step_count: result.step_count,
                valid_steps: result.valid_steps,
                first_error_step_index: result.first_error_step_index,
                error_summary: result.error_summary,
            },
            final_score: result.final_score,
            percentage: result.percentage,
            feedback: result.feedback,
            created_at: format_primitive(result.created_at),
        }
    }
}
