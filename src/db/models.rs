use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{MatchType, SubmissionStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ReferenceProblem {
    pub(crate) problem_id: i64,
    pub(crate) problem: String,
    pub(crate) domain: Vec<String>,
    pub(crate) answer: String,
    pub(crate) solution: String,
    pub(crate) difficulty: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) student_id: String,
    pub(crate) status: SubmissionStatus,
    pub(crate) graded_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ProblemSubmission {
    pub(crate) submission_id: String,
    pub(crate) problem_id: i64,
    pub(crate) ocr_text: Option<String>,
    pub(crate) student_solution: Option<String>,
    pub(crate) student_answer: Option<String>,
    pub(crate) page_count: i32,
    pub(crate) ocr_processed_at: PrimitiveDateTime,
}

impl ProblemSubmission {
    pub(crate) fn raw_text(&self) -> &str {
        self.ocr_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .or(self.student_solution.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct GradingResult {
    pub(crate) id: String,
    pub(crate) submission_id: String,
    pub(crate) problem_id: i64,
    pub(crate) is_relevant: bool,
    pub(crate) relevance_reason: String,
    pub(crate) is_proof: bool,
    pub(crate) answer_is_correct: bool,
    pub(crate) answer_confidence: f64,
    pub(crate) answer_reasoning: String,
    pub(crate) match_type: Option<MatchType>,
    pub(crate) logical_score: f64,
    pub(crate) step_count: i32,
    pub(crate) valid_steps: i32,
    pub(crate) first_error_step_index: i32,
    pub(crate) error_summary: Option<String>,
    pub(crate) final_score: f64,
    pub(crate) percentage: f64,
    pub(crate) feedback: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}
