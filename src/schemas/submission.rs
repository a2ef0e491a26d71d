use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::intake::{IntakeReceipt, IntakeRequest};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ProblemUploadRequest {
    #[serde(default)]
    #[validate(length(max = 64, message = "test_id is too long"))]
    pub(crate) test_id: Option<String>,
    #[validate(length(min = 1, max = 128, message = "student_id must not be empty"))]
    pub(crate) student_id: String,
    #[validate(range(min = 1, message = "problem_id must be positive"))]
    pub(crate) problem_id: i64,
    #[validate(length(min = 1, max = 20, message = "between 1 and 20 pages are accepted"))]
    pub(crate) pages: Vec<String>,
}

impl From<ProblemUploadRequest> for IntakeRequest {
    fn from(request: ProblemUploadRequest) -> Self {
        Self {
            test_id: request.test_id,
            student_id: request.student_id.trim().to_string(),
            problem_id: request.problem_id,
            pages: request.pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProblemUploadResponse {
    pub(crate) submission_id: String,
    pub(crate) test_id: String,
    pub(crate) problem_id: i64,
    pub(crate) page_count: usize,
    pub(crate) student_answer: Option<String>,
    pub(crate) status: &'static str,
}

impl From<IntakeReceipt> for ProblemUploadResponse {
    fn from(receipt: IntakeReceipt) -> Self {
        Self {
            submission_id: receipt.submission_id,
            test_id: receipt.test_id,
            problem_id: receipt.problem_id,
            page_count: receipt.page_count,
            student_answer: receipt.student_answer,
            status: "processing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_requires_student_and_pages() {
        let request = ProblemUploadRequest {
            test_id: None,
            student_id: String::new(),
            problem_id: 3,
            pages: Vec::new(),
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("student_id"));
        assert!(fields.contains_key("pages"));
    }

    #[test]
    fn valid_upload_passes() {
        let request = ProblemUploadRequest {
            test_id: Some("midterm".to_string()),
            student_id: "s-1".to_string(),
            problem_id: 3,
            pages: vec!["x = 2".to_string()],
        };
        assert!(request.validate().is_ok());
    }
}
