use std::sync::LazyLock;

use regex::Regex;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::ProblemSubmission;
use crate::db::types::SubmissionStatus;
use crate::repositories::{problem_submissions, reference_problems, submissions};

pub(crate) const PRACTICE_TEST_ID: &str = "practice";

static LABELLED_ANSWER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\\boxed\{([^{}]+)\}",
        r"(?im)\bfinal\s+answer\s*(?:is)?\s*[:=]?\s*(.+)$",
        r"(?im)\banswer\s+is\s*:?\s*(.+)$",
        r"(?im)\b(?:answer|ans)\s*[:=]\s*(.+)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid answer pattern"))
    .collect()
});

static TRAILING_ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:answer|ans)\b\s*:?\s*(.+)$").expect("valid answer pattern")
});

static ANSWER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:is\b|equals?\b|=)\s*").expect("valid answer pattern")
});

#[derive(Debug, Error)]
pub(crate) enum IntakeError {
    #[error("at least one page with recognized text is required")]
    EmptyUpload,
    #[error("problem {0} does not exist")]
    UnknownProblem(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub(crate) struct IntakeRequest {
    pub(crate) test_id: Option<String>,
    pub(crate) student_id: String,
    pub(crate) problem_id: i64,
    pub(crate) pages: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct IntakeReceipt {
    pub(crate) submission_id: String,
    pub(crate) test_id: String,
    pub(crate) problem_id: i64,
    pub(crate) page_count: usize,
    pub(crate) student_answer: Option<String>,
}

/// Joins non-blank pages. Several pages get `[Page N]` markers so the
/// structure extractor can restore their order.
pub(crate) fn combine_pages(pages: &[String]) -> Option<(String, usize)> {
    let texts: Vec<&str> =
        pages.iter().map(|page| page.trim()).filter(|page| !page.is_empty()).collect();

    match texts.as_slice() {
        [] => None,
        [single] => Some((single.to_string(), 1)),
        many => {
            let combined = many
                .iter()
                .enumerate()
                .map(|(index, text)| format!("[Page {}]\n\n{text}", index + 1))
                .collect::<Vec<_>>()
                .join("\n\n");
            Some((combined, many.len()))
        }
    }
}

pub(crate) fn extract_answer(text: &str) -> Option<String> {
    for pattern in LABELLED_ANSWER.iter() {
        let candidate = pattern.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str());
        if let Some(answer) = candidate.and_then(clean_answer) {
            return Some(answer);
        }
    }

    let lines: Vec<&str> = text.lines().collect();
    let tail = &lines[lines.len().saturating_sub(3)..];
    tail.iter()
        .rev()
        .filter_map(|line| TRAILING_ANSWER.captures(line))
        .find_map(|caps| caps.get(1).and_then(|m| clean_answer(m.as_str())))
}

fn clean_answer(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches(['.', ',', ';', ':']).trim();
    let stripped = ANSWER_PREFIX.replace(trimmed, "");
    let answer = stripped.trim();
    (!answer.is_empty()).then(|| answer.to_string())
}

pub(crate) async fn record_problem_submission(
    pool: &PgPool,
    request: IntakeRequest,
) -> Result<IntakeReceipt, IntakeError> {
    let (ocr_text, page_count) = combine_pages(&request.pages).ok_or(IntakeError::EmptyUpload)?;
    let student_answer = extract_answer(&ocr_text);
    let test_id = request
        .test_id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| PRACTICE_TEST_ID.to_string());
    let now = primitive_now_utc();

    let mut tx = pool.begin().await?;

    if !reference_problems::exists(&mut *tx, request.problem_id).await? {
        return Err(IntakeError::UnknownProblem(request.problem_id));
    }

    let existing =
        submissions::lock_by_test_and_student(&mut *tx, &test_id, &request.student_id).await?;
    let submission_id = match existing {
        Some(submission) => {
            if submission.status == SubmissionStatus::Graded {
                tracing::info!(submission_id = %submission.id, "Reopening graded submission");
            }
            let status = submission.status.reopen();
            submissions::update_status(&mut *tx, &submission.id, status, None, now).await?;
            submission.id
        }
        None => {
            let id = Uuid::new_v4().to_string();
            submissions::insert_processing(&mut *tx, &id, &test_id, &request.student_id, now)
                .await?
        }
    };

    let problem_submission = ProblemSubmission {
        submission_id: submission_id.clone(),
        problem_id: request.problem_id,
        ocr_text: Some(ocr_text.clone()),
        student_solution: Some(ocr_text),
        student_answer: student_answer.clone(),
        page_count: i32::try_from(page_count).unwrap_or(i32::MAX),
        ocr_processed_at: now,
    };
    problem_submissions::upsert(&mut *tx, &problem_submission).await?;

    tx.commit().await?;

    tracing::info!(
        submission_id = %submission_id,
        test_id = %test_id,
        problem_id = request.problem_id,
        page_count,
        answer_found = student_answer.is_some(),
        "Problem submission recorded"
    );

    Ok(IntakeReceipt {
        submission_id,
        test_id,
        problem_id: request.problem_id,
        page_count,
        student_answer,
    })
}
