use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{ProblemSubmission, ReferenceProblem};
use crate::grading::ProblemWork;

#[derive(Debug, sqlx::FromRow)]
struct WorkRow {
    submission_id: String,
    problem_id: i64,
    ocr_text: Option<String>,
    student_solution: Option<String>,
    student_answer: Option<String>,
    page_count: i32,
    ocr_processed_at: PrimitiveDateTime,
    problem: String,
    domain: Vec<String>,
    answer: String,
    solution: String,
    difficulty: Option<f64>,
}

impl From<WorkRow> for ProblemWork {
    fn from(row: WorkRow) -> Self {
        Self {
            submission: ProblemSubmission {
                submission_id: row.submission_id,
                problem_id: row.problem_id,
                ocr_text: row.ocr_text,
                student_solution: row.student_solution,
                student_answer: row.student_answer,
                page_count: row.page_count,
                ocr_processed_at: row.ocr_processed_at,
            },
            problem: ReferenceProblem {
                problem_id: row.problem_id,
                problem: row.problem,
                domain: row.domain,
                answer: row.answer,
                solution: row.solution,
                difficulty: row.difficulty,
            },
        }
    }
}

pub(crate) async fn list_work(
    pool: &PgPool,
    submission_id: &str,
    problem_id: Option<i64>,
) -> Result<Vec<ProblemWork>, sqlx::Error> {
    let rows = sqlx::query_as::<_, WorkRow>(
        "SELECT ps.submission_id, ps.problem_id, ps.ocr_text, ps.student_solution,
                ps.student_answer, ps.page_count, ps.ocr_processed_at,
                rp.problem, rp.domain, rp.answer, rp.solution, rp.difficulty
         FROM problem_submissions ps
         JOIN reference_problems rp ON rp.problem_id = ps.problem_id
         WHERE ps.submission_id = $1
           AND ($2::BIGINT IS NULL OR ps.problem_id = $2)
         ORDER BY ps.problem_id",
    )
    .bind(submission_id)
    .bind(problem_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProblemWork::from).collect())
}

/// Re-uploads keep earlier derived values when the new ones are empty.
pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    submission: &ProblemSubmission,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO problem_submissions (
            submission_id, problem_id, ocr_text, student_solution, student_answer,
            page_count, ocr_processed_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (submission_id, problem_id) DO UPDATE
             SET ocr_text = COALESCE(NULLIF(EXCLUDED.ocr_text, ''), problem_submissions.ocr_text),
                 student_solution = COALESCE(
                     NULLIF(EXCLUDED.student_solution, ''),
                     problem_submissions.student_solution
                 ),
                 student_answer = COALESCE(
                     NULLIF(EXCLUDED.student_answer, ''),
                     problem_submissions.student_answer
                 ),
                 page_count = EXCLUDED.page_count,
                 ocr_processed_at = EXCLUDED.ocr_processed_at",
    )
    .bind(&submission.submission_id)
    .bind(submission.problem_id)
    .bind(&submission.ocr_text)
    .bind(&submission.student_solution)
    .bind(&submission.student_answer)
    .bind(submission.page_count)
    .bind(submission.ocr_processed_at)
    .execute(executor)
    .await?;
    Ok(())
}
