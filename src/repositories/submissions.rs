use time::PrimitiveDateTime;

use crate::db::models::Submission;
use crate::db::types::SubmissionStatus;

pub(crate) const COLUMNS: &str =
    "id, test_id, student_id, status, graded_at, created_at, updated_at";

/// Row lock held until the surrounding transaction ends.
pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn lock_by_test_and_student(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
    student_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE test_id = $1 AND student_id = $2 FOR UPDATE"
    ))
    .bind(test_id)
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

/// Inserts a processing submission; a concurrent insert for the same
/// (test, student) pair resolves to the existing row.
pub(crate) async fn insert_processing(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    test_id: &str,
    student_id: &str,
    now: PrimitiveDateTime,
) -> Result<String, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "INSERT INTO submissions (id, test_id, student_id, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $5)
         ON CONFLICT (test_id, student_id) DO UPDATE
             SET status = EXCLUDED.status,
                 updated_at = EXCLUDED.updated_at
         RETURNING id",
    )
    .bind(id)
    .bind(test_id)
    .bind(student_id)
    .bind(SubmissionStatus::Processing)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update_status(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    status: SubmissionStatus,
    graded_at: Option<PrimitiveDateTime>,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE submissions
         SET status = $1,
             graded_at = COALESCE($2, graded_at),
             updated_at = $3
         WHERE id = $4",
    )
    .bind(status)
    .bind(graded_at)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}
