use sqlx::PgPool;

use crate::db::models::GradingResult;

pub(crate) const COLUMNS: &str = "\
    id, submission_id, problem_id, is_relevant, relevance_reason, is_proof, answer_is_correct, \
    answer_confidence, answer_reasoning, match_type, logical_score, step_count, valid_steps, \
    first_error_step_index, error_summary, final_score, percentage, feedback, created_at";

pub(crate) async fn list_by_submission(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Vec<GradingResult>, sqlx::Error> {
    sqlx::query_as::<_, GradingResult>(&format!(
        "SELECT {COLUMNS} FROM grading_results WHERE submission_id = $1 ORDER BY problem_id"
    ))
    .bind(submission_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_by_submission(
    executor: impl sqlx::PgExecutor<'_>,
    submission_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM grading_results WHERE submission_id = $1")
        .bind(submission_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn insert(
    executor: impl sqlx::PgExecutor<'_>,
    result: &GradingResult,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO grading_results ({COLUMNS})
         VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19)"
    ))
    .bind(&result.id)
    .bind(&result.submission_id)
    .bind(result.problem_id)
    .bind(result.is_relevant)
    .bind(&result.relevance_reason)
    .bind(result.is_proof)
    .bind(result.answer_is_correct)
    .bind(result.answer_confidence)
    .bind(&result.answer_reasoning)
    .bind(result.match_type)
    .bind(result.logical_score)
    .bind(result.step_count)
    .bind(result.valid_steps)
    .bind(result.first_error_step_index)
    .bind(&result.error_summary)
    .bind(result.final_score)
    .bind(result.percentage)
    .bind(&result.feedback)
    .bind(result.created_at)
    .execute(executor)
    .await?;
    Ok(())
}
