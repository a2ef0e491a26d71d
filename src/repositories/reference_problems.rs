use sqlx::PgPool;

use crate::db::models::ReferenceProblem;

pub(crate) const COLUMNS: &str = "problem_id, problem, domain, answer, solution, difficulty";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EmbeddedProblem {
    #[sqlx(flatten)]
    pub(crate) problem: ReferenceProblem,
    pub(crate) embedding: Vec<f32>,
}

pub(crate) async fn exists(
    executor: impl sqlx::PgExecutor<'_>,
    problem_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reference_problems WHERE problem_id = $1)")
        .bind(problem_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    problem_id: i64,
) -> Result<Option<ReferenceProblem>, sqlx::Error> {
    sqlx::query_as::<_, ReferenceProblem>(&format!(
        "SELECT {COLUMNS} FROM reference_problems WHERE problem_id = $1"
    ))
    .bind(problem_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ReferenceProblem>, sqlx::Error> {
    sqlx::query_as::<_, ReferenceProblem>(&format!(
        "SELECT {COLUMNS} FROM reference_problems ORDER BY problem_id LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Problems with any domain tag containing one of `domains`, case-insensitively.
pub(crate) async fn list_by_domains(
    pool: &PgPool,
    domains: &[String],
    limit: i64,
) -> Result<Vec<ReferenceProblem>, sqlx::Error> {
    let patterns: Vec<String> = domains.iter().map(|domain| like_pattern(domain)).collect();
    sqlx::query_as::<_, ReferenceProblem>(&format!(
        "SELECT {COLUMNS} FROM reference_problems
         WHERE EXISTS (
             SELECT 1 FROM unnest(domain) AS tag
             WHERE LOWER(TRIM(tag)) LIKE ANY($1)
         )
         ORDER BY problem_id
         LIMIT $2"
    ))
    .bind(patterns)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_difficulty(
    pool: &PgPool,
    level: f64,
    limit: i64,
) -> Result<Vec<ReferenceProblem>, sqlx::Error> {
    sqlx::query_as::<_, ReferenceProblem>(&format!(
        "SELECT {COLUMNS} FROM reference_problems WHERE difficulty = $1 \
         ORDER BY problem_id LIMIT $2"
    ))
    .bind(level)
    .bind(limit)
    .fetch_all(pool)
    .await
}

fn like_pattern(domain: &str) -> String {
    let escaped = domain
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub(crate) async fn list_embedded(
    pool: &PgPool,
    exclude_problem_id: i64,
) -> Result<Vec<EmbeddedProblem>, sqlx::Error> {
    sqlx::query_as::<_, EmbeddedProblem>(&format!(
        "SELECT {COLUMNS}, embedding FROM reference_problems \
         WHERE embedding IS NOT NULL AND problem_id <> $1"
    ))
    .bind(exclude_problem_id)
    .fetch_all(pool)
    .await
}
