use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::ReferenceProblem;
use crate::repositories::reference_problems;
use crate::schemas::problem::{
    parse_domains, DifficultyQuery, DomainQuery, ProblemListQuery, ProblemResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_problems))
        .route("/domain", get(problems_by_domain))
        .route("/difficulty", get(problems_by_difficulty))
        .route("/:problem_id", get(get_problem))
}

async fn list_problems(
    State(state): State<AppState>,
    Query(query): Query<ProblemListQuery>,
) -> Result<Json<Vec<ProblemResponse>>, ApiError> {
    query.validate()?;

    let problems = reference_problems::list(state.db(), query.limit, query.offset)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list problems"))?;
    Ok(into_response(problems))
}

async fn get_problem(
    State(state): State<AppState>,
    Path(problem_id): Path<i64>,
) -> Result<Json<ProblemResponse>, ApiError> {
    let problem = reference_problems::find_by_id(state.db(), problem_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch problem"))?
        .ok_or_else(|| ApiError::NotFound("Problem not found".to_string()))?;
    Ok(Json(problem.into()))
}

async fn problems_by_domain(
    State(state): State<AppState>,
    Query(query): Query<DomainQuery>,
) -> Result<Json<Vec<ProblemResponse>>, ApiError> {
    query.validate()?;
    let domains = parse_domains(&query.domain);
    if domains.is_empty() {
        return Err(ApiError::UnprocessableEntity("domain must name at least one domain".into()));
    }

    let problems = reference_problems::list_by_domains(state.db(), &domains, query.limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list problems by domain"))?;
    Ok(into_response(problems))
}

async fn problems_by_difficulty(
    State(state): State<AppState>,
    Query(query): Query<DifficultyQuery>,
) -> Result<Json<Vec<ProblemResponse>>, ApiError> {
    if !query.level.is_finite() {
        return Err(ApiError::UnprocessableEntity("level must be a number".into()));
    }
    query.validate()?;

    let problems = reference_problems::list_by_difficulty(state.db(), query.level, query.limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list problems by difficulty"))?;
    Ok(into_response(problems))
}

fn into_response(problems: Vec<ReferenceProblem>) -> Json<Vec<ProblemResponse>> {
    Json(problems.into_iter().map(ProblemResponse::from).collect())
}
