use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::schemas::grading::{GradeQuery, GradeResponse, GradingResultResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/submissions/:submission_id/grade", post(grade_submission))
        .route("/submissions/:submission_id/results", get(list_results))
}

async fn grade_submission(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
    Query(query): Query<GradeQuery>,
) -> Result<Json<GradeResponse>, ApiError> {
    tracing::info!(
        submission_id = %submission_id,
        problem_id = ?query.problem_id,
        "Grade requested"
    );
    let outcome = state.pipeline().grade(&submission_id, query.problem_id).await?;
    Ok(Json(outcome.into()))
}

async fn list_results(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> Result<Json<Vec<GradingResultResponse>>, ApiError> {
    let results = state.pipeline().get_results(&submission_id).await?;
    Ok(Json(results.into_iter().map(GradingResultResponse::from).collect()))
}
