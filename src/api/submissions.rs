use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::schemas::submission::{ProblemUploadRequest, ProblemUploadResponse};
use crate::services::intake;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(upload_problem))
}

async fn upload_problem(
    State(state): State<AppState>,
    Json(payload): Json<ProblemUploadRequest>,
) -> Result<(StatusCode, Json<ProblemUploadResponse>), ApiError> {
    payload.validate()?;

    let receipt = intake::record_problem_submission(state.db(), payload.into()).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}
