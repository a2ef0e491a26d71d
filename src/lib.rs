pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod grading;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::grading::GradingPipeline;
use crate::repositories::grading_store::PgGradingStore;
use crate::services::{llm::LlmClient, reasoning::OpenAiReasoning, retrieval::SemanticRetriever};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let llm = LlmClient::from_settings(&settings)?;
    let pipeline = GradingPipeline::new(
        Arc::new(OpenAiReasoning::new(llm, &settings)),
        Arc::new(SemanticRetriever::new(db_pool.clone(), &settings)),
        Arc::new(PgGradingStore::new(db_pool.clone())),
        settings.grading().clone(),
    );

    let state = AppState::new(settings, db_pool, pipeline);
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        grading_model = %state.settings().ai().grading_model,
        "Math grader API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    state.db().close().await;
    tracing::info!("Database pool closed");

    Ok(())
}
