use std::cmp::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::core::config::Settings;
use crate::db::models::ReferenceProblem;
use crate::grading::capabilities::{CapabilityError, SimilarProblemSource};
use crate::repositories::reference_problems;

#[derive(Debug)]
struct EmbeddingClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl EmbeddingClient {
    async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let payload = json!({"model": self.model, "input": input});
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call embeddings API")?;

        let status = response.status();
        let body: Value = response.json().await.context("Invalid embeddings response")?;
        if !status.is_success() {
            anyhow::bail!("Embeddings API error ({status}): {body}");
        }

        let vector = body
            .get("data")
            .and_then(|data| data.get(0))
            .and_then(|item| item.get("embedding"))
            .and_then(Value::as_array)
            .context("Missing embedding in response")?;

        Ok(vector.iter().filter_map(Value::as_f64).map(|value| value as f32).collect())
    }
}

/// The embedding client is built on first use and shared afterwards.
pub(crate) struct SemanticRetriever {
    pool: PgPool,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    embedder: OnceCell<EmbeddingClient>,
}

impl SemanticRetriever {
    pub(crate) fn new(pool: PgPool, settings: &Settings) -> Self {
        let ai = settings.ai();
        Self {
            pool,
            base_url: ai.openai_base_url.trim_end_matches('/').to_string(),
            api_key: ai.openai_api_key.clone(),
            model: ai.embedding_model.clone(),
            timeout: Duration::from_secs(ai.ai_request_timeout),
            embedder: OnceCell::new(),
        }
    }

    async fn embedder(&self) -> Result<&EmbeddingClient> {
        self.embedder
            .get_or_try_init(|| async {
                tracing::info!(model = %self.model, "Initializing embedding client");
                let client = Client::builder()
                    .timeout(self.timeout)
                    .build()
                    .context("Failed to build embeddings HTTP client")?;
                Ok(EmbeddingClient {
                    client,
                    url: format!("{}/embeddings", self.base_url),
                    api_key: self.api_key.clone(),
                    model: self.model.clone(),
                })
            })
            .await
    }
}

#[async_trait]
impl SimilarProblemSource for SemanticRetriever {
    async fn similar_problems(
        &self,
        query: &str,
        k: usize,
        exclude_problem_id: i64,
    ) -> Result<Vec<ReferenceProblem>, CapabilityError> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder().await?.embed(query).await?;
        let candidates = reference_problems::list_embedded(&self.pool, exclude_problem_id)
            .await
            .context("Failed to load reference embeddings")?;

        let ranked = rank_by_similarity(
            &query_vector,
            candidates.into_iter().map(|row| (row.problem, row.embedding)),
            k,
        );
        tracing::debug!(exclude_problem_id, found = ranked.len(), "Similar problems retrieved");
        Ok(ranked)
    }
}

pub(crate) fn cosine_similarity(left: &[f32], right: &[f32]) -> Option<f32> {
    if left.len() != right.len() || left.is_empty() {
        return None;
    }
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|value| value * value).sum::<f32>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        return None;
    }
    Some(dot / (left_norm * right_norm))
}

/// Top `k` candidates by cosine similarity. Dimension mismatches are skipped.
fn rank_by_similarity<T>(
    query: &[f32],
    candidates: impl IntoIterator<Item = (T, Vec<f32>)>,
    k: usize,
) -> Vec<T> {
    let mut scored: Vec<(f32, T)> = candidates
        .into_iter()
        .filter_map(|(item, vector)| cosine_similarity(query, &vector).map(|score| (score, item)))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().take(k).map(|(_, item)| item).collect()
}
