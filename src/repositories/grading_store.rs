use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use super::{grading_results, problem_submissions, submissions};
use crate::db::models::GradingResult;
use crate::db::types::SubmissionStatus;
use crate::grading::{GradingStore, ProblemWork, StoreError};

#[derive(Debug, Clone)]
pub(crate) struct PgGradingStore {
    pool: PgPool,
}

impl PgGradingStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GradingStore for PgGradingStore {
    async fn load_work(
        &self,
        submission_id: &str,
        problem_id: Option<i64>,
    ) -> Result<Vec<ProblemWork>, StoreError> {
        Ok(problem_submissions::list_work(&self.pool, submission_id, problem_id).await?)
    }

    async fn replace_results(
        &self,
        submission_id: &str,
        results: &[GradingResult],
        graded_at: PrimitiveDateTime,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let submission = submissions::lock_by_id(&mut *tx, submission_id)
            .await?
            .ok_or_else(|| StoreError::MissingSubmission(submission_id.to_string()))?;
        let status = submission.status.transition(SubmissionStatus::Graded)?;

        let removed = grading_results::delete_by_submission(&mut *tx, submission_id).await?;
        for result in results {
            grading_results::insert(&mut *tx, result).await?;
        }
        submissions::update_status(&mut *tx, submission_id, status, Some(graded_at), graded_at)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            submission_id,
            removed,
            inserted = results.len(),
            "Grading results replaced"
        );
        Ok(())
    }

    async fn list_results(&self, submission_id: &str) -> Result<Vec<GradingResult>, StoreError> {
        Ok(grading_results::list_by_submission(&self.pool, submission_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;
    use crate::test_support::{
        self, grading_result, insert_reference_problem, problem_submission, reference_problem,
    };

    const SUBMISSION: &str = "sub-pg-1";

    async fn seeded_store() -> Option<PgGradingStore> {
        let Some(pool) = test_support::live_database().await else {
            eprintln!("skipping Postgres store test: GRADER_TEST_DATABASE_URL is not set");
            return None;
        };
        let now = primitive_now_utc();
        for (id, answer) in [(1, "42"), (2, "7")] {
            insert_reference_problem(&pool, &reference_problem(id, "Solve it.", answer)).await;
        }
        submissions::insert_processing(&pool, SUBMISSION, "practice", "student-1", now)
            .await
            .expect("insert submission");
        for id in [1, 2] {
            let work = problem_submission(SUBMISSION, id, "x + 1 = 43, so x = 42. Answer: 42");
            problem_submissions::upsert(&pool, &work).await.expect("insert problem submission");
        }
        Some(PgGradingStore::new(pool))
    }

    async fn status(store: &PgGradingStore) -> SubmissionStatus {
        submissions::lock_by_id(&store.pool, SUBMISSION)
            .await
            .expect("load submission")
            .expect("submission exists")
            .status
    }

    #[tokio::test]
    async fn load_work_honours_problem_filter() {
        let _guard = test_support::env_lock().await;
        let Some(store) = seeded_store().await else { return };

        let all = store.load_work(SUBMISSION, None).await.expect("all work");
        let second = store.load_work(SUBMISSION, Some(2)).await.expect("filtered work");
        let missing = store.load_work(SUBMISSION, Some(99)).await.expect("missing work");

        assert_eq!(all.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].problem.answer, "7");
        assert_eq!(second[0].submission.student_answer.as_deref(), Some("42"));
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn replace_swaps_rows_and_marks_graded() {
        let _guard = test_support::env_lock().await;
        let Some(store) = seeded_store().await else { return };

        let first = [grading_result(SUBMISSION, 1, 80.0), grading_result(SUBMISSION, 2, 40.0)];
        store.replace_results(SUBMISSION, &first, primitive_now_utc()).await.expect("first");
        let second = [grading_result(SUBMISSION, 2, 100.0)];
        store.replace_results(SUBMISSION, &second, primitive_now_utc()).await.expect("second");

        let stored = store.list_results(SUBMISSION).await.expect("results");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, second[0].id);
        assert_eq!(stored[0].match_type, Some(crate::db::types::MatchType::Exact));
        assert_eq!(status(&store).await, SubmissionStatus::Graded);
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_delete_and_status() {
        let _guard = test_support::env_lock().await;
        let Some(store) = seeded_store().await else { return };

        let kept = grading_result(SUBMISSION, 1, 80.0);
        let now = primitive_now_utc();
        store.replace_results(SUBMISSION, &[kept.clone()], now).await.expect("seed");
        submissions::update_status(&store.pool, SUBMISSION, SubmissionStatus::Processing, None, now)
            .await
            .expect("reopen");

        // Violates the percentage CHECK constraint after the delete has run.
        let broken = [grading_result(SUBMISSION, 2, 100.0), grading_result(SUBMISSION, 1, 150.0)];
        let err = store.replace_results(SUBMISSION, &broken, now).await.unwrap_err();

        assert!(matches!(err, StoreError::Database(_)), "unexpected error: {err:?}");
        let stored = store.list_results(SUBMISSION).await.expect("results");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, kept.id);
        assert_eq!(stored[0].percentage, 80.0);
        assert_eq!(status(&store).await, SubmissionStatus::Processing);
    }

    #[tokio::test]
    async fn replace_for_unknown_submission_is_rejected() {
        let _guard = test_support::env_lock().await;
        let Some(store) = seeded_store().await else { return };

        let rows = [grading_result("sub-missing", 1, 50.0)];
        let err =
            store.replace_results("sub-missing", &rows, primitive_now_utc()).await.unwrap_err();

        assert!(matches!(err, StoreError::MissingSubmission(id) if id == "sub-missing"));
    }
}
