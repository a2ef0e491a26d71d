use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::answer::{verify_answer, AnswerVerdict};
use super::capabilities::{ReasoningService, SimilarProblemSource};
use super::feedback::{fallback_message, generate_feedback, irrelevant_message, FeedbackContext};
use super::logic::{verify_logic, LogicVerdict, SolutionInput};
use super::policy::{require, settle, Capability};
use super::relevance::{check_relevance, RelevanceVerdict};
use super::score::{compose, ScoreBreakdown};
use super::store::{GradingStore, ProblemWork};
use super::structure::{extract_structure, is_proof_problem, SolutionStructure};
use super::GradingError;
use crate::core::config::GradingSettings;
use crate::core::time::{primitive_now_utc, seconds_between};
use crate::db::models::GradingResult;

pub(crate) const COMPLETED_MESSAGE: &str = "Grading completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProblemStage {
    Pending,
    RelevanceChecked,
    Structured,
    Scored,
    Persisted,
}

impl ProblemStage {
    fn can_advance(self, to: ProblemStage) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::RelevanceChecked)
                | (Self::RelevanceChecked, Self::Structured)
                | (Self::RelevanceChecked, Self::Persisted)
                | (Self::Structured, Self::Scored)
                | (Self::Scored, Self::Persisted)
        )
    }
}

#[derive(Debug)]
struct StageTracker {
    problem_id: i64,
    stage: ProblemStage,
}

impl StageTracker {
    fn new(problem_id: i64) -> Self {
        Self { problem_id, stage: ProblemStage::Pending }
    }

    fn advance(&mut self, to: ProblemStage) -> Result<(), GradingError> {
        if !self.stage.can_advance(to) {
            return Err(GradingError::Stage { problem_id: self.problem_id, from: self.stage, to });
        }
        tracing::debug!(problem_id = self.problem_id, from = ?self.stage, ?to, "Problem stage");
        self.stage = to;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GradeOutcome {
    pub(crate) submission_id: String,
    pub(crate) message: String,
    pub(crate) problems_graded: usize,
}

#[derive(Clone)]
pub(crate) struct GradingPipeline {
    reasoning: Arc<dyn ReasoningService>,
    retriever: Arc<dyn SimilarProblemSource>,
    store: Arc<dyn GradingStore>,
    settings: GradingSettings,
}

impl GradingPipeline {
    pub(crate) fn new(
        reasoning: Arc<dyn ReasoningService>,
        retriever: Arc<dyn SimilarProblemSource>,
        store: Arc<dyn GradingStore>,
        settings: GradingSettings,
    ) -> Self {
        Self { reasoning, retriever, store, settings }
    }

    pub(crate) async fn grade(
        &self,
        submission_id: &str,
        problem_id: Option<i64>,
    ) -> Result<GradeOutcome, GradingError> {
        let started_at = primitive_now_utc();
        let outcome = self.grade_inner(submission_id, problem_id).await;

        let status = match &outcome {
            Ok(_) => "completed",
            Err(GradingError::NotFound { .. }) => "not_found",
            Err(_) => "failed",
        };
        metrics::counter!("grading_jobs_total", "status" => status).increment(1);
        metrics::histogram!("grading_duration_seconds")
            .record(seconds_between(started_at, primitive_now_utc()));

        if let Err(err) = &outcome {
            tracing::warn!(submission_id, ?problem_id, error = %err, "Grading failed");
        }
        outcome
    }

    async fn grade_inner(
        &self,
        submission_id: &str,
        problem_id: Option<i64>,
    ) -> Result<GradeOutcome, GradingError> {
        let work = self.store.load_work(submission_id, problem_id).await?;
        if work.is_empty() {
            let submission_id = submission_id.to_string();
            return Err(GradingError::NotFound { submission_id, problem_id });
        }

        tracing::info!(submission_id, problems = work.len(), "Grading submission");

        let mut trackers = Vec::with_capacity(work.len());
        let mut results = Vec::with_capacity(work.len());
        for item in &work {
            let mut tracker = StageTracker::new(item.problem.problem_id);
            let result = self.grade_problem(item, &mut tracker).await?;
            metrics::histogram!("grading_problem_percentage").record(result.percentage);
            results.push(result);
            trackers.push(tracker);
        }

        self.store.replace_results(submission_id, &results, primitive_now_utc()).await?;
        for tracker in &mut trackers {
            tracker.advance(ProblemStage::Persisted)?;
        }

        tracing::info!(submission_id, problems_graded = results.len(), "Grading completed");

        Ok(GradeOutcome {
            submission_id: submission_id.to_string(),
            message: COMPLETED_MESSAGE.to_string(),
            problems_graded: results.len(),
        })
    }

    pub(crate) async fn get_results(
        &self,
        submission_id: &str,
    ) -> Result<Vec<GradingResult>, GradingError> {
        Ok(self.store.list_results(submission_id).await?)
    }

    async fn grade_problem(
        &self,
        work: &ProblemWork,
        tracker: &mut StageTracker,
    ) -> Result<GradingResult, GradingError> {
        let problem = &work.problem;
        let raw_text = work.submission.raw_text();
        let reasoning = self.reasoning.as_ref();

        let relevance = settle(
            Capability::Relevance,
            check_relevance(reasoning, raw_text, &problem.problem).await,
            RelevanceVerdict::fail_open,
        )?;
        tracker.advance(ProblemStage::RelevanceChecked)?;

        if !relevance.is_relevant {
            tracing::info!(
                submission_id = %work.submission.submission_id,
                problem_id = problem.problem_id,
                reason = %relevance.reason,
                "Submission not relevant, skipping verification"
            );
            return Ok(irrelevant_result(work, relevance));
        }

        let structure = settle(
            Capability::Structure,
            extract_structure(reasoning, raw_text, self.settings.min_structure_chars).await,
            |_| SolutionStructure::fallback(raw_text),
        )?
        .with_problem_hint(&problem.problem);
        tracker.advance(ProblemStage::Structured)?;

        let student_answer = if structure.student_answer.trim().is_empty() {
            work.submission.student_answer.clone().unwrap_or_default()
        } else {
            structure.student_answer.clone()
        };
        let solution = if structure.student_steps.is_empty() {
            let text = work.submission.student_solution.as_deref().unwrap_or(raw_text);
            SolutionInput::Raw(text.to_string())
        } else {
            SolutionInput::Steps(structure.student_steps.clone())
        };

        let (answer, logic) = tokio::join!(
            verify_answer(
                reasoning,
                &student_answer,
                &problem.answer,
                self.settings.high_confidence
            ),
            verify_logic(reasoning, &solution, &problem.solution, &problem.answer),
        );
        let answer = require(Capability::Equivalence, answer)?;
        let logic = require(Capability::Logic, logic)?;

        let score = compose(structure.is_proof, answer.is_correct, logic.logical_score);
        tracker.advance(ProblemStage::Scored)?;

        let k = self.settings.similar_examples;
        let similar = settle(
            Capability::Retrieval,
            self.retriever.similar_problems(&problem.problem, k, problem.problem_id).await,
            |_| Vec::new(),
        )?;

        let student_solution = match &solution {
            SolutionInput::Steps(steps) => steps.join("\n"),
            SolutionInput::Raw(text) => text.clone(),
        };
        let context = FeedbackContext {
            problem,
            student_answer: &student_answer,
            student_solution: &student_solution,
            is_correct: score.answer_correct,
            similar_examples: &similar,
        };
        let feedback = settle(
            Capability::Feedback,
            generate_feedback(reasoning, &context).await,
            |_| fallback_message(score.answer_correct),
        )?;

        tracing::info!(
            submission_id = %work.submission.submission_id,
            problem_id = problem.problem_id,
            is_proof = structure.is_proof,
            answer_correct = score.answer_correct,
            logical_score = logic.logical_score,
            percentage = score.percentage,
            "Problem graded"
        );

        Ok(build_result(work, &relevance, structure.is_proof, &answer, &logic, score, feedback))
    }
}

fn irrelevant_result(work: &ProblemWork, relevance: RelevanceVerdict) -> GradingResult {
    let feedback = irrelevant_message(&relevance.reason);
    let answer = AnswerVerdict {
        is_correct: false,
        confidence: 0.0,
        reasoning: "Not evaluated: submission is not relevant to the problem".to_string(),
        match_type: None,
    };
    let logic = LogicVerdict {
        logical_score: 0.0,
        step_count: 0,
        valid_steps: 0,
        first_error_step_index: 0,
        error_summary: None,
    };
    let is_proof = is_proof_problem(&work.problem.problem);

    build_result(work, &relevance, is_proof, &answer, &logic, ScoreBreakdown::ZERO, feedback)
}

fn build_result(
    work: &ProblemWork,
    relevance: &RelevanceVerdict,
    is_proof: bool,
    answer: &AnswerVerdict,
    logic: &LogicVerdict,
    score: ScoreBreakdown,
    feedback: String,
) -> GradingResult {
    GradingResult {
        id: Uuid::new_v4().to_string(),
        submission_id: work.submission.submission_id.clone(),
        problem_id: work.problem.problem_id,
        is_relevant: relevance.is_relevant,
        relevance_reason: relevance.reason.clone(),
        is_proof,
        answer_is_correct: score.answer_correct,
        answer_confidence: answer.confidence,
        answer_reasoning: answer.reasoning.clone(),
        match_type: answer.match_type,
        logical_score: logic.logical_score,
        step_count: logic.step_count,
        valid_steps: logic.valid_steps,
        first_error_step_index: logic.first_error_step_index,
        error_summary: logic.error_summary.clone(),
        final_score: score.final_score,
        percentage: score.percentage,
        feedback: Some(feedback),
        created_at: primitive_now_utc(),
    }
}
