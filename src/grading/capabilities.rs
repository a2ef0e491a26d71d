use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::db::models::ReferenceProblem;

#[derive(Debug, Error)]
pub(crate) enum CapabilityError {
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
    #[error("malformed {capability} payload: {detail}")]
    Malformed { capability: &'static str, detail: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RelevanceReport {
    pub(crate) is_relevant: bool,
    pub(crate) reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StructureReport {
    pub(crate) is_proof: bool,
    pub(crate) student_answer: String,
    pub(crate) student_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EquivalenceReport {
    pub(crate) is_correct: bool,
    pub(crate) confidence: f64,
    pub(crate) reasoning: String,
}

/// `first_error_step_index` keeps the capability's `-1` for "no error";
/// the logical-flow verifier owns the display convention.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LogicReport {
    pub(crate) logical_score: f64,
    pub(crate) step_count: i64,
    pub(crate) valid_steps: i64,
    pub(crate) first_error_step_index: i64,
    pub(crate) error_summary: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct FeedbackRequest<'a> {
    pub(crate) problem: &'a str,
    pub(crate) student_answer: &'a str,
    pub(crate) correct_answer: &'a str,
    pub(crate) student_solution: &'a str,
    pub(crate) reference_solution: &'a str,
    pub(crate) is_correct: bool,
    pub(crate) similar_examples: &'a [ReferenceProblem],
}

#[async_trait]
pub(crate) trait ReasoningService: Send + Sync {
    async fn classify_relevance(
        &self,
        text: &str,
        problem_text: &str,
    ) -> Result<RelevanceReport, CapabilityError>;

    async fn extract_structure(&self, ocr_text: &str) -> Result<StructureReport, CapabilityError>;

    async fn check_equivalence(
        &self,
        student_answer: &str,
        correct_answer: &str,
    ) -> Result<EquivalenceReport, CapabilityError>;

    async fn evaluate_logic(
        &self,
        student_steps: &str,
        reference_solution: &str,
        correct_answer: &str,
    ) -> Result<LogicReport, CapabilityError>;

    async fn generate_feedback(
        &self,
        request: FeedbackRequest<'_>,
    ) -> Result<String, CapabilityError>;
}

#[async_trait]
pub(crate) trait SimilarProblemSource: Send + Sync {
    async fn similar_problems(
        &self,
        query: &str,
        k: usize,
        exclude_problem_id: i64,
    ) -> Result<Vec<ReferenceProblem>, CapabilityError>;
}

impl RelevanceReport {
    pub(crate) fn from_payload(payload: &Value) -> Result<Self, CapabilityError> {
        let object = expect_object("relevance", payload)?;
        let is_relevant = lenient_bool(object.get("is_relevant"))
            .ok_or_else(|| missing("relevance", "is_relevant"))?;
        let reason = lenient_string(object.get("reason")).unwrap_or_default();

        Ok(Self { is_relevant, reason })
    }
}

impl StructureReport {
    pub(crate) fn from_payload(payload: &Value) -> Result<Self, CapabilityError> {
        let object = expect_object("structure", payload)?;
        let is_proof = lenient_bool(object.get("is_proof")).unwrap_or(false);
        let student_answer = lenient_string(object.get("student_answer")).unwrap_or_default();

        let student_steps = match object.get("student_steps") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| lenient_string(Some(item)))
                .filter(|step| !step.trim().is_empty())
                .collect(),
            Some(Value::String(text)) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToString::to_string)
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(CapabilityError::Malformed {
                    capability: "structure",
                    detail: format!("student_steps has unexpected shape: {other}"),
                })
            }
        };

        Ok(Self { is_proof, student_answer: student_answer.trim().to_string(), student_steps })
    }
}

impl EquivalenceReport {
    pub(crate) fn from_payload(payload: &Value) -> Result<Self, CapabilityError> {
        let object = expect_object("equivalence", payload)?;
        let is_correct = lenient_bool(object.get("is_correct"))
            .ok_or_else(|| missing("equivalence", "is_correct"))?;
        let confidence = lenient_f64(object.get("confidence")).unwrap_or(0.0).clamp(0.0, 1.0);
        let reasoning = lenient_string(object.get("reasoning")).unwrap_or_default();

        Ok(Self { is_correct, confidence, reasoning })
    }
}

impl LogicReport {
    pub(crate) fn from_payload(payload: &Value) -> Result<Self, CapabilityError> {
        let object = expect_object("logic", payload)?;
        let logical_score = lenient_f64(object.get("logical_score"))
            .ok_or_else(|| missing("logic", "logical_score"))?
            .clamp(0.0, 1.0);
        let valid_steps = lenient_i64(object.get("valid_steps")).unwrap_or(0).max(0);
        let step_count = lenient_i64(object.get("step_count")).unwrap_or(0).max(valid_steps);
        let error_summary = lenient_string(object.get("error_summary"))
            .map(|summary| summary.trim().to_string())
            .filter(|summary| !summary.is_empty() && !summary.eq_ignore_ascii_case("null"));
        let first_error_step_index = match lenient_i64(object.get("first_error_step_index")) {
            Some(index) => index.max(-1),
            // An error reported without a position is pinned to the first step
            None if error_summary.is_some() => 0,
            None => -1,
        };

        Ok(Self { logical_score, step_count, valid_steps, first_error_step_index, error_summary })
    }
}

fn expect_object<'a>(
    capability: &'static str,
    payload: &'a Value,
) -> Result<&'a serde_json::Map<String, Value>, CapabilityError> {
    payload.as_object().ok_or_else(|| CapabilityError::Malformed {
        capability,
        detail: format!("expected a JSON object, got {payload}"),
    })
}

fn missing(capability: &'static str, field: &str) -> CapabilityError {
    CapabilityError::Malformed { capability, detail: format!("missing field `{field}`") }
}

fn lenient_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|value| value != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn lenient_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn lenient_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().map(|v| v as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn lenient_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}
