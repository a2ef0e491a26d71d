use serde::Serialize;

use super::capabilities::{CapabilityError, ReasoningService};
use super::normalize::answers_match_exactly;
use crate::db::types::MatchType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AnswerVerdict {
    pub(crate) is_correct: bool,
    pub(crate) confidence: f64,
    pub(crate) reasoning: String,
    /// `None` when there was nothing to compare.
    pub(crate) match_type: Option<MatchType>,
}

pub(crate) async fn verify_answer(
    reasoning: &dyn ReasoningService,
    student_answer: &str,
    correct_answer: &str,
    high_confidence: f64,
) -> Result<AnswerVerdict, CapabilityError> {
    if student_answer.trim().is_empty() || correct_answer.trim().is_empty() {
        return Ok(AnswerVerdict {
            is_correct: false,
            confidence: 0.0,
            reasoning: "Missing answer".to_string(),
            match_type: None,
        });
    }

    if answers_match_exactly(student_answer, correct_answer) {
        return Ok(AnswerVerdict {
            is_correct: true,
            confidence: 1.0,
            reasoning: "Exact match after normalization".to_string(),
            match_type: Some(MatchType::Exact),
        });
    }

    let report = reasoning.check_equivalence(student_answer, correct_answer).await?;
    let mut reasoning_text = report.reasoning;
    if report.is_correct && report.confidence >= high_confidence {
        reasoning_text.push_str(" (accepted: high-confidence equivalence)");
    }

    Ok(AnswerVerdict {
        is_correct: report.is_correct,
        confidence: report.confidence,
        reasoning: reasoning_text.trim().to_string(),
        match_type: Some(MatchType::EquivalenceChecked),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::capabilities::EquivalenceReport;
    use crate::test_support::ScriptedReasoning;

    #[tokio::test]
    async fn unicode_minus_is_an_exact_match_without_calls() {
        let reasoning = ScriptedReasoning::default();

        let verdict = verify_answer(&reasoning, "-5", "\u{2212}5", 0.85).await.expect("verdict");

        assert!(verdict.is_correct);
        assert_eq!(verdict.confidence, 1.0);
        assert_eq!(verdict.match_type, Some(MatchType::Exact));
        assert_eq!(reasoning.calls().equivalence, 0);
    }

    #[tokio::test]
    async fn empty_answers_are_incorrect_without_calls() {
        let reasoning = ScriptedReasoning::default();

        for (student, reference) in [("", "5"), ("5", " "), ("", "")] {
            let verdict = verify_answer(&reasoning, student, reference, 0.85).await.unwrap();
            assert!(!verdict.is_correct);
            assert_eq!(verdict.confidence, 0.0);
            assert_eq!(verdict.match_type, None);
        }
        assert_eq!(reasoning.calls().equivalence, 0);
    }

    #[tokio::test]
    async fn equivalence_checker_decides_representational_differences() {
        let reasoning = ScriptedReasoning::default().equivalence(EquivalenceReport {
            is_correct: true,
            confidence: 0.9,
            reasoning: "1/2 equals 0.5".to_string(),
        });

        let verdict = verify_answer(&reasoning, "0.5", "\\frac{1}{2}", 0.85).await.unwrap();

        assert!(verdict.is_correct);
        assert_eq!(verdict.match_type, Some(MatchType::EquivalenceChecked));
        assert!(verdict.reasoning.starts_with("1/2 equals 0.5"));
        assert!(verdict.reasoning.contains("high-confidence"));
        assert_eq!(reasoning.calls().equivalence, 1);
    }

    #[tokio::test]
    async fn low_confidence_rejection_stays_incorrect() {
        let reasoning = ScriptedReasoning::default().equivalence(EquivalenceReport {
            is_correct: false,
            confidence: 0.4,
            reasoning: "different values".to_string(),
        });

        let verdict = verify_answer(&reasoning, "3", "4", 0.85).await.unwrap();

        assert!(!verdict.is_correct);
        assert_eq!(verdict.confidence, 0.4);
        assert_eq!(verdict.reasoning, "different values");
    }

    #[tokio::test]
    async fn checker_failure_propagates() {
        let reasoning = ScriptedReasoning::default().failing_equivalence();

        let outcome = verify_answer(&reasoning, "3", "4", 0.85).await;

        assert!(matches!(outcome, Err(CapabilityError::Upstream(_))));
    }
}
