use serde::Serialize;

use super::capabilities::{CapabilityError, ReasoningService};

const PROOF_KEYWORDS: &[&str] = &["prove", "show that", "demonstrate"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct SolutionStructure {
    pub(crate) is_proof: bool,
    pub(crate) student_answer: String,
    pub(crate) student_steps: Vec<String>,
}

impl SolutionStructure {
    fn unstructured(raw_text: &str) -> Self {
        let student_answer = raw_text.trim().to_string();
        Self { is_proof: false, student_answer, student_steps: Vec::new() }
    }

    /// Degraded result when the extractor fails: the whole text becomes one step.
    pub(crate) fn fallback(raw_text: &str) -> Self {
        let trimmed = raw_text.trim();
        let student_steps =
            if trimmed.is_empty() { Vec::new() } else { vec![trimmed.to_string()] };
        Self { is_proof: false, student_answer: String::new(), student_steps }
    }

    pub(crate) fn with_problem_hint(mut self, problem_text: &str) -> Self {
        if !self.is_proof && is_proof_problem(problem_text) {
            self.is_proof = true;
        }
        self
    }
}

pub(crate) fn is_proof_problem(problem_text: &str) -> bool {
    let lowered = problem_text.to_lowercase();
    PROOF_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Multi-page input carries `[Page N]` markers; the extractor is expected to
/// reorder pages by content before emitting steps.
pub(crate) async fn extract_structure(
    reasoning: &dyn ReasoningService,
    raw_text: &str,
    min_chars: usize,
) -> Result<SolutionStructure, CapabilityError> {
    if raw_text.trim().chars().count() < min_chars {
        return Ok(SolutionStructure::unstructured(raw_text));
    }

    let report = reasoning.extract_structure(raw_text).await?;
    Ok(SolutionStructure {
        is_proof: report.is_proof,
        student_answer: report.student_answer,
        student_steps: report.student_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::capabilities::StructureReport;
    use crate::grading::policy::{settle, Capability};
    use crate::test_support::ScriptedReasoning;

    const LONG_TEXT: &str = "[Page 1]\n\nLet x + 1 = 43.\nThen x = 42.\nAnswer: 42";

    #[tokio::test]
    async fn short_text_skips_extraction() {
        let reasoning = ScriptedReasoning::default();

        let structure = extract_structure(&reasoning, " 42 ", 20).await.expect("structure");

        assert_eq!(structure, SolutionStructure::unstructured("42"));
        assert!(structure.student_steps.is_empty());
        assert_eq!(reasoning.calls().structure, 0);
    }

    #[tokio::test]
    async fn extracted_report_becomes_structure() {
        let reasoning = ScriptedReasoning::default().structure(StructureReport {
            is_proof: false,
            student_answer: "42".to_string(),
            student_steps: vec!["x + 1 = 43".to_string(), "x = 42".to_string()],
        });

        let structure = extract_structure(&reasoning, LONG_TEXT, 20).await.expect("structure");

        assert_eq!(structure.student_answer, "42");
        assert_eq!(structure.student_steps.len(), 2);
        assert_eq!(reasoning.calls().structure, 1);
    }

    #[tokio::test]
    async fn extractor_failure_falls_back_to_single_step() {
        let reasoning = ScriptedReasoning::default().failing_structure();

        let outcome = extract_structure(&reasoning, LONG_TEXT, 20).await;
        let structure =
            settle(Capability::Structure, outcome, |_| SolutionStructure::fallback(LONG_TEXT))
                .expect("fallback");

        assert_eq!(structure.student_answer, "");
        assert_eq!(structure.student_steps, vec![LONG_TEXT.to_string()]);
        assert!(!structure.is_proof);
    }

    #[test]
    fn proof_keywords_force_proof_mode() {
        let structure = SolutionStructure::fallback("some argument")
            .with_problem_hint("Show that the sum of two odd numbers is even.");
        assert!(structure.is_proof);

        let structure = SolutionStructure::fallback("2+2=4").with_problem_hint("Compute 2+2.");
        assert!(!structure.is_proof);
    }

    #[test]
    fn proof_keyword_match_is_case_insensitive() {
        assert!(is_proof_problem("PROVE that there are infinitely many primes"));
        assert!(is_proof_problem("Demonstrate the identity holds for all n"));
    }
}
