use async_trait::async_trait;

use super::llm::LlmClient;
use crate::core::config::Settings;
use crate::grading::capabilities::{
    CapabilityError, EquivalenceReport, FeedbackRequest, LogicReport, ReasoningService,
    RelevanceReport, StructureReport,
};

const JSON_ONLY_SYSTEM: &str =
    "You are a precise math grading assistant. Always respond with valid JSON only.";

const LOGIC_SYSTEM: &str = "You are a precise math grading assistant. Always respond with valid \
     JSON only. Evaluate mathematical solutions fairly, recognizing that multiple valid \
     approaches exist.";

const FEEDBACK_SYSTEM: &str = "You are a patient math tutor. Explain what the student did well, \
     where the reasoning breaks down if it does, and how to approach similar problems. \
     Use Markdown with LaTeX ($ ... $) for formulas. Keep it under 250 words.";

#[derive(Debug, Clone)]
pub(crate) struct OpenAiReasoning {
    llm: LlmClient,
    grading_model: String,
    feedback_model: String,
}

impl OpenAiReasoning {
    pub(crate) fn new(llm: LlmClient, settings: &Settings) -> Self {
        Self {
            llm,
            grading_model: settings.ai().grading_model.clone(),
            feedback_model: settings.ai().feedback_model.clone(),
        }
    }
}

#[async_trait]
impl ReasoningService for OpenAiReasoning {
    async fn classify_relevance(
        &self,
        text: &str,
        problem_text: &str,
    ) -> Result<RelevanceReport, CapabilityError> {
        let prompt = format!(
            "Decide whether the student's submission is an attempt to solve the given problem.\n\n\
             Problem:\n{problem_text}\n\n\
             Student submission (OCR text, may contain recognition noise):\n{text}\n\n\
             A submission is relevant if it works on this problem, even if the work is wrong \
             or incomplete. It is not relevant if it is blank, solves a different problem, or \
             is unrelated content.\n\n\
             Return a JSON object with:\n\
             - \"is_relevant\": boolean\n\
             - \"reason\": string (one sentence)"
        );
        let payload = self.llm.chat_json(&self.grading_model, JSON_ONLY_SYSTEM, &prompt).await?;
        RelevanceReport::from_payload(&payload)
    }

    async fn extract_structure(&self, ocr_text: &str) -> Result<StructureReport, CapabilityError> {
        let prompt = format!(
            "Split the student's handwritten solution into its final answer and reasoning \
             steps.\n\n\
             OCR text:\n{ocr_text}\n\n\
             The text may span several pages marked [Page N]. Pages can be out of order: \
             reorder the content by its logical flow before listing steps.\n\n\
             Tasks:\n\
             1. Classify the work as a proof or a calculation.\n\
             2. For a calculation, extract the final value (boxed or labelled \"Answer:\"). \
             For a proof, extract the concluding statement.\n\
             3. List the reasoning steps in order, normalizing notation to LaTeX.\n\n\
             Return a JSON object with:\n\
             - \"is_proof\": boolean\n\
             - \"student_answer\": string\n\
             - \"student_steps\": array of strings"
        );
        let payload = self.llm.chat_json(&self.grading_model, JSON_ONLY_SYSTEM, &prompt).await?;
        StructureReport::from_payload(&payload)
    }

    async fn check_equivalence(
        &self,
        student_answer: &str,
        correct_answer: &str,
    ) -> Result<EquivalenceReport, CapabilityError> {
        let prompt = format!(
            "Compare the student's answer with the correct answer.\n\n\
             Student Answer: {student_answer}\n\n\
             Correct Answer: {correct_answer}\n\n\
             Tasks:\n\
             1. Determine if the student's answer is mathematically equivalent to the correct \
             answer.\n\
             2. Answers can be in different formats (fractions vs decimals, different forms of \
             expressions).\n\n\
             Return a JSON object with:\n\
             - \"is_correct\": boolean\n\
             - \"confidence\": float between 0.0 and 1.0\n\
             - \"reasoning\": string (brief explanation)"
        );
        let payload = self.llm.chat_json(&self.grading_model, JSON_ONLY_SYSTEM, &prompt).await?;
        EquivalenceReport::from_payload(&payload)
    }

    async fn evaluate_logic(
        &self,
        student_steps: &str,
        reference_solution: &str,
        correct_answer: &str,
    ) -> Result<LogicReport, CapabilityError> {
        let prompt = format!(
            "Evaluate the logic of the student's solution.\n\n\
             Student's Solution:\n{student_steps}\n\n\
             Reference Solution:\n{reference_solution}\n\n\
             Correct Answer: {correct_answer}\n\n\
             Rules:\n\
             1. Any valid mathematical approach is acceptable, not only the reference method.\n\
             2. Walk through the solution step by step and check that each step follows from \
             the previous ones.\n\
             3. Minor calculation errors reduce the score but do not invalidate the approach.\n\n\
             Return a JSON object with:\n\
             - \"logical_score\": float between 0.0 and 1.0\n\
             - \"step_count\": integer\n\
             - \"valid_steps\": integer\n\
             - \"first_error_step_index\": integer (0-based index of the first materially \
             wrong step, or -1 if none)\n\
             - \"error_summary\": string describing the first error, or null\n\n\
             The logical_score should be at least 0.8 when the approach is valid, the steps are \
             sound and they lead to the correct answer."
        );
        let payload = self.llm.chat_json(&self.grading_model, LOGIC_SYSTEM, &prompt).await?;
        LogicReport::from_payload(&payload)
    }

    async fn generate_feedback(
        &self,
        request: FeedbackRequest<'_>,
    ) -> Result<String, CapabilityError> {
        let verdict = if request.is_correct { "correct" } else { "incorrect" };
        let examples = request
            .similar_examples
            .iter()
            .enumerate()
            .map(|(index, example)| {
                format!(
                    "Example {}:\nProblem: {}\nAnswer: {}",
                    index + 1,
                    example.problem,
                    example.answer
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut prompt = format!(
            "Problem:\n{}\n\n\
             Student answer: {}\n\
             Correct answer: {}\n\
             The answer was graded as {verdict}.\n\n\
             Student solution:\n{}\n\n\
             Reference solution:\n{}",
            request.problem,
            request.student_answer,
            request.correct_answer,
            request.student_solution,
            request.reference_solution,
        );
        if !examples.is_empty() {
            prompt.push_str("\n\nSimilar practice problems to suggest:\n");
            prompt.push_str(&examples);
        }

        let text = self.llm.chat_text(&self.feedback_model, FEEDBACK_SYSTEM, &prompt).await?;
        Ok(text)
    }
}
