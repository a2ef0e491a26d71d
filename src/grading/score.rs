use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct ScoreBreakdown {
    /// For proofs this is derived from the logical score, not the answer check.
    pub(crate) answer_correct: bool,
    pub(crate) percentage: f64,
    pub(crate) final_score: f64,
}

impl ScoreBreakdown {
    pub(crate) const ZERO: Self = Self { answer_correct: false, percentage: 0.0, final_score: 0.0 };

    fn new(answer_correct: bool, percentage: f64) -> Self {
        Self { answer_correct, percentage, final_score: percentage / 100.0 }
    }
}

pub(crate) fn compose(is_proof: bool, answer_correct: bool, logical_score: f64) -> ScoreBreakdown {
    if is_proof {
        return match logical_score {
            s if s >= 0.8 => ScoreBreakdown::new(true, 100.0),
            s if s >= 0.5 => ScoreBreakdown::new(true, 75.0),
            s if s >= 0.3 => ScoreBreakdown::new(false, 40.0),
            _ => ScoreBreakdown::new(false, 0.0),
        };
    }

    let percentage = if answer_correct {
        match logical_score {
            s if s >= 0.7 => 100.0,
            s if s >= 0.4 => 80.0,
            _ => 40.0,
        }
    } else {
        match logical_score {
            s if s >= 0.8 => 60.0,
            s if s >= 0.4 => 30.0,
            _ => 0.0,
        }
    };

    ScoreBreakdown::new(answer_correct, percentage)
}
