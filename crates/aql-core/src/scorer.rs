//! The assessment scorer.
//!
//! Binds a step bank to a scoring configuration. Answers are looked up by
//! step id, so only steps from the injected bank can be scored.

use crate::error::ScoringError;
use crate::model::{Answer, StepBank};
use crate::scoring::{
    normalize, score_answer, Contribution, NormalizedResult, ScoreAccumulator, ScoringConfig,
    UnscoredReason,
};

/// Scores answers against a fixed step bank.
#[derive(Debug, Clone)]
pub struct AssessmentScorer {
    bank: StepBank,
    config: ScoringConfig,
}

impl AssessmentScorer {
    pub fn new(bank: StepBank, config: ScoringConfig) -> Self {
        Self { bank, config }
    }

    pub fn bank(&self) -> &StepBank {
        &self.bank
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score an answer and add it to `accumulator`.
    ///
    /// Unscored answers leave the accumulator untouched and are logged as
    /// warnings; free-text answers are expected and only logged at debug.
    pub fn apply_answer(
        &self,
        step_id: &str,
        answer: &Answer,
        accumulator: &mut ScoreAccumulator,
    ) -> Result<Contribution, ScoringError> {
        let step = self
            .bank
            .step(step_id)
            .ok_or_else(|| ScoringError::UnknownStep(step_id.to_string()))?;
        let question = step
            .question()
            .ok_or_else(|| ScoringError::NotAQuestion(step_id.to_string()))?;

        let contribution = score_answer(step_id, question, answer, &self.config)?;
        accumulator.apply(&contribution);

        match &contribution {
            Contribution::Unscored(UnscoredReason::TextAnswer) => {
                tracing::debug!(step = step_id, "text answer recorded without score");
            }
            Contribution::Unscored(reason) => {
                tracing::warn!(step = step_id, ?reason, "unscored answer");
            }
            scored => {
                tracing::debug!(step = step_id, contribution = ?scored, "answer applied");
            }
        }

        Ok(contribution)
    }

    /// Score a whole set of answers in bank order, starting from zero.
    ///
    /// Steps without an answer are skipped. This is the non-interactive
    /// equivalent of walking the bank forward once.
    pub fn score_all<'a, F>(&self, mut answer_for: F) -> Result<ScoreAccumulator, ScoringError>
    where
        F: FnMut(&str) -> Option<&'a Answer>,
    {
        let mut accumulator = ScoreAccumulator::new();
        for step in self.bank.steps.iter().filter(|s| s.is_question()) {
            if let Some(answer) = answer_for(&step.id) {
                self.apply_answer(&step.id, answer, &mut accumulator)?;
            }
        }
        Ok(accumulator)
    }

    pub fn normalize(&self, accumulator: &ScoreAccumulator) -> NormalizedResult {
        normalize(accumulator, &self.config)
    }
}
