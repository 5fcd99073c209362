//! Linear assessment sessions.
//!
//! A session walks a step bank in order. Question steps must be answered
//! before advancing; retreating only moves the cursor. Every accepted answer
//! is added to the accumulator, so answering a question again after going
//! back adds to its earlier contribution instead of replacing it. Reaching
//! the results step (or running off the end of the bank) normalizes the
//! accumulator exactly once.

use std::collections::{BTreeMap, VecDeque};

use anyhow::Result;
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::{Answer, QuizStep};
use crate::scorer::AssessmentScorer;
use crate::scoring::{Contribution, NormalizedResult, ScoreAccumulator};

/// Where the user is in the assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub step_index: usize,
    pub total_steps: usize,
    /// 1-based position among question steps; `None` on intro/results.
    pub question_number: Option<usize>,
    pub total_questions: usize,
    pub percent_complete: u32,
    /// 1-based question numbers that have an answer recorded.
    pub answered: Vec<usize>,
}

/// The current step as presented to an interaction source.
#[derive(Debug, Clone)]
pub struct StepView<'a> {
    pub step: &'a QuizStep,
    pub progress: Progress,
    /// The most recent answer recorded for this step, if any.
    pub previous_answer: Option<&'a Answer>,
}

/// Result of a successful `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { index: usize },
    Completed(NormalizedResult),
}

/// One assessment attempt.
#[derive(Debug)]
pub struct AssessmentSession {
    id: Uuid,
    scorer: AssessmentScorer,
    index: usize,
    answers: BTreeMap<String, Answer>,
    accumulator: ScoreAccumulator,
    result: Option<NormalizedResult>,
}

impl AssessmentSession {
    pub fn new(scorer: AssessmentScorer) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            scorer,
            index: 0,
            answers: BTreeMap::new(),
            accumulator: ScoreAccumulator::new(),
            result: None,
        };
        let starts_finished = session
            .scorer
            .bank()
            .steps
            .first()
            .map_or(true, |s| s.is_results());
        if starts_finished {
            session.finish();
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn scorer(&self) -> &AssessmentScorer {
        &self.scorer
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The step under the cursor. `None` only for an empty bank.
    pub fn current_step(&self) -> Option<&QuizStep> {
        self.scorer.bank().steps.get(self.index)
    }

    pub fn answers(&self) -> &BTreeMap<String, Answer> {
        &self.answers
    }

    pub fn accumulator(&self) -> &ScoreAccumulator {
        &self.accumulator
    }

    pub fn result(&self) -> Option<&NormalizedResult> {
        self.result.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    pub fn progress(&self) -> Progress {
        let bank = self.scorer.bank();
        let total_questions = bank.question_count();
        let question_number = self
            .current_step()
            .filter(|s| s.is_question())
            .map(|_| bank.questions_before(self.index) + 1);

        let percent_complete = match (question_number, self.current_step()) {
            (Some(n), _) => ((200 * n + total_questions) / (2 * total_questions)) as u32,
            (None, Some(step)) if step.is_results() => 100,
            _ if self.is_complete() => 100,
            _ => 0,
        };

        let answered = bank
            .steps
            .iter()
            .filter(|s| s.is_question())
            .enumerate()
            .filter(|(_, s)| self.answers.contains_key(&s.id))
            .map(|(i, _)| i + 1)
            .collect();

        Progress {
            step_index: self.index,
            total_steps: bank.steps.len(),
            question_number,
            total_questions,
            percent_complete,
            answered,
        }
    }

    pub fn view(&self) -> Option<StepView<'_>> {
        let step = self.current_step()?;
        Some(StepView {
            step,
            progress: self.progress(),
            previous_answer: self.answers.get(&step.id),
        })
    }

    /// Score an answer to the current question and record it.
    ///
    /// Rejected answers are neither recorded nor scored.
    pub fn answer(&mut self, answer: Answer) -> Result<Contribution, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let step_id = self
            .current_step()
            .map(|s| s.id.clone())
            .ok_or(SessionError::Completed)?;

        let contribution = self
            .scorer
            .apply_answer(&step_id, &answer, &mut self.accumulator)?;
        self.answers.insert(step_id, answer);
        Ok(contribution)
    }

    /// Move to the next step, completing the assessment on the results step.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if let Some(step) = self.current_step() {
            if step.is_question() && !self.answers.contains_key(&step.id) {
                return Err(SessionError::AnswerRequired(step.id.clone()));
            }
        }

        let next = self.index + 1;
        let next_is_results = self.scorer.bank().steps.get(next).map(|s| s.is_results());
        match next_is_results {
            Some(false) => {
                self.index = next;
                Ok(Advance::Moved { index: next })
            }
            Some(true) => {
                self.index = next;
                Ok(Advance::Completed(self.finish()))
            }
            None => Ok(Advance::Completed(self.finish())),
        }
    }

    /// Move back one step. Returns `false` at the first step.
    pub fn retreat(&mut self) -> Result<bool, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if self.index == 0 {
            return Ok(false);
        }
        self.index -= 1;
        Ok(true)
    }

    fn finish(&mut self) -> NormalizedResult {
        let result = self.scorer.normalize(&self.accumulator);
        tracing::info!(
            session = %self.id,
            answered = self.answers.len(),
            dominant_trait = ?result.dominant_trait(),
            "assessment complete"
        );
        self.result = Some(result.clone());
        result
    }
}

/// A user action against the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Answer(Answer),
    Advance,
    Retreat,
}

/// Supplies interactions to [`run_assessment`].
pub trait InteractionSource {
    fn next_interaction(&mut self, view: &StepView<'_>) -> Result<Interaction>;

    /// Called when the session rejects an interaction. Returning `Ok` asks
    /// for another interaction on the same step.
    fn rejected(&mut self, step_id: &str, error: &SessionError) -> Result<()> {
        Err(anyhow::Error::new(error.clone()).context(format!("step '{step_id}' rejected input")))
    }
}

/// Observes an assessment as it runs.
pub trait AssessmentObserver {
    fn on_step(&self, view: &StepView<'_>);
    fn on_answer(&self, step_id: &str, contribution: &Contribution);
    fn on_rejected(&self, step_id: &str, error: &SessionError);
    fn on_complete(&self, result: &NormalizedResult);
}

/// No-op observer.
pub struct NoopObserver;

impl AssessmentObserver for NoopObserver {
    fn on_step(&self, _: &StepView<'_>) {}
    fn on_answer(&self, _: &str, _: &Contribution) {}
    fn on_rejected(&self, _: &str, _: &SessionError) {}
    fn on_complete(&self, _: &NormalizedResult) {}
}

/// A fixed list of interactions, consumed in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInteractions {
    queue: VecDeque<Interaction>,
}

impl ScriptedInteractions {
    pub fn new(interactions: impl IntoIterator<Item = Interaction>) -> Self {
        Self {
            queue: interactions.into_iter().collect(),
        }
    }
}

impl InteractionSource for ScriptedInteractions {
    fn next_interaction(&mut self, view: &StepView<'_>) -> Result<Interaction> {
        self.queue.pop_front().ok_or_else(|| {
            anyhow::anyhow!("script ended at step '{}' before completion", view.step.id)
        })
    }
}

/// Drive a session to completion.
pub fn run_assessment(
    session: &mut AssessmentSession,
    source: &mut dyn InteractionSource,
    observer: &dyn AssessmentObserver,
) -> Result<NormalizedResult> {
    if let Some(result) = session.result() {
        observer.on_complete(result);
        return Ok(result.clone());
    }

    loop {
        let Some(view) = session.view() else {
            anyhow::bail!("assessment has no steps");
        };
        observer.on_step(&view);
        let interaction = source.next_interaction(&view)?;
        let step_id = view.step.id.clone();

        let outcome = match interaction {
            Interaction::Answer(answer) => session
                .answer(answer)
                .map(|contribution| observer.on_answer(&step_id, &contribution)),
            Interaction::Advance => match session.advance() {
                Ok(Advance::Completed(result)) => {
                    observer.on_complete(&result);
                    return Ok(result);
                }
                Ok(Advance::Moved { .. }) => Ok(()),
                Err(e) => Err(e),
            },
            Interaction::Retreat => session.retreat().map(|_| ()),
        };

        if let Err(err) = outcome {
            observer.on_rejected(&step_id, &err);
            if !err.is_recoverable() {
                return Err(err.into());
            }
            source.rejected(&step_id, &err)?;
        }
    }
}
