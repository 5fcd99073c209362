//! Interactive assessment on a terminal.
//!
//! Prompts are written to `out` (stderr in the binary) so stdout only
//! carries the final result.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use aql_core::error::SessionError;
use aql_core::model::{Answer, Question, QuestionType, StepKind};
use aql_core::scoring::ScoringConfig;
use aql_core::session::{Interaction, InteractionSource, StepView};

/// Reads answers line by line.
///
/// A question accepts an option number or id, a slider value, or free text.
/// `b` or `back` goes to the previous step. An empty line keeps a previously
/// recorded answer.
pub struct ConsoleInteractions<R, W> {
    input: R,
    out: W,
    slider_min: u32,
    slider_max: u32,
    answered: Option<String>,
}

impl<R: BufRead, W: Write> ConsoleInteractions<R, W> {
    pub fn new(input: R, out: W, config: &ScoringConfig) -> Self {
        Self {
            input,
            out,
            slider_min: config.slider_min,
            slider_max: config.slider_max,
            answered: None,
        }
    }

    fn read_line(&mut self, step_id: &str) -> Result<String> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        anyhow::ensure!(read > 0, "input ended at step '{step_id}'");
        Ok(line.trim().to_string())
    }

    fn show_question(&mut self, view: &StepView<'_>, question: &Question) -> Result<()> {
        let progress = &view.progress;
        writeln!(
            self.out,
            "\nQuestion {} of {} ({}%)",
            progress.question_number.unwrap_or(0),
            progress.total_questions,
            progress.percent_complete
        )?;
        writeln!(self.out, "{}", question.prompt)?;
        match question.question_type {
            QuestionType::MultipleChoice => {
                for (i, option) in question.options.iter().enumerate() {
                    writeln!(self.out, "  {}) {}", i + 1, option.text)?;
                }
            }
            QuestionType::Slider => {
                writeln!(
                    self.out,
                    "  Enter a number from {} to {}",
                    self.slider_min, self.slider_max
                )?;
            }
            QuestionType::Text => writeln!(self.out, "  Type your answer")?,
        }
        if let Some(previous) = view.previous_answer {
            writeln!(self.out, "  (press Enter to keep {previous})")?;
        }
        Ok(())
    }
}

/// Read `input` against `question`. `None` means the input was not
/// understood and the user should be asked again.
fn parse_answer(question: &Question, input: &str) -> Option<Answer> {
    match question.question_type {
        QuestionType::MultipleChoice => {
            if let Ok(n) = input.parse::<usize>() {
                return n
                    .checked_sub(1)
                    .and_then(|i| question.options.get(i))
                    .map(|o| Answer::Choice(o.id.clone()));
            }
            question
                .options
                .iter()
                .find(|o| o.id.eq_ignore_ascii_case(input))
                .map(|o| Answer::Choice(o.id.clone()))
        }
        // Range is checked by the session so the error names the bounds.
        QuestionType::Slider => input.parse::<u32>().ok().map(Answer::Slider),
        QuestionType::Text => Some(Answer::Text(input.to_string())),
    }
}

fn is_back(input: &str) -> bool {
    input.eq_ignore_ascii_case("b") || input.eq_ignore_ascii_case("back")
}

impl<R: BufRead, W: Write> InteractionSource for ConsoleInteractions<R, W> {
    fn next_interaction(&mut self, view: &StepView<'_>) -> Result<Interaction> {
        let step = view.step;

        let question = match &step.kind {
            StepKind::Question(q) => q,
            StepKind::Intro { title, body } => {
                writeln!(self.out, "\n{title}\n")?;
                writeln!(self.out, "{}", body.trim_end())?;
                writeln!(self.out, "\nPress Enter to begin.")?;
                let line = self.read_line(&step.id)?;
                return Ok(if is_back(&line) {
                    Interaction::Retreat
                } else {
                    Interaction::Advance
                });
            }
            StepKind::Results { .. } => return Ok(Interaction::Advance),
        };

        if self.answered.as_deref() == Some(step.id.as_str()) {
            self.answered = None;
            return Ok(Interaction::Advance);
        }

        self.show_question(view, question)?;
        loop {
            let line = self.read_line(&step.id)?;
            if is_back(&line) {
                return Ok(Interaction::Retreat);
            }
            if line.is_empty() {
                if view.previous_answer.is_some() {
                    return Ok(Interaction::Advance);
                }
                writeln!(self.out, "  An answer is required.")?;
                continue;
            }
            match parse_answer(question, &line) {
                Some(answer) => {
                    self.answered = Some(step.id.clone());
                    return Ok(Interaction::Answer(answer));
                }
                None => writeln!(self.out, "  Not a valid answer: {line}")?,
            }
        }
    }

    fn rejected(&mut self, _step_id: &str, error: &SessionError) -> Result<()> {
        self.answered = None;
        writeln!(self.out, "  {error}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use aql_core::bank;
    use aql_core::model::Trait;
    use aql_core::scorer::AssessmentScorer;
    use aql_core::session::{run_assessment, AssessmentSession, NoopObserver};

    fn run(input: &str) -> (Result<AssessmentSession>, String) {
        let scorer = AssessmentScorer::new(bank::builtin().unwrap(), ScoringConfig::default());
        let mut session = AssessmentSession::new(scorer);
        let mut out = Vec::new();
        let outcome = {
            let mut console = ConsoleInteractions::new(
                Cursor::new(input.to_string()),
                &mut out,
                &ScoringConfig::default(),
            );
            run_assessment(&mut session, &mut console, &NoopObserver)
        };
        (outcome.map(|_| session), String::from_utf8(out).unwrap())
    }

    #[test]
    fn accepts_numbers_ids_and_slider_values() {
        let input = "\n1\nq2c\n8\n6\n1\nq6b\n5\n1\n4\n2\n";
        let (session, _) = run(input);
        let session = session.unwrap();
        let result = session.result().unwrap();
        assert_eq!(session.accumulator().traits().get(Trait::Analytical), 15);
        assert_eq!(result.traits.get(Trait::Analytical), 56);
        assert_eq!(
            result.career_affinity,
            vec!["Technology and Software Development".to_string()]
        );
    }

    #[test]
    fn reprompts_on_bad_input_and_out_of_range_slider() {
        let input = "\n9\nzzz\n1\n1\n11\n8\n6\n1\n1\n5\n1\n4\n2\n";
        let (session, out) = run(input);
        assert!(session.unwrap().is_complete());
        assert!(out.contains("Not a valid answer: 9"));
        assert!(out.contains("Not a valid answer: zzz"));
        assert!(out.contains("outside 0..=10"));
    }

    #[test]
    fn back_then_enter_keeps_previous_answer() {
        // Answer q3, go back from q4 to q3, keep the answer, continue.
        let input = "\n1\n1\n8\nb\n\n6\n1\n1\n5\n1\n4\n2\n";
        let (session, out) = run(input);
        let session = session.unwrap();
        assert!(out.contains("press Enter to keep 8"));
        assert_eq!(session.accumulator().traits().get(Trait::Analytical), 15);
    }

    #[test]
    fn eof_is_an_error() {
        let (session, _) = run("\n1\n");
        let err = session.unwrap_err();
        assert!(err.to_string().contains("input ended at step 'q2'"));
    }
}
