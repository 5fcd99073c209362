//! Built-in step bank and sample module quiz.

use std::path::Path;

use anyhow::Result;

use crate::grading::ModuleQuiz;
use crate::model::StepBank;
use crate::parser::{parse_bank_str, parse_quiz_str};

/// TOML source of the onboarding personality assessment.
pub const PERSONALITY_BANK_TOML: &str = include_str!("../banks/personality.toml");

/// TOML source of the sample module knowledge check.
pub const MODULE_QUIZ_TOML: &str = include_str!("../banks/module-quiz.toml");

/// The ten-question onboarding personality assessment.
pub fn builtin() -> Result<StepBank> {
    parse_bank_str(PERSONALITY_BANK_TOML, Path::new("<builtin>/personality.toml"))
}

pub fn builtin_quiz() -> Result<ModuleQuiz> {
    parse_quiz_str(MODULE_QUIZ_TOML, Path::new("<builtin>/module-quiz.toml"))
}
