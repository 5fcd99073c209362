//! The `aql grade` command.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use aql_core::config::load_config_from;
use aql_core::grading::{grade, ModuleQuiz};
use aql_core::parser::{parse_quiz, validate_quiz};
use aql_core::sheet::SheetValue;

pub fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let quiz = parse_quiz(&quiz_path)?;
    for w in validate_quiz(&quiz) {
        match &w.step_id {
            Some(id) => tracing::warn!(question = %id, "{}", w.message),
            None => tracing::warn!("{}", w.message),
        }
    }

    let selections = load_selections(&answers_path, &quiz)?;
    let result = grade(&quiz, &selections, &config.grading);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => {
            println!("{}", quiz.title);
            println!(
                "Score: {}/{} ({}%) [{}]",
                result.correct, result.total, result.percentage, result.tier
            );
            println!("{}", result.tier.message());

            if !result.missed.is_empty() {
                println!("\nReview:");
                for question in quiz
                    .questions
                    .iter()
                    .filter(|q| result.missed.contains(&q.id))
                {
                    println!("  [{}] {}", question.id, question.prompt);
                    if let Some(explanation) = &question.explanation {
                        println!("      {explanation}");
                    }
                }
            }
        }
        other => anyhow::bail!("unknown format '{other}', expected text or json"),
    }

    Ok(())
}

/// Read selections as question id → option id. A number picks the option
/// at that 1-based position.
fn load_selections(path: &Path, quiz: &ModuleQuiz) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read selections: {}", path.display()))?;
    let raw: BTreeMap<String, SheetValue> = toml::from_str(&content)
        .with_context(|| format!("failed to parse selections: {}", path.display()))?;

    let mut selections = HashMap::new();
    for (question_id, value) in raw {
        let option_id = match value {
            SheetValue::Text(id) => id,
            SheetValue::Number(position) => quiz
                .questions
                .iter()
                .find(|q| q.id == question_id)
                .and_then(|q| {
                    let index = usize::try_from(position).ok()?.checked_sub(1)?;
                    q.options.get(index)
                })
                .map(|o| o.id.clone())
                .with_context(|| {
                    format!("question '{question_id}': no option at position {position}")
                })?,
        };
        selections.insert(question_id, option_id);
    }
    Ok(selections)
}
