//! The `aql init` command.

use std::path::Path;

use anyhow::Result;

use aql_core::bank::PERSONALITY_BANK_TOML;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("aql.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("banks")?;
    write_if_missing(Path::new("banks/personality.toml"), PERSONALITY_BANK_TOML)?;

    println!("\nNext steps:");
    println!("  1. Adjust scoring in aql.toml if needed");
    println!("  2. Run: aql validate --bank banks/personality.toml");
    println!("  3. Run: aql take --bank banks/personality.toml");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# aql configuration

default_bank = "banks/personality.toml"
output_dir = "./aql-results"

[scoring]
trait_choice_weight = 7
learning_style_weight = 10
slider_min = 0
slider_max = 10
# Style picked by each option position of a learning-style question.
learning_style_order = ["visual", "auditory", "reading", "kinesthetic"]
# half-away-from-zero | half-to-even
rounding = "half-away-from-zero"
# independent | largest-remainder
normalization = "independent"

[grading]
mastery_threshold = 80
proficiency_threshold = 60
"#;
