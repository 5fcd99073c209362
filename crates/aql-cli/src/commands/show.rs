//! The `aql show` command.

use std::path::PathBuf;

use anyhow::Result;

use aql_core::report::AssessmentReport;

use crate::render::print_profile;

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = AssessmentReport::load_json(&report_path)?;

    match format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "table" => {
            println!(
                "Report {} ({})",
                report.id,
                report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            print_profile(&report);
        }
        other => anyhow::bail!("unknown format '{other}', expected table, json or markdown"),
    }

    Ok(())
}
