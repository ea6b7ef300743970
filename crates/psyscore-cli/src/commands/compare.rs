//! The `psyscore compare` command.

use std::path::PathBuf;

use anyhow::Result;

use psyscore_core::report::ExamReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: u32,
    fail_on_decline: bool,
    format: String,
) -> Result<()> {
    let baseline = ExamReport::load_json(&baseline_path)?;
    let current = ExamReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Total score: {} -> {} ({:+})",
                report.baseline_total, report.current_total, report.total_delta
            );
            println!(
                "Mistakes: {} -> {}",
                report.baseline_mistakes, report.current_mistakes
            );
            println!(
                "Comparison: {} declines, {} improvements, {} unchanged",
                report.declines.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.declines.is_empty() {
                println!("\nDeclines:");
                for d in &report.declines {
                    println!(
                        "  {} {}% -> {}% ({:+})",
                        d.subject, d.baseline_score, d.current_score, d.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {}% -> {}% ({:+})",
                        i.subject, i.baseline_score, i.current_score, i.delta
                    );
                }
            }
        }
    }

    if fail_on_decline && report.has_declines() {
        std::process::exit(1);
    }

    Ok(())
}
