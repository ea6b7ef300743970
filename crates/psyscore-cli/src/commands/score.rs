//! The `psyscore score` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use psyscore_core::engine::{DiagnosticSink, ScoringEngine};
use psyscore_core::model::{ChapterAssignment, Subject};
use psyscore_core::parser;
use psyscore_core::report::ExamReport;
use psyscore_core::statistics::compute_breakdown;
use psyscore_core::traits::SheetImage;
use psyscore_report::html::write_html_report;
use psyscore_scan::config::load_config_from;
use psyscore_scan::{create_scanner, ScannerConfig};

const FORMATS: [&str; 4] = ["none", "json", "html", "all"];

/// Console sink for scoring diagnostics.
struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn on_missing_key(&self, assignment: &ChapterAssignment) {
        eprintln!(
            "  WARNING: no answer key for {}, section {} not graded",
            assignment.chapter(),
            assignment.section
        );
    }
}

pub struct ScoreArgs {
    pub sheet: PathBuf,
    pub assignments: PathBuf,
    pub keys: Option<PathBuf>,
    pub mock: bool,
    pub output: Option<PathBuf>,
    pub format: String,
    pub show_mistakes: bool,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: ScoreArgs) -> Result<()> {
    let formats: Vec<&str> = match args.format.as_str() {
        "all" => vec!["json", "html"],
        other => other.split(',').map(str::trim).collect(),
    };
    for fmt in &formats {
        anyhow::ensure!(
            FORMATS.contains(fmt),
            "unknown format '{fmt}', expected one of: {}",
            FORMATS.join(", ")
        );
    }

    let config = load_config_from(args.config.as_deref())?;

    // Load answer keys
    let keys_path = args.keys.unwrap_or_else(|| config.answer_keys.clone());
    let store = parser::load_answer_keys(&keys_path)?;
    if store.is_empty() {
        eprintln!("Warning: no answer keys found in {}", keys_path.display());
    }

    // Load assignments
    let assignments = parser::parse_assignments(&args.assignments)?;

    // Scan the sheet
    let scanner_config = match (&config.scanner, args.mock) {
        (ScannerConfig::Mock { .. }, _) | (_, false) => config.scanner.clone(),
        (_, true) => ScannerConfig::default_mock(),
    };
    let scanner = create_scanner(&scanner_config);
    let image = SheetImage::new(args.sheet.to_string_lossy());
    eprintln!("Scanning {image} ({})...", scanner.name());

    let scan = match scanner.scan(&image).await {
        Ok(scan) => scan,
        Err(e) if e.is_retryable() => {
            return Err(e).context("could not read the sheet, try scanning it again")
        }
        Err(e) => return Err(e).context("could not recognize the answer sheet"),
    };

    for warning in parser::check_assignments(&assignments, &scan) {
        let target = warning.target.as_deref().unwrap_or("assignments");
        eprintln!("  WARNING: [{target}] {}", warning.message);
    }

    // Score
    let engine = ScoringEngine::new(Arc::new(store));
    let results = engine.score_with(&assignments, &scan.answers, &ConsoleSink);
    let breakdown = compute_breakdown(&assignments, &scan.answers, engine.store());
    tracing::debug!(
        total = results.total_score,
        mistakes = results.mistakes.len(),
        "scored {} assignments",
        assignments.len()
    );

    let report = ExamReport::new(
        image.uri.clone(),
        scanner.name(),
        assignments,
        results,
        breakdown,
    );

    print_summary(&report);
    if args.show_mistakes {
        print_mistakes(&report);
    }

    // Save outputs
    let output = args.output.unwrap_or_else(|| config.output_dir.clone());
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {}
        }
    }

    Ok(())
}

fn print_summary(report: &ExamReport) {
    let results = &report.results;

    let mut scores = Table::new();
    scores.set_header(vec!["Subject", "Score", "Mistakes"]);
    for subject in Subject::ALL {
        scores.add_row(vec![
            Cell::new(subject),
            Cell::new(format!("{}%", results.subject_scores.get(subject))),
            Cell::new(results.mistakes_for(subject).count()),
        ]);
    }
    println!("{scores}");
    println!("Total score: {}", results.total_score);

    let mut sections = Table::new();
    sections.set_header(vec!["Section", "Chapter", "Correct", "Score"]);
    for s in &report.breakdown.sections {
        let (correct, score) = if s.graded {
            (format!("{}/{}", s.correct, s.answered), format!("{}%", s.score))
        } else {
            ("-".to_string(), "no answer key".to_string())
        };
        sections.add_row(vec![
            Cell::new(s.section),
            Cell::new(s.chapter),
            Cell::new(correct),
            Cell::new(score),
        ]);
    }
    println!("\n{sections}");

    if report.breakdown.blank_count > 0 {
        println!("{} question(s) left blank", report.breakdown.blank_count);
    }
}

fn print_mistakes(report: &ExamReport) {
    let mistakes = &report.results.mistakes;
    if mistakes.is_empty() {
        println!("\nNo mistakes.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Section", "Question", "Your answer", "Correct", "Subject"]);
    for m in mistakes {
        table.add_row(vec![
            Cell::new(m.chapter),
            Cell::new(m.question),
            Cell::new(m.user_answer),
            Cell::new(m.correct_answer.map_or_else(|| "?".to_string(), |c| c.to_string())),
            Cell::new(m.subject),
        ]);
    }
    println!("\nMistakes ({}):\n{table}", mistakes.len());
}
