//! Exam report types with JSON persistence and progress comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ChapterAssignment, ExamResults, Subject};
use crate::statistics::Breakdown;

/// A scored answer sheet together with everything needed to review it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the sheet was scored.
    pub created_at: DateTime<Utc>,
    /// The sheet that was scanned.
    pub sheet: String,
    /// Name of the scanner that read the sheet.
    pub scanner: String,
    /// Chapter assignments used for grading.
    pub assignments: Vec<ChapterAssignment>,
    /// Headline scores and mistakes.
    pub results: ExamResults,
    /// Per-section breakdown.
    pub breakdown: Breakdown,
}

impl ExamReport {
    /// Create a report stamped with a fresh id and the current time.
    pub fn new(
        sheet: impl Into<String>,
        scanner: impl Into<String>,
        assignments: Vec<ChapterAssignment>,
        results: ExamResults,
        breakdown: Breakdown,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            sheet: sheet.into(),
            scanner: scanner.into(),
            assignments,
            results,
            breakdown,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ExamReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against an earlier one.
    ///
    /// Changes of `threshold` points or less count as unchanged.
    pub fn compare(&self, baseline: &ExamReport, threshold: u32) -> ProgressReport {
        let threshold = i64::from(threshold);
        let mut improvements = Vec::new();
        let mut declines = Vec::new();
        let mut unchanged = 0usize;

        for subject in Subject::ALL {
            let before = baseline.results.subject_scores.get(subject);
            let after = self.results.subject_scores.get(subject);
            let delta = i64::from(after) - i64::from(before);
            let change = SubjectChange {
                subject,
                baseline_score: before,
                current_score: after,
                delta,
            };
            if delta > threshold {
                improvements.push(change);
            } else if delta < -threshold {
                declines.push(change);
            } else {
                unchanged += 1;
            }
        }

        ProgressReport {
            baseline_total: baseline.results.total_score,
            current_total: self.results.total_score,
            total_delta: i64::from(self.results.total_score)
                - i64::from(baseline.results.total_score),
            baseline_mistakes: baseline.results.mistakes.len(),
            current_mistakes: self.results.mistakes.len(),
            improvements,
            declines,
            unchanged,
        }
    }
}

/// Result of comparing two exam reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub baseline_total: u32,
    pub current_total: u32,
    pub total_delta: i64,
    pub baseline_mistakes: usize,
    pub current_mistakes: usize,
    /// Subjects whose score went up.
    pub improvements: Vec<SubjectChange>,
    /// Subjects whose score went down.
    pub declines: Vec<SubjectChange>,
    /// Subjects with no significant change.
    pub unchanged: usize,
}

/// A per-subject score change between two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectChange {
    pub subject: Subject,
    pub baseline_score: u32,
    pub current_score: u32,
    pub delta: i64,
}

impl ProgressReport {
    /// Format the progress report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Total:** {} -> {} ({:+})\n\n",
            self.baseline_total, self.current_total, self.total_delta
        ));
        md.push_str(&format!(
            "**Summary:** {} improved, {} declined, {} unchanged; mistakes {} -> {}\n\n",
            self.improvements.len(),
            self.declines.len(),
            self.unchanged,
            self.baseline_mistakes,
            self.current_mistakes
        ));

        for (title, changes) in [("Improvements", &self.improvements), ("Declines", &self.declines)] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Subject | Baseline | Current | Delta |\n");
            md.push_str("|---------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {}% | {}% | {:+} |\n",
                    c.subject, c.baseline_score, c.current_score, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any subject score went down.
    pub fn has_declines(&self) -> bool {
        !self.declines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, Mistake, SubjectScores};

    fn make_report(math: u32, hebrew: u32, english: u32, mistakes: usize) -> ExamReport {
        let subject_scores = SubjectScores {
            math,
            hebrew,
            english,
        };
        let mistake = Mistake {
            chapter: 1,
            question: 1,
            user_answer: Choice::A,
            correct_answer: Some(Choice::B),
            subject: Subject::Math,
        };
        ExamReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            sheet: "sheet.json".into(),
            scanner: "test".into(),
            assignments: vec![],
            results: ExamResults {
                total_score: crate::engine::composite_score(&subject_scores),
                subject_scores,
                mistakes: vec![mistake; mistakes],
            },
            breakdown: Breakdown::default(),
        }
    }

    #[test]
    fn compare_identical_reports() {
        let report = make_report(70, 80, 90, 3);
        let progress = report.compare(&report.clone(), 2);
        assert!(progress.improvements.is_empty());
        assert!(progress.declines.is_empty());
        assert_eq!(progress.unchanged, 3);
        assert_eq!(progress.total_delta, 0);
    }

    #[test]
    fn compare_with_changes() {
        let baseline = make_report(70, 80, 90, 5);
        let current = make_report(85, 79, 60, 4);

        let progress = current.compare(&baseline, 2);
        assert_eq!(progress.improvements.len(), 1);
        assert_eq!(progress.improvements[0].subject, Subject::Math);
        assert_eq!(progress.improvements[0].delta, 15);
        assert_eq!(progress.declines.len(), 1);
        assert_eq!(progress.declines[0].subject, Subject::English);
        assert_eq!(progress.unchanged, 1);
        assert!(progress.has_declines());
        assert!(progress.total_delta < 0);
        assert_eq!((progress.baseline_mistakes, progress.current_mistakes), (5, 4));
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(75, 0, 0, 1);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = ExamReport::load_json(&path).unwrap();

        assert_eq!(loaded.results, report.results);
        assert_eq!(loaded.sheet, "sheet.json");
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(ExamReport::load_json(Path::new("no/such/report.json")).is_err());
    }

    #[test]
    fn markdown_output() {
        let baseline = make_report(70, 80, 90, 5);
        let current = make_report(85, 79, 60, 4);
        let md = current.compare(&baseline, 2).to_markdown();
        assert!(md.contains("### Improvements"));
        assert!(md.contains("### Declines"));
        assert!(md.contains("| Math | 70% | 85% | +15 |"));
        assert!(md.contains("| English | 90% | 60% | -30 |"));
    }
}
