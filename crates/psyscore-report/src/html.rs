//! HTML results page.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined: headline
//! scores, a per-section breakdown, and a filterable list of mistakes.

use anyhow::{Context, Result};
use std::path::Path;

use psyscore_core::model::{Subject, SubjectScores};
use psyscore_core::report::ExamReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the HTML results page for a scored sheet.
pub fn generate_html(report: &ExamReport) -> String {
    let results = &report.results;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>psyscore results: {}</title>\n",
        html_escape(&report.sheet)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Exam results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Sheet: <strong>{}</strong> | scanner {} | {} sections | {}</p>\n",
        html_escape(&report.sheet),
        html_escape(&report.scanner),
        report.assignments.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Scores
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<p class=\"total\">Total score <strong>{}</strong></p>\n",
        results.total_score
    ));
    html.push_str(&generate_bar_chart(&results.subject_scores));
    html.push_str("</section>\n");

    // Sections
    html.push_str("<section class=\"sections\">\n");
    html.push_str("<h2>Sections</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Section</th><th>Chapter</th><th>Correct</th><th>Score</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for s in &report.breakdown.sections {
        let (class, correct, score) = if s.graded {
            (
                if s.score >= 50 { "pass" } else { "fail" },
                format!("{}/{}", s.correct, s.answered),
                format!("{}%", s.score),
            )
        } else {
            ("ungraded", "-".to_string(), "no answer key".to_string())
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            s.section,
            html_escape(&s.chapter.to_string()),
            correct,
            score
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Mistakes
    html.push_str("<section class=\"mistakes\">\n");
    html.push_str(&format!("<h2>Mistakes ({})</h2>\n", results.mistakes.len()));
    if results.mistakes.is_empty() {
        html.push_str("<p>No mistakes.</p>\n");
    } else {
        html.push_str("<p class=\"filters\">");
        html.push_str("<button onclick=\"filterSubject('')\">All</button>");
        for subject in Subject::ALL {
            html.push_str(&format!(
                "<button onclick=\"filterSubject('{subject}')\">{subject} ({})</button>",
                results.mistakes_for(subject).count()
            ));
        }
        html.push_str("</p>\n");
        html.push_str("<table id=\"mistakes\">\n");
        html.push_str("<thead><tr><th>Section</th><th>Question</th><th>Your answer</th><th>Correct answer</th><th>Subject</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for m in &results.mistakes {
            let (class, correct) = match m.correct_answer {
                Some(c) => ("pass", c.to_string()),
                None => ("unknown", "?".to_string()),
            };
            html.push_str(&format!(
                "<tr data-subject=\"{}\"><td>{}</td><td>{}</td><td class=\"fail\">{}</td><td class=\"{class}\">{}</td><td>{}</td></tr>\n",
                m.subject, m.chapter, m.question, m.user_answer, correct, m.subject
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the HTML results page to a file.
pub fn write_html_report(report: &ExamReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(scores: &SubjectScores) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 100;

    let total_height = Subject::ALL.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, subject) in Subject::ALL.iter().enumerate() {
        let score = scores.get(*subject) as usize;
        let y = i * (bar_height + padding) + padding;
        let width = score * max_width / 100;

        let color = if score >= 80 {
            "#22c55e"
        } else if score >= 50 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            subject
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --muted: #f3f4f6; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --muted: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.total { font-size: 1.5rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.ungraded { background: var(--muted); font-style: italic; }
.unknown { background: var(--muted); }
button { margin-right: 0.5rem; padding: 0.25rem 0.75rem; cursor: pointer; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function filterSubject(subject) {
  const rows = document.querySelectorAll('#mistakes tbody tr');
  rows.forEach(r => {
    r.style.display = subject === '' || r.dataset.subject === subject ? '' : 'none';
  });
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use psyscore_core::model::*;
    use psyscore_core::statistics::{Breakdown, SectionStats};

    fn make_test_report(mistakes: Vec<Mistake>) -> ExamReport {
        let chapter = ChapterKey::new(2021, Season::Winter, Subject::Math, Part::A);
        ExamReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            sheet: "sheets/<scan>.json".into(),
            scanner: "mark-sheet".into(),
            assignments: vec![ChapterAssignment {
                section: 1,
                year: 2021,
                season: Season::Winter,
                subject: Subject::Math,
                part: Part::A,
            }],
            results: ExamResults {
                total_score: 3750,
                subject_scores: SubjectScores {
                    math: 75,
                    hebrew: 0,
                    english: 0,
                },
                mistakes,
            },
            breakdown: Breakdown {
                sections: vec![SectionStats {
                    section: 1,
                    chapter,
                    graded: true,
                    answered: 4,
                    correct: 3,
                    score: 75,
                }],
                ..Default::default()
            },
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report(vec![Mistake {
            chapter: 1,
            question: 4,
            user_answer: Choice::C,
            correct_answer: Some(Choice::D),
            subject: Subject::Math,
        }]);
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Total score <strong>3750</strong>"));
        assert!(html.contains("2021 Winter Math A"));
        assert!(html.contains("Mistakes (1)"));
        assert!(html.contains("<td>4</td><td class=\"fail\">C</td><td class=\"pass\">D</td>"));
        assert!(html.contains("sheets/&lt;scan&gt;.json"));
    }

    #[test]
    fn phantom_mistake_shows_unknown_answer() {
        let report = make_test_report(vec![Mistake {
            chapter: 1,
            question: 5,
            user_answer: Choice::A,
            correct_answer: None,
            subject: Subject::Math,
        }]);
        let html = generate_html(&report);
        assert!(html.contains("<td class=\"unknown\">?</td>"));
        assert!(!html.contains("<td class=\"pass\">?</td>"));
    }

    #[test]
    fn raw_json_escapes_ampersands() {
        let mut report = make_test_report(vec![]);
        report.sheet = "sheets/a&lt;b.json".into();
        let html = generate_html(&report);

        assert!(html.contains("&quot;sheet&quot;: &quot;sheets/a&amp;lt;b.json&quot;"));
        assert!(!html.contains("sheets/a&lt;b.json"));
    }

    #[test]
    fn no_mistakes_message() {
        let html = generate_html(&make_test_report(vec![]));
        assert!(html.contains("No mistakes."));
        assert!(!html.contains("id=\"mistakes\""));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report(vec![]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
