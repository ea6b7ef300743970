//! Mark-sheet scanner.
//!
//! Reads the JSON emitted by an external bubble detector: one object per
//! section, mapping 1-based question numbers to the index of the filled
//! bubble (`0` when nothing was marked).
//!
//! ```json
//! { "section_1": { "1": 2, "2": 0, "3": 4 }, "section_2": { "1": 1 } }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;

use psyscore_core::model::{section_key, Choice, ScanResult};
use psyscore_core::traits::{SheetImage, SheetScanner};
use psyscore_core::ScanError;

type RawSheet = BTreeMap<String, BTreeMap<String, i64>>;

/// Scanner that decodes bubble-mark JSON files.
#[derive(Debug, Default, Clone)]
pub struct MarkSheetScanner;

impl MarkSheetScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SheetScanner for MarkSheetScanner {
    fn name(&self) -> &str {
        "mark-sheet"
    }

    async fn scan(&self, image: &SheetImage) -> Result<ScanResult, ScanError> {
        let content = tokio::fs::read_to_string(&image.uri)
            .await
            .map_err(|e| ScanError::Unreadable {
                path: image.uri.clone(),
                reason: e.to_string(),
            })?;

        let result = decode_mark_sheet(&content)?;
        tracing::debug!(
            "decoded {} sections from {}",
            result.sections.len(),
            image.uri
        );
        Ok(result)
    }
}

/// Parse a section label such as `section_3`, `section3` or `3`.
fn section_number(label: &str) -> Result<u32, ScanError> {
    let digits = label
        .trim()
        .strip_prefix("section")
        .unwrap_or(label.trim())
        .trim_start_matches(['_', '-', ' ']);
    match digits.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ScanError::InvalidSection(label.to_string())),
    }
}

/// Decode bubble-mark JSON into a [`ScanResult`].
pub fn decode_mark_sheet(content: &str) -> Result<ScanResult, ScanError> {
    let raw: RawSheet =
        serde_json::from_str(content).map_err(|e| ScanError::Malformed(e.to_string()))?;

    let mut numbered: BTreeMap<u32, BTreeMap<String, i64>> = BTreeMap::new();
    for (label, questions) in raw {
        let number = section_number(&label)?;
        if numbered.insert(number, questions).is_some() {
            return Err(ScanError::Malformed(format!(
                "{} appears more than once",
                section_key(number)
            )));
        }
    }

    // Validate in section number order.
    let mut sections: BTreeMap<u32, Vec<Choice>> = BTreeMap::new();
    for (number, questions) in numbered {
        let key = section_key(number);

        let mut marks: BTreeMap<u32, i64> = BTreeMap::new();
        for (question, mark) in questions {
            let q = question
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|&q| q > 0)
                .ok_or_else(|| {
                    ScanError::Malformed(format!("{key}: invalid question number {question:?}"))
                })?;
            if marks.insert(q, mark).is_some() {
                return Err(ScanError::Malformed(format!(
                    "{key}: question {q} appears more than once"
                )));
            }
        }

        let mut answers = Vec::with_capacity(marks.len());
        for (expected, (question, mark)) in (1u32..).zip(marks) {
            if question != expected {
                return Err(ScanError::MissingQuestion {
                    section: key,
                    question: expected,
                });
            }
            let choice = u8::try_from(mark)
                .ok()
                .and_then(Choice::from_mark)
                .ok_or_else(|| ScanError::InvalidMark {
                    section: key.clone(),
                    question,
                    mark,
                })?;
            answers.push(choice);
        }

        sections.insert(number, answers);
    }

    if sections.is_empty() {
        return Err(ScanError::EmptySheet);
    }

    let mut result = ScanResult::default();
    for (number, answers) in sections {
        let key = section_key(number);
        result.sections.push(key.clone());
        result.answers.insert(key, answers);
    }
    Ok(result)
}
