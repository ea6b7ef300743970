//! Scan error types.
//!
//! These represent failures to turn an answer sheet into a [`ScanResult`].
//! Defined in `psyscore-core` so every scan adapter and the CLI share one
//! taxonomy.
//!
//! [`ScanResult`]: crate::model::ScanResult

use thiserror::Error;

/// Errors that can occur while reading an answer sheet.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The sheet image or mark file could not be read at all.
    #[error("cannot read sheet {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// The sheet was read but its contents are not in the expected shape.
    #[error("malformed sheet: {0}")]
    Malformed(String),

    /// A section label that does not name a numbered section.
    #[error("unrecognized section label: {0}")]
    InvalidSection(String),

    /// Question numbers within a section have a gap.
    #[error("{section}: question {question} is missing")]
    MissingQuestion { section: String, question: u32 },

    /// A bubble index outside the markable range.
    #[error("{section}: question {question} has invalid mark {mark}")]
    InvalidMark {
        section: String,
        question: u32,
        mark: i64,
    },

    /// No sections were recognized on the sheet.
    #[error("no answer sections recognized on the sheet")]
    EmptySheet,
}

impl ScanError {
    /// Returns `true` if scanning again (e.g. a new photo) may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScanError::Unreadable { .. })
    }
}
