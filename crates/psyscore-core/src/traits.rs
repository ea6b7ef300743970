//! Core trait definitions for answer key stores and sheet scanners.
//!
//! The scoring engine depends only on [`AnswerKeyStore`]; the CLI drives a
//! [`SheetScanner`] implemented in `psyscore-scan`.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::model::{ChapterKey, Choice, ScanResult};

// ---------------------------------------------------------------------------
// Answer key store
// ---------------------------------------------------------------------------

/// Read-only lookup of correct answers by exam chapter.
pub trait AnswerKeyStore: Send + Sync {
    /// Correct answers for a chapter, or `None` if the chapter is unknown.
    fn lookup(&self, key: &ChapterKey) -> Option<&[Choice]>;

    /// All chapters this store can grade, sorted.
    fn chapters(&self) -> Vec<ChapterKey>;
}

/// In-memory answer key table.
#[derive(Debug, Clone, Default)]
pub struct AnswerKeyTable {
    keys: HashMap<ChapterKey, Vec<Choice>>,
}

impl AnswerKeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chapter, replacing any previous answers for the same key.
    pub fn insert(&mut self, key: ChapterKey, answers: Vec<Choice>) {
        if self.keys.insert(key, answers).is_some() {
            tracing::warn!("answer key for {key} defined more than once, keeping the last");
        }
    }

    /// Fold another table into this one; entries in `other` win.
    pub fn merge(&mut self, other: AnswerKeyTable) {
        for (key, answers) in other.keys {
            self.insert(key, answers);
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(ChapterKey, Vec<Choice>)> for AnswerKeyTable {
    fn from_iter<I: IntoIterator<Item = (ChapterKey, Vec<Choice>)>>(iter: I) -> Self {
        let mut table = AnswerKeyTable::new();
        for (key, answers) in iter {
            table.insert(key, answers);
        }
        table
    }
}

impl AnswerKeyStore for AnswerKeyTable {
    fn lookup(&self, key: &ChapterKey) -> Option<&[Choice]> {
        self.keys.get(key).map(Vec::as_slice)
    }

    fn chapters(&self) -> Vec<ChapterKey> {
        let mut chapters: Vec<ChapterKey> = self.keys.keys().copied().collect();
        chapters.sort();
        chapters
    }
}

// ---------------------------------------------------------------------------
// Sheet scanner trait
// ---------------------------------------------------------------------------

/// Reference to the answer sheet being scanned (a photo or a mark file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetImage {
    pub uri: String,
}

impl SheetImage {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

impl fmt::Display for SheetImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Single-shot answer sheet recognition.
#[async_trait]
pub trait SheetScanner: Send + Sync {
    /// Human-readable scanner name (e.g. "mock").
    fn name(&self) -> &str;

    /// Read the marked answers from a sheet.
    async fn scan(&self, image: &SheetImage) -> Result<ScanResult, ScanError>;
}
