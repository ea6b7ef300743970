//! psyscore-core: answer keys, the scoring engine and exam reports.
//!
//! This crate defines the data model, the answer key store, and the scoring
//! logic that the rest of psyscore builds on.

pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod statistics;
pub mod traits;

pub use engine::ScoringEngine;
pub use error::ScanError;
pub use traits::{AnswerKeyStore, AnswerKeyTable, SheetImage, SheetScanner};
