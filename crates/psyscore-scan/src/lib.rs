//! psyscore-scan: answer sheet scan adapters.
//!
//! Implements the `SheetScanner` trait for bubble-mark files and a
//! deterministic mock, and loads the psyscore configuration.

pub mod config;
pub mod mock;
pub mod sheet;

pub use config::{create_scanner, load_config_from, PsyscoreConfig, ScannerConfig};
pub use mock::MockScanner;
pub use psyscore_core::ScanError;
pub use sheet::MarkSheetScanner;
