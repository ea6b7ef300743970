//! Mock scanner for testing and demos.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use psyscore_core::model::{section_key, Choice, ScanResult};
use psyscore_core::traits::{SheetImage, SheetScanner};
use psyscore_core::ScanError;

/// Sections on a standard answer sheet.
pub const DEFAULT_SECTIONS: u32 = 8;
/// Answers read per section by the synthetic sheet.
pub const DEFAULT_QUESTIONS_PER_SECTION: usize = 20;
/// Simulated processing time.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

/// A mock scanner that returns a prepared sheet without reading any image.
///
/// The answers are fixed or generated from a deterministic pattern, so
/// repeated scans always return the same result.
pub struct MockScanner {
    /// Result returned by every scan.
    result: ScanResult,
    /// Simulated processing delay.
    delay: Duration,
    /// Number of scans performed.
    call_count: AtomicU32,
    /// Last image scanned.
    last_image: Mutex<Option<SheetImage>>,
}

impl MockScanner {
    /// Create a mock that always returns `result`, with no delay.
    pub fn with_fixed_result(result: ScanResult) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
            call_count: AtomicU32::new(0),
            last_image: Mutex::new(None),
        }
    }

    /// Create a mock returning a synthetic sheet of `sections` sections.
    pub fn synthetic(sections: u32, questions_per_section: usize) -> Self {
        Self::with_fixed_result(synthetic_sheet(sections, questions_per_section))
            .with_delay(DEFAULT_DELAY)
    }

    /// Set the simulated processing delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Get the number of scans made with this scanner.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last image passed to this scanner.
    pub fn last_image(&self) -> Option<SheetImage> {
        self.last_image
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::synthetic(DEFAULT_SECTIONS, DEFAULT_QUESTIONS_PER_SECTION)
    }
}

/// Build a deterministic sheet where each section cycles through the
/// letters from a different starting point.
pub fn synthetic_sheet(sections: u32, questions_per_section: usize) -> ScanResult {
    let mut result = ScanResult::default();
    for section in 1..=sections {
        let key = section_key(section);
        let answers = (0..questions_per_section)
            .map(|q| Choice::LETTERS[(q + section as usize * 3) % Choice::LETTERS.len()])
            .collect();
        result.sections.push(key.clone());
        result.answers.insert(key, answers);
    }
    result
}

#[async_trait]
impl SheetScanner for MockScanner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn scan(&self, image: &SheetImage) -> Result<ScanResult, ScanError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_image
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(image.clone());

        tracing::debug!("mock scan of {image}, simulating {:?}", self.delay);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(self.result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_result() {
        let sheet = ScanResult {
            sections: vec!["section1".into()],
            answers: [("section1".to_string(), vec![Choice::B, Choice::Blank])]
                .into_iter()
                .collect(),
        };
        let scanner = MockScanner::with_fixed_result(sheet.clone());

        let result = scanner.scan(&SheetImage::new("photo.jpg")).await.unwrap();
        assert_eq!(result, sheet);
        assert_eq!(scanner.call_count(), 1);
        assert_eq!(scanner.last_image(), Some(SheetImage::new("photo.jpg")));
    }

    #[test]
    fn synthetic_sheet_shape() {
        let sheet = synthetic_sheet(8, 20);
        assert_eq!(sheet.sections.len(), 8);
        assert_eq!(sheet.sections[0], "section1");
        assert_eq!(sheet.sections[7], "section8");
        assert!(sheet.answers.values().all(|a| a.len() == 20));
        assert!(sheet.answers.values().flatten().all(|c| !c.is_blank()));
        assert_eq!(sheet, synthetic_sheet(8, 20));
    }

    #[tokio::test(start_paused = true)]
    async fn default_scan_waits_for_the_delay() {
        let scanner = MockScanner::default();
        let start = tokio::time::Instant::now();

        let result = scanner.scan(&SheetImage::new("sheet.jpg")).await.unwrap();

        assert!(start.elapsed() >= DEFAULT_DELAY);
        assert_eq!(result.sections.len(), DEFAULT_SECTIONS as usize);
        assert_eq!(result.answer_count("section3"), DEFAULT_QUESTIONS_PER_SECTION);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_scans_are_identical() {
        let scanner = MockScanner::synthetic(3, 5);
        let image = SheetImage::new("sheet.jpg");
        let first = scanner.scan(&image).await.unwrap();
        let second = scanner.scan(&image).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(scanner.call_count(), 2);
    }
}
