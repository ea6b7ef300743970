//! Scoring engine.
//!
//! Grades scanned sections against the answer key store and folds the
//! outcome into per-subject percentages, a composite score, and the list
//! of missed questions.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{
    ChapterAssignment, ExamResults, Mistake, SectionAnswers, Subject, SubjectScores,
};
use crate::traits::AnswerKeyStore;

/// Scale of the composite score: the mean subject percentage times this.
pub const COMPOSITE_SCALE: f64 = 150.0;

/// Receives diagnostics emitted while scoring.
pub trait DiagnosticSink {
    /// An assignment referenced a chapter with no answer key and was skipped.
    fn on_missing_key(&self, assignment: &ChapterAssignment);
}

/// Diagnostic sink that discards everything.
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn on_missing_key(&self, _: &ChapterAssignment) {}
}

/// Running counts for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubjectTally {
    pub correct: u32,
    pub total: u32,
}

impl SubjectTally {
    /// Percentage correct, rounded to the nearest integer; 0 if nothing was graded.
    pub fn score(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (f64::from(self.correct) / f64::from(self.total) * 100.0).round() as u32
    }
}

/// Composite score from the three subject percentages.
pub fn composite_score(scores: &SubjectScores) -> u32 {
    let sum = f64::from(scores.math + scores.hebrew + scores.english);
    (sum / 3.0 * COMPOSITE_SCALE).round() as u32
}

/// Grades answer sheets against an injected answer key store.
pub struct ScoringEngine {
    store: Arc<dyn AnswerKeyStore>,
}

impl ScoringEngine {
    pub fn new(store: Arc<dyn AnswerKeyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn AnswerKeyStore {
        self.store.as_ref()
    }

    /// Score a sheet. Assignments without an answer key are skipped.
    pub fn score(&self, assignments: &[ChapterAssignment], answers: &SectionAnswers) -> ExamResults {
        self.score_with(assignments, answers, &NoopSink)
    }

    /// Score a sheet, reporting skipped assignments to `diagnostics`.
    pub fn score_with(
        &self,
        assignments: &[ChapterAssignment],
        answers: &SectionAnswers,
        diagnostics: &dyn DiagnosticSink,
    ) -> ExamResults {
        let mut tallies: BTreeMap<Subject, SubjectTally> =
            Subject::ALL.iter().map(|&s| (s, SubjectTally::default())).collect();
        let mut mistakes = Vec::new();

        for assignment in assignments {
            let section_answers = answers
                .get(&assignment.section_key())
                .map(Vec::as_slice)
                .unwrap_or_default();

            let chapter = assignment.chapter();
            let Some(correct_answers) = self.store.lookup(&chapter) else {
                tracing::warn!(
                    section = assignment.section,
                    "no answer key found for {chapter}, skipping section"
                );
                diagnostics.on_missing_key(assignment);
                continue;
            };

            let tally = tallies.entry(assignment.subject).or_default();

            // Graded over the user's answers: anything past the end of the
            // key has no correct answer and counts as a mistake.
            for (index, &user_answer) in section_answers.iter().enumerate() {
                let correct_answer = correct_answers.get(index).copied();
                tally.total += 1;

                if correct_answer == Some(user_answer) {
                    tally.correct += 1;
                } else {
                    mistakes.push(Mistake {
                        chapter: assignment.section,
                        question: index as u32 + 1,
                        user_answer,
                        correct_answer,
                        subject: assignment.subject,
                    });
                }
            }
        }

        let subject_score = |subject: Subject| tallies.get(&subject).map_or(0, SubjectTally::score);
        let subject_scores = SubjectScores {
            math: subject_score(Subject::Math),
            hebrew: subject_score(Subject::Hebrew),
            english: subject_score(Subject::English),
        };

        ExamResults {
            total_score: composite_score(&subject_scores),
            subject_scores,
            mistakes,
        }
    }
}
