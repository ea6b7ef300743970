//! Per-section breakdown of a scored sheet.
//!
//! Complements [`ExamResults`](crate::model::ExamResults) with how each
//! assigned section fared, for display alongside the headline scores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::SubjectTally;
use crate::model::{ChapterAssignment, ChapterKey, SectionAnswers, Subject};
use crate::traits::AnswerKeyStore;

/// How one assigned section was graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStats {
    /// Scanned section number.
    pub section: u32,
    /// Chapter the section was assigned to.
    pub chapter: ChapterKey,
    /// Whether an answer key was available.
    pub graded: bool,
    /// Number of answers read for the section.
    pub answered: u32,
    /// Number of answers matching the key.
    pub correct: u32,
    /// Percentage correct within this section.
    pub score: u32,
}

/// Breakdown of a scored sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    /// One entry per assignment, in assignment order.
    pub sections: Vec<SectionStats>,
    /// Mistake counts per subject (graded sections only).
    pub mistakes_per_subject: BTreeMap<Subject, u32>,
    /// Unmarked questions in graded sections.
    pub blank_count: u32,
}

impl Breakdown {
    /// Sections that could not be graded for lack of an answer key.
    pub fn ungraded(&self) -> impl Iterator<Item = &SectionStats> {
        self.sections.iter().filter(|s| !s.graded)
    }
}

/// Compute the per-section breakdown for a sheet.
pub fn compute_breakdown(
    assignments: &[ChapterAssignment],
    answers: &SectionAnswers,
    store: &dyn AnswerKeyStore,
) -> Breakdown {
    let mut breakdown = Breakdown {
        mistakes_per_subject: Subject::ALL.iter().map(|&s| (s, 0)).collect(),
        ..Default::default()
    };

    for assignment in assignments {
        let chapter = assignment.chapter();
        let section_answers = answers
            .get(&assignment.section_key())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let Some(key) = store.lookup(&chapter) else {
            breakdown.sections.push(SectionStats {
                section: assignment.section,
                chapter,
                graded: false,
                answered: section_answers.len() as u32,
                correct: 0,
                score: 0,
            });
            continue;
        };

        let mut tally = SubjectTally::default();
        for (index, &answer) in section_answers.iter().enumerate() {
            tally.total += 1;
            if key.get(index).copied() == Some(answer) {
                tally.correct += 1;
            }
            if answer.is_blank() {
                breakdown.blank_count += 1;
            }
        }

        *breakdown
            .mistakes_per_subject
            .entry(assignment.subject)
            .or_default() += tally.total - tally.correct;

        breakdown.sections.push(SectionStats {
            section: assignment.section,
            chapter,
            graded: true,
            answered: tally.total,
            correct: tally.correct,
            score: tally.score(),
        });
    }

    breakdown
}
