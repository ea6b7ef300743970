//! Core data model types for psyscore.
//!
//! These are the fundamental types shared by the answer key store, the
//! scoring engine, the scan adapters and the presentation layer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Exam sitting season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Winter => write!(f, "Winter"),
            Season::Spring => write!(f, "Spring"),
            Season::Summer => write!(f, "Summer"),
            Season::Autumn => write!(f, "Autumn"),
        }
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            other => Err(format!("unknown season: {other}")),
        }
    }
}

/// Scored exam subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Hebrew,
    English,
}

impl Subject {
    /// All subjects in display order.
    pub const ALL: [Subject; 3] = [Subject::Math, Subject::Hebrew, Subject::English];
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Math => write!(f, "Math"),
            Subject::Hebrew => write!(f, "Hebrew"),
            Subject::English => write!(f, "English"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "math" | "quantitative" => Ok(Subject::Math),
            "hebrew" | "verbal" => Ok(Subject::Hebrew),
            "english" => Ok(Subject::English),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// Sub-division of a chapter's question set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Part {
    A,
    B,
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::A => write!(f, "A"),
            Part::B => write!(f, "B"),
        }
    }
}

impl FromStr for Part {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" | "1" => Ok(Part::A),
            "b" | "2" => Ok(Part::B),
            other => Err(format!("unknown part: {other}")),
        }
    }
}

/// A single answer letter as marked on the sheet or stored in a key.
///
/// `Blank` stands for an unmarked question. Answer keys never contain it,
/// so a blank user answer is always graded as a mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
    #[serde(rename = "-")]
    Blank,
}

impl Choice {
    /// The four markable letters, in bubble order.
    pub const LETTERS: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    /// Map a 1-based bubble index to a letter; `0` is an unmarked question.
    pub fn from_mark(mark: u8) -> Option<Choice> {
        match mark {
            0 => Some(Choice::Blank),
            1..=4 => Some(Self::LETTERS[usize::from(mark - 1)]),
            _ => None,
        }
    }

    pub fn is_blank(self) -> bool {
        self == Choice::Blank
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::A => write!(f, "A"),
            Choice::B => write!(f, "B"),
            Choice::C => write!(f, "C"),
            Choice::D => write!(f, "D"),
            Choice::Blank => write!(f, "-"),
        }
    }
}

impl TryFrom<char> for Choice {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Choice::A),
            'B' => Ok(Choice::B),
            'C' => Ok(Choice::C),
            'D' => Ok(Choice::D),
            '-' | '_' => Ok(Choice::Blank),
            other => Err(format!("invalid answer letter: {other:?}")),
        }
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Choice::try_from(c),
            _ => Err(format!("invalid answer letter: {s:?}")),
        }
    }
}

/// Identifies one past exam chapter whose correct answers are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChapterKey {
    pub year: u16,
    pub season: Season,
    pub subject: Subject,
    pub part: Part,
}

impl ChapterKey {
    pub fn new(year: u16, season: Season, subject: Subject, part: Part) -> Self {
        Self {
            year,
            season,
            subject,
            part,
        }
    }
}

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.season, self.subject, self.part)
    }
}

/// Links one scanned section to the exam chapter it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterAssignment {
    /// 1-based index of the scanned section.
    pub section: u32,
    pub year: u16,
    pub season: Season,
    pub subject: Subject,
    pub part: Part,
}

impl ChapterAssignment {
    /// The answer key this assignment is graded against.
    pub fn chapter(&self) -> ChapterKey {
        ChapterKey::new(self.year, self.season, self.subject, self.part)
    }

    /// The identifier of the scanned section this assignment refers to.
    pub fn section_key(&self) -> String {
        section_key(self.section)
    }
}

/// Build the section identifier used in [`ScanResult::answers`].
pub fn section_key(section: u32) -> String {
    format!("section{section}")
}

/// User answers keyed by section identifier.
pub type SectionAnswers = BTreeMap<String, Vec<Choice>>;

/// What a scan adapter extracts from an answer sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Section identifiers in sheet order.
    pub sections: Vec<String>,
    /// Marked answers per section.
    pub answers: SectionAnswers,
}

impl ScanResult {
    /// Number of answers read for a section, or 0 if the section is absent.
    pub fn answer_count(&self, section: &str) -> usize {
        self.answers.get(section).map_or(0, Vec::len)
    }
}

/// A single incorrectly answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mistake {
    /// The scanned section number the question was in.
    pub chapter: u32,
    /// 1-based position within the section.
    pub question: u32,
    pub user_answer: Choice,
    /// `None` when the user marked more questions than the key holds.
    pub correct_answer: Option<Choice>,
    pub subject: Subject,
}

/// Per-subject percentage scores, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubjectScores {
    pub math: u32,
    pub hebrew: u32,
    pub english: u32,
}

impl SubjectScores {
    pub fn get(&self, subject: Subject) -> u32 {
        match subject {
            Subject::Math => self.math,
            Subject::Hebrew => self.hebrew,
            Subject::English => self.english,
        }
    }
}

/// The outcome of one scoring pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResults {
    pub total_score: u32,
    pub subject_scores: SubjectScores,
    pub mistakes: Vec<Mistake>,
}

impl ExamResults {
    /// Mistakes made in a single subject, in recorded order.
    pub fn mistakes_for(&self, subject: Subject) -> impl Iterator<Item = &Mistake> {
        self.mistakes.iter().filter(move |m| m.subject == subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_display_and_parse() {
        assert_eq!(Season::Autumn.to_string(), "Autumn");
        assert_eq!("winter".parse::<Season>().unwrap(), Season::Winter);
        assert_eq!("Fall".parse::<Season>().unwrap(), Season::Autumn);
        assert!("monsoon".parse::<Season>().is_err());

        assert_eq!("MATH".parse::<Subject>().unwrap(), Subject::Math);
        assert_eq!("verbal".parse::<Subject>().unwrap(), Subject::Hebrew);
        assert!("history".parse::<Subject>().is_err());

        assert_eq!("b".parse::<Part>().unwrap(), Part::B);
        assert!("c".parse::<Part>().is_err());
    }

    #[test]
    fn choice_from_mark() {
        assert_eq!(Choice::from_mark(0), Some(Choice::Blank));
        assert_eq!(Choice::from_mark(1), Some(Choice::A));
        assert_eq!(Choice::from_mark(4), Some(Choice::D));
        assert_eq!(Choice::from_mark(5), None);
    }

    #[test]
    fn choice_parse() {
        assert_eq!("c".parse::<Choice>().unwrap(), Choice::C);
        assert_eq!("-".parse::<Choice>().unwrap(), Choice::Blank);
        assert!("AB".parse::<Choice>().is_err());
        assert!("E".parse::<Choice>().is_err());
        assert_eq!(Choice::Blank.to_string(), "-");
    }

    #[test]
    fn assignment_section_key() {
        let assignment = ChapterAssignment {
            section: 3,
            year: 2021,
            season: Season::Winter,
            subject: Subject::Math,
            part: Part::A,
        };
        assert_eq!(assignment.section_key(), "section3");
        assert_eq!(assignment.chapter().to_string(), "2021 Winter Math A");
    }

    #[test]
    fn results_serialize_with_presentation_field_names() {
        let results = ExamResults {
            total_score: 3750,
            subject_scores: SubjectScores {
                math: 75,
                hebrew: 0,
                english: 0,
            },
            mistakes: vec![Mistake {
                chapter: 1,
                question: 4,
                user_answer: Choice::C,
                correct_answer: Some(Choice::D),
                subject: Subject::Math,
            }],
        };
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["totalScore"], 3750);
        assert_eq!(json["subjectScores"]["Math"], 75);
        assert_eq!(json["mistakes"][0]["userAnswer"], "C");
        assert_eq!(json["mistakes"][0]["correctAnswer"], "D");
        assert_eq!(json["mistakes"][0]["subject"], "Math");
    }
}
