//! TOML parsers for answer key files and chapter assignment files.
//!
//! Loads answer keys from files and directories, reads the assignment list
//! produced by the assignment step, and validates both.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{ChapterAssignment, ChapterKey, Choice, Part, ScanResult, Season, Subject};
use crate::traits::AnswerKeyTable;

/// Intermediate TOML structure for answer key files.
#[derive(Debug, Deserialize)]
struct TomlAnswerKeyFile {
    #[serde(default)]
    answer_keys: TomlAnswerKeyHeader,
    #[serde(default)]
    chapters: Vec<TomlChapter>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlAnswerKeyHeader {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlChapter {
    year: u16,
    season: String,
    subject: String,
    part: String,
    answers: String,
}

#[derive(Debug, Deserialize)]
struct TomlAssignmentFile {
    #[serde(default)]
    assignments: Vec<TomlAssignment>,
}

#[derive(Debug, Deserialize)]
struct TomlAssignment {
    section: u32,
    year: u16,
    season: String,
    subject: String,
    part: String,
}

/// One chapter as written in an answer key file.
#[derive(Debug, Clone)]
pub struct ChapterEntry {
    pub key: ChapterKey,
    pub answers: Vec<Choice>,
}

/// A parsed answer key file, kept in file order for validation.
#[derive(Debug, Clone)]
pub struct AnswerKeyFile {
    pub name: String,
    pub description: String,
    pub chapters: Vec<ChapterEntry>,
}

impl AnswerKeyFile {
    /// Build the lookup table; later duplicates replace earlier ones.
    pub fn to_table(&self) -> AnswerKeyTable {
        self.chapters
            .iter()
            .map(|c| (c.key, c.answers.clone()))
            .collect()
    }
}

fn parse_field<T: std::str::FromStr<Err = String>>(value: &str) -> Result<T> {
    value.parse().map_err(|e: String| anyhow::anyhow!("{}", e))
}

/// Parse an answer string such as `"ABCD DCBA"`; whitespace is ignored.
pub fn parse_answer_string(answers: &str) -> Result<Vec<Choice>> {
    answers
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            let choice = Choice::try_from(c).map_err(|e| anyhow::anyhow!("{}", e))?;
            anyhow::ensure!(!choice.is_blank(), "answer keys cannot contain blanks");
            Ok(choice)
        })
        .collect()
}

/// Parse a single answer key TOML file.
pub fn parse_answer_keys(path: &Path) -> Result<AnswerKeyFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer key file: {}", path.display()))?;

    parse_answer_keys_str(&content, path)
}

/// Parse answer key TOML from a string (useful for testing).
pub fn parse_answer_keys_str(content: &str, source_path: &Path) -> Result<AnswerKeyFile> {
    let parsed: TomlAnswerKeyFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let chapters = parsed
        .chapters
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let key = ChapterKey {
                year: c.year,
                season: parse_field::<Season>(&c.season)?,
                subject: parse_field::<Subject>(&c.subject)?,
                part: parse_field::<Part>(&c.part)?,
            };
            let answers = parse_answer_string(&c.answers)
                .with_context(|| format!("chapter #{} ({key})", i + 1))?;
            Ok(ChapterEntry { key, answers })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid answer key file: {}", source_path.display()))?;

    let name = if parsed.answer_keys.name.is_empty() {
        source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        parsed.answer_keys.name
    };

    Ok(AnswerKeyFile {
        name,
        description: parsed.answer_keys.description,
        chapters,
    })
}

/// Recursively load all `.toml` answer key files from a directory.
pub fn load_answer_key_directory(dir: &Path) -> Result<Vec<AnswerKeyFile>> {
    let mut files = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            files.extend(load_answer_key_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_answer_keys(&path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(files)
}

/// Load answer keys from a file or a directory of files.
pub fn load_answer_key_files(path: &Path) -> Result<Vec<AnswerKeyFile>> {
    if path.is_dir() {
        load_answer_key_directory(path)
    } else {
        Ok(vec![parse_answer_keys(path)?])
    }
}

/// Load answer keys from a file or directory into one lookup table.
pub fn load_answer_keys(path: &Path) -> Result<AnswerKeyTable> {
    let mut table = AnswerKeyTable::new();
    for file in load_answer_key_files(path)? {
        table.merge(file.to_table());
    }
    tracing::info!("loaded {} answer keys from {}", table.len(), path.display());
    Ok(table)
}

/// Parse a chapter assignment TOML file.
pub fn parse_assignments(path: &Path) -> Result<Vec<ChapterAssignment>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read assignments file: {}", path.display()))?;

    parse_assignments_str(&content, path)
}

/// Parse chapter assignment TOML from a string.
pub fn parse_assignments_str(content: &str, source_path: &Path) -> Result<Vec<ChapterAssignment>> {
    let parsed: TomlAssignmentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    parsed
        .assignments
        .into_iter()
        .map(|a| {
            Ok(ChapterAssignment {
                section: a.section,
                year: a.year,
                season: parse_field(&a.season)?,
                subject: parse_field(&a.subject)?,
                part: parse_field(&a.part)?,
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid assignments file: {}", source_path.display()))
}

/// A warning from answer key or assignment validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The chapter or section the warning concerns (if applicable).
    pub target: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate an answer key file for common issues.
pub fn validate_answer_keys(file: &AnswerKeyFile) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for chapter in &file.chapters {
        if !seen.insert(chapter.key) {
            warnings.push(ValidationWarning {
                target: Some(chapter.key.to_string()),
                message: format!("duplicate chapter: {}", chapter.key),
            });
        }
    }

    for chapter in &file.chapters {
        if chapter.answers.is_empty() {
            warnings.push(ValidationWarning {
                target: Some(chapter.key.to_string()),
                message: "answer string is empty".into(),
            });
        }
    }

    for chapter in &file.chapters {
        if !(1980..=2100).contains(&chapter.key.year) {
            warnings.push(ValidationWarning {
                target: Some(chapter.key.to_string()),
                message: format!("implausible exam year: {}", chapter.key.year),
            });
        }
    }

    // Chapters of the same subject and part normally share a length.
    let mut lengths: HashMap<(Subject, Part), HashMap<usize, usize>> = HashMap::new();
    for chapter in &file.chapters {
        *lengths
            .entry((chapter.key.subject, chapter.key.part))
            .or_default()
            .entry(chapter.answers.len())
            .or_default() += 1;
    }
    for chapter in &file.chapters {
        let Some(counts) = lengths.get(&(chapter.key.subject, chapter.key.part)) else {
            continue;
        };
        let (&common, _) = counts
            .iter()
            .max_by_key(|(len, count)| (**count, **len))
            .unwrap_or((&0, &0));
        if counts.len() > 1 && chapter.answers.len() != common && !chapter.answers.is_empty() {
            warnings.push(ValidationWarning {
                target: Some(chapter.key.to_string()),
                message: format!(
                    "has {} answers, other {} part {} chapters have {}",
                    chapter.answers.len(),
                    chapter.key.subject,
                    chapter.key.part,
                    common
                ),
            });
        }
    }

    warnings
}

/// Check assignments against the sections actually scanned.
pub fn check_assignments(
    assignments: &[ChapterAssignment],
    scan: &ScanResult,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for assignment in assignments {
        let section_key = assignment.section_key();

        if assignment.section == 0 {
            warnings.push(ValidationWarning {
                target: Some(section_key.clone()),
                message: "section numbers start at 1".into(),
            });
        }
        if !seen.insert(assignment.section) {
            warnings.push(ValidationWarning {
                target: Some(section_key.clone()),
                message: format!("section {} is assigned more than once", assignment.section),
            });
        }
        if !scan.answers.contains_key(&section_key) {
            warnings.push(ValidationWarning {
                target: Some(section_key),
                message: "section was not found on the scanned sheet".into(),
            });
        }
    }

    let assigned: HashSet<String> = assignments.iter().map(ChapterAssignment::section_key).collect();
    for section in &scan.sections {
        if !assigned.contains(section) {
            warnings.push(ValidationWarning {
                target: Some(section.clone()),
                message: "scanned section has no chapter assignment".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::AnswerKeyStore;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[answer_keys]
name = "Test keys"
description = "Two chapters"

[[chapters]]
year = 2021
season = "Winter"
subject = "Math"
part = "A"
answers = "ABCD ABCD"

[[chapters]]
year = 2021
season = "winter"
subject = "english"
part = "b"
answers = """
DCBA
DCBA
"""
"#;

    #[test]
    fn parse_valid_toml() {
        let file = parse_answer_keys_str(VALID_TOML, &PathBuf::from("keys.toml")).unwrap();
        assert_eq!(file.name, "Test keys");
        assert_eq!(file.chapters.len(), 2);
        assert_eq!(file.chapters[0].answers.len(), 8);
        assert_eq!(file.chapters[1].key.subject, Subject::English);
        assert_eq!(file.chapters[1].key.part, Part::B);
        assert_eq!(file.chapters[1].answers[0], Choice::D);

        let table = file.to_table();
        let key = ChapterKey::new(2021, Season::Winter, Subject::Math, Part::A);
        assert_eq!(table.lookup(&key).map(<[Choice]>::len), Some(8));
    }

    #[test]
    fn name_defaults_to_file_stem() {
        let toml = r#"
[[chapters]]
year = 2020
season = "Summer"
subject = "Hebrew"
part = "A"
answers = "AB"
"#;
        let file = parse_answer_keys_str(toml, &PathBuf::from("summer-2020.toml")).unwrap();
        assert_eq!(file.name, "summer-2020");
    }

    #[test]
    fn reject_bad_letters_and_blanks() {
        let bad_letter = VALID_TOML.replace("ABCD ABCD", "ABCE");
        let err = parse_answer_keys_str(&bad_letter, &PathBuf::from("k.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("invalid answer letter"));

        let blank = VALID_TOML.replace("ABCD ABCD", "AB-D");
        let err = parse_answer_keys_str(&blank, &PathBuf::from("k.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("blanks"));
    }

    #[test]
    fn reject_unknown_subject() {
        let toml = VALID_TOML.replace("\"english\"", "\"history\"");
        assert!(parse_answer_keys_str(&toml, &PathBuf::from("k.toml")).is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_answer_keys_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [toml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let nested = dir.path().join("2022");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(
            nested.join("spring.toml"),
            r#"
[[chapters]]
year = 2022
season = "Spring"
subject = "Hebrew"
part = "A"
answers = "ABCD"
"#,
        )
        .unwrap();

        let files = load_answer_key_directory(dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let table = load_answer_keys(dir.path()).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn load_directory_rejects_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.toml");
        std::fs::write(&path, VALID_TOML).unwrap();
        assert!(load_answer_key_directory(&path).is_err());
        assert_eq!(load_answer_key_files(&path).unwrap().len(), 1);
    }

    #[test]
    fn validate_duplicates_and_empty() {
        let toml = r#"
[[chapters]]
year = 2021
season = "Winter"
subject = "Math"
part = "A"
answers = "ABCD"

[[chapters]]
year = 2021
season = "Winter"
subject = "Math"
part = "A"
answers = ""
"#;
        let file = parse_answer_keys_str(toml, &PathBuf::from("k.toml")).unwrap();
        let warnings = validate_answer_keys(&file);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("empty")));
    }

    #[test]
    fn validate_length_outliers_and_years() {
        let toml = r#"
[[chapters]]
year = 2019
season = "Winter"
subject = "Math"
part = "A"
answers = "ABCDABCD"

[[chapters]]
year = 2020
season = "Winter"
subject = "Math"
part = "A"
answers = "ABCDABCD"

[[chapters]]
year = 1921
season = "Winter"
subject = "Math"
part = "A"
answers = "ABC"
"#;
        let file = parse_answer_keys_str(toml, &PathBuf::from("k.toml")).unwrap();
        let warnings = validate_answer_keys(&file);
        assert!(warnings.iter().any(|w| w.message.contains("implausible exam year")));
        let outliers: Vec<_> = warnings
            .iter()
            .filter(|w| w.message.contains("other Math part A chapters have 8"))
            .collect();
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].target.as_deref(), Some("1921 Winter Math A"));
    }

    #[test]
    fn validate_clean_file() {
        let file = parse_answer_keys_str(VALID_TOML, &PathBuf::from("k.toml")).unwrap();
        assert!(validate_answer_keys(&file).is_empty());
    }

    #[test]
    fn parse_assignment_file() {
        let toml = r#"
[[assignments]]
section = 1
year = 2021
season = "Winter"
subject = "Math"
part = "A"

[[assignments]]
section = 2
year = 2019
season = "autumn"
subject = "hebrew"
part = "b"
"#;
        let assignments = parse_assignments_str(toml, &PathBuf::from("a.toml")).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[1].season, Season::Autumn);
        assert_eq!(assignments[1].subject, Subject::Hebrew);
        assert_eq!(assignments[1].part, Part::B);
    }

    #[test]
    fn parse_assignment_with_bad_season() {
        let toml = r#"
[[assignments]]
section = 1
year = 2021
season = "Monsoon"
subject = "Math"
part = "A"
"#;
        let err = parse_assignments_str(toml, &PathBuf::from("a.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("unknown season"));
    }

    #[test]
    fn check_assignments_against_scan() {
        let scan = ScanResult {
            sections: vec!["section1".into(), "section2".into(), "section3".into()],
            answers: [
                ("section1".to_string(), vec![Choice::A]),
                ("section2".to_string(), vec![Choice::B]),
                ("section3".to_string(), vec![Choice::C]),
            ]
            .into_iter()
            .collect(),
        };
        let assign = |section| ChapterAssignment {
            section,
            year: 2021,
            season: Season::Winter,
            subject: Subject::Math,
            part: Part::A,
        };

        let warnings = check_assignments(&[assign(1), assign(1), assign(9), assign(0)], &scan);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("more than once")));
        assert!(messages.iter().any(|m| m.contains("start at 1")));
        assert_eq!(
            messages.iter().filter(|m| m.contains("not found")).count(),
            2
        );
        assert_eq!(
            messages.iter().filter(|m| m.contains("no chapter assignment")).count(),
            2
        );

        let clean = check_assignments(&[assign(1), assign(2), assign(3)], &scan);
        assert!(clean.is_empty());
    }
}
