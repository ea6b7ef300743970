//! The `psyscore init` command.

use std::path::Path;

use anyhow::{Context, Result};

const FILES: [(&str, &str); 4] = [
    ("psyscore.toml", SAMPLE_CONFIG),
    ("answer-keys/sample.toml", SAMPLE_ANSWER_KEYS),
    ("sheets/sample-sheet.json", SAMPLE_SHEET),
    ("sheets/sample-assignments.toml", SAMPLE_ASSIGNMENTS),
];

pub fn execute() -> Result<()> {
    for (path, content) in FILES {
        let path = Path::new(path);
        if path.exists() {
            println!("{} already exists, skipping.", path.display());
            continue;
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }

    println!("\nNext steps:");
    println!("  1. Run: psyscore validate --keys answer-keys");
    println!("  2. Run: psyscore score --sheet sheets/sample-sheet.json --assignments sheets/sample-assignments.toml --mistakes");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# psyscore configuration

answer_keys = "./answer-keys"
output_dir = "./psyscore-results"

[scanner]
type = "mark_sheet"

# [scanner]
# type = "mock"
# delay_ms = 2000
# sections = 8
# questions_per_section = 20
"#;

const SAMPLE_ANSWER_KEYS: &str = r#"[answer_keys]
name = "Sample"
description = "A small answer key file to get started"

[[chapters]]
year = 2021
season = "Winter"
subject = "Math"
part = "A"
answers = "ABCDA BCDAB"

[[chapters]]
year = 2021
season = "Winter"
subject = "Hebrew"
part = "A"
answers = "DCBAD CBADC"

[[chapters]]
year = 2021
season = "Winter"
subject = "English"
part = "A"
answers = "AABBC CDDAA"
"#;

const SAMPLE_SHEET: &str = r#"{
  "section_1": { "1": 1, "2": 2, "3": 3, "4": 4, "5": 1, "6": 2, "7": 3, "8": 4, "9": 2, "10": 2 },
  "section_2": { "1": 4, "2": 3, "3": 2, "4": 1, "5": 4, "6": 3, "7": 2, "8": 1, "9": 4, "10": 0 },
  "section_3": { "1": 1, "2": 1, "3": 2, "4": 2, "5": 3, "6": 3, "7": 4, "8": 4, "9": 1, "10": 1 }
}
"#;

const SAMPLE_ASSIGNMENTS: &str = r#"# Which exam chapter each scanned section belongs to

[[assignments]]
section = 1
year = 2021
season = "Winter"
subject = "Math"
part = "A"

[[assignments]]
section = 2
year = 2021
season = "Winter"
subject = "Hebrew"
part = "A"

[[assignments]]
section = 3
year = 2021
season = "Winter"
subject = "English"
part = "A"
"#;
