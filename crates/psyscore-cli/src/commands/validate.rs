//! The `psyscore validate` command.

use std::path::PathBuf;

use anyhow::Result;

use psyscore_core::parser;

pub fn execute(keys_path: PathBuf) -> Result<()> {
    let files = if keys_path.is_dir() {
        parser::load_answer_key_directory(&keys_path)?
    } else {
        vec![parser::parse_answer_keys(&keys_path)?]
    };

    let mut total_warnings = 0;

    for file in &files {
        println!("Answer keys: {} ({} chapters)", file.name, file.chapters.len());

        let warnings = parser::validate_answer_keys(file);
        for w in &warnings {
            let prefix = w
                .target
                .as_ref()
                .map(|t| format!("  [{t}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All answer keys valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
