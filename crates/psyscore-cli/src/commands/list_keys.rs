//! The `psyscore list-keys` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::Table;

use psyscore_core::model::Subject;
use psyscore_core::parser;
use psyscore_core::traits::AnswerKeyStore;
use psyscore_scan::config::load_config_from;

pub fn execute(
    keys: Option<PathBuf>,
    subject: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let subject = subject
        .map(|s| s.parse::<Subject>().map_err(anyhow::Error::msg))
        .transpose()
        .context("invalid --subject")?;

    let keys_path = match keys {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.answer_keys,
    };
    let store = parser::load_answer_keys(&keys_path)?;

    let chapters: Vec<_> = store
        .chapters()
        .into_iter()
        .filter(|c| subject.map_or(true, |s| c.subject == s))
        .collect();

    if chapters.is_empty() {
        println!("No answer keys found in {}", keys_path.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Year", "Season", "Subject", "Part", "Questions"]);
    for chapter in &chapters {
        let questions = store.lookup(chapter).map_or(0, <[_]>::len);
        table.add_row(vec![
            chapter.year.to_string(),
            chapter.season.to_string(),
            chapter.subject.to_string(),
            chapter.part.to_string(),
            questions.to_string(),
        ]);
    }

    println!("{table}");
    println!("{} chapter(s)", chapters.len());

    Ok(())
}
