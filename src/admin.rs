//! Knowledge base editing.
//!
//! Each operation reads the current knowledge base, mutates a copy, and
//! immediately rewrites the whole file. Records are addressed by position,
//! so an index is only meaningful against the list it was read from.
//!
//! There is no edit operation: the web panel's answer field is a local
//! draft and is never saved.

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::models::{print_notices, FaqRecord, Notice};
use crate::store::KnowledgeStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("Please provide both a question and an answer.")]
    EmptyField,

    #[error("No FAQ at index {index} (the knowledge base has {len} entries).")]
    IndexOutOfRange { index: usize, len: usize },
}

/// The knowledge base after a successful mutation, plus what to tell the user.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOutcome {
    /// In-memory records after the mutation, whether or not the save landed.
    pub records: Vec<FaqRecord>,
    pub saved: bool,
    pub notices: Vec<Notice>,
}

/// Current records, with any load failure reported.
pub fn list_records(store: &KnowledgeStore) -> (Vec<FaqRecord>, Vec<Notice>) {
    let mut notices = Vec::new();
    let records = store.load_or_report(&mut notices);
    (records, notices)
}

/// Append a trimmed question/answer pair and save.
///
/// Whitespace-only input is rejected before anything is read or written.
pub fn add_record(
    store: &KnowledgeStore,
    question: &str,
    answer: &str,
) -> Result<AdminOutcome, AdminError> {
    let question = question.trim();
    let answer = answer.trim();
    if question.is_empty() || answer.is_empty() {
        return Err(AdminError::EmptyField);
    }

    let mut notices = Vec::new();
    let mut records = store.load_or_report(&mut notices);
    records.push(FaqRecord::new(question, answer));

    let saved = store.save_or_report(&records, &mut notices);
    if saved {
        notices.push(Notice::success(
            "FAQ added successfully. Please refresh the page to see changes.",
        ));
    }

    Ok(AdminOutcome {
        records,
        saved,
        notices,
    })
}

/// Remove the record at `index` (0-based) and save.
///
/// Anything rendered from the pre-delete list is stale afterwards; callers
/// should stop using it and reload.
pub fn delete_record(store: &KnowledgeStore, index: usize) -> Result<AdminOutcome, AdminError> {
    let mut notices = Vec::new();
    let mut records = store.load_or_report(&mut notices);
    if index >= records.len() {
        return Err(AdminError::IndexOutOfRange {
            index,
            len: records.len(),
        });
    }

    let removed = records.remove(index);
    tracing::info!(index, question = %removed.question, "deleting FAQ");

    let saved = store.save_or_report(&records, &mut notices);
    if saved {
        notices.push(Notice::success("FAQ deleted. Please refresh the page."));
    }

    Ok(AdminOutcome {
        records,
        saved,
        notices,
    })
}

// ============ CLI entry points ============

/// `mitra admin list`
pub fn run_list(config: &Config) -> Result<()> {
    let store = KnowledgeStore::new(&config.store.path);
    let (records, notices) = list_records(&store);
    print_notices(&notices);

    if records.is_empty() {
        println!("No FAQs.");
        return Ok(());
    }

    for (i, rec) in records.iter().enumerate() {
        println!("{}. {}", i + 1, rec.question);
        for line in rec.answer.lines() {
            println!("    {}", line);
        }
        println!();
    }
    Ok(())
}

/// `mitra admin add`
pub fn run_add(config: &Config, question: &str, answer: &str) -> Result<()> {
    let store = KnowledgeStore::new(&config.store.path);
    match add_record(&store, question, answer) {
        Ok(outcome) => finish(&outcome),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// `mitra admin delete <position>`, where position is 1-based as shown by `list`.
pub fn run_delete(config: &Config, position: usize) -> Result<()> {
    let store = KnowledgeStore::new(&config.store.path);
    let Some(index) = position.checked_sub(1) else {
        eprintln!("Error: positions start at 1.");
        std::process::exit(1);
    };
    match delete_record(&store, index) {
        Ok(outcome) => finish(&outcome),
        Err(AdminError::IndexOutOfRange { len, .. }) => {
            eprintln!(
                "Error: No FAQ at position {} (the knowledge base has {} entries).",
                position, len
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn finish(outcome: &AdminOutcome) -> Result<()> {
    print_notices(&outcome.notices);
    if !outcome.saved {
        std::process::exit(1);
    }
    println!("{} FAQs in knowledge base.", outcome.records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_best_match;
    use tempfile::TempDir;

    fn setup(records: &[FaqRecord]) -> (TempDir, KnowledgeStore) {
        let tmp = TempDir::new().unwrap();
        let store = KnowledgeStore::new(tmp.path().join("faqs.json"));
        store.save(records).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_add_trims_and_saves() {
        let (_tmp, store) = setup(&[]);
        let out = add_record(&store, "  What is CVD?  ", "\tCardiovascular disease.\n").unwrap();
        assert!(out.saved);
        assert_eq!(out.records, vec![FaqRecord::new("What is CVD?", "Cardiovascular disease.")]);
        assert!(out.notices.iter().any(|n| n.message.starts_with("FAQ added")));
        assert_eq!(store.load().unwrap(), out.records);
    }

    #[test]
    fn test_add_appends_to_end() {
        let (_tmp, store) = setup(&[FaqRecord::new("first", "1")]);
        add_record(&store, "second", "2").unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].question, "first");
        assert_eq!(loaded[1].question, "second");
    }

    #[test]
    fn test_add_whitespace_question_rejected() {
        let original = vec![FaqRecord::new("q", "a")];
        let (_tmp, store) = setup(&original);
        let before = std::fs::read_to_string(store.path()).unwrap();

        let err = add_record(&store, "  ", "some answer").unwrap_err();
        assert_eq!(err, AdminError::EmptyField);
        assert_eq!(err.to_string(), "Please provide both a question and an answer.");

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
        assert_eq!(store.load().unwrap(), original);
    }

    #[test]
    fn test_add_empty_answer_rejected() {
        let (_tmp, store) = setup(&[]);
        assert_eq!(add_record(&store, "q", "").unwrap_err(), AdminError::EmptyField);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_add_creates_missing_store() {
        let tmp = TempDir::new().unwrap();
        let store = KnowledgeStore::new(tmp.path().join("faqs.json"));
        let out = add_record(&store, "q", "a").unwrap();
        assert!(out.saved);
        assert!(out.notices[0].is_error(), "missing file is still reported");
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_add_save_failure_keeps_in_memory_records() {
        let tmp = TempDir::new().unwrap();
        let store = KnowledgeStore::new(tmp.path().join("missing-dir").join("faqs.json"));
        let out = add_record(&store, "q", "a").unwrap();
        assert!(!out.saved);
        assert_eq!(out.records.len(), 1);
        assert!(out
            .notices
            .iter()
            .any(|n| n.message.starts_with("Failed to save FAQs")));
    }

    #[test]
    fn test_delete_only_record_empties_base() {
        let (_tmp, store) = setup(&[FaqRecord::new(
            "What is normal blood pressure?",
            "Below 120/80 mmHg.",
        )]);

        let out = delete_record(&store, 0).unwrap();
        assert!(out.saved);
        assert!(out.records.is_empty());

        let reloaded = store.load().unwrap();
        assert!(reloaded.is_empty());
        assert!(find_best_match("What is normal blood pressure?", &reloaded)
            .answer
            .is_none());
    }

    #[test]
    fn test_delete_shifts_positions() {
        let (_tmp, store) = setup(&[
            FaqRecord::new("a", "1"),
            FaqRecord::new("b", "2"),
            FaqRecord::new("c", "3"),
        ]);
        delete_record(&store, 1).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![FaqRecord::new("a", "1"), FaqRecord::new("c", "3")]);
    }

    #[test]
    fn test_delete_out_of_range() {
        let (_tmp, store) = setup(&[FaqRecord::new("a", "1")]);
        let err = delete_record(&store, 1).unwrap_err();
        assert_eq!(err, AdminError::IndexOutOfRange { index: 1, len: 1 });
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_list_reports_malformed_store() {
        let tmp = TempDir::new().unwrap();
        let store = KnowledgeStore::new(tmp.path().join("faqs.json"));
        std::fs::write(store.path(), "not json").unwrap();
        let (records, notices) = list_records(&store);
        assert!(records.is_empty());
        assert!(notices[0].is_error());
    }
}
