//! One question-and-answer interaction.
//!
//! Every call to [`respond`] is a full pass: the knowledge base is reloaded
//! from disk, the query is matched, and exactly one user turn followed by
//! exactly one assistant turn is appended to the session.
//!
//! Used by `mitra ask`, `mitra chat` and `POST /api/sessions/{id}/messages`.

use anyhow::Result;
use serde::Serialize;

use crate::config::{AssistantConfig, Config};
use crate::matcher::find_best_match;
use crate::models::{print_notices, Notice, Role, Turn};
use crate::session::Session;
use crate::store::KnowledgeStore;

/// Result of one interaction pass.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    /// The assistant turn appended to the session.
    pub reply: Turn,
    pub matched: bool,
    /// Best score found, reported even when nothing matched.
    pub score: f64,
    /// Store errors and the no-match warning, in the order they arose.
    pub notices: Vec<Notice>,
}

/// Render a matched answer with its confidence score.
///
/// The score is truncated to a whole percentage.
pub fn format_answer(answer: &str, score: f64) -> String {
    format!("{}\n\n*(Match score: {}%)*", answer, score as i64)
}

/// A computed reply that has not been recorded in a session yet.
#[derive(Debug, Clone)]
pub struct Answer {
    query: String,
    content: String,
    matched: bool,
    score: f64,
    notices: Vec<Notice>,
}

impl Answer {
    /// Append the user turn and the reply to `session`.
    pub fn record(self, session: &mut Session) -> Exchange {
        session.append_turn(Role::User, self.query);
        session.append_turn(Role::Assistant, self.content.clone());

        Exchange {
            reply: Turn {
                role: Role::Assistant,
                content: self.content,
            },
            matched: self.matched,
            score: self.score,
            notices: self.notices,
        }
    }
}

/// Reload the knowledge base and match `query` against it.
///
/// Reads the backing file and scores every record; callers on an async
/// runtime should run it on a blocking thread.
pub fn answer(store: &KnowledgeStore, assistant: &AssistantConfig, query: &str) -> Answer {
    let mut notices = Vec::new();
    let records = store.load_or_report(&mut notices);

    let result = find_best_match(query, &records);
    let content = match result.answer.as_deref() {
        Some(answer) => format_answer(answer, result.score),
        None => {
            notices.push(Notice::warning(assistant.fallback_message.clone()));
            assistant.fallback_message.clone()
        }
    };

    Answer {
        query: query.to_string(),
        content,
        matched: result.is_match(),
        score: result.score,
        notices,
    }
}

/// Answer `query` against the current knowledge base and record the exchange.
pub fn respond(
    store: &KnowledgeStore,
    assistant: &AssistantConfig,
    session: &mut Session,
    query: &str,
) -> Exchange {
    answer(store, assistant, query).record(session)
}

/// CLI entry point for `mitra ask`: one query in a throwaway session.
pub fn run_ask(config: &Config, query: &str) -> Result<()> {
    let store = KnowledgeStore::new(&config.store.path);
    let mut session = Session::new();
    let exchange = respond(&store, &config.assistant, &mut session, query);

    let errors: Vec<Notice> = exchange
        .notices
        .iter()
        .filter(|n| n.is_error())
        .cloned()
        .collect();
    print_notices(&errors);

    println!("{}", exchange.reply.content);
    Ok(())
}
