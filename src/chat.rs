//! Interactive terminal conversation (`mitra chat`).
//!
//! One [`Session`] lives for the duration of the loop. Each non-blank line
//! is one submission; the reply is written before the next line is read.
//! `/quit`, `/exit` or end of input ends the session. `/history` replays the
//! transcript so far.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::assistant::respond;
use crate::config::Config;
use crate::models::{NoticeLevel, Role};
use crate::session::Session;
use crate::store::KnowledgeStore;

/// Run a chat session on stdin/stdout.
pub fn run_chat(config: &Config) -> Result<()> {
    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    chat_loop(config, stdin.lock(), stdout.lock(), interactive)
}

/// Drive a session from `input`, writing everything user-visible to `output`.
///
/// `prompt` controls whether a `> ` prompt is printed before each read.
pub fn chat_loop<R: BufRead, W: Write>(
    config: &Config,
    input: R,
    mut output: W,
    prompt: bool,
) -> Result<()> {
    let store = KnowledgeStore::new(&config.store.path);
    let mut session = Session::new();

    writeln!(output, "{}", config.assistant.title)?;
    writeln!(output, "{}", config.assistant.greeting)?;
    writeln!(output)?;

    let mut lines = input.lines();
    loop {
        if prompt {
            write!(output, "> ")?;
            output.flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let query = line.trim();

        match query {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                render_transcript(&session, &mut output)?;
                continue;
            }
            _ => {}
        }

        let exchange = respond(&store, &config.assistant, &mut session, query);
        for notice in exchange.notices.iter().filter(|n| n.is_error()) {
            writeln!(output, "[error] {}", notice.message)?;
        }
        let tag = if exchange
            .notices
            .iter()
            .any(|n| n.level == NoticeLevel::Warning)
        {
            "assistant (warning)"
        } else {
            "assistant"
        };
        writeln!(output, "{}: {}", tag, exchange.reply.content)?;
        writeln!(output)?;
    }

    tracing::debug!(session = %session.id(), turns = session.len(), "chat session closed");
    Ok(())
}

/// Write the full transcript, oldest first.
pub fn render_transcript<W: Write>(session: &Session, output: &mut W) -> Result<()> {
    if session.is_empty() {
        writeln!(output, "(no messages yet)")?;
        return Ok(());
    }
    for turn in session.turns() {
        let who = match turn.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        writeln!(output, "{}: {}", who, turn.content)?;
    }
    writeln!(output)?;
    Ok(())
}
