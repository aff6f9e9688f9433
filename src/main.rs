//! # Hriday Mitra CLI (`mitra`)
//!
//! The `mitra` binary is the interface to the FAQ assistant. It answers
//! questions from the terminal, edits the knowledge base, and serves the
//! web page.
//!
//! ## Usage
//!
//! ```bash
//! mitra --config ./config/mitra.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mitra init` | Create an empty knowledge base file |
//! | `mitra ask "<query>"` | Answer one question |
//! | `mitra chat` | Interactive conversation |
//! | `mitra admin list` | Show every FAQ with its position |
//! | `mitra admin add --question .. --answer ..` | Append an FAQ |
//! | `mitra admin delete <position>` | Remove an FAQ |
//! | `mitra serve` | Start the web server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hriday_mitra::store::KnowledgeStore;
use hriday_mitra::{admin, assistant, chat, config, server};

/// Hriday Mitra — a conversational FAQ assistant.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. If the file does not exist, built-in defaults are used and the
/// knowledge base is read from `./data/faqs.json`.
#[derive(Parser)]
#[command(
    name = "mitra",
    about = "Hriday Mitra — a conversational FAQ assistant",
    version,
    long_about = "Hriday Mitra answers free-text questions from a curated question/answer \
    knowledge base using fuzzy matching, and lets an administrator add and delete entries. \
    Available as a one-shot CLI, an interactive terminal chat, and a single-page web app."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/mitra.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty knowledge base file.
    ///
    /// Does nothing if the file already exists.
    Init,

    /// Answer a single question and exit.
    Ask {
        /// The question to ask.
        query: String,
    },

    /// Start an interactive conversation.
    ///
    /// Reads one question per line. `/history` shows the transcript,
    /// `/quit` or end of input ends the session.
    Chat,

    /// Edit the knowledge base.
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Start the web server.
    ///
    /// Binds to `[server].bind` and serves the chat page and JSON API.
    Serve,
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every FAQ with its 1-based position.
    List,

    /// Append a new FAQ. Both fields are trimmed and must be non-empty.
    Add {
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
    },

    /// Delete the FAQ at a 1-based position, as shown by `admin list`.
    Delete { position: usize },
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(match cli.command {
        Commands::Serve => "info",
        _ => "warn",
    });

    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let store = KnowledgeStore::new(&cfg.store.path);
            if store.init()? {
                println!("Created {}", store.path().display());
            } else {
                println!("{} already exists.", store.path().display());
            }
        }
        Commands::Ask { query } => {
            assistant::run_ask(&cfg, &query)?;
        }
        Commands::Chat => {
            chat::run_chat(&cfg)?;
        }
        Commands::Admin { action } => match action {
            AdminAction::List => admin::run_list(&cfg)?,
            AdminAction::Add { question, answer } => admin::run_add(&cfg, &question, &answer)?,
            AdminAction::Delete { position } => admin::run_delete(&cfg, position)?,
        },
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
