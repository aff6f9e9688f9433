//! # Hriday Mitra
//!
//! A conversational FAQ assistant backed by a small curated knowledge base.
//!
//! A user asks a free-text question; the assistant scores it against every
//! stored question with a weighted fuzzy ratio and, if the best score clears
//! a fixed threshold, replies with the stored answer and its confidence
//! score. An admin surface adds and deletes records, rewriting the JSON
//! knowledge base file in full after each change.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────┐   ┌──────────────┐
//! │  faqs.json   │──▶│  Matcher  │──▶│   Session    │
//! │ (store)      │   │ (wratio)  │   │ (transcript) │
//! └──────▲───────┘   └───────────┘   └──────┬───────┘
//!        │                                  │
//!        │ add / delete         ┌───────────┴──────────┐
//!        │                      ▼                      ▼
//!  ┌─────┴─────┐          ┌──────────┐          ┌──────────┐
//!  │   admin   │◀─────────│   CLI    │          │   HTTP   │
//!  └───────────┘          │ (mitra)  │          │  (page)  │
//!                         └──────────┘          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mitra init                                   # create an empty data/faqs.json
//! mitra admin add --question "What is normal blood pressure?" \
//!                 --answer "Below 120/80 mmHg."
//! mitra ask "normal bp value"
//! mitra chat                                   # interactive session
//! mitra serve                                  # web page on 127.0.0.1:8501
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`store`] | JSON knowledge base file |
//! | [`fuzz`] | String similarity scorers |
//! | [`matcher`] | Best-match selection and threshold |
//! | [`session`] | Conversation transcripts |
//! | [`assistant`] | One question/answer interaction |
//! | [`admin`] | Knowledge base editing |
//! | [`chat`] | Terminal conversation loop |
//! | [`server`] | HTTP server and web page |

pub mod admin;
pub mod assistant;
pub mod chat;
pub mod config;
pub mod fuzz;
pub mod matcher;
pub mod models;
pub mod server;
pub mod session;
pub mod store;
