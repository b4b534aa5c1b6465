//! Letterdesk - LLM-drafted letters and wedding speeches
//!
//! Letterdesk drafts formal letters and wedding speeches with an
//! OpenAI-compatible model, keeps them in a hosted record store and emails
//! them on request.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        HTTP API (axum)                       │
//! │   /generate-letter  /send-email  /letters/*                  │
//! │   /generate-speech  /send-speech /speech/:id                 │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼───────────────────────────────┐
//! │                         Orchestrator                         │
//! │  generate → store (best effort) → content + optional id      │
//! │  send → resolve record (id or content prefix) → mark sent    │
//! └──────┬───────────────────────┬───────────────────────┬───────┘
//!        │                       │                       │
//! ┌──────▼────────┐    ┌─────────▼────────┐    ┌─────────▼────────┐
//! │  Generator    │    │    Notifier      │    │   Record Store   │
//! │  chat API     │    │    SMTP          │    │   PostgREST/mem  │
//! └───────────────┘    └──────────────────┘    └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`orchestrator`]: generate and send workflows
//! - [`generator`]: content generation
//! - [`notifier`]: email delivery
//! - [`store`]: artifact persistence
//! - [`letters`], [`speeches`]: HTTP handlers and wire types
//! - [`config`]: configuration management

pub mod api;
pub mod artifact;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod letters;
pub mod notifier;
pub mod orchestrator;
pub mod speeches;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::LetterdeskConfig;
pub use context::AppContext;
pub use error::{Error, Result};
