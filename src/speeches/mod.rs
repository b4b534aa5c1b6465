//! Speeches module: drafting and emailing wedding speeches

pub mod handler;
pub mod types;

pub use handler::{speeches_router, SpeechesState};
