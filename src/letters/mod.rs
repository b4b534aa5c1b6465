//! Letters module: drafting, emailing and browsing formal letters

pub mod handler;
pub mod types;

pub use handler::{letters_router, LettersState};
