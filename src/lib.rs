// Library surface for the binary, headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod client;
pub mod config;
pub mod language;
pub mod runtime;
pub mod server;
pub mod session;
pub mod ui;

pub use language::{filter_words, Catalog, CharacterPool, WordEntry};
pub use session::{PracticeSession, SessionPhase, TapOutcome};
