//! merge-resolve core library.
//!
//! This crate provides the foundational components for AI-assisted merge
//! conflict resolution: conflict-marker parsing and resolution splicing,
//! the interactive review session, backup management, configuration, the
//! resolution provider abstraction with its Gemini binding, and the batch
//! engine that ties them together.

pub mod backup;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod errors;
pub mod git;
pub mod provider;
pub mod session;

// Re-exports for convenience.
pub use backup::BackupManager;
pub use config::Config;
pub use conflict::{ConflictHunk, ConflictParser, ParsedFile, Resolution, ResolutionApplier};
pub use engine::{BatchReport, EventSink, FileReport, FileStatus, NullSink, ResolveEngine, ResolveEvent};
pub use errors::CoreError;
pub use provider::{GeminiProvider, ResolutionProvider};
pub use session::{InteractiveSession, ReviewCommand, ReviewGate, ReviewPrompt, SessionState};
