//! Conflict hunk parsing and resolution splicing.
//!
//! [`parser`] turns raw file text into an ordered list of conflict hunks;
//! [`applier`] splices accepted resolution text back into the original line
//! sequence, leaving everything outside the hunks byte-identical.

pub mod applier;
pub mod parser;

pub use applier::{Disposition, Resolution, ResolutionApplier};
pub use parser::{ConflictHunk, ConflictParser, ParsedFile};
