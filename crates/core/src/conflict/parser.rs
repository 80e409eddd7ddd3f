//! Conflict marker parsing.
//!
//! Scans raw file text for git-style conflict markers and returns the
//! ordered hunks together with the surrounding untouched lines. The scan is
//! a pure function of the input text; no file system access, no side
//! effects.

use tracing::{debug, warn};

/// A line opening a conflict region. Trailing annotation (branch name,
/// commit id) is not interpreted.
pub const OURS_MARKER: &str = "<<<<<<<";

/// The line separating the two sides of a conflict region.
pub const SEPARATOR_MARKER: &str = "=======";

/// A line closing a conflict region.
pub const THEIRS_MARKER: &str = ">>>>>>>";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One conflicted region bounded by opening marker, separator, and closing
/// marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictHunk {
    /// Zero-based line offset of the opening-marker line.
    pub start_index: usize,
    /// Zero-based line offset of the closing-marker line.
    pub end_index: usize,
    /// Joined text of the "ours" side (lines strictly between opening
    /// marker and separator).
    pub head_text: String,
    /// Joined text of the "theirs" side (lines strictly between separator
    /// and closing marker).
    pub incoming_text: String,
    /// The literal closing-marker line, retained for re-emission when a
    /// hunk is left unresolved.
    pub closing_marker_line: String,
}

/// A file split into lines, with its conflict hunks in document order.
///
/// Hunks never overlap (markers cannot nest) and are sorted by ascending
/// `start_index`.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    /// The raw lines of the file, line terminators stripped.
    pub lines: Vec<String>,
    /// Conflict hunks in document order.
    pub hunks: Vec<ConflictHunk>,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Stateless conflict marker scanner.
pub struct ConflictParser;

impl ConflictParser {
    /// Parse `content` into lines and conflict hunks.
    ///
    /// The scan walks a single forward cursor. A line starting with the
    /// opening marker begins head collection; a line starting with the
    /// separator switches to incoming collection; a line starting with the
    /// closing marker emits the hunk and resumes scanning after it.
    ///
    /// If the separator or the closing marker is never found before
    /// end-of-input, the in-progress hunk is discarded and scanning stops.
    /// No error is raised; the truncation is logged as a warning so it is
    /// observable, but all hunks completed before that point are still
    /// returned.
    pub fn parse(content: &str) -> ParsedFile {
        let lines = split_lines(content);
        let mut hunks = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            if lines[i].starts_with(OURS_MARKER) {
                let start_index = i;
                i += 1;

                let head_start = i;
                while i < lines.len() && !lines[i].starts_with(SEPARATOR_MARKER) {
                    i += 1;
                }
                if i >= lines.len() {
                    warn!(
                        line = start_index,
                        "opening marker without separator; discarding trailing hunk"
                    );
                    break;
                }
                let head_text = lines[head_start..i].join("\n");

                // Skip the separator line.
                i += 1;

                let incoming_start = i;
                while i < lines.len() && !lines[i].starts_with(THEIRS_MARKER) {
                    i += 1;
                }
                if i >= lines.len() {
                    warn!(
                        line = start_index,
                        "opening marker without closing marker; discarding trailing hunk"
                    );
                    break;
                }
                let end_index = i;

                hunks.push(ConflictHunk {
                    start_index,
                    end_index,
                    head_text,
                    incoming_text: lines[incoming_start..end_index].join("\n"),
                    closing_marker_line: lines[end_index].clone(),
                });
            }
            i += 1;
        }

        debug!(lines = lines.len(), hunks = hunks.len(), "parsed content");
        ParsedFile { lines, hunks }
    }
}

/// Split on `\n`, stripping a trailing `\r` from each line so CRLF input
/// parses the same as LF input.
fn split_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
