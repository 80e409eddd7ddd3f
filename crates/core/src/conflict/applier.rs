//! Resolution splicing.
//!
//! Reconstructs file content from a [`ParsedFile`] and one resolution per
//! hunk. Untouched spans are copied verbatim and never reordered; each
//! resolution is emitted as a single block, embedded newlines preserved.

use tracing::debug;

use super::parser::{ConflictHunk, ParsedFile};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a resolution was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The provider's suggestion was used as-is.
    Accepted,
    /// The operator rejected the suggestion; the original conflict block
    /// was re-emitted for manual handling.
    Remarked,
    /// The operator skipped the hunk; same output as `Remarked`.
    Skipped,
}

/// The text chosen to replace one hunk, plus its disposition.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Index into [`ParsedFile::hunks`].
    pub hunk_index: usize,
    /// Replacement text for the whole marker block, emitted as one segment.
    pub text: String,
    pub disposition: Disposition,
}

impl Resolution {
    /// An accepted provider suggestion for the hunk at `hunk_index`.
    pub fn accepted(hunk_index: usize, text: impl Into<String>) -> Self {
        Self {
            hunk_index,
            text: text.into(),
            disposition: Disposition::Accepted,
        }
    }

    /// A re-emitted conflict block for a rejected or skipped hunk.
    pub fn remarked(hunk_index: usize, hunk: &ConflictHunk, disposition: Disposition) -> Self {
        Self {
            hunk_index,
            text: ResolutionApplier::remark_block(hunk),
            disposition,
        }
    }
}

// ---------------------------------------------------------------------------
// Applier
// ---------------------------------------------------------------------------

/// Stateless splicer of resolutions into parsed file content.
pub struct ResolutionApplier;

impl ResolutionApplier {
    /// Rebuild file content with each hunk replaced by its resolution.
    ///
    /// `resolutions` must be aligned 1:1 with `parsed.hunks`, in order.
    /// Walks the hunks ascending: copies untouched lines up to each hunk's
    /// opening marker, emits the resolution text as one segment, then
    /// continues one line past the closing marker. Segments are joined
    /// with a single newline; the original file's exact final-newline
    /// presence is not otherwise preserved.
    pub fn apply(parsed: &ParsedFile, resolutions: &[Resolution]) -> String {
        let mut out: Vec<&str> = Vec::new();
        let mut cursor = 0;

        for (hunk, resolution) in parsed.hunks.iter().zip(resolutions) {
            for line in &parsed.lines[cursor..hunk.start_index] {
                out.push(line);
            }
            out.push(&resolution.text);
            cursor = hunk.end_index + 1;
        }
        for line in &parsed.lines[cursor..] {
            out.push(line);
        }

        debug!(
            segments = out.len(),
            hunks = parsed.hunks.len(),
            "applied resolutions"
        );
        out.join("\n")
    }

    /// Re-emit an unresolved hunk as a conflict block.
    ///
    /// Uses the original head and incoming text, a literal separator, and
    /// the original closing-marker line, so the region parses as a conflict
    /// again on the next run.
    pub fn remark_block(hunk: &ConflictHunk) -> String {
        [
            "<<<<<<< OURS",
            hunk.head_text.as_str(),
            "=======",
            hunk.incoming_text.as_str(),
            hunk.closing_marker_line.as_str(),
        ]
        .join("\n")
    }
}
