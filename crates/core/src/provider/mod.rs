//! The external resolution provider capability.
//!
//! The engine only knows the [`ResolutionProvider`] trait; production wires
//! it to the Gemini REST binding in [`gemini`], tests substitute a
//! deterministic stub. Exactly one attempt is made per hunk: no retry and
//! no timeout policy is imposed here.

pub mod gemini;

use async_trait::async_trait;

use crate::conflict::ConflictHunk;
use crate::errors::ProviderError;

pub use gemini::GeminiProvider;

/// Proposes resolved text for one conflict hunk.
#[async_trait]
pub trait ResolutionProvider: Send + Sync {
    async fn resolve(&self, hunk: &ConflictHunk) -> Result<String, ProviderError>;
}

/// Instruction prefix sent with every resolution request.
const SYSTEM_INSTRUCTION: &str = "You are an expert software engineer helping resolve \
     Git merge conflicts. Return ONLY the resolved content with no explanations and no \
     markdown formatting. Preserve code style and semantics. Prefer non-destructive \
     merges when possible.";

/// Frame a hunk as an instruction to merge two labeled code blocks into
/// one, returning resolved content only.
pub fn build_prompt(hunk: &ConflictHunk) -> String {
    format!(
        "{SYSTEM_INSTRUCTION}\n\
         Here is a merge conflict. Merge the two sides into a single best version.\n\
         <<<<<<< HEAD (ours)\n\
         {}\n\
         =======\n\
         {}\n\
         >>>>>>> theirs\n\
         Respond with only the resolved content.",
        hunk.head_text, hunk.incoming_text
    )
}

/// Clean a raw provider response: drop a single leading and/or trailing
/// fenced-code delimiter line, then trim blank edges. An empty result is
/// a provider fault.
pub fn clean_suggestion(raw: &str) -> Result<String, ProviderError> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // The fence info string (e.g. ```rust) goes with the fence line.
        text = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(head: &str, incoming: &str) -> ConflictHunk {
        ConflictHunk {
            start_index: 0,
            end_index: 4,
            head_text: head.into(),
            incoming_text: incoming.into(),
            closing_marker_line: ">>>>>>> theirs".into(),
        }
    }

    #[test]
    fn test_prompt_carries_both_sides() {
        let prompt = build_prompt(&hunk("let a = 1;", "let a = 2;"));
        assert!(prompt.contains("<<<<<<< HEAD (ours)\nlet a = 1;"));
        assert!(prompt.contains("=======\nlet a = 2;"));
        assert!(prompt.contains("only the resolved content"));
    }

    #[test]
    fn test_clean_plain_text() {
        assert_eq!(clean_suggestion("  merged();\n\n").unwrap(), "merged();");
    }

    #[test]
    fn test_clean_strips_fences() {
        assert_eq!(
            clean_suggestion("```rust\nfn merged() {}\n```").unwrap(),
            "fn merged() {}"
        );
        assert_eq!(clean_suggestion("```\nx\n```\n").unwrap(), "x");
    }

    #[test]
    fn test_clean_strips_leading_fence_only() {
        assert_eq!(clean_suggestion("```js\na();\nb();").unwrap(), "a();\nb();");
    }

    #[test]
    fn test_clean_preserves_interior_backticks() {
        let raw = "let s = \"```\";\nuse_it(s);";
        assert_eq!(clean_suggestion(raw).unwrap(), raw);
    }

    #[test]
    fn test_empty_after_cleaning_is_a_fault() {
        assert!(matches!(
            clean_suggestion("```\n```"),
            Err(ProviderError::EmptyResponse)
        ));
        assert!(matches!(
            clean_suggestion("   \n  "),
            Err(ProviderError::EmptyResponse)
        ));
    }
}
