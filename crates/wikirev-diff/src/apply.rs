//! Patch application with per-hunk outcome reporting.
//!
//! Each hunk is anchored at its expected position first, then by exact
//! search over the whole text, then by bitap fuzzy matching. A hunk that
//! cannot be anchored is skipped and reported [`HunkOutcome::Failed`];
//! the remaining hunks still apply. Callers inspect the outcome instead
//! of getting a silently best-effort string.

use serde::{Deserialize, Serialize};

use crate::diff::find_subslice;
use crate::matching;
use crate::patch::PatchHunk;

/// How a single hunk landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HunkOutcome {
    /// Found verbatim, at the expected position or elsewhere.
    Clean,
    /// Anchored by fuzzy matching at `at`; the replaced region differed
    /// from what the hunk recorded.
    Fuzzy { at: usize },
    /// No acceptable anchor anywhere; the hunk was skipped.
    Failed,
}

/// Result of applying a patch to a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub text: String,
    pub hunks: Vec<HunkOutcome>,
}

impl ApplyOutcome {
    /// True when every hunk applied verbatim.
    pub fn is_exact(&self) -> bool {
        self.hunks.iter().all(|h| matches!(h, HunkOutcome::Clean))
    }

    pub fn fuzzy_hunks(&self) -> usize {
        self.hunks
            .iter()
            .filter(|h| matches!(h, HunkOutcome::Fuzzy { .. }))
            .count()
    }

    pub fn failed_hunks(&self) -> usize {
        self.hunks
            .iter()
            .filter(|h| matches!(h, HunkOutcome::Failed))
            .count()
    }
}

/// Applies `hunks` to `text`.
pub fn apply(hunks: &[PatchHunk], text: &str) -> ApplyOutcome {
    let mut chars: Vec<char> = text.chars().collect();
    let mut outcomes = Vec::with_capacity(hunks.len());
    // Drift between where hunks expected to land and where they did.
    let mut delta: isize = 0;

    for hunk in hunks {
        let src = hunk.source();
        let dst = hunk.target();
        let expected = clamp_pos(hunk.dst_pos as isize + delta, chars.len());

        let anchor = if slice_at(&chars, expected, &src) {
            Some((expected, true))
        } else if let Some(at) = find_subslice(&chars, &src) {
            Some((at, true))
        } else {
            matching::locate(&chars, &src, expected).map(|at| (at, false))
        };

        match anchor {
            Some((at, clean)) => {
                let end = (at + src.len()).min(chars.len());
                chars.splice(at..end, dst.iter().copied());
                delta = at as isize - hunk.dst_pos as isize;
                outcomes.push(if clean {
                    HunkOutcome::Clean
                } else {
                    HunkOutcome::Fuzzy { at }
                });
            }
            None => {
                // Later hunks expected this one's length change to have
                // happened; compensate for the skip.
                delta -= hunk.dst_len as isize - hunk.src_len as isize;
                outcomes.push(HunkOutcome::Failed);
            }
        }
    }

    ApplyOutcome {
        text: chars.iter().collect(),
        hunks: outcomes,
    }
}

fn clamp_pos(pos: isize, len: usize) -> usize {
    pos.clamp(0, len as isize) as usize
}

fn slice_at(text: &[char], at: usize, needle: &[char]) -> bool {
    at <= text.len() && text.len() - at >= needle.len() && &text[at..at + needle.len()] == needle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use crate::patch::make_patch;

    fn patch(old: &str, new: &str) -> Vec<PatchHunk> {
        make_patch(old, &diff(old, new))
    }

    #[test]
    fn clean_roundtrip() {
        let cases = [
            ("Hello", "Hello world"),
            ("Hello world", "Hello world!"),
            ("Hello world!", "Hello world"),
            ("the quick brown fox", "the slow brown dog"),
            ("", "created from nothing"),
            ("reduced to nothing", ""),
            ("слово Пример слово", "слово Другой слово"),
        ];
        for (old, new) in cases {
            let outcome = apply(&patch(old, new), old);
            assert!(outcome.is_exact(), "{old:?} -> {new:?}: {:?}", outcome.hunks);
            assert_eq!(outcome.text, new, "{old:?} -> {new:?}");
        }
    }

    #[test]
    fn empty_patch_is_identity() {
        let outcome = apply(&[], "unchanged");
        assert!(outcome.is_exact());
        assert_eq!(outcome.text, "unchanged");
    }

    #[test]
    fn applies_cleanly_after_unrelated_shift() {
        // The edit targets the tail; an unrelated prefix insertion moves it.
        let old = "heading\n\nsome body text here";
        let new = "heading\n\nsome body text here and more";
        let drifted = "intro line\nheading\n\nsome body text here";
        let outcome = apply(&patch(old, new), drifted);
        assert!(outcome.is_exact());
        assert_eq!(outcome.text, "intro line\nheading\n\nsome body text here and more");
    }

    #[test]
    fn fuzzy_apply_on_drifted_context() {
        let old = "The quick brown fox jumps over the lazy dog";
        let new = "The quick brown fox leaps over the lazy dog";
        // Context around the edit changed slightly.
        let drifted = "The quick brown foxx jumps over the lazy dog";
        let outcome = apply(&patch(old, new), drifted);
        assert!(!outcome.is_exact());
        assert_eq!(outcome.failed_hunks(), 0);
        assert!(outcome.text.contains("leaps"), "got {:?}", outcome.text);
    }

    #[test]
    fn failed_hunk_is_reported_and_skipped() {
        let old = "alpha beta gamma";
        let new = "alpha BETA gamma";
        let outcome = apply(&patch(old, new), "1234567890 1234567890");
        assert_eq!(outcome.failed_hunks(), 1);
        assert_eq!(outcome.text, "1234567890 1234567890");
    }
}
