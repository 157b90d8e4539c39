//! Text diff and fuzzy patch primitives for wikirev-rs.
//!
//! The pipeline is: [`diff::diff`] computes a character edit script,
//! [`patch::make_patch`] folds it into context hunks,
//! [`patch::encode`]/[`patch::decode`] move hunks through a text-safe
//! blob, and [`apply::apply`] replays them against a (possibly drifted)
//! text with a per-hunk clean/fuzzy/failed report.

pub mod apply;
pub mod diff;
pub mod display;
pub mod matching;
pub mod patch;

pub use apply::{apply, ApplyOutcome, HunkOutcome};
pub use diff::{diff, invert, source_text, target_text, Diff, DiffChunk, DiffOp};
pub use display::render_html;
pub use patch::{decode, encode, make_patch, PatchCodecError, PatchHunk};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
