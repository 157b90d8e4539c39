//! Context-hunk patches built from a diff.
//!
//! A patch is a list of hunks, each carrying a few characters of
//! surrounding context so it can be re-anchored when the text it is
//! applied to has drifted. Coordinates are Unicode scalar counts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diff::{Diff, DiffOp};

/// Characters of equal-text context kept on each side of a hunk.
pub const PATCH_MARGIN: usize = 4;

/// Upper bound on an encoded patch blob accepted by [`decode`].
pub const MAX_PATCH_BLOB: usize = 10 * 1024 * 1024;

/// One contiguous edited region with surrounding context.
///
/// `src_pos`/`src_len` locate the hunk in the text the patch applies to;
/// `dst_pos`/`dst_len` locate it in the transformed text. `dst_pos`
/// already accounts for the length shift of earlier hunks, which is what
/// application uses as the expected anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchHunk {
    pub src_pos: usize,
    pub dst_pos: usize,
    pub src_len: usize,
    pub dst_len: usize,
    pub ops: Diff,
}

impl PatchHunk {
    /// Concatenated Equal and Delete chunks: what the hunk expects to find.
    pub fn source(&self) -> Vec<char> {
        self.ops
            .iter()
            .filter(|(op, _)| *op != DiffOp::Insert)
            .flat_map(|(_, text)| text.chars())
            .collect()
    }

    /// Concatenated Equal and Insert chunks: what the hunk writes.
    pub fn target(&self) -> Vec<char> {
        self.ops
            .iter()
            .filter(|(op, _)| *op != DiffOp::Delete)
            .flat_map(|(_, text)| text.chars())
            .collect()
    }
}

/// Splits a diff over `src` into context hunks.
///
/// Edit runs separated by at most `2 * PATCH_MARGIN` equal characters share
/// a hunk. An all-equal diff produces no hunks.
pub fn make_patch(src: &str, diffs: &Diff) -> Vec<PatchHunk> {
    let mut patches: Vec<PatchHunk> = Vec::new();
    if diffs.iter().all(|(op, _)| *op == DiffOp::Equal) {
        return patches;
    }

    let mut hunk = PatchHunk::default();
    let mut char_count1 = 0usize;
    let mut char_count2 = 0usize;
    // Text state before the current hunk's edits (context source) and
    // after them, both tracked as the diff is replayed.
    let mut prepatch: Vec<char> = src.chars().collect();
    let mut postpatch: Vec<char> = prepatch.clone();

    for (i, (op, text)) in diffs.iter().enumerate() {
        let tlen = text.chars().count();
        if hunk.ops.is_empty() && *op != DiffOp::Equal {
            hunk.src_pos = char_count1;
            hunk.dst_pos = char_count2;
        }

        match op {
            DiffOp::Insert => {
                hunk.ops.push((*op, text.clone()));
                hunk.dst_len += tlen;
                postpatch.splice(char_count2..char_count2, text.chars());
            }
            DiffOp::Delete => {
                hunk.ops.push((*op, text.clone()));
                hunk.src_len += tlen;
                postpatch.drain(char_count2..char_count2 + tlen);
            }
            DiffOp::Equal => {
                if tlen <= 2 * PATCH_MARGIN && !hunk.ops.is_empty() && i != diffs.len() - 1 {
                    hunk.ops.push((*op, text.clone()));
                    hunk.src_len += tlen;
                    hunk.dst_len += tlen;
                }
                if tlen >= 2 * PATCH_MARGIN && !hunk.ops.is_empty() {
                    add_context(&mut hunk, &prepatch);
                    patches.push(std::mem::take(&mut hunk));
                    prepatch = postpatch.clone();
                    char_count1 = char_count2;
                }
            }
        }

        if *op != DiffOp::Insert {
            char_count1 += tlen;
        }
        if *op != DiffOp::Delete {
            char_count2 += tlen;
        }
    }

    if !hunk.ops.is_empty() {
        add_context(&mut hunk, &prepatch);
        patches.push(hunk);
    }
    patches
}

fn add_context(hunk: &mut PatchHunk, prepatch: &[char]) {
    if prepatch.is_empty() {
        return;
    }
    let start = hunk.dst_pos.min(prepatch.len());
    let end = (hunk.dst_pos + hunk.src_len).min(prepatch.len());

    let pre_start = start.saturating_sub(PATCH_MARGIN);
    let prefix: String = prepatch[pre_start..start].iter().collect();
    let suf_end = (end + PATCH_MARGIN).min(prepatch.len());
    let suffix: String = prepatch[end..suf_end].iter().collect();

    let plen = start - pre_start;
    let slen = suf_end - end;
    if plen > 0 {
        hunk.ops.insert(0, (DiffOp::Equal, prefix));
    }
    if slen > 0 {
        hunk.ops.push((DiffOp::Equal, suffix));
    }
    hunk.src_pos = hunk.src_pos.saturating_sub(plen);
    hunk.dst_pos = hunk.dst_pos.saturating_sub(plen);
    hunk.src_len += plen + slen;
    hunk.dst_len += plen + slen;
}

#[derive(Debug, Error)]
pub enum PatchCodecError {
    #[error("patch blob of {0} bytes exceeds max {MAX_PATCH_BLOB}")]
    BlobTooLarge(usize),
    #[error("patch decode failed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serializes hunks to the text-safe blob stored in changesets.
pub fn encode(hunks: &[PatchHunk]) -> Result<String, PatchCodecError> {
    Ok(serde_json::to_string(hunks)?)
}

/// Parses a blob produced by [`encode`].
pub fn decode(blob: &str) -> Result<Vec<PatchHunk>, PatchCodecError> {
    if blob.len() > MAX_PATCH_BLOB {
        return Err(PatchCodecError::BlobTooLarge(blob.len()));
    }
    Ok(serde_json::from_str(blob)?)
}
