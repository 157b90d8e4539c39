//! Fuzzy pattern location for patch application.
//!
//! Bitap search with the classic diff-match-patch scoring: a candidate
//! position is accepted when its combined error rate and distance from the
//! expected location stays under [`MATCH_THRESHOLD`].

use std::collections::HashMap;

/// Worst acceptable match score (0.0 = perfect, 1.0 = anything goes).
pub const MATCH_THRESHOLD: f64 = 0.5;

/// How far from the expected location a match may stray before the
/// proximity penalty alone exceeds the threshold.
pub const MATCH_DISTANCE: usize = 1000;

/// Bitap state fits one machine word; longer patterns are truncated.
const MAX_BITS: usize = 32;

/// Locates `pattern` in `text` near `expected`, tolerating errors.
///
/// Returns the best-scoring start position, or `None` when nothing close
/// enough exists.
pub fn locate(text: &[char], pattern: &[char], expected: usize) -> Option<usize> {
    if pattern.is_empty() {
        return Some(expected.min(text.len()));
    }
    let pattern = &pattern[..pattern.len().min(MAX_BITS)];
    bitap(text, pattern, expected.min(text.len()))
}

fn bitap(text: &[char], pattern: &[char], loc: usize) -> Option<usize> {
    let mut alphabet: HashMap<char, u64> = HashMap::new();
    for (i, &c) in pattern.iter().enumerate() {
        *alphabet.entry(c).or_insert(0) |= 1u64 << (pattern.len() - i - 1);
    }

    let mut score_threshold = MATCH_THRESHOLD;
    let match_mask = 1u64 << (pattern.len() - 1);
    let mut best_loc: isize = -1;

    let mut bin_max = pattern.len() + text.len();
    let mut last_rd: Vec<u64> = Vec::new();

    for d in 0..pattern.len() {
        // Binary search for the widest window still under the threshold
        // at this error level.
        let mut bin_min = 0usize;
        let mut bin_mid = bin_max;
        while bin_min < bin_mid {
            if score(d, loc + bin_mid, loc, pattern.len()) <= score_threshold {
                bin_min = bin_mid;
            } else {
                bin_max = bin_mid;
            }
            bin_mid = (bin_max - bin_min) / 2 + bin_min;
        }
        bin_max = bin_mid;

        let mut start = if loc as isize - bin_mid as isize + 1 > 1 {
            (loc - bin_mid + 1) as usize
        } else {
            1
        };
        let finish = (loc + bin_mid).min(text.len()) + pattern.len();

        let mut rd = vec![0u64; finish + 2];
        rd[finish + 1] = (1u64 << d) - 1;

        let mut j = finish;
        while j >= start {
            let char_match = if j <= text.len() {
                *alphabet.get(&text[j - 1]).unwrap_or(&0)
            } else {
                0
            };
            rd[j] = if d == 0 {
                ((rd[j + 1] << 1) | 1) & char_match
            } else {
                (((rd[j + 1] << 1) | 1) & char_match)
                    | (((last_rd[j + 1] | last_rd[j]) << 1) | 1)
                    | last_rd[j + 1]
            };
            if rd[j] & match_mask != 0 {
                let s = score(d, j - 1, loc, pattern.len());
                if s <= score_threshold {
                    score_threshold = s;
                    best_loc = (j - 1) as isize;
                    if best_loc as usize > loc {
                        // A better match may still exist on the near side.
                        start = if 2 * loc as isize - best_loc > 1 {
                            (2 * loc as isize - best_loc) as usize
                        } else {
                            1
                        };
                    } else {
                        break;
                    }
                }
            }
            j -= 1;
        }

        if score(d + 1, loc, loc, pattern.len()) > score_threshold {
            break;
        }
        last_rd = rd;
    }

    (best_loc >= 0).then(|| best_loc as usize)
}

fn score(errors: usize, pos: usize, loc: usize, pattern_len: usize) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    let proximity = (loc as isize - pos as isize).unsigned_abs();
    accuracy + proximity as f64 / MATCH_DISTANCE as f64
}
