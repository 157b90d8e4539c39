use serde::{Deserialize, Serialize};

/// A single diff operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffOp {
    #[serde(rename = "d")]
    Delete,
    #[serde(rename = "e")]
    Equal,
    #[serde(rename = "i")]
    Insert,
}

pub type DiffChunk = (DiffOp, String);
pub type Diff = Vec<DiffChunk>;

/// Computes a character-based edit script turning `old` into `new`.
///
/// Invariants: concatenating the Equal and Delete chunks yields `old`;
/// concatenating the Equal and Insert chunks yields `new`. The result is
/// normalized: no empty chunks, no two adjacent chunks of the same kind.
pub fn diff(old: &str, new: &str) -> Diff {
    if old == new {
        if old.is_empty() {
            return Vec::new();
        }
        return vec![(DiffOp::Equal, old.to_string())];
    }
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    normalize(diff_slices(&a, &b))
}

fn diff_slices(a: &[char], b: &[char]) -> Diff {
    if a == b {
        if a.is_empty() {
            return Vec::new();
        }
        return vec![(DiffOp::Equal, a.iter().collect())];
    }

    let prefix = common_prefix(a, b);
    let suffix = common_suffix(&a[prefix..], &b[prefix..]);

    let mut out = Vec::new();
    if prefix > 0 {
        out.push((DiffOp::Equal, a[..prefix].iter().collect()));
    }
    out.extend(diff_middle(
        &a[prefix..a.len() - suffix],
        &b[prefix..b.len() - suffix],
    ));
    if suffix > 0 {
        out.push((DiffOp::Equal, a[a.len() - suffix..].iter().collect()));
    }
    out
}

fn diff_middle(a: &[char], b: &[char]) -> Diff {
    if a.is_empty() {
        return vec![(DiffOp::Insert, b.iter().collect())];
    }
    if b.is_empty() {
        return vec![(DiffOp::Delete, a.iter().collect())];
    }

    let (long, short, a_longer) = if a.len() > b.len() {
        (a, b, true)
    } else {
        (b, a, false)
    };

    if let Some(at) = find_subslice(long, short) {
        let op = if a_longer { DiffOp::Delete } else { DiffOp::Insert };
        let mut out = Vec::new();
        if at > 0 {
            out.push((op, long[..at].iter().collect()));
        }
        out.push((DiffOp::Equal, short.iter().collect()));
        if at + short.len() < long.len() {
            out.push((op, long[at + short.len()..].iter().collect()));
        }
        return out;
    }

    if short.len() == 1 {
        // Single char with no match in the other text: full replace.
        return vec![
            (DiffOp::Delete, a.iter().collect()),
            (DiffOp::Insert, b.iter().collect()),
        ];
    }

    bisect(a, b)
}

/// Myers middle-snake search, walking the edit graph from both ends.
fn bisect(a: &[char], b: &[char]) -> Diff {
    let n = a.len() as isize;
    let m = b.len() as isize;

    let max_d = (n + m + 1) / 2;
    let v_offset = max_d;
    let v_len = (2 * max_d + 2) as usize;
    let mut v1 = vec![-1isize; v_len];
    let mut v2 = vec![-1isize; v_len];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = n - m;
    let front = delta % 2 != 0;
    let mut k1start = 0isize;
    let mut k1end = 0isize;
    let mut k2start = 0isize;
    let mut k2end = 0isize;

    for d in 0..max_d {
        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && a[x1 as usize] == b[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n {
                k1end += 2;
            } else if y1 > m {
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && (k2_offset as usize) < v_len && v2[k2_offset as usize] != -1 {
                    let x2 = n - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n && y2 < m && a[(n - x2 - 1) as usize] == b[(m - y2 - 1) as usize] {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n {
                k2end += 2;
            } else if y2 > m {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && (k1_offset as usize) < v_len && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= n - x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize);
                    }
                }
            }
            k2 += 2;
        }
    }

    // No snake found within the budget: the texts share nothing.
    vec![
        (DiffOp::Delete, a.iter().collect()),
        (DiffOp::Insert, b.iter().collect()),
    ]
}

fn bisect_split(a: &[char], b: &[char], x: usize, y: usize) -> Diff {
    let mut out = diff_slices(&a[..x], &b[..y]);
    out.extend(diff_slices(&a[x..], &b[y..]));
    out
}

/// Drops empty chunks and merges adjacent chunks of the same kind.
pub fn normalize(chunks: Diff) -> Diff {
    let mut out: Diff = Vec::with_capacity(chunks.len());
    for (op, text) in chunks {
        if text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.0 == op => last.1.push_str(&text),
            _ => out.push((op, text)),
        }
    }
    out
}

pub fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

pub fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

pub fn find_subslice(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Recovers the old text from a diff (Equal and Delete chunks).
pub fn source_text(diff: &Diff) -> String {
    let mut txt = String::new();
    for (op, text) in diff {
        if *op != DiffOp::Insert {
            txt.push_str(text);
        }
    }
    txt
}

/// Recovers the new text from a diff (Equal and Insert chunks).
pub fn target_text(diff: &Diff) -> String {
    let mut txt = String::new();
    for (op, text) in diff {
        if *op != DiffOp::Delete {
            txt.push_str(text);
        }
    }
    txt
}

/// Swaps Insert and Delete chunks, turning an old->new diff into new->old.
pub fn invert(diff: &Diff) -> Diff {
    diff.iter()
        .map(|(op, text)| match op {
            DiffOp::Equal => (DiffOp::Equal, text.clone()),
            DiffOp::Insert => (DiffOp::Delete, text.clone()),
            DiffOp::Delete => (DiffOp::Insert, text.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(old: &str, new: &str) {
        let d = diff(old, new);
        assert_eq!(source_text(&d), old, "source side of diff({old:?}, {new:?})");
        assert_eq!(target_text(&d), new, "target side of diff({old:?}, {new:?})");
    }

    #[test]
    fn equal_texts() {
        assert!(diff("", "").is_empty());
        assert_eq!(diff("abc", "abc"), vec![(DiffOp::Equal, "abc".into())]);
    }

    #[test]
    fn pure_insert_and_delete() {
        assert_eq!(diff("", "abc"), vec![(DiffOp::Insert, "abc".into())]);
        assert_eq!(diff("abc", ""), vec![(DiffOp::Delete, "abc".into())]);
    }

    #[test]
    fn substring_shortcut() {
        assert_eq!(
            diff("abc", "xabcy"),
            vec![
                (DiffOp::Insert, "x".into()),
                (DiffOp::Equal, "abc".into()),
                (DiffOp::Insert, "y".into()),
            ]
        );
    }

    #[test]
    fn roundtrip_shapes() {
        roundtrip("Hello", "Hello world");
        roundtrip("Hello world", "Hello world!");
        roundtrip("the quick brown fox", "the slow brown dog");
        roundtrip("entirely", "different");
        roundtrip("", "");
        roundtrip("a", "b");
        roundtrip("mañana", "manana");
        roundtrip("line one\nline two\n", "line one\nline 2\nline three\n");
    }

    #[test]
    fn roundtrip_unicode() {
        roundtrip("слово Пример слово", "слово Другой слово");
        roundtrip("日本語のテキスト", "日本語の別のテキスト");
    }

    #[test]
    fn normalize_merges_runs() {
        let chunks = vec![
            (DiffOp::Equal, "a".to_string()),
            (DiffOp::Equal, "b".to_string()),
            (DiffOp::Insert, String::new()),
            (DiffOp::Delete, "c".to_string()),
        ];
        assert_eq!(
            normalize(chunks),
            vec![(DiffOp::Equal, "ab".into()), (DiffOp::Delete, "c".into())]
        );
    }

    #[test]
    fn invert_swaps_sides() {
        let d = diff("old text", "new text");
        let inv = invert(&d);
        assert_eq!(source_text(&inv), "new text");
        assert_eq!(target_text(&inv), "old text");
    }
}
