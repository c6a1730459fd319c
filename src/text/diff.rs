use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

/// Returned instead of a diff when the comparison itself fails.
pub const DIFF_ERROR_SENTINEL: &str = "Error comparing texts";

/// Right-hand sequences at least this long drop popular tokens from the
/// match index.
const POPULAR_MIN_LEN: usize = 200;

/// Word-level difference between two texts.
///
/// Both texts are split on whitespace and compared as token sequences with
/// no context. Each change region lists the removed tokens (`-word`) before
/// the added ones (`+word`); the markers are joined with single spaces.
/// Identical inputs produce an empty string.
pub fn word_diff(left: &str, right: &str) -> String {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let left: Vec<&str> = left.split_whitespace().collect();
        let right: Vec<&str> = right.split_whitespace().collect();
        render(&left, &right)
    }));

    match outcome {
        Ok(diff) => diff,
        Err(_) => {
            error!("failed to compare texts");
            DIFF_ERROR_SENTINEL.to_string()
        }
    }
}

fn render(left: &[&str], right: &[&str]) -> String {
    let mut markers: Vec<String> = Vec::new();
    let (mut left_at, mut right_at) = (0, 0);

    for block in matching_blocks(left, right) {
        markers.extend(left[left_at..block.left].iter().map(|word| format!("-{word}")));
        markers.extend(right[right_at..block.right].iter().map(|word| format!("+{word}")));
        left_at = block.left + block.len;
        right_at = block.right + block.len;
    }

    markers.join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    left: usize,
    right: usize,
    len: usize,
}

/// Common runs of the two sequences in ascending order, terminated by a
/// zero-length block at the end of both.
///
/// Finds the longest common run, then recurses into the regions on either
/// side of it. Ties resolve to the earliest run in `left`, then in `right`.
///
/// When `right` has at least [`POPULAR_MIN_LEN`] tokens, tokens occurring
/// more than `right.len() / 100 + 1` times cannot start a run; they only
/// join one by extending it at either end.
fn matching_blocks(left: &[&str], right: &[&str]) -> Vec<Block> {
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, word) in right.iter().enumerate() {
        positions.entry(*word).or_default().push(index);
    }
    if right.len() >= POPULAR_MIN_LEN {
        let limit = right.len() / 100 + 1;
        positions.retain(|_, indices| indices.len() <= limit);
    }

    let mut pending = vec![(0, left.len(), 0, right.len())];
    let mut blocks = Vec::new();
    while let Some((left_lo, left_hi, right_lo, right_hi)) = pending.pop() {
        let block = longest_match(
            left, right, &positions, left_lo, left_hi, right_lo, right_hi,
        );
        if block.len == 0 {
            continue;
        }
        blocks.push(block);
        if left_lo < block.left && right_lo < block.right {
            pending.push((left_lo, block.left, right_lo, block.right));
        }
        if block.left + block.len < left_hi && block.right + block.len < right_hi {
            pending.push((block.left + block.len, left_hi, block.right + block.len, right_hi));
        }
    }

    blocks.sort_by_key(|block| (block.left, block.right));
    blocks.push(Block {
        left: left.len(),
        right: right.len(),
        len: 0,
    });
    blocks
}

fn longest_match(
    left: &[&str],
    right: &[&str],
    positions: &HashMap<&str, Vec<usize>>,
    left_lo: usize,
    left_hi: usize,
    right_lo: usize,
    right_hi: usize,
) -> Block {
    let mut best = Block {
        left: left_lo,
        right: right_lo,
        len: 0,
    };
    // run length of the match ending at right[j], for the previous left row
    let mut runs: HashMap<usize, usize> = HashMap::new();

    for (i, word) in left.iter().enumerate().take(left_hi).skip(left_lo) {
        let mut next_runs = HashMap::new();
        if let Some(indices) = positions.get(word) {
            for &j in indices {
                if j < right_lo {
                    continue;
                }
                if j >= right_hi {
                    break;
                }
                let len = j
                    .checked_sub(1)
                    .and_then(|prev| runs.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, len);
                if len > best.len {
                    best = Block {
                        left: i + 1 - len,
                        right: j + 1 - len,
                        len,
                    };
                }
            }
        }
        runs = next_runs;
    }

    while best.left > left_lo
        && best.right > right_lo
        && left[best.left - 1] == right[best.right - 1]
    {
        best.left -= 1;
        best.right -= 1;
        best.len += 1;
    }
    while best.left + best.len < left_hi
        && best.right + best.len < right_hi
        && left[best.left + best.len] == right[best.right + best.len]
    {
        best.len += 1;
    }

    best
}
