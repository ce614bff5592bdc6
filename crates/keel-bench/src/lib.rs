//! Benchmark workloads for the Keel containers.
//!
//! - [`populated`]: a container of `len` sequential values
//! - [`with_cursors`]: the same container with `cursors` floating cursors
//!   spread evenly across it
//! - [`edit_script`]: a deterministic mix of inserts and erases via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use keel_vec::{Cursor, StableVec};

/// One edit of an [`edit_script`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOp {
    /// Insert one value before this index.
    Insert(usize),
    /// Erase the element at this index.
    Erase(usize),
}

/// A container holding `0..len`.
pub fn populated(len: usize) -> StableVec<u64> {
    (0..len as u64).collect()
}

/// A container holding `0..len` with `cursors` cursors spread evenly
/// from the beginning to the end sentinel.
pub fn with_cursors(len: usize, cursors: usize) -> (StableVec<u64>, Vec<Cursor<u64>>) {
    let vec = populated(len);
    let spread = (0..cursors)
        .map(|i| {
            let index = if cursors <= 1 { 0 } else { i * len / (cursors - 1) };
            vec.cursor_at(index)
                .expect("spread index is within [0, len]")
        })
        .collect();
    (vec, spread)
}

/// A deterministic sequence of `count` edits that keeps the length of a
/// container starting at `len` elements roughly stable.
pub fn edit_script(len: usize, count: usize, seed: u64) -> Vec<EditOp> {
    let mut current = len;
    let mut state = seed;
    let mut ops = Vec::with_capacity(count);
    for i in 0..count {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let pick = (state >> 33) as usize;
        let op = if current == 0 || (i % 2 == 0 && current <= len) {
            EditOp::Insert(pick % (current + 1))
        } else {
            EditOp::Erase(pick % current)
        };
        match op {
            EditOp::Insert(_) => current += 1,
            EditOp::Erase(_) => current -= 1,
        }
        ops.push(op);
    }
    ops
}

/// Apply an [`edit_script`] to a container.
pub fn run_script(vec: &StableVec<u64>, script: &[EditOp]) {
    for (i, op) in script.iter().enumerate() {
        match *op {
            EditOp::Insert(at) => vec
                .insert(at, i as u64)
                .expect("script index is within [0, len]"),
            EditOp::Erase(at) => {
                vec.erase_at(at).expect("script index is within [0, len)");
            }
        }
    }
}
