//! Deterministic row selection.
//!
//! The hash is a fixed polynomial recurrence over UTF-8 bytes:
//! `h = (h * 31 + byte) mod 2^32`, starting from 0. Selection is
//! `h("<subtype>|<seed>") mod rows`. Any change to either step moves every
//! existing selection and must come with a new `STABLE_HASH_VERSION`.

use crate::index::{DatasetRow, SubtypeIndex};

pub const STABLE_HASH_VERSION: &str = "stable-hash-poly31-u32-v1";

/// Polynomial hash over the UTF-8 bytes of `input`, wrapping at 32 bits.
pub fn stable_hash(input: &str) -> u32 {
    input
        .bytes()
        .fold(0u32, |hash, byte| hash.wrapping_mul(31).wrapping_add(u32::from(byte)))
}

/// Pick one row for `subtype` keyed by `seed`.
///
/// `subtype` must already be canonical. `None` means the index has no rows
/// for it, which callers treat as a data-integrity failure.
pub fn select_row<'a>(
    index: &'a SubtypeIndex,
    subtype: &str,
    seed: &str,
) -> Option<&'a DatasetRow> {
    let rows = index.rows_for(subtype);
    if rows.is_empty() {
        return None;
    }
    let hash = stable_hash(&format!("{subtype}|{seed}"));
    let slot = u64::from(hash) % rows.len() as u64;
    rows.get(usize::try_from(slot).ok()?)
}
