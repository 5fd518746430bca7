//! # hintgate-dataset
//!
//! The curated error-example dataset and the two lookups the tutoring policy
//! makes against it on every decision.
//!
//! ```text
//! raw CSV ──parse_dataset──▶ SubtypeIndex ──canonical set──▶ Canonicalizer
//!                                 │                              │
//!                                 └──────── select_row ◀─────────┘
//!                                      (subtype, seed) → row id
//! ```
//!
//! Selection is a pure function of dataset bytes, subtype and seed. There is
//! no clock, no RNG, and no hash-map iteration anywhere on that path.

pub mod canonical;
pub mod csv;
pub mod error;
pub mod index;
pub mod select;

pub use canonical::{AliasTable, Canonicalizer, Resolution, canonicalize, normalize_label};
pub use error::DatasetError;
pub use index::{
    DatasetRow, ERROR_SUBTYPE_COLUMN, QUERY_COLUMN, SubtypeIndex, load_index, parse_dataset,
};
pub use select::{STABLE_HASH_VERSION, select_row, stable_hash};
