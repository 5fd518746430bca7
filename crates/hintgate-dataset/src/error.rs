//! Dataset errors.

/// Errors from reading the dataset or configuring canonicalization.
///
/// Every variant is fatal to the caller: an index that cannot be built, or a
/// fallback that cannot be resolved, would make every later tutoring decision
/// unreproducible.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },

    #[error("dataset header is missing required column {column:?} (found: {found:?})")]
    MissingColumn { column: String, found: Vec<String> },

    #[error("dataset has no indexable data rows")]
    NoDataRows,

    #[error(
        "fallback subtype {fallback:?} is not present in the dataset; \
         add rows for it or change dataset.fallback_subtype"
    )]
    FallbackMissing { fallback: String },
}
