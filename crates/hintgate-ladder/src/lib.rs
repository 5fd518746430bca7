//! # hintgate-ladder
//!
//! Builds the hint-ladder map: one versioned JSON artifact derived wholesale
//! from a set of source assets, and proves the derivation is a pure function
//! of those assets.
//!
//! ```text
//! source assets ──convert──▶ LadderArtifact ──write_atomic──▶ output JSON
//!                                                               │
//!                  verify_idempotency: run twice, hash both ◀───┘
//!                  + reported digest + structural invariants
//! ```

pub mod artifact;
pub mod convert;
pub mod error;
pub mod source;
pub mod verify;

pub use artifact::{
    ArtifactDocument, CONVERTER_POLICY_VERSION, DocumentEntry, DocumentHintLevel, DocumentStats,
    HintLevel, LadderArtifact, LadderEntry, LadderStats, POLICY_SEMANTICS_VERSION, SourceAsset,
    load_artifact_document,
};
pub use convert::{ConvertReport, build_artifact, convert, convert_to_path};
pub use error::LadderError;
pub use source::{LoadedSource, SourceLadder, load_source, parse_source};
pub use verify::{
    ConverterRun, IdempotencyReport, InProcessConverter, InvariantViolation, VerifyFailure,
    parse_reported_digest, validate_artifact, verify_idempotency,
};
