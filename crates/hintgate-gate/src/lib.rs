//! # hintgate-gate
//!
//! Replay and regression gating for hint policy decisions.
//!
//! - `replay`: deterministic replay of a learner fixture into a decision
//!   trace plus a policy-only checksum
//! - `parity`: first divergence between two traces
//! - `baseline`: the persisted digest baseline and its two I/O operations
//! - `gate`: the check/update state machine over all of the above

pub mod baseline;
pub mod error;
pub mod gate;
pub mod harness;
pub mod inputs;
pub mod parity;
pub mod replay;

pub use baseline::{
    BASELINE_SCHEMA_VERSION, DigestBaseline, ExpectedOutput, load_baseline, write_baseline,
};
pub use error::GateError;
pub use gate::{
    GateMode, GateReport, GateVerdict, InputChange, build_baseline, compare_input_digests,
    compare_versions, evaluate, run_gate,
};
pub use harness::HarnessCommand;
pub use inputs::{
    POLICY_LOGIC_VERSIONS, compute_input_digests, current_input_digests, policy_logic_digest,
};
pub use parity::{TraceDivergence, compare_traces};
pub use replay::{
    Attempt, DEFAULT_MAX_HINT_LEVEL, DecisionEvent, Fixture, HarnessOutput, POLICY_FIELDS,
    REPLAY_HARNESS_VERSION, REPLAY_POLICY_SEMANTICS_VERSION, SQL_ENGAGE_POLICY_VERSION,
    load_fixture, load_harness_output, policy_only_checksum, replay_from_config, run_replay,
    write_harness_output,
};
