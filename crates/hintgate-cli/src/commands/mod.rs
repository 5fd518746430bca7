pub mod canonicalize;
pub mod checksum_gate;
pub mod dataset_check;
pub mod ladder_convert;
pub mod ladder_verify;
pub mod replay_harness;
pub mod select_row;
pub mod trace_parity;
