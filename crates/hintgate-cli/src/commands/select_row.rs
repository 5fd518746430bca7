use crate::support::{emit_error, load_config_or_exit, load_dataset_or_exit, render_json_payload};
use hintgate_dataset::{STABLE_HASH_VERSION, select_row};
use serde_json::json;

pub fn run(label: String, seed: String, config: String, json_output: bool) {
    let config = load_config_or_exit(&config);
    let (index, canonicalizer) = load_dataset_or_exit(&config);
    let resolution = canonicalizer.canonicalize(&label);
    let subtype = resolution.subtype();

    // A canonicalizer built for this index only yields subtypes it holds.
    let row = select_row(&index, subtype, &seed).unwrap_or_else(|| {
        emit_error(format!("dataset has no rows for canonical subtype {subtype:?}"))
    });

    if json_output {
        render_json_payload(&json!({
            "input": label,
            "subtype": subtype,
            "fallback": resolution.is_fallback(),
            "seed": seed,
            "stable_hash_version": STABLE_HASH_VERSION,
            "candidates": index.rows_for(subtype).len(),
            "row": row,
        }));
    } else {
        println!(
            "[select-row] {subtype} seed={seed} -> {} (candidates={})",
            row.row_id,
            index.rows_for(subtype).len()
        );
        println!("  query: {}", row.query);
    }
}
