use crate::support::{
    EXIT_REJECTED, load_config_or_exit, load_dataset_or_exit, render_json_payload,
};
use hintgate_dataset::select_row;
use serde_json::json;

const PROBE_SEED: &str = "sql-engage-index-check";

pub fn run(config: String, json_output: bool) {
    let config = load_config_or_exit(&config);
    let (index, canonicalizer) = load_dataset_or_exit(&config);

    let subtypes: Vec<_> = index
        .subtypes()
        .map(|subtype| {
            json!({
                "subtype": subtype,
                "rows": index.rows_for(subtype).len(),
                "probe_row_id": select_row(&index, subtype, PROBE_SEED).map(|row| &row.row_id),
            })
        })
        .collect();

    let unserved = canonicalizer.unserved_aliases();
    for (alias, target) in &unserved {
        tracing::warn!(alias = %alias, target = %target, "alias target has no dataset rows");
    }
    let accepted = unserved.is_empty();

    if json_output {
        let unserved: Vec<_> = unserved
            .iter()
            .map(|(alias, target)| json!({ "alias": alias, "target": target }))
            .collect();
        render_json_payload(&json!({
            "result": if accepted { "accepted" } else { "rejected" },
            "dataset": config.dataset.path.display().to_string(),
            "row_count": index.row_count(),
            "subtype_count": index.subtype_count(),
            "fallback_subtype": canonicalizer.fallback(),
            "probe_seed": PROBE_SEED,
            "unserved_aliases": unserved,
            "subtypes": subtypes,
        }));
    } else if accepted {
        println!(
            "[dataset-check] OK (rows={}, subtypes={}, fallback={})",
            index.row_count(),
            index.subtype_count(),
            canonicalizer.fallback()
        );
        for subtype in index.subtypes() {
            let probe = select_row(&index, subtype, PROBE_SEED)
                .map(|row| row.row_id.as_str())
                .unwrap_or("-");
            println!(
                "  - {subtype}: {} rows (probe -> {probe})",
                index.rows_for(subtype).len()
            );
        }
    } else {
        println!(
            "[dataset-check] FAIL (alias targets without rows: {})",
            unserved.len()
        );
        for (alias, target) in &unserved {
            println!("  - {alias:?} -> {target:?}");
        }
    }

    if !accepted {
        std::process::exit(EXIT_REJECTED);
    }
}
