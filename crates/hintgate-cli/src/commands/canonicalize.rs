use crate::support::{load_config_or_exit, load_dataset_or_exit, render_json_payload};
use serde_json::json;

pub fn run(label: String, config: String, json_output: bool) {
    let config = load_config_or_exit(&config);
    let (_, canonicalizer) = load_dataset_or_exit(&config);
    let resolution = canonicalizer.canonicalize(&label);

    if json_output {
        render_json_payload(&json!({
            "input": label,
            "subtype": resolution.subtype(),
            "fallback": resolution.is_fallback(),
            "resolution": resolution,
        }));
    } else {
        let kind = if resolution.is_fallback() {
            "fallback"
        } else {
            "resolved"
        };
        println!("[canonicalize] {label:?} -> {} ({kind})", resolution.subtype());
    }
}
