//! Event-by-event comparison of two replay traces on policy fields.

use crate::replay::{DecisionEvent, POLICY_FIELDS};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceDivergence {
    Length {
        left: usize,
        right: usize,
    },
    Field {
        index: usize,
        field: String,
        left: Value,
        right: Value,
    },
}

impl std::fmt::Display for TraceDivergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length { left, right } => {
                write!(f, "trace lengths differ (left={left}, right={right})")
            }
            Self::Field {
                index,
                field,
                left,
                right,
            } => write!(f, "event {index} differs on {field}: {left} != {right}"),
        }
    }
}

/// First divergence between `left` and `right`, or `None` when they agree.
///
/// Shared prefixes are compared before lengths, so a trace that diverges
/// early reports the field rather than the length.
pub fn compare_traces(left: &[DecisionEvent], right: &[DecisionEvent]) -> Option<TraceDivergence> {
    for (index, (a, b)) in left.iter().zip(right).enumerate() {
        let (a, b) = (a.policy_value(), b.policy_value());
        for field in POLICY_FIELDS {
            let (lv, rv) = (&a[field], &b[field]);
            if lv != rv {
                return Some(TraceDivergence::Field {
                    index,
                    field: field.to_string(),
                    left: lv.clone(),
                    right: rv.clone(),
                });
            }
        }
    }
    (left.len() != right.len()).then(|| TraceDivergence::Length {
        left: left.len(),
        right: right.len(),
    })
}
