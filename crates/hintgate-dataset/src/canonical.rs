//! Subtype canonicalization.
//!
//! Raw error labels arrive from SQL engines, graders and humans in many
//! spellings. `canonicalize` folds them onto the finite subtype set the
//! dataset knows about, and degrades to the configured fallback instead of
//! failing: a tutoring decision always gets a resolvable subtype.

use crate::error::DatasetError;
use crate::index::SubtypeIndex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("unknown column", "undefined column"),
    ("no such column", "undefined column"),
    ("invalid column", "undefined column"),
    ("unknown table", "undefined table"),
    ("no such table", "undefined table"),
    ("unknown function", "undefined function"),
    ("no such function", "undefined function"),
    ("ambiguous column", "ambiguous reference"),
    ("ambiguous column name", "ambiguous reference"),
    ("type mismatch", "incorrect data type"),
    ("datatype mismatch", "incorrect data type"),
];

/// Trim and lower-case a raw label.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Non-canonical spelling → canonical subtype. Static configuration, not
/// derived from the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ALIASES
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }

    /// Layer configured aliases over this table; configured entries win.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (from, to) in overrides {
            self.entries
                .insert(normalize_label(from), normalize_label(to));
        }
        self
    }

    /// Alias target for an already-normalized label, or the label itself.
    pub fn resolve<'a>(&'a self, normalized: &'a str) -> &'a str {
        self.entries
            .get(normalized)
            .map(String::as_str)
            .unwrap_or(normalized)
    }

    /// `(alias, target)` pairs in alias order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Outcome of canonicalization. Both arms carry a usable subtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// The label (after aliasing) is a known canonical subtype.
    Resolved { subtype: String },
    /// The label was empty or unknown; `subtype` is the fallback.
    Fallback { subtype: String, normalized: String },
}

impl Resolution {
    pub fn subtype(&self) -> &str {
        match self {
            Self::Resolved { subtype } | Self::Fallback { subtype, .. } => subtype,
        }
    }

    pub fn into_subtype(self) -> String {
        match self {
            Self::Resolved { subtype } | Self::Fallback { subtype, .. } => subtype,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Map `raw` onto `canonical_set`, or onto `fallback` when it cannot.
pub fn canonicalize(
    raw: &str,
    aliases: &AliasTable,
    canonical_set: &BTreeSet<String>,
    fallback: &str,
) -> Resolution {
    let normalized = normalize_label(raw);
    if normalized.is_empty() {
        return Resolution::Fallback {
            subtype: fallback.to_string(),
            normalized,
        };
    }

    let candidate = aliases.resolve(&normalized);
    if canonical_set.contains(candidate) {
        return Resolution::Resolved {
            subtype: candidate.to_string(),
        };
    }

    Resolution::Fallback {
        subtype: fallback.to_string(),
        normalized,
    }
}

/// Canonicalization bound to one dataset's subtype set.
///
/// Construction fails if the fallback is not itself canonical, so a built
/// `Canonicalizer` can never hand out a subtype the index cannot serve.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    aliases: AliasTable,
    canonical: BTreeSet<String>,
    fallback: String,
}

impl Canonicalizer {
    pub fn new(
        aliases: AliasTable,
        canonical: BTreeSet<String>,
        fallback: &str,
    ) -> Result<Self, DatasetError> {
        let fallback = normalize_label(fallback);
        if !canonical.contains(&fallback) {
            return Err(DatasetError::FallbackMissing { fallback });
        }
        Ok(Self {
            aliases,
            canonical,
            fallback,
        })
    }

    pub fn for_index(
        index: &SubtypeIndex,
        aliases: AliasTable,
        fallback: &str,
    ) -> Result<Self, DatasetError> {
        Self::new(aliases, index.canonical_set(), fallback)
    }

    pub fn canonicalize(&self, raw: &str) -> Resolution {
        let resolution = canonicalize(raw, &self.aliases, &self.canonical, &self.fallback);
        if let Resolution::Fallback { normalized, subtype } = &resolution {
            tracing::warn!(
                label = %normalized,
                fallback = %subtype,
                "unrecognized error subtype, using fallback"
            );
        }
        resolution
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn canonical_set(&self) -> &BTreeSet<String> {
        &self.canonical
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Aliases whose target the dataset has no rows for. Labels spelled
    /// this way silently resolve to the fallback.
    pub fn unserved_aliases(&self) -> Vec<(&str, &str)> {
        self.aliases
            .entries()
            .filter(|(_, target)| !self.canonical.contains(*target))
            .collect()
    }
}
