//! Subtype index over the error-example dataset.

use crate::canonical::{AliasTable, normalize_label};
use crate::csv::{Record, read_records};
use crate::error::DatasetError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

pub const QUERY_COLUMN: &str = "query";
pub const ERROR_SUBTYPE_COLUMN: &str = "error_subtype";

/// One example row. `row_id` comes from the row's source line, never from its
/// content, so editing a subtype label does not renumber anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetRow {
    pub row_id: String,
    pub line: usize,
    pub query: String,
    /// Canonical subtype the row is indexed under.
    pub subtype: String,
    /// Label as written in the source table.
    pub raw_subtype: String,
}

/// Canonical subtype → rows in first-seen order. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtypeIndex {
    rows: BTreeMap<String, Vec<DatasetRow>>,
    row_count: usize,
}

impl SubtypeIndex {
    pub fn rows_for(&self, subtype: &str) -> &[DatasetRow] {
        self.rows.get(subtype).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, subtype: &str) -> bool {
        self.rows.contains_key(subtype)
    }

    pub fn subtypes(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn canonical_set(&self) -> BTreeSet<String> {
        self.rows.keys().cloned().collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn subtype_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    fn push(&mut self, row: DatasetRow) {
        self.rows.entry(row.subtype.clone()).or_default().push(row);
        self.row_count += 1;
    }
}

/// Parse a dataset table into a subtype index.
///
/// Column positions come from the header by name, so reordered sources parse
/// the same. Subtype labels are normalized and folded through `aliases` so
/// that rows labelled with an alias are served for its canonical target.
/// Rows with an empty subtype cell are not indexable and are skipped.
pub fn parse_dataset(
    raw: &str,
    aliases: &AliasTable,
    row_id_prefix: &str,
) -> Result<SubtypeIndex, DatasetError> {
    let records = read_records(raw)?;
    let mut records = records.into_iter();
    let Some(header) = records.next() else {
        return Err(DatasetError::NoDataRows);
    };
    let columns = HeaderColumns::locate(&header)?;

    let mut index = SubtypeIndex::default();
    for record in records {
        let raw_subtype = record
            .fields
            .get(columns.subtype)
            .map(String::as_str)
            .unwrap_or("");
        let normalized = normalize_label(raw_subtype);
        if normalized.is_empty() {
            tracing::debug!(line = record.line, "skipping dataset row without error subtype");
            continue;
        }
        let subtype = aliases.resolve(&normalized).to_string();
        let query = record
            .fields
            .get(columns.query)
            .cloned()
            .unwrap_or_default();
        index.push(DatasetRow {
            row_id: format!("{row_id_prefix}:{}", record.line),
            line: record.line,
            query,
            subtype,
            raw_subtype: raw_subtype.to_string(),
        });
    }

    if index.is_empty() {
        return Err(DatasetError::NoDataRows);
    }
    tracing::debug!(
        rows = index.row_count(),
        subtypes = index.subtype_count(),
        "dataset indexed"
    );
    Ok(index)
}

/// Read and parse a dataset file.
pub fn load_index(
    path: impl AsRef<Path>,
    aliases: &AliasTable,
    row_id_prefix: &str,
) -> Result<SubtypeIndex, DatasetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_dataset(&text, aliases, row_id_prefix)
}

struct HeaderColumns {
    query: usize,
    subtype: usize,
}

impl HeaderColumns {
    fn locate(header: &Record) -> Result<Self, DatasetError> {
        let names: Vec<String> = header
            .fields
            .iter()
            .map(|field| normalize_label(field))
            .collect();
        let position = |column: &str| {
            names
                .iter()
                .position(|name| name == column)
                .ok_or_else(|| DatasetError::MissingColumn {
                    column: column.to_string(),
                    found: names.clone(),
                })
        };
        Ok(Self {
            query: position(QUERY_COLUMN)?,
            subtype: position(ERROR_SUBTYPE_COLUMN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> SubtypeIndex {
        parse_dataset(raw, &AliasTable::builtin(), "sql-engage").expect("dataset should parse")
    }

    #[test]
    fn row_ids_follow_source_lines() {
        let index = parse("query,error_subtype\nSELECT 1,incomplete query\n\nSELECT 2,incomplete query\n");
        let rows = index.rows_for("incomplete query");
        let ids: Vec<&str> = rows.iter().map(|row| row.row_id.as_str()).collect();
        assert_eq!(ids, vec!["sql-engage:2", "sql-engage:4"]);
    }

    #[test]
    fn quoted_queries_with_commas_and_quotes_parse_exactly() {
        let index = parse(
            "query,error_subtype\n\"SELECT name, \"\"age\"\" FROM users\",Undefined Column\n",
        );
        let rows = index.rows_for("undefined column");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].query, "SELECT name, \"age\" FROM users");
        assert_eq!(rows[0].raw_subtype, "Undefined Column");
    }

    #[test]
    fn header_lookup_survives_column_reordering() {
        let index = parse("error_subtype,id,Query\nundefined table,7,SELECT * FROM nope\n");
        let rows = index.rows_for("undefined table");
        assert_eq!(rows[0].query, "SELECT * FROM nope");
    }

    #[test]
    fn aliased_rows_are_indexed_under_canonical_subtype() {
        let index = parse("query,error_subtype\nA,unknown column\nB,Unknown Column\n");
        assert!(!index.contains("unknown column"));
        assert_eq!(index.rows_for("undefined column").len(), 2);
    }

    #[test]
    fn first_seen_order_is_preserved_per_subtype() {
        let index = parse("query,error_subtype\nA,x\nB,y\nC,x\n");
        let queries: Vec<&str> = index
            .rows_for("x")
            .iter()
            .map(|row| row.query.as_str())
            .collect();
        assert_eq!(queries, vec!["A", "C"]);
        assert_eq!(index.row_count(), 3);
        assert_eq!(index.subtype_count(), 2);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let err = parse_dataset("query,subtype\nA,x\n", &AliasTable::builtin(), "sql-engage")
            .expect_err("missing error_subtype must fail");
        match err {
            DatasetError::MissingColumn { column, found } => {
                assert_eq!(column, ERROR_SUBTYPE_COLUMN);
                assert_eq!(found, vec!["query", "subtype"]);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn header_only_table_has_no_data_rows() {
        let err = parse_dataset("query,error_subtype\n\n", &AliasTable::builtin(), "sql-engage")
            .expect_err("no rows must fail");
        assert!(matches!(err, DatasetError::NoDataRows));
    }

    #[test]
    fn empty_input_has_no_data_rows() {
        let err = parse_dataset("", &AliasTable::builtin(), "sql-engage").expect_err("must fail");
        assert!(matches!(err, DatasetError::NoDataRows));
    }

    #[test]
    fn rows_without_subtype_are_skipped() {
        let index = parse("query,error_subtype\nA,\nB\nC,x\n");
        assert_eq!(index.row_count(), 1);
        assert_eq!(index.rows_for("x")[0].row_id, "sql-engage:4");
    }
}
