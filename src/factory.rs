//! The tree-source contract: turns an external payload into a [`Tree`].
//! A thin interface layer, not a full ingestion pipeline — the spec's
//! factory stub (see `SPEC_FULL.md` §6.1), grounded on how loosely the
//! original `dlquery.DLQuery` constructor just shells out to Python's own
//! `json`/`yaml`/`csv` modules and hands the engine a single in-memory
//! value.

use crate::error::{Error, Result};
use crate::tree::Tree;
use std::io::Read;

/// Something that can be turned into a query-ready [`Tree`]. Implemented
/// here for the two shapes the engine accepts directly; a caller wanting
/// YAML or another format decodes to [`serde_json::Value`] first and
/// calls [`Tree::from_json_value`] itself.
pub trait TreeSource {
    fn into_tree(self) -> Result<Tree>;
}

impl TreeSource for serde_json::Value {
    fn into_tree(self) -> Result<Tree> {
        Tree::from_json_value(self)
    }
}

/// Parse `text` as JSON and build a tree from it.
pub fn from_json_str(text: &str) -> Result<Tree> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| Error::TreeShape(format!("invalid JSON: {e}")))?;
    Tree::from_json_value(value)
}

/// Read `reader` as CSV (header row required) and build a sequence of
/// sibling mapping records, one per data row, in file order.
pub fn from_csv_reader<R: Read>(reader: R) -> Result<Tree> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| Error::TreeShape(format!("invalid CSV header: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| Error::TreeShape(format!("invalid CSV row: {e}")))?;
        let row: Vec<(String, String)> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }
    Tree::from_csv_records(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_value_builds_a_tree() {
        let tree = json!({"a": 1}).into_tree().unwrap();
        assert_eq!(tree.stringify(tree.get_field(tree.root(), "a").unwrap()), "1");
    }

    #[test]
    fn json_str_builds_a_tree() {
        let tree = from_json_str(r#"{"a": {"b": 2}}"#).unwrap();
        let a = tree.get_field(tree.root(), "a").unwrap();
        assert_eq!(tree.stringify(tree.get_field(a, "b").unwrap()), "2");
    }

    #[test]
    fn csv_reader_builds_sibling_records() {
        let csv_text = "name,width\nwindow,500\nimage,100\n";
        let tree = from_csv_reader(csv_text.as_bytes()).unwrap();
        let rows = tree.sequence_children(tree.root());
        assert_eq!(rows.len(), 2);
        let first = tree.get_field(rows[0], "name").unwrap();
        assert_eq!(tree.stringify(first), "window");
    }

    #[test]
    fn invalid_json_is_tree_shape_error() {
        let err = from_json_str("{not json}").unwrap_err();
        assert!(matches!(err, Error::TreeShape(_)));
    }
}
