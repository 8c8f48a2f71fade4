//! The tree traversal and matching driver: depth-first descent applying
//! a compiled lookup and an optional select-statement predicate, per the
//! spec's §4.5 driver design (no direct teacher/original analogue — the
//! original's `Element.find` was an unimplemented stub).

use crate::config::EngineOptions;
use crate::error::Result;
use crate::lookup::CompiledLookup;
use crate::select::{ColumnSpec, CompiledSelect};
use crate::tree::{NodeId, Tree, Value};
use serde_json::{Map, Value as Json};

/// Depth-first, insertion-order walk of `tree` collecting every node
/// whose key satisfies `lookup`'s left matcher (and right side/predicate,
/// if present), filtered by `select`'s WHERE predicate and projected
/// through its column spec.
///
/// `options.strict` controls whether a predicate's internal parse/compare
/// failure propagates as an error (`true`) or is swallowed to `false`
/// (`false`); `options.cache_regex` gates the lazy `match`/`not_match`
/// regex compile in the WHERE predicate path.
pub fn find(
    tree: &Tree,
    lookup: &CompiledLookup,
    select: &CompiledSelect,
    options: &EngineOptions,
) -> Result<Vec<Json>> {
    let mut results = Vec::new();
    walk(tree, tree.root(), lookup, select, options, &mut results)?;
    Ok(results)
}

fn walk(
    tree: &Tree,
    node: NodeId,
    lookup: &CompiledLookup,
    select: &CompiledSelect,
    options: &EngineOptions,
    results: &mut Vec<Json>,
) -> Result<()> {
    match tree.value(node) {
        Value::Mapping(entries) => {
            for (key, child) in entries.clone() {
                if lookup.matches_key(&key) && candidate_matches(tree, child, lookup, options)? {
                    project_candidate(tree, child, select, options, results)?;
                }
                walk(tree, child, lookup, select, options, results)?;
            }
        }
        Value::Sequence(items) => {
            for item in items.clone() {
                walk(tree, item, lookup, select, options, results)?;
            }
        }
        Value::Scalar(_) => {}
    }
    Ok(())
}

fn candidate_matches(
    tree: &Tree,
    child: NodeId,
    lookup: &CompiledLookup,
    options: &EngineOptions,
) -> Result<bool> {
    if !lookup.has_right() {
        return Ok(true);
    }
    if !tree.is_scalar(child) {
        return Ok(false);
    }
    let probe = tree.stringify(child);
    lookup.matches_value(&probe, options)
}

fn project_candidate(
    tree: &Tree,
    candidate: NodeId,
    select: &CompiledSelect,
    options: &EngineOptions,
    results: &mut Vec<Json>,
) -> Result<()> {
    let record = tree.enclosing_record(candidate);
    if let Some(predicate) = &select.predicate {
        if !predicate.evaluate(tree, record, options)? {
            return Ok(());
        }
    }
    match &select.columns {
        ColumnSpec::ZeroSelect => results.push(tree.to_json(candidate)),
        ColumnSpec::AllSelect => results.push(tree.to_json(record)),
        ColumnSpec::Named(columns) => {
            let mut map = Map::new();
            for column in columns {
                if let Some(value) = tree.get_field(record, column) {
                    map.insert(column.clone(), tree.to_json(value));
                }
            }
            results.push(Json::Object(map));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineOptions;
    use crate::lookup::compile_lookup;
    use crate::select::compile_select;
    use serde_json::json;

    fn find_str(tree: &Tree, lookup: &str, select: &str) -> Vec<Json> {
        let options = EngineOptions::default();
        let compiled_lookup = compile_lookup(lookup, &options).unwrap();
        let compiled_select = compile_select(select, &options).unwrap();
        find(tree, &compiled_lookup, &compiled_select, &options).unwrap()
    }

    #[test]
    fn simple_key_lookup_collects_every_match() {
        let tree = Tree::from_json_value(json!({
            "widget": {
                "window": {"width": 500, "title": "ABC"},
                "image": {"width": 100},
                "text": {"width": 300}
            }
        }))
        .unwrap();
        let results = find_str(&tree, "width", "");
        assert_eq!(results, vec![json!(500), json!(100), json!(300)]);
    }

    #[test]
    fn value_predicate_filters_scalars() {
        let tree = Tree::from_json_value(json!({
            "a": {"debug": "on"},
            "b": {"debug": "off"}
        }))
        .unwrap();
        let results = find_str(&tree, "debug=off", "");
        assert_eq!(results, vec![json!("off")]);
    }

    #[test]
    fn where_predicate_filters_by_sibling_field() {
        let tree = Tree::from_json_value(json!({
            "name": "text abc",
            "alignment": "center",
            "width": 300
        }))
        .unwrap();
        let results = find_str(&tree, "alignment=center", "name where width eq 300");
        assert_eq!(results, vec![json!({"name": "text abc"})]);
    }

    #[test]
    fn sequence_records_select_enclosing_row() {
        let tree = Tree::from_json_value(json!([
            {"debug": "on", "window": {"title": "ABC"}},
            {"debug": "off", "window": {"title": "XYZ"}}
        ]))
        .unwrap();
        let results = find_str(&tree, "debug=off", "window");
        assert_eq!(results, vec![json!({"window": {"title": "XYZ"}})]);
    }

    #[test]
    fn all_select_projects_whole_record() {
        let tree = Tree::from_json_value(json!({"a": 1, "b": 2})).unwrap();
        let results = find_str(&tree, "a", "select *");
        assert_eq!(results, vec![json!({"a": 1, "b": 2})]);
    }
}
