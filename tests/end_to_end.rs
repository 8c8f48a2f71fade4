use serde_json::json;
use treeql::error::Error;
use treeql::predicates::compare::{compare_datetime, CompareOp};
use treeql::predicates::datetime::DatetimeOptions;
use treeql::tree::{get, Tree};
use treeql::{query, EngineOptions};

#[test]
fn scenario_1_plain_key_lookup() {
    let tree = Tree::from_json_value(json!({
        "widget": {
            "window": {"width": 500, "title": "ABC"},
            "image": {"width": 100},
            "text": {"width": 300}
        }
    }))
    .unwrap();
    let results = query(&tree, "width", "", &EngineOptions::default()).unwrap();
    assert_eq!(results, vec![json!(500), json!(100), json!(300)]);
}

#[test]
fn scenario_2_embedded_wildcard_value_projects_sibling() {
    // Each widget is a record living inside a sequence, so its "name" and
    // "src" fields share the same enclosing record.
    let tree = Tree::from_json_value(json!({
        "widget": [
            {"name": "window abc", "src": "Images/abc.png"},
            {"name": "image abc", "src": "Images/abc.png"},
            {"name": "text abc", "src": "Images/abc.png"}
        ]
    }))
    .unwrap();
    let results = query(&tree, "name=_iwildcard(*abc*)", "src", &EngineOptions::default()).unwrap();
    assert_eq!(
        results,
        vec![
            json!({"src": "Images/abc.png"}),
            json!({"src": "Images/abc.png"}),
            json!({"src": "Images/abc.png"}),
        ]
    );
}

#[test]
fn scenario_3_where_predicate_over_enclosing_record() {
    let tree = Tree::from_json_value(json!({
        "name": "text abc",
        "alignment": "center",
        "width": 300,
        "data": "irrelevant"
    }))
    .unwrap();
    let results = query(
        &tree,
        "alignment=center",
        "name where width eq 300",
        &EngineOptions::default(),
    )
    .unwrap();
    assert_eq!(results, vec![json!({"name": "text abc"})]);
}

#[test]
fn scenario_4_sequence_of_records_select_window() {
    let tree = Tree::from_json_value(json!([
        {
            "debug": "on",
            "window": {"title": "ABC Widget", "name": "window abc", "width": 500, "height": 500}
        },
        {
            "debug": "off",
            "window": {"title": "XYZ Widget", "name": "window xyz", "width": 599, "height": 599}
        }
    ]))
    .unwrap();
    let results = query(&tree, "debug=off", "window", &EngineOptions::default()).unwrap();
    assert_eq!(
        results,
        vec![json!({"window": {
            "title": "XYZ Widget",
            "name": "window xyz",
            "width": 599,
            "height": 599
        }})]
    );
}

#[test]
fn scenario_5_slice_and_negative_index_and_strict_error() {
    let tree = Tree::from_json_value(json!([2021, "Hello", {"a": "Apricot"}])).unwrap();
    let root = tree.root();

    let sliced = get(&tree, root, "0:3:2", None, false).unwrap();
    assert_eq!(sliced, json!([2021, {"a": "Apricot"}]));

    let negative = get(&tree, root, "-3", None, false).unwrap();
    assert_eq!(negative, json!(2021));

    let err = get(&tree, root, "abc", None, true).unwrap_err();
    assert!(matches!(err, Error::TreeShape(_)));
}

#[test]
fn scenario_6_compare_datetime_true_and_false() {
    let opts = DatetimeOptions::default();
    assert!(!compare_datetime(
        CompareOp::Eq,
        "06/14/2021 15:30:00",
        "Jun 14 11:30 PM 2021",
        &opts
    )
    .unwrap());
    assert!(compare_datetime(
        CompareOp::Eq,
        "06/14/2021 23:30:00",
        "Jun 14 11:30 PM 2021",
        &opts
    )
    .unwrap());
}

#[test]
fn select_all_projects_whole_enclosing_record() {
    let tree = Tree::from_json_value(json!({"alignment": "center", "width": 300})).unwrap();
    let results = query(&tree, "alignment", "select *", &EngineOptions::default()).unwrap();
    assert_eq!(results, vec![json!({"alignment": "center", "width": 300})]);
}

#[test]
fn strict_mode_propagates_predicate_argument_errors() {
    let tree = Tree::from_json_value(json!({"width": "not-a-number"})).unwrap();
    let strict = EngineOptions {
        strict: true,
        ..EngineOptions::default()
    };
    let err = query(&tree, "width=gt(100)", "", &strict).unwrap_err();
    assert!(matches!(err, Error::PredicateArgument(_)));

    let lenient = query(&tree, "width=gt(100)", "", &EngineOptions::default()).unwrap();
    assert!(lenient.is_empty());
}
