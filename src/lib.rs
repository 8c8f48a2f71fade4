//! A hierarchical-data query engine: compile a lookup expression and an
//! optional SELECT/WHERE statement, then run both against a tree of
//! mappings, sequences, and scalars built from JSON or CSV.
//!
//! ```
//! use treeql::{query, EngineOptions};
//! use serde_json::json;
//!
//! let tree = treeql::tree::Tree::from_json_value(json!({
//!     "widget": {"window": {"width": 500}, "image": {"width": 100}}
//! })).unwrap();
//! let results = query(&tree, "width", "", &EngineOptions::default()).unwrap();
//! assert_eq!(results, vec![json!(500), json!(100)]);
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod lookup;
pub mod matchers;
pub mod predicates;
pub mod select;
pub mod traversal;
pub mod tree;

pub use config::EngineOptions;
pub use error::{Error, Result};
pub use factory::TreeSource;
pub use tree::Tree;

/// Compile `lookup` and `select_statement` and run them against `tree`,
/// the single call most callers need. Use [`lookup::compile_lookup`] and
/// [`select::compile_select`] directly when the same expressions run
/// against many trees, to avoid recompiling them each time.
pub fn query(
    tree: &Tree,
    lookup: &str,
    select_statement: &str,
    options: &EngineOptions,
) -> Result<Vec<serde_json::Value>> {
    let compiled_lookup = lookup::compile_lookup(lookup, options)?;
    let compiled_select = select::compile_select(select_statement, options)?;
    traversal::find(tree, &compiled_lookup, &compiled_select, options)
}
