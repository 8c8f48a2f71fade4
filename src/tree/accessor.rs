//! The `get` leaf accessor: integer/negative/slice indexing into
//! sequences, keyed lookup into mappings.

use super::{NodeId, Tree};
use crate::error::{Error, Result};
use serde_json::Value as Json;

/// Fetch `index` out of the node at `id`.
///
/// - Sequences accept a bare (possibly negative) integer, or Python-style
///   slice syntax `a:b` / `a:b:c` with any endpoint left empty.
/// - Mappings accept a plain string key.
///
/// On failure: if `on_exception` is true, returns `Err`; otherwise
/// returns `default` (or `Json::Null` if none was given).
pub fn get(
    tree: &Tree,
    id: NodeId,
    index: &str,
    default: Option<Json>,
    on_exception: bool,
) -> Result<Json> {
    let fallback = || default.clone().unwrap_or(Json::Null);
    match tree.value(id) {
        super::Value::Sequence(items) => {
            let items = items.clone();
            if index.contains(':') {
                match parse_slice(index, items.len()) {
                    Ok(indices) => Ok(Json::Array(
                        indices.into_iter().map(|i| tree.to_json(items[i])).collect(),
                    )),
                    Err(e) => fail(on_exception, fallback, e),
                }
            } else {
                match index.trim().parse::<i64>() {
                    Ok(n) => match resolve_index(n, items.len()) {
                        Some(i) => Ok(tree.to_json(items[i])),
                        None => fail(
                            on_exception,
                            fallback,
                            Error::NotFound(format!("index {n} out of range (len {})", items.len())),
                        ),
                    },
                    Err(_) => fail(
                        on_exception,
                        fallback,
                        Error::TreeShape(format!("{index:?} is not a valid sequence index")),
                    ),
                }
            }
        }
        super::Value::Mapping(_) => match tree.get_field(id, index) {
            Some(child) => Ok(tree.to_json(child)),
            None => fail(
                on_exception,
                fallback,
                Error::NotFound(format!("key {index:?} not found")),
            ),
        },
        super::Value::Scalar(_) => fail(
            on_exception,
            fallback,
            Error::TreeShape("scalar value is not subscriptable".to_string()),
        ),
    }
}

fn fail(on_exception: bool, fallback: impl FnOnce() -> Json, err: Error) -> Result<Json> {
    if on_exception {
        Err(err)
    } else {
        Ok(fallback())
    }
}

/// Negative indices count from the end; out-of-range returns `None`.
fn resolve_index(n: i64, len: usize) -> Option<usize> {
    let resolved = if n < 0 { n + len as i64 } else { n };
    if resolved < 0 || resolved as usize >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

/// Parse Python-style slice syntax `a:b` or `a:b:c`, any part optionally
/// empty, and return the selected positions in order.
fn parse_slice(spec: &str, len: usize) -> Result<Vec<usize>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(Error::TreeShape(format!(
            "{spec:?} is not a valid slice (expected a:b or a:b:c)"
        )));
    }
    let parse_part = |s: &str| -> Result<Option<i64>> {
        let t = s.trim();
        if t.is_empty() {
            Ok(None)
        } else {
            t.parse::<i64>()
                .map(Some)
                .map_err(|_| Error::TreeShape(format!("{t:?} is not a valid slice bound")))
        }
    };
    let step = match parts.get(2) {
        Some(s) => parse_part(s)?.unwrap_or(1),
        None => 1,
    };
    if step == 0 {
        return Err(Error::TreeShape("slice step must not be zero".to_string()));
    }
    let len_i = len as i64;
    let clamp_start = |n: Option<i64>| -> i64 {
        match n {
            None => {
                if step > 0 {
                    0
                } else {
                    len_i - 1
                }
            }
            Some(mut v) => {
                if v < 0 {
                    v += len_i;
                }
                v.clamp(if step > 0 { 0 } else { -1 }, len_i - 1)
            }
        }
    };
    let clamp_stop = |n: Option<i64>| -> i64 {
        match n {
            None => {
                if step > 0 {
                    len_i
                } else {
                    -1
                }
            }
            Some(mut v) => {
                if v < 0 {
                    v += len_i;
                }
                v.clamp(-1, len_i)
            }
        }
    };
    let start = clamp_start(parse_part(parts[0])?);
    let stop = clamp_stop(parse_part(parts[1])?);

    let mut out = Vec::new();
    if step > 0 {
        let mut i = start;
        while i < stop {
            if i >= 0 {
                out.push(i as usize);
            }
            i += step;
        }
    } else {
        let mut i = start;
        while i > stop {
            if i >= 0 && (i as usize) < len {
                out.push(i as usize);
            }
            i += step;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tree;
    use serde_json::json;

    fn seq() -> Tree {
        Tree::from_json_value(json!([2021, "Hello", {"a": "Apricot"}])).unwrap()
    }

    #[test]
    fn slice_with_step() {
        let tree = seq();
        let result = get(&tree, tree.root(), "0:3:2", None, true).unwrap();
        assert_eq!(result, json!([2021, {"a": "Apricot"}]));
    }

    #[test]
    fn negative_index() {
        let tree = seq();
        let result = get(&tree, tree.root(), "-3", None, true).unwrap();
        assert_eq!(result, json!(2021));
    }

    #[test]
    fn non_numeric_strict_errors() {
        let tree = seq();
        assert!(get(&tree, tree.root(), "abc", None, true).is_err());
    }

    #[test]
    fn non_numeric_lenient_returns_default() {
        let tree = seq();
        let result = get(&tree, tree.root(), "abc", Some(json!("fallback")), false).unwrap();
        assert_eq!(result, json!("fallback"));
    }

    #[test]
    fn mapping_key_lookup() {
        let tree = Tree::from_json_value(json!({"a": 1, "b": 2})).unwrap();
        let result = get(&tree, tree.root(), "b", None, true).unwrap();
        assert_eq!(result, json!(2));
    }
}
