//! The arena-based, immutable tree model queries run against.
//!
//! A [`Tree`] owns a flat arena of [`NodeData`] addressed by [`NodeId`].
//! Every non-root node records its parent and the key/index its parent
//! used to reach it, which is what lets the traversal driver climb back
//! up to the enclosing record without the tree owning cycles.

mod scalar;

pub use scalar::Scalar;

use crate::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Mapping(Vec<(String, NodeId)>),
    Sequence(Vec<NodeId>),
    Scalar(Scalar),
}

/// How a node's parent refers to it.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub value: Value,
    pub parent: Option<NodeId>,
    pub link: Option<Link>,
}

/// An immutable, acyclic tree of mappings, sequences, and scalars.
#[derive(Debug, Clone)]
pub struct Tree {
    arena: Vec<NodeData>,
    root: NodeId,
}

impl Tree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.arena[id.index()]
    }

    pub fn value(&self, id: NodeId) -> &Value {
        &self.node(id).value
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// The nearest ancestor mapping that is itself a child of a sequence
    /// (or the root mapping, if there is no such ancestor). This is the
    /// "enclosing record" the WHERE predicate and column projection
    /// evaluate against.
    pub fn enclosing_record(&self, id: NodeId) -> NodeId {
        let mut current = id;
        loop {
            match self.parent(current) {
                None => return current,
                Some(parent) => {
                    let is_seq_child = matches!(self.value(parent), Value::Sequence(_));
                    if is_seq_child && matches!(self.value(current), Value::Mapping(_)) {
                        return current;
                    }
                    if self.parent(parent).is_none() {
                        return parent;
                    }
                    current = parent;
                }
            }
        }
    }

    /// Child lookups of a mapping node, in insertion order.
    pub fn mapping_children(&self, id: NodeId) -> &[(String, NodeId)] {
        match self.value(id) {
            Value::Mapping(entries) => entries,
            _ => &[],
        }
    }

    pub fn sequence_children(&self, id: NodeId) -> &[NodeId] {
        match self.value(id) {
            Value::Sequence(entries) => entries,
            _ => &[],
        }
    }

    pub fn get_field(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.mapping_children(id)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn is_scalar(&self, id: NodeId) -> bool {
        matches!(self.value(id), Value::Scalar(_))
    }

    /// Render a node as its string representation, used when a scalar is
    /// fed into a textual matcher or value predicate.
    pub fn stringify(&self, id: NodeId) -> String {
        match self.value(id) {
            Value::Scalar(s) => s.to_display_string(),
            Value::Mapping(_) | Value::Sequence(_) => String::new(),
        }
    }

    /// Convert a node (and its subtree) back into a `serde_json::Value`,
    /// used for projecting results out of the engine.
    pub fn to_json(&self, id: NodeId) -> serde_json::Value {
        match self.value(id) {
            Value::Scalar(s) => s.to_json(),
            Value::Mapping(entries) => {
                let map = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.to_json(*v)))
                    .collect();
                serde_json::Value::Object(map)
            }
            Value::Sequence(entries) => {
                serde_json::Value::Array(entries.iter().map(|v| self.to_json(*v)).collect())
            }
        }
    }

    /// Build a tree from an already-parsed `serde_json::Value`. JSON/YAML
    /// decoding itself is an external collaborator's job; this is the
    /// thin adapter the spec calls for in place of a full factory layer.
    pub fn from_json_value(value: serde_json::Value) -> Result<Tree> {
        let mut arena = Vec::new();
        let root = build_node(&mut arena, value, None, None)?;
        Ok(Tree { arena, root })
    }

    /// Build a tree of sibling mapping records from CSV-style rows, each
    /// row a list of `(column, value)` pairs in column order.
    pub fn from_csv_records(rows: Vec<Vec<(String, String)>>) -> Result<Tree> {
        let mut arena = Vec::new();
        let mut children = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            let mut mapping_entries = Vec::with_capacity(row.len());
            for (key, val) in row {
                let scalar_id = push_node(
                    &mut arena,
                    NodeData {
                        value: Value::Scalar(Scalar::Str(val)),
                        parent: None,
                        link: None,
                    },
                );
                mapping_entries.push((key, scalar_id));
            }
            let row_id = push_node(
                &mut arena,
                NodeData {
                    value: Value::Mapping(mapping_entries),
                    parent: None,
                    link: Some(Link::Index(i)),
                },
            );
            children.push(row_id);
        }
        let root_id = push_node(
            &mut arena,
            NodeData {
                value: Value::Sequence(children.clone()),
                parent: None,
                link: None,
            },
        );
        for (i, child) in children.iter().enumerate() {
            let entry = &mut arena[child.index()];
            entry.parent = Some(root_id);
            entry.link = Some(Link::Index(i));
        }
        Ok(Tree { arena, root: root_id })
    }
}

fn push_node(arena: &mut Vec<NodeData>, data: NodeData) -> NodeId {
    arena.push(data);
    NodeId((arena.len() - 1) as u32)
}

fn build_node(
    arena: &mut Vec<NodeData>,
    value: serde_json::Value,
    parent: Option<NodeId>,
    link: Option<Link>,
) -> Result<NodeId> {
    let node_value = match value {
        serde_json::Value::Object(map) => {
            let mut seen = HashMap::with_capacity(map.len());
            let mut entries = Vec::with_capacity(map.len());
            // reserve this node's slot first so children can record the right parent
            let placeholder = push_node(
                arena,
                NodeData {
                    value: Value::Mapping(Vec::new()),
                    parent,
                    link: link.clone(),
                },
            );
            for (key, val) in map {
                if seen.insert(key.clone(), ()).is_some() {
                    return Err(Error::TreeShape(format!("duplicate key {key:?} in mapping")));
                }
                let child = build_node(arena, val, Some(placeholder), Some(Link::Key(key.clone())))?;
                entries.push((key, child));
            }
            arena[placeholder.index()].value = Value::Mapping(entries);
            return Ok(placeholder);
        }
        serde_json::Value::Array(items) => {
            let placeholder = push_node(
                arena,
                NodeData {
                    value: Value::Sequence(Vec::new()),
                    parent,
                    link: link.clone(),
                },
            );
            let mut entries = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let child = build_node(arena, item, Some(placeholder), Some(Link::Index(i)))?;
                entries.push(child);
            }
            arena[placeholder.index()].value = Value::Sequence(entries);
            return Ok(placeholder);
        }
        serde_json::Value::String(s) => Value::Scalar(Scalar::Str(s)),
        serde_json::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
        serde_json::Value::Null => Value::Scalar(Scalar::Null),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Scalar(Scalar::Int(i))
            } else {
                Value::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
    };
    Ok(push_node(
        arena,
        NodeData {
            value: node_value,
            parent,
            link,
        },
    ))
}

mod accessor;
pub use accessor::get;
