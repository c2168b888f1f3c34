//! JSON rendering of generic trees, for diagnostics and fixtures.
//!
//! Member names are the local name, qualified as `namespace:local` whenever
//! the namespace differs from the enclosing node's. Choices and augmentations
//! are transparent: their children are rendered into the enclosing object.
//! 64-bit integers and decimals are strings, `empty` is `[null]`.

use base64::Engine;
use serde_json::{Map, Value};

use bindtree_schema::QName;

use crate::{Children, GenericNode, Scalar};

/// Renders `node` as a single-member JSON object.
pub fn to_json(node: &GenericNode) -> Value {
    let mut out = Map::new();
    write_member(&mut out, node, None);
    Value::Object(out)
}

pub fn scalar_to_json(value: &Scalar) -> Value {
    match value {
        Scalar::Boolean(v) => Value::Bool(*v),
        Scalar::Int8(v) => Value::from(*v),
        Scalar::Int16(v) => Value::from(*v),
        Scalar::Int32(v) => Value::from(*v),
        Scalar::Uint8(v) => Value::from(*v),
        Scalar::Uint16(v) => Value::from(*v),
        Scalar::Uint32(v) => Value::from(*v),
        Scalar::Int64(v) => Value::String(v.to_string()),
        Scalar::Uint64(v) => Value::String(v.to_string()),
        Scalar::Decimal64(v) => Value::String(v.to_string()),
        Scalar::String(v) => Value::String(v.clone()),
        Scalar::Binary(v) => Value::String(base64::engine::general_purpose::STANDARD.encode(v)),
        Scalar::Empty => Value::Array(vec![Value::Null]),
        Scalar::Bits(_) | Scalar::QName(_) | Scalar::InstanceIdentifier(_) => {
            Value::String(value.to_string())
        }
    }
}

fn member_name(name: &QName, parent_ns: Option<&str>) -> String {
    match parent_ns {
        Some(ns) if ns == name.namespace() => name.local_name().to_string(),
        _ => format!("{}:{}", name.namespace(), name.local_name()),
    }
}

fn write_member(out: &mut Map<String, Value>, node: &GenericNode, parent_ns: Option<&str>) {
    match node {
        GenericNode::Leaf { name, value } => {
            out.insert(member_name(name, parent_ns), scalar_to_json(value));
        }
        GenericNode::LeafSet { name, values, .. } => {
            out.insert(
                member_name(name, parent_ns),
                Value::Array(values.iter().map(scalar_to_json).collect()),
            );
        }
        GenericNode::Container { name, children } => {
            out.insert(
                member_name(name, parent_ns),
                object_of(children, name.namespace()),
            );
        }
        GenericNode::Map { name, entries, .. } => {
            let items = entries
                .values()
                .map(|e| entry_object(e, name.namespace()))
                .collect();
            out.insert(member_name(name, parent_ns), Value::Array(items));
        }
        GenericNode::UnkeyedList { name, entries } => {
            let items = entries
                .iter()
                .map(|e| entry_object(e, name.namespace()))
                .collect();
            out.insert(member_name(name, parent_ns), Value::Array(items));
        }
        GenericNode::MapEntry { id, children } => {
            out.insert(
                member_name(&id.node_type, parent_ns),
                object_of(children, id.node_type.namespace()),
            );
        }
        GenericNode::UnkeyedListEntry { name, children } => {
            out.insert(
                member_name(name, parent_ns),
                object_of(children, name.namespace()),
            );
        }
        GenericNode::Choice { children, .. } | GenericNode::Augmentation { children, .. } => {
            for child in children.values() {
                write_member(out, child, parent_ns);
            }
        }
    }
}

fn entry_object(entry: &GenericNode, ns: &str) -> Value {
    match entry.children() {
        Some(children) => object_of(children, ns),
        None => Value::Null,
    }
}

fn object_of(children: &Children, ns: &str) -> Value {
    let mut out = Map::new();
    for child in children.values() {
        write_member(&mut out, child, Some(ns));
    }
    Value::Object(out)
}
