//! Structural equality and hashing over typed-tree objects.
//!
//! Two objects are equal when they have the same implemented type, the same
//! populated accessors with equal values, equal keys and equal
//! augmentations. Values that fail to decode compare unequal.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{BindingValue, DataObject, KeyHolder};

fn populated(obj: &dyn DataObject) -> Vec<(Arc<str>, BindingValue)> {
    let mut out: Vec<_> = obj
        .attribute_names()
        .into_iter()
        .filter_map(|name| match obj.attribute(&name) {
            Ok(Some(value)) if !value.is_vacant() => Some((name, value)),
            _ => None,
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

pub fn data_object_eq(a: &dyn DataObject, b: &dyn DataObject) -> bool {
    if a.implemented_type() != b.implemented_type() {
        return false;
    }

    let (left, right) = (populated(a), populated(b));
    if left.len() != right.len() {
        return false;
    }
    let same_attributes = left
        .iter()
        .zip(&right)
        .all(|((ln, lv), (rn, rv))| ln == rn && binding_value_eq(lv, rv));
    if !same_attributes {
        return false;
    }

    match (a.key(), b.key()) {
        (Ok(Some(x)), Ok(Some(y))) if key_eq(&*x, &*y) => {}
        (Ok(None), Ok(None)) => {}
        _ => return false,
    }

    let (Ok(left), Ok(right)) = (a.augmentations(), b.augmentations()) else {
        return false;
    };
    left.len() == right.len()
        && left
            .iter()
            .all(|x| right.iter().any(|y| data_object_eq(&**x, &**y)))
}

pub fn binding_value_eq(a: &BindingValue, b: &BindingValue) -> bool {
    match (a, b) {
        (BindingValue::Leaf(x), BindingValue::Leaf(y)) => x == y,
        (BindingValue::LeafList(x), BindingValue::LeafList(y)) => x == y,
        (BindingValue::Container(x), BindingValue::Container(y))
        | (BindingValue::Choice(x), BindingValue::Choice(y)) => data_object_eq(&**x, &**y),
        (BindingValue::List(x), BindingValue::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| data_object_eq(&**l, &**r))
        }
        _ => false,
    }
}

pub fn key_eq(a: &dyn KeyHolder, b: &dyn KeyHolder) -> bool {
    a.key_type() == b.key_type() && a.components() == b.components()
}

pub fn key_hash<H: Hasher>(key: &dyn KeyHolder, state: &mut H) {
    key.key_type().hash(state);
    key.components().hash(state);
}

/// Hash consistent with [`data_object_eq`].
pub fn data_object_hash<H: Hasher>(obj: &dyn DataObject, state: &mut H) {
    obj.implemented_type().hash(state);
    for (name, value) in populated(obj) {
        name.hash(state);
        binding_value_hash(&value, state);
    }
    if let Ok(Some(key)) = obj.key() {
        key_hash(&*key, state);
    }
    if let Ok(mut augs) = obj.augmentations() {
        augs.sort_by(|a, b| a.implemented_type().cmp(b.implemented_type()));
        augs.len().hash(state);
        for aug in &augs {
            data_object_hash(&**aug, state);
        }
    }
}

fn binding_value_hash<H: Hasher>(value: &BindingValue, state: &mut H) {
    value.kind().hash(state);
    match value {
        BindingValue::Leaf(v) => v.hash(state),
        BindingValue::LeafList(vs) => vs.hash(state),
        BindingValue::Container(o) | BindingValue::Choice(o) => data_object_hash(&**o, state),
        BindingValue::List(entries) => {
            entries.len().hash(state);
            for entry in entries {
                data_object_hash(&**entry, state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;
    use crate::binding::{BindingType, DataObjectBuilder, ImmutableKey, TypedValue};

    fn hash_of(obj: &dyn DataObject) -> u64 {
        let mut h = DefaultHasher::new();
        data_object_hash(obj, &mut h);
        h.finish()
    }

    fn entry(name: &str, extra: Option<i32>) -> Arc<dyn DataObject> {
        let key = ImmutableKey::new(
            BindingType::new("t.ListKey"),
            [("name", TypedValue::from(name))],
        );
        let mut b = DataObjectBuilder::new(BindingType::new("t.List")).key(Arc::new(key));
        if let Some(v) = extra {
            b = b.leaf("extra", v);
        }
        b.build()
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let a = DataObjectBuilder::new(BindingType::new("t.C"))
            .leaf("a", 1)
            .leaf("b", "x")
            .build();
        let b = DataObjectBuilder::new(BindingType::new("t.C"))
            .leaf("b", "x")
            .leaf("a", 1)
            .build();
        assert!(data_object_eq(&*a, &*b));
        assert_eq!(hash_of(&*a), hash_of(&*b));
    }

    #[test]
    fn type_value_and_key_differences_are_detected() {
        let a = DataObjectBuilder::new(BindingType::new("t.C")).leaf("a", 1).build();
        let other_type = DataObjectBuilder::new(BindingType::new("t.D")).leaf("a", 1).build();
        let other_value = DataObjectBuilder::new(BindingType::new("t.C")).leaf("a", 2).build();
        assert!(!data_object_eq(&*a, &*other_type));
        assert!(!data_object_eq(&*a, &*other_value));

        assert!(data_object_eq(&*entry("foo", None), &*entry("foo", None)));
        assert!(!data_object_eq(&*entry("foo", None), &*entry("bar", None)));
        assert!(!data_object_eq(&*entry("foo", Some(1)), &*entry("foo", None)));
    }

    #[test]
    fn empty_lists_equal_absent_lists() {
        let with_empty = DataObjectBuilder::new(BindingType::new("t.C"))
            .list("items", Vec::new())
            .build();
        let without = DataObjectBuilder::new(BindingType::new("t.C")).build();
        assert!(data_object_eq(&*with_empty, &*without));
        assert_eq!(hash_of(&*with_empty), hash_of(&*without));
    }

    #[test]
    fn augmentations_compare_by_content() {
        let aug = |v: &str| {
            DataObjectBuilder::new(BindingType::new("t.Aug"))
                .leaf("note", v)
                .build()
        };
        let a = DataObjectBuilder::new(BindingType::new("t.C"))
            .augmentation(aug("x"))
            .build();
        let b = DataObjectBuilder::new(BindingType::new("t.C"))
            .augmentation(aug("x"))
            .build();
        let c = DataObjectBuilder::new(BindingType::new("t.C"))
            .augmentation(aug("y"))
            .build();
        assert!(data_object_eq(&*a, &*b));
        assert!(!data_object_eq(&*a, &*c));
    }
}
