//! Plain immutable typed-tree objects and keys.

use std::sync::Arc;

use indexmap::IndexMap;

use super::{BindingType, BindingValue, DataObject, KeyHolder, TypedValue};
use crate::error::{CodecError, Result};
use crate::types::KeyFactory;

/// A fully materialized typed-tree object.
#[derive(Debug, Clone)]
pub struct ImmutableDataObject {
    ty: BindingType,
    attributes: IndexMap<Arc<str>, BindingValue>,
    key: Option<Arc<dyn KeyHolder>>,
    augmentations: Vec<Arc<dyn DataObject>>,
}

impl ImmutableDataObject {
    /// Deep copy of any object, forcing every lazily decoded value.
    pub fn copy_of(obj: &dyn DataObject) -> Result<Arc<dyn DataObject>> {
        let mut builder = DataObjectBuilder::new(obj.implemented_type().clone());
        for name in obj.attribute_names() {
            let Some(value) = obj.attribute(&name)? else {
                continue;
            };
            let value = match value {
                BindingValue::Container(o) => BindingValue::Container(Self::copy_of(&*o)?),
                BindingValue::Choice(o) => BindingValue::Choice(Self::copy_of(&*o)?),
                BindingValue::List(entries) => BindingValue::List(
                    entries
                        .iter()
                        .map(|e| Self::copy_of(&**e))
                        .collect::<Result<_>>()?,
                ),
                leaf => leaf,
            };
            builder = builder.set(name, value);
        }
        if let Some(key) = obj.key()? {
            builder.key = Some(Arc::new(ImmutableKey::copy_of(&*key)));
        }
        for aug in obj.augmentations()? {
            builder = builder.augmentation(Self::copy_of(&*aug)?);
        }
        Ok(builder.build())
    }
}

impl DataObject for ImmutableDataObject {
    fn implemented_type(&self) -> &BindingType {
        &self.ty
    }

    fn attribute(&self, name: &str) -> Result<Option<BindingValue>> {
        Ok(self.attributes.get(name).cloned())
    }

    fn attribute_names(&self) -> Vec<Arc<str>> {
        self.attributes.keys().cloned().collect()
    }

    fn key(&self) -> Result<Option<Arc<dyn KeyHolder>>> {
        Ok(self.key.clone())
    }

    fn augmentations(&self) -> Result<Vec<Arc<dyn DataObject>>> {
        Ok(self.augmentations.clone())
    }
}

/// Builds [`ImmutableDataObject`]s.
///
/// ```
/// use bindtree_codec::{BindingType, DataObject, DataObjectBuilder};
///
/// let top = DataObjectBuilder::new(BindingType::new("test.Top"))
///     .leaf("name", "foo")
///     .build();
/// assert!(top.attribute("name").unwrap().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct DataObjectBuilder {
    ty: BindingType,
    attributes: IndexMap<Arc<str>, BindingValue>,
    key: Option<Arc<dyn KeyHolder>>,
    augmentations: Vec<Arc<dyn DataObject>>,
}

impl DataObjectBuilder {
    pub fn new(ty: BindingType) -> Self {
        Self {
            ty,
            attributes: IndexMap::new(),
            key: None,
            augmentations: Vec::new(),
        }
    }

    pub fn set(mut self, name: impl Into<Arc<str>>, value: BindingValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn leaf(self, name: &str, value: impl Into<TypedValue>) -> Self {
        self.set(name, BindingValue::Leaf(value.into()))
    }

    pub fn leaf_list<I>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = TypedValue>,
    {
        self.set(name, BindingValue::LeafList(values.into_iter().collect()))
    }

    pub fn container(self, name: &str, value: Arc<dyn DataObject>) -> Self {
        self.set(name, BindingValue::Container(value))
    }

    /// Populates a choice with the given case object.
    pub fn choice(self, name: &str, case: Arc<dyn DataObject>) -> Self {
        self.set(name, BindingValue::Choice(case))
    }

    pub fn list<I>(self, name: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DataObject>>,
    {
        self.set(name, BindingValue::List(entries.into_iter().collect()))
    }

    /// Sets the entry key; populated components also become leaf attributes.
    pub fn key(mut self, key: Arc<dyn KeyHolder>) -> Self {
        for (name, value) in key.components() {
            if let Some(value) = value {
                self.attributes.insert(name, BindingValue::Leaf(value));
            }
        }
        self.key = Some(key);
        self
    }

    /// Adds an augmentation, replacing any previous one of the same type.
    pub fn augmentation(mut self, aug: Arc<dyn DataObject>) -> Self {
        self.augmentations
            .retain(|a| a.implemented_type() != aug.implemented_type());
        self.augmentations.push(aug);
        self
    }

    pub fn build(self) -> Arc<dyn DataObject> {
        Arc::new(ImmutableDataObject {
            ty: self.ty,
            attributes: self.attributes,
            key: self.key,
            augmentations: self.augmentations,
        })
    }
}

/// A key holder backed by a plain component list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImmutableKey {
    ty: BindingType,
    components: Vec<(Arc<str>, Option<TypedValue>)>,
}

impl ImmutableKey {
    pub fn new<I, S>(ty: BindingType, components: I) -> Self
    where
        I: IntoIterator<Item = (S, TypedValue)>,
        S: Into<Arc<str>>,
    {
        Self {
            ty,
            components: components
                .into_iter()
                .map(|(n, v)| (n.into(), Some(v)))
                .collect(),
        }
    }

    /// A key where some components may be unset.
    pub fn partial<I, S>(ty: BindingType, components: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<TypedValue>)>,
        S: Into<Arc<str>>,
    {
        Self {
            ty,
            components: components.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    pub fn copy_of(key: &dyn KeyHolder) -> Self {
        Self {
            ty: key.key_type().clone(),
            components: key.components(),
        }
    }
}

impl KeyHolder for ImmutableKey {
    fn key_type(&self) -> &BindingType {
        &self.ty
    }

    fn components(&self) -> Vec<(Arc<str>, Option<TypedValue>)> {
        self.components.clone()
    }
}

/// Constructs [`ImmutableKey`]s from components given in key order.
#[derive(Debug, Clone)]
pub struct ImmutableKeyFactory {
    ty: BindingType,
    names: Vec<Arc<str>>,
}

impl ImmutableKeyFactory {
    pub fn new<I, S>(ty: BindingType, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            ty,
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl KeyFactory for ImmutableKeyFactory {
    fn key_type(&self) -> &BindingType {
        &self.ty
    }

    fn construct(&self, components: Vec<TypedValue>) -> Result<Arc<dyn KeyHolder>> {
        if components.len() != self.names.len() {
            return Err(CodecError::invalid_value(
                &self.ty,
                format!(
                    "expected {} key components, got {}",
                    self.names.len(),
                    components.len()
                ),
            ));
        }
        Ok(Arc::new(ImmutableKey::new(
            self.ty.clone(),
            self.names.iter().cloned().zip(components),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::data_object_eq;

    #[test]
    fn key_components_become_attributes() {
        let key = ImmutableKey::new(BindingType::new("t.K"), [("name", TypedValue::from("foo"))]);
        let obj = DataObjectBuilder::new(BindingType::new("t.L"))
            .key(Arc::new(key))
            .build();
        assert_eq!(
            obj.attribute("name").unwrap(),
            Some(BindingValue::Leaf(TypedValue::from("foo")))
        );
        assert_eq!(
            obj.key().unwrap().unwrap().component("name"),
            Some(TypedValue::from("foo"))
        );
    }

    #[test]
    fn augmentation_of_same_type_is_replaced() {
        let aug = |v: i32| {
            DataObjectBuilder::new(BindingType::new("t.A"))
                .leaf("v", v)
                .build()
        };
        let obj = DataObjectBuilder::new(BindingType::new("t.C"))
            .augmentation(aug(1))
            .augmentation(aug(2))
            .build();
        let augs = obj.augmentations().unwrap();
        assert_eq!(augs.len(), 1);
        assert!(data_object_eq(&*augs[0], &*aug(2)));
        assert!(obj.augmentation(&BindingType::new("t.Other")).unwrap().is_none());
    }

    #[test]
    fn copy_is_structurally_equal() {
        let inner = DataObjectBuilder::new(BindingType::new("t.In")).leaf("x", 1).build();
        let obj = DataObjectBuilder::new(BindingType::new("t.C"))
            .container("in", inner)
            .leaf_list("tags", [TypedValue::from("a"), TypedValue::from("b")])
            .build();
        let copy = ImmutableDataObject::copy_of(&*obj).unwrap();
        assert!(data_object_eq(&*obj, &*copy));
    }

    #[test]
    fn factory_checks_arity() {
        let factory = ImmutableKeyFactory::new(BindingType::new("t.K"), ["a", "b"]);
        assert!(factory.construct(vec![TypedValue::from(1)]).is_err());
        let key = factory
            .construct(vec![TypedValue::from(1), TypedValue::from("x")])
            .unwrap();
        assert_eq!(key.component("b"), Some(TypedValue::from("x")));
    }
}
