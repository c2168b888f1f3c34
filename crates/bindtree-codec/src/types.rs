//! Mapping between typed-tree types and schema locations.
//!
//! The codec never discovers types on its own: everything it knows about
//! the typed tree comes through a [`TypeRegistry`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bindtree_schema::{QName, SchemaLocation};
use parking_lot::RwLock;

use crate::binding::{BindingType, KeyHolder, TypedValue};
use crate::error::{CodecError, Result};

/// Builds key holders for one keyed list.
pub trait KeyFactory: Send + Sync {
    fn key_type(&self) -> &BindingType;

    /// Components arrive in the list's declared key order.
    fn construct(&self, components: Vec<TypedValue>) -> Result<Arc<dyn KeyHolder>>;
}

/// Lookup capability supplied by the application.
///
/// Several types may map to the same location (grouping reuse); each
/// location has exactly one canonical type, returned by [`type_at`].
///
/// [`type_at`]: TypeRegistry::type_at
pub trait TypeRegistry: Send + Sync {
    fn location_of(&self, ty: &BindingType) -> Result<SchemaLocation>;

    fn type_at(&self, location: &SchemaLocation) -> Result<BindingType>;

    fn key_factory(&self, list: &BindingType) -> Result<Arc<dyn KeyFactory>>;

    /// Type of a named typedef, enumeration, bits or union.
    fn definition_type(&self, name: &QName) -> Result<BindingType>;

    fn identity_type(&self, identity: &QName) -> Result<BindingType>;

    fn identity_of(&self, ty: &BindingType) -> Result<QName>;
}

#[derive(Default)]
struct Tables {
    locations: HashMap<BindingType, SchemaLocation>,
    canonical: HashMap<SchemaLocation, BindingType>,
    key_factories: HashMap<BindingType, Arc<dyn KeyFactory>>,
    definitions: HashMap<QName, BindingType>,
    identities: HashMap<QName, BindingType>,
    identity_names: HashMap<BindingType, QName>,
    unavailable: HashSet<BindingType>,
}

/// An in-memory [`TypeRegistry`] populated up front.
///
/// Types can be withheld with [`mark_unavailable`] to model bindings whose
/// code is not loaded yet; lookups that reach them fail with a recoverable
/// error until [`make_available`] is called.
///
/// [`mark_unavailable`]: StaticTypeRegistry::mark_unavailable
/// [`make_available`]: StaticTypeRegistry::make_available
#[derive(Default)]
pub struct StaticTypeRegistry {
    tables: RwLock<Tables>,
}

impl std::fmt::Debug for StaticTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("StaticTypeRegistry")
            .field("types", &tables.locations.len())
            .field("key_factories", &tables.key_factories.len())
            .field("definitions", &tables.definitions.len())
            .field("identities", &tables.identities.len())
            .finish()
    }
}

impl StaticTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `ty` as the canonical type of `location`.
    pub fn bind(&self, ty: BindingType, location: SchemaLocation) -> &Self {
        let mut tables = self.tables.write();
        tables.canonical.insert(location.clone(), ty.clone());
        tables.locations.insert(ty, location);
        self
    }

    /// Binds `ty` to `location` without making it canonical.
    pub fn bind_alternate(&self, ty: BindingType, location: SchemaLocation) -> &Self {
        self.tables.write().locations.insert(ty, location);
        self
    }

    pub fn bind_key(&self, list: BindingType, factory: Arc<dyn KeyFactory>) -> &Self {
        self.tables.write().key_factories.insert(list, factory);
        self
    }

    pub fn bind_definition(&self, name: QName, ty: BindingType) -> &Self {
        self.tables.write().definitions.insert(name, ty);
        self
    }

    pub fn bind_identity(&self, identity: QName, ty: BindingType) -> &Self {
        let mut tables = self.tables.write();
        tables.identity_names.insert(ty.clone(), identity.clone());
        tables.identities.insert(identity, ty);
        self
    }

    pub fn mark_unavailable(&self, ty: BindingType) -> &Self {
        self.tables.write().unavailable.insert(ty);
        self
    }

    pub fn make_available(&self, ty: &BindingType) -> &Self {
        self.tables.write().unavailable.remove(ty);
        self
    }

    fn check_available(tables: &Tables, ty: &BindingType) -> Result<()> {
        if tables.unavailable.contains(ty) {
            return Err(CodecError::TypeUnavailable(ty.clone()));
        }
        Ok(())
    }
}

impl TypeRegistry for StaticTypeRegistry {
    fn location_of(&self, ty: &BindingType) -> Result<SchemaLocation> {
        let tables = self.tables.read();
        Self::check_available(&tables, ty)?;
        tables
            .locations
            .get(ty)
            .cloned()
            .ok_or_else(|| CodecError::MissingSchema(format!("type {ty}")))
    }

    fn type_at(&self, location: &SchemaLocation) -> Result<BindingType> {
        let tables = self.tables.read();
        let ty = tables
            .canonical
            .get(location)
            .ok_or_else(|| CodecError::MissingType(location.to_string()))?;
        Self::check_available(&tables, ty)?;
        Ok(ty.clone())
    }

    fn key_factory(&self, list: &BindingType) -> Result<Arc<dyn KeyFactory>> {
        let tables = self.tables.read();
        tables
            .key_factories
            .get(list)
            .cloned()
            .ok_or_else(|| CodecError::MissingType(format!("key of {list}")))
    }

    fn definition_type(&self, name: &QName) -> Result<BindingType> {
        let tables = self.tables.read();
        let ty = tables
            .definitions
            .get(name)
            .ok_or_else(|| CodecError::MissingType(format!("type definition {name}")))?;
        Self::check_available(&tables, ty)?;
        Ok(ty.clone())
    }

    fn identity_type(&self, identity: &QName) -> Result<BindingType> {
        let tables = self.tables.read();
        let ty = tables
            .identities
            .get(identity)
            .ok_or_else(|| CodecError::MissingType(format!("identity {identity}")))?;
        Self::check_available(&tables, ty)?;
        Ok(ty.clone())
    }

    fn identity_of(&self, ty: &BindingType) -> Result<QName> {
        let tables = self.tables.read();
        Self::check_available(&tables, ty)?;
        tables
            .identity_names
            .get(ty)
            .cloned()
            .ok_or_else(|| CodecError::MissingSchema(format!("identity type {ty}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindtree_schema::SchemaPath;

    fn loc(name: &str) -> SchemaLocation {
        SchemaLocation::Node(SchemaPath::from_qnames([QName::new("urn:t", name)]))
    }

    #[test]
    fn alternate_types_resolve_but_are_not_canonical() {
        let reg = StaticTypeRegistry::new();
        reg.bind(BindingType::new("a.Top"), loc("top"))
            .bind_alternate(BindingType::new("b.Top"), loc("top"));

        assert_eq!(reg.location_of(&BindingType::new("b.Top")).unwrap(), loc("top"));
        assert_eq!(reg.type_at(&loc("top")).unwrap(), BindingType::new("a.Top"));
    }

    #[test]
    fn lookup_failures_map_to_error_kinds() {
        let reg = StaticTypeRegistry::new();
        assert!(matches!(
            reg.location_of(&BindingType::new("x.Y")),
            Err(CodecError::MissingSchema(_))
        ));
        assert!(matches!(
            reg.type_at(&loc("nothing")),
            Err(CodecError::MissingType(_))
        ));
    }

    #[test]
    fn unavailable_types_recover_once_made_available() {
        let reg = StaticTypeRegistry::new();
        let ty = BindingType::new("a.Top");
        reg.bind(ty.clone(), loc("top")).mark_unavailable(ty.clone());

        let err = reg.type_at(&loc("top")).unwrap_err();
        assert!(err.is_recoverable());

        reg.make_available(&ty);
        assert_eq!(reg.type_at(&loc("top")).unwrap(), ty);
    }
}
