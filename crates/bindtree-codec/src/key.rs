//! Keyed list identifiers.

use std::fmt;
use std::sync::Arc;

use bindtree_node::{KeyPredicates, NodeIdentifierWithPredicates};
use bindtree_schema::QName;

use crate::binding::KeyHolder;
use crate::error::{CodecError, Result};
use crate::types::KeyFactory;
use crate::value::{ValueCodec, ValueContext};

pub(crate) struct KeyComponent {
    pub qname: QName,
    pub local_name: Arc<str>,
    pub codec: Arc<ValueCodec>,
}

/// Converts between a list entry's key holder and its generic entry
/// identifier. Predicates are always produced in declared key order.
pub struct KeyCodec {
    list: QName,
    components: Vec<KeyComponent>,
    factory: Arc<dyn KeyFactory>,
}

impl fmt::Debug for KeyCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyCodec")
            .field("list", &self.list)
            .field("key_type", self.factory.key_type())
            .field(
                "components",
                &self.components.iter().map(|c| &c.qname).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl KeyCodec {
    pub(crate) fn new(list: QName, components: Vec<KeyComponent>, factory: Arc<dyn KeyFactory>) -> Self {
        Self {
            list,
            components,
            factory,
        }
    }

    pub fn list(&self) -> &QName {
        &self.list
    }

    pub fn component_names(&self) -> impl Iterator<Item = &QName> {
        self.components.iter().map(|c| &c.qname)
    }

    pub fn serialize(&self, cx: &dyn ValueContext, key: &dyn KeyHolder) -> Result<NodeIdentifierWithPredicates> {
        let mut predicates = KeyPredicates::new();
        for c in &self.components {
            let value = key
                .component(&c.local_name)
                .ok_or_else(|| self.incomplete(c))?;
            predicates.push(c.qname.clone(), c.codec.serialize(cx, &value)?);
        }
        Ok(NodeIdentifierWithPredicates::new(self.list.clone(), predicates))
    }

    pub fn deserialize(&self, cx: &dyn ValueContext, id: &NodeIdentifierWithPredicates) -> Result<Arc<dyn KeyHolder>> {
        if id.node_type != self.list {
            return Err(CodecError::not_a_child(&id.node_type, &self.list));
        }
        let values = self
            .components
            .iter()
            .map(|c| {
                let scalar = id.predicates.get(&c.qname).ok_or_else(|| self.incomplete(c))?;
                c.codec.deserialize(cx, scalar)
            })
            .collect::<Result<Vec<_>>>()?;
        self.factory.construct(values)
    }

    fn incomplete(&self, component: &KeyComponent) -> CodecError {
        CodecError::IncompleteKey {
            list: self.list.clone(),
            component: component.qname.clone(),
        }
    }
}
