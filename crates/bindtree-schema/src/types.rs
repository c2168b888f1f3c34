//! Leaf type definitions.

use crate::QName;

/// One declared enumeration member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: i32,
}

/// One declared bit of a `bits` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bit {
    pub name: String,
    pub position: u32,
}

/// The resolved type of a leaf or leaf-list.
///
/// Types that generate their own typed-tree class (enumerations, bits, unions
/// and typedefs) carry a `name`; for inline declarations the name is the
/// declaring leaf's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Decimal64 {
        fraction_digits: u8,
    },
    String,
    Binary,
    Empty,
    Enumeration {
        name: QName,
        members: Vec<EnumMember>,
    },
    /// Bits in declaration order.
    Bits {
        name: QName,
        bits: Vec<Bit>,
    },
    /// Member types in declaration order; the first matching member wins.
    Union {
        name: QName,
        members: Vec<TypeDefinition>,
    },
    IdentityRef {
        bases: Vec<QName>,
    },
    InstanceIdentifier {
        require_instance: bool,
    },
    /// A leafref already resolved to its target's type.
    LeafRef {
        target: Box<TypeDefinition>,
    },
    /// A typedef wrapping a base type.
    Derived {
        name: QName,
        base: Box<TypeDefinition>,
    },
}

impl TypeDefinition {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Decimal64 { .. } => "decimal64",
            Self::String => "string",
            Self::Binary => "binary",
            Self::Empty => "empty",
            Self::Enumeration { .. } => "enumeration",
            Self::Bits { .. } => "bits",
            Self::Union { .. } => "union",
            Self::IdentityRef { .. } => "identityref",
            Self::InstanceIdentifier { .. } => "instance-identifier",
            Self::LeafRef { .. } => "leafref",
            Self::Derived { .. } => "derived",
        }
    }

    /// The generated-class name of this type, if it has one.
    pub fn name(&self) -> Option<&QName> {
        match self {
            Self::Enumeration { name, .. }
            | Self::Bits { name, .. }
            | Self::Union { name, .. }
            | Self::Derived { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Follows leafrefs to the type values are actually carried as.
    pub fn resolved(&self) -> &TypeDefinition {
        match self {
            Self::LeafRef { target } => target.resolved(),
            other => other,
        }
    }

    /// True for built-in types whose values coincide with generic scalars.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.resolved(),
            Self::Boolean
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Decimal64 { .. }
                | Self::String
                | Self::Binary
                | Self::Empty
        )
    }

    /// True when values of this type reference other parts of the model.
    pub fn is_context_dependent(&self) -> bool {
        match self.resolved() {
            Self::IdentityRef { .. } | Self::InstanceIdentifier { .. } => true,
            Self::Derived { base, .. } => base.is_context_dependent(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leafref_resolution_is_transitive() {
        let ty = TypeDefinition::LeafRef {
            target: Box::new(TypeDefinition::LeafRef {
                target: Box::new(TypeDefinition::Uint16),
            }),
        };
        assert_eq!(ty.resolved(), &TypeDefinition::Uint16);
        assert!(ty.is_primitive());
        assert_eq!(ty.kind(), "leafref");
    }

    #[test]
    fn derived_context_dependence_follows_base() {
        let name = QName::new("urn:t", "ref");
        let ty = TypeDefinition::Derived {
            name: name.clone(),
            base: Box::new(TypeDefinition::InstanceIdentifier {
                require_instance: true,
            }),
        };
        assert!(ty.is_context_dependent());
        assert_eq!(ty.name(), Some(&name));
        assert!(!TypeDefinition::String.is_context_dependent());
    }
}
