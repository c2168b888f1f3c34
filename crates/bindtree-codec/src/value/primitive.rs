use bindtree_node::Scalar;
use bindtree_schema::TypeDefinition;

use crate::binding::TypedValue;

/// Built-in types whose typed and generic forms coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Decimal64 { fraction_digits: u8 },
    String,
    Binary,
    Empty,
}

impl Primitive {
    pub fn of(def: &TypeDefinition) -> Option<Self> {
        Some(match def.resolved() {
            TypeDefinition::Boolean => Self::Boolean,
            TypeDefinition::Int8 => Self::Int8,
            TypeDefinition::Int16 => Self::Int16,
            TypeDefinition::Int32 => Self::Int32,
            TypeDefinition::Int64 => Self::Int64,
            TypeDefinition::Uint8 => Self::Uint8,
            TypeDefinition::Uint16 => Self::Uint16,
            TypeDefinition::Uint32 => Self::Uint32,
            TypeDefinition::Uint64 => Self::Uint64,
            TypeDefinition::Decimal64 { fraction_digits } => Self::Decimal64 {
                fraction_digits: *fraction_digits,
            },
            TypeDefinition::String => Self::String,
            TypeDefinition::Binary => Self::Binary,
            TypeDefinition::Empty => Self::Empty,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
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
        }
    }

    pub fn scalar_of(self, value: &TypedValue) -> Option<Scalar> {
        Some(match (self, value) {
            (Self::Boolean, TypedValue::Boolean(v)) => Scalar::Boolean(*v),
            (Self::Int8, TypedValue::Int8(v)) => Scalar::Int8(*v),
            (Self::Int16, TypedValue::Int16(v)) => Scalar::Int16(*v),
            (Self::Int32, TypedValue::Int32(v)) => Scalar::Int32(*v),
            (Self::Int64, TypedValue::Int64(v)) => Scalar::Int64(*v),
            (Self::Uint8, TypedValue::Uint8(v)) => Scalar::Uint8(*v),
            (Self::Uint16, TypedValue::Uint16(v)) => Scalar::Uint16(*v),
            (Self::Uint32, TypedValue::Uint32(v)) => Scalar::Uint32(*v),
            (Self::Uint64, TypedValue::Uint64(v)) => Scalar::Uint64(*v),
            (Self::Decimal64 { fraction_digits }, TypedValue::Decimal64(d))
                if d.scale == fraction_digits =>
            {
                Scalar::Decimal64(*d)
            }
            (Self::String, TypedValue::String(v)) => Scalar::String(v.clone()),
            (Self::Binary, TypedValue::Binary(v)) => Scalar::Binary(v.clone()),
            (Self::Empty, TypedValue::Empty) => Scalar::Empty,
            _ => return None,
        })
    }

    pub fn value_of(self, scalar: &Scalar) -> Option<TypedValue> {
        Some(match (self, scalar) {
            (Self::Boolean, Scalar::Boolean(v)) => TypedValue::Boolean(*v),
            (Self::Int8, Scalar::Int8(v)) => TypedValue::Int8(*v),
            (Self::Int16, Scalar::Int16(v)) => TypedValue::Int16(*v),
            (Self::Int32, Scalar::Int32(v)) => TypedValue::Int32(*v),
            (Self::Int64, Scalar::Int64(v)) => TypedValue::Int64(*v),
            (Self::Uint8, Scalar::Uint8(v)) => TypedValue::Uint8(*v),
            (Self::Uint16, Scalar::Uint16(v)) => TypedValue::Uint16(*v),
            (Self::Uint32, Scalar::Uint32(v)) => TypedValue::Uint32(*v),
            (Self::Uint64, Scalar::Uint64(v)) => TypedValue::Uint64(*v),
            (Self::Decimal64 { fraction_digits }, Scalar::Decimal64(d))
                if d.scale == fraction_digits =>
            {
                TypedValue::Decimal64(*d)
            }
            (Self::String, Scalar::String(v)) => TypedValue::String(v.clone()),
            (Self::Binary, Scalar::Binary(v)) => TypedValue::Binary(v.clone()),
            (Self::Empty, Scalar::Empty) => TypedValue::Empty,
            _ => return None,
        })
    }
}
