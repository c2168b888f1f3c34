//! Scalar leaf values of the generic tree.

use std::collections::BTreeSet;
use std::fmt;

use bindtree_schema::QName;

use crate::GenericPath;

/// A fixed-point decimal: `unscaled * 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal64 {
    pub unscaled: i64,
    pub scale: u8,
}

impl Decimal64 {
    pub fn new(unscaled: i64, scale: u8) -> Self {
        Self { unscaled, scale }
    }

    /// Parses `-12.345` style text; the scale is the number of fraction digits.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() || !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let scale = u8::try_from(frac_part.len()).ok()?;
        let mut unscaled: i64 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            unscaled = unscaled.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        }
        Some(Self {
            unscaled: if negative { -unscaled } else { unscaled },
            scale,
        })
    }
}

impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let abs = self.unscaled.unsigned_abs();
        let divisor = 10u64.pow(u32::from(self.scale));
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / divisor,
            abs % divisor,
            width = usize::from(self.scale)
        )
    }
}

/// A leaf value as carried by the generic tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Decimal64(Decimal64),
    /// Strings and enumeration names.
    String(String),
    Binary(Vec<u8>),
    Empty,
    /// Names of the bits that are set.
    Bits(BTreeSet<String>),
    /// An identity reference.
    QName(QName),
    InstanceIdentifier(GenericPath),
}

impl Scalar {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Uint8(_) => "uint8",
            Self::Uint16(_) => "uint16",
            Self::Uint32(_) => "uint32",
            Self::Uint64(_) => "uint64",
            Self::Decimal64(_) => "decimal64",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Empty => "empty",
            Self::Bits(_) => "bits",
            Self::QName(_) => "identityref",
            Self::InstanceIdentifier(_) => "instance-identifier",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn bits<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Bits(names.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Uint8(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Decimal64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Binary(v) => write!(f, "<{} bytes>", v.len()),
            Self::Empty => f.write_str("[empty]"),
            Self::Bits(v) => {
                let names: Vec<&str> = v.iter().map(String::as_str).collect();
                f.write_str(&names.join(" "))
            }
            Self::QName(v) => write!(f, "{v}"),
            Self::InstanceIdentifier(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Uint32(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_display_matrix() {
        assert_eq!(Decimal64::new(12345, 2).to_string(), "123.45");
        assert_eq!(Decimal64::new(-5, 3).to_string(), "-0.005");
        assert_eq!(Decimal64::new(7, 0).to_string(), "7");
    }

    #[test]
    fn decimal_parse_matrix() {
        assert_eq!(Decimal64::parse("123.45"), Some(Decimal64::new(12345, 2)));
        assert_eq!(Decimal64::parse("-0.005"), Some(Decimal64::new(-5, 3)));
        assert_eq!(Decimal64::parse("42"), Some(Decimal64::new(42, 0)));
        assert_eq!(Decimal64::parse(".5"), None);
        assert_eq!(Decimal64::parse("1.2x"), None);
    }

    #[test]
    fn bits_display_is_sorted() {
        assert_eq!(Scalar::bits(["gamma", "alpha"]).to_string(), "alpha gamma");
    }
}
