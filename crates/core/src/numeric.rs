//! Scalar operand of unknown-until-decoded numeric subtype.
//!
//! A [`Numeric`] carries the right-hand side of a comparison predicate
//! across the API boundary. Decoding keeps the subtype the wire reported
//! (signed, unsigned, or floating) so the bound SQL parameter lands in the
//! same type family as the column it is compared against.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};

/// The operand could not be interpreted as any supported numeric subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown numeric kind")]
pub struct UnknownNumericKind;

/// A tagged numeric scalar.
///
/// `Unknown` is the empty state: it exists so a default-constructed value is
/// representable, but it never encodes and never produces a predicate.
/// Absence of an operand is modeled by the containing field (`Option`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Numeric {
    #[default]
    Unknown,
    Int(i64),
    UnsignedInt(u64),
    Float(f64),
}

impl Numeric {
    /// Decode from an untyped wire value.
    ///
    /// JSON numbers keep the representation `serde_json` parsed them into:
    /// negative integers are signed, non-negative integers are unsigned and
    /// anything with a fraction or exponent is a float. Every other JSON
    /// type fails.
    pub fn decode(value: &serde_json::Value) -> Result<Self, UnknownNumericKind> {
        let serde_json::Value::Number(number) = value else {
            return Err(UnknownNumericKind);
        };
        if let Some(v) = number.as_u64() {
            Ok(Self::UnsignedInt(v))
        } else if let Some(v) = number.as_i64() {
            Ok(Self::Int(v))
        } else if let Some(v) = number.as_f64() {
            Ok(Self::Float(v))
        } else {
            Err(UnknownNumericKind)
        }
    }

    /// Encode back into a wire value. Fails for [`Numeric::Unknown`] and for
    /// floats JSON cannot represent (NaN and the infinities).
    pub fn encode(&self) -> Result<serde_json::Value, UnknownNumericKind> {
        match *self {
            Self::Unknown => Err(UnknownNumericKind),
            Self::Int(v) => Ok(v.into()),
            Self::UnsignedInt(v) => Ok(v.into()),
            Self::Float(v) => serde_json::Number::from_f64(v)
                .map(serde_json::Value::Number)
                .ok_or(UnknownNumericKind),
        }
    }

    /// `true` when a payload is held.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl From<i32> for Numeric {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Numeric {
    fn from(v: u32) -> Self {
        Self::UnsignedInt(v.into())
    }
}

impl From<u64> for Numeric {
    fn from(v: u64) -> Self {
        Self::UnsignedInt(v)
    }
}

impl From<f32> for Numeric {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("<unknown>"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UnsignedInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Unknown => Err(ser::Error::custom(UnknownNumericKind)),
            Self::Int(v) => serializer.serialize_i64(v),
            Self::UnsignedInt(v) => serializer.serialize_u64(v),
            Self::Float(v) => serializer.serialize_f64(v),
        }
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericVisitor)
    }
}

struct NumericVisitor;

impl Visitor<'_> for NumericVisitor {
    type Value = Numeric;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a signed integer, unsigned integer or float")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Numeric, E> {
        Ok(Numeric::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Numeric, E> {
        Ok(Numeric::UnsignedInt(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Numeric, E> {
        Ok(Numeric::Float(v))
    }
}
