//! The owned `Value` data model (§3).
use std::hash::{Hash, Hasher};

use indexmap::{IndexMap, IndexSet};

use crate::bigint::BigInteger;
use crate::datetime::{DateTime, Duration};
use crate::integer::Integer;
use crate::typed_array::{BoolBitList, TypedArray};
use crate::uri::Uri;

/// An owned value tree node. Every variant in §3's data model has a
/// matching arm here; `ValueRef` mirrors this with borrowed `Text`/`Bytes`/
/// `TypedArray` payloads for zero-copy decoding.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(Integer),
    BigInteger(BigInteger),
    Float64(f64),
    Bytes(Vec<u8>),
    Text(String),
    List(Vec<Value>),
    /// Insertion-ordered associative container; keys may be any `Value`,
    /// though in practice they are overwhelmingly `Text`.
    Map(IndexMap<Value, Value>),
    /// Unordered collection, encoded/decoded via the `set` ext type.
    Set(IndexSet<Value>),
    DateTime(DateTime),
    Duration(Duration),
    Uri(Uri),
    TypedArray(TypedArray),
    BoolBitList(BoolBitList),
    /// An ext-type byte this decoder does not recognize, carried opaquely.
    ExtUnknown { ext_type: u8, payload: Vec<u8> },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_int64(&self) -> Option<Integer> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_map(&self) -> Option<&IndexMap<Value, Value>> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Semantic round-trip equality per §8 property 1: `BigInteger`
    /// compared by numeric value (already structural here), `Float64`
    /// compared with `NaN == NaN`. Plain `PartialEq`/`Eq` (used for map
    /// keys and general comparisons) instead compares floats by bit
    /// pattern, which is reflexive but not IEEE-754 semantics.
    pub fn roundtrip_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float64(a), Value::Float64(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.roundtrip_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).map(|v2| v.roundtrip_eq(v2)).unwrap_or(false))
            }
            (Value::Set(a), Value::Set(b)) => a.len() == b.len() && a.iter().all(|v| b.contains(v)),
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (BigInteger(a), BigInteger(b)) => a == b,
            (Float64(a), Float64(b)) => a.to_bits() == b.to_bits(),
            (Bytes(a), Bytes(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Map(a), Map(b)) => a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v)),
            (Set(a), Set(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Duration(a), Duration(b)) => a == b,
            (Uri(a), Uri(b)) => a == b,
            (TypedArray(a), TypedArray(b)) => a == b,
            (BoolBitList(a), BoolBitList(b)) => a == b,
            (ExtUnknown { ext_type: t1, payload: p1 }, ExtUnknown { ext_type: t2, payload: p2 }) => {
                t1 == t2 && p1 == p2
            }
            _ => false,
        }
    }
}
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        use Value::*;
        match self {
            Null => {}
            Bool(v) => v.hash(state),
            Int64(v) => v.hash(state),
            BigInteger(v) => v.hash(state),
            Float64(v) => v.to_bits().hash(state),
            Bytes(v) => v.hash(state),
            Text(v) => v.hash(state),
            List(v) => v.hash(state),
            Map(v) => {
                // Order-independent: combine per-entry hashes with
                // wrapping addition so insertion order doesn't affect the
                // hash of an otherwise-equal map.
                let mut acc: u64 = 0;
                for (k, val) in v {
                    let mut h = std::collections::hash_map::DefaultHasher::new();
                    k.hash(&mut h);
                    val.hash(&mut h);
                    acc = acc.wrapping_add(h.finish());
                }
                acc.hash(state);
            }
            Set(v) => {
                let mut acc: u64 = 0;
                for item in v {
                    let mut h = std::collections::hash_map::DefaultHasher::new();
                    item.hash(&mut h);
                    acc = acc.wrapping_add(h.finish());
                }
                acc.hash(state);
            }
            DateTime(v) => v.hash(state),
            Duration(v) => v.hash(state),
            Uri(v) => v.hash(state),
            TypedArray(v) => format!("{:?}", v).hash(state),
            BoolBitList(v) => v.hash(state),
            ExtUnknown { ext_type, payload } => {
                ext_type.hash(state);
                payload.hash(state);
            }
        }
    }
}

macro_rules! impl_from_integer {
    ($t:ty) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int64(Integer::from(v))
            }
        }
    };
}
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);
impl_from_integer!(u64);
impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(i64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}
impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_eq_is_bitwise_not_ieee() {
        let nan = Value::Float64(f64::NAN);
        assert_eq!(nan, nan.clone());
    }

    #[test]
    fn roundtrip_eq_treats_nan_as_equal_to_nan() {
        let a = Value::Float64(f64::NAN);
        let b = Value::Float64(f64::NAN);
        assert!(a.roundtrip_eq(&b));
    }

    #[test]
    fn map_eq_is_order_independent() {
        let mut a = IndexMap::new();
        a.insert(Value::from("x"), Value::from(1i64));
        a.insert(Value::from("y"), Value::from(2i64));
        let mut b = IndexMap::new();
        b.insert(Value::from("y"), Value::from(2i64));
        b.insert(Value::from("x"), Value::from(1i64));
        assert_eq!(Value::Map(a), Value::Map(b));
    }
}
