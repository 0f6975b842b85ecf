//! `ValueRef<'a>`, the borrowing mirror of `Value` produced by zero-copy
//! decoding: `Text`/`Bytes` borrow the input buffer directly, and
//! `TypedArray` borrows it whenever alignment permits.
use std::hash::{Hash, Hasher};

use indexmap::{IndexMap, IndexSet};

use crate::bigint::BigInteger;
use crate::datetime::{DateTime, Duration};
use crate::integer::Integer;
use crate::typed_array::{BoolBitList, TypedArrayRef};
use crate::uri::Uri;
use crate::value::Value;

/// A value tree node borrowing from a decoder's input buffer wherever
/// possible. Convert to an owned `Value` with `to_owned()` when the
/// buffer's lifetime cannot be guaranteed to outlive the value.
#[derive(Clone, Debug)]
pub enum ValueRef<'a> {
    Null,
    Bool(bool),
    Int64(Integer),
    BigInteger(BigInteger),
    Float64(f64),
    Bytes(&'a [u8]),
    Text(&'a str),
    List(Vec<ValueRef<'a>>),
    Map(IndexMap<ValueRef<'a>, ValueRef<'a>>),
    Set(IndexSet<ValueRef<'a>>),
    DateTime(DateTime),
    Duration(Duration),
    Uri(Uri),
    TypedArray(TypedArrayRef<'a>),
    BoolBitList(BoolBitList),
    ExtUnknown { ext_type: u8, payload: &'a [u8] },
}

impl<'a> ValueRef<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, ValueRef::Null)
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ValueRef::Bool(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            ValueRef::Text(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            ValueRef::Bytes(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_map(&self) -> Option<&IndexMap<ValueRef<'a>, ValueRef<'a>>> {
        match self {
            ValueRef::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Copy every borrowed payload out, producing an owned `Value` that no
    /// longer depends on the decoder's input buffer.
    pub fn to_owned_value(&self) -> Value {
        match self {
            ValueRef::Null => Value::Null,
            ValueRef::Bool(v) => Value::Bool(*v),
            ValueRef::Int64(v) => Value::Int64(*v),
            ValueRef::BigInteger(v) => Value::BigInteger(v.clone()),
            ValueRef::Float64(v) => Value::Float64(*v),
            ValueRef::Bytes(v) => Value::Bytes(v.to_vec()),
            ValueRef::Text(v) => Value::Text(v.to_string()),
            ValueRef::List(v) => Value::List(v.iter().map(ValueRef::to_owned_value).collect()),
            ValueRef::Map(v) => {
                Value::Map(v.iter().map(|(k, val)| (k.to_owned_value(), val.to_owned_value())).collect())
            }
            ValueRef::Set(v) => Value::Set(v.iter().map(ValueRef::to_owned_value).collect()),
            ValueRef::DateTime(v) => Value::DateTime(*v),
            ValueRef::Duration(v) => Value::Duration(*v),
            ValueRef::Uri(v) => Value::Uri(v.clone()),
            ValueRef::TypedArray(v) => Value::TypedArray(v.to_owned_array()),
            ValueRef::BoolBitList(v) => Value::BoolBitList(v.clone()),
            ValueRef::ExtUnknown { ext_type, payload } => {
                Value::ExtUnknown { ext_type: *ext_type, payload: payload.to_vec() }
            }
        }
    }
}

impl<'a> PartialEq for ValueRef<'a> {
    fn eq(&self, other: &Self) -> bool {
        use ValueRef::*;
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
impl<'a> Eq for ValueRef<'a> {}

impl<'a> Hash for ValueRef<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        use ValueRef::*;
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

impl<'a> From<&'a Value> for ValueRef<'a> {
    fn from(v: &'a Value) -> Self {
        match v {
            Value::Null => ValueRef::Null,
            Value::Bool(b) => ValueRef::Bool(*b),
            Value::Int64(i) => ValueRef::Int64(*i),
            Value::BigInteger(b) => ValueRef::BigInteger(b.clone()),
            Value::Float64(f) => ValueRef::Float64(*f),
            Value::Bytes(b) => ValueRef::Bytes(b),
            Value::Text(s) => ValueRef::Text(s),
            Value::List(l) => ValueRef::List(l.iter().map(ValueRef::from).collect()),
            Value::Map(m) => ValueRef::Map(m.iter().map(|(k, v)| (ValueRef::from(k), ValueRef::from(v))).collect()),
            Value::Set(s) => ValueRef::Set(s.iter().map(ValueRef::from).collect()),
            Value::DateTime(d) => ValueRef::DateTime(*d),
            Value::Duration(d) => ValueRef::Duration(*d),
            Value::Uri(u) => ValueRef::Uri(u.clone()),
            Value::TypedArray(t) => ValueRef::TypedArray(t.clone().into()),
            Value::BoolBitList(b) => ValueRef::BoolBitList(b.clone()),
            Value::ExtUnknown { ext_type, payload } => ValueRef::ExtUnknown { ext_type: *ext_type, payload },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_owned_value_roundtrips_scalars() {
        let v = ValueRef::Text("hello");
        assert_eq!(v.to_owned_value(), Value::Text("hello".to_string()));
    }
}
