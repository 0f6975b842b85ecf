//! The Model Hook (§4.5, §9): the only extension point an end application
//! touches. A type that can present itself as a `Text -> Value` map
//! participates in encoding without the core knowing anything about it
//! beyond that capability.
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// Implemented by a type that can be encoded by first materializing it
/// into a text-keyed map. `Encoder` calls `to_model_map` and encodes the
/// result as an ordinary `Value::Map`; nothing about the concrete type
/// reaches the wire.
pub trait ToModel {
    fn to_model_map(&self) -> IndexMap<String, Value>;
}

/// The reverse path: the caller supplies a factory of this shape at the
/// decode call site, invoked with the decoded text-keyed map. A decoded
/// value that is not a text-keyed map fails with `type-mismatch` before
/// the factory is ever called.
pub trait FromModel: Sized {
    fn from_model_map(map: IndexMap<String, Value>) -> Result<Self>;
}

/// Decode `value` (expected to be `Value::Map` with every key `Text`) into
/// `T` via its `FromModel` factory. Fails with `type-mismatch` if the
/// decoded shape isn't a text-keyed map.
pub fn decode_model<T: FromModel>(value: Value) -> Result<T> {
    match value {
        Value::Map(map) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    Value::Text(s) => s,
                    other => {
                        return Err(Error::type_mismatch("Text key", value_type_name(&other)));
                    }
                };
                out.insert(key, v);
            }
            T::from_model_map(out)
        }
        other => Err(Error::type_mismatch("Map", value_type_name(&other))),
    }
}

/// Encode `model` into a `Value::Map` the rest of the encoder already
/// knows how to write.
pub fn encode_model<T: ToModel>(model: &T) -> Value {
    let map = model
        .to_model_map()
        .into_iter()
        .map(|(k, v)| (Value::Text(k), v))
        .collect();
    Value::Map(map)
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Int64(_) => "Int64",
        Value::BigInteger(_) => "BigInteger",
        Value::Float64(_) => "Float64",
        Value::Bytes(_) => "Bytes",
        Value::Text(_) => "Text",
        Value::List(_) => "List",
        Value::Map(_) => "Map",
        Value::Set(_) => "Set",
        Value::DateTime(_) => "DateTime",
        Value::Duration(_) => "Duration",
        Value::Uri(_) => "Uri",
        Value::TypedArray(_) => "TypedArray",
        Value::BoolBitList(_) => "BoolBitList",
        Value::ExtUnknown { .. } => "ExtUnknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
        y: i64,
    }

    impl ToModel for Point {
        fn to_model_map(&self) -> IndexMap<String, Value> {
            let mut m = IndexMap::new();
            m.insert("x".to_string(), Value::from(self.x));
            m.insert("y".to_string(), Value::from(self.y));
            m
        }
    }

    impl FromModel for Point {
        fn from_model_map(map: IndexMap<String, Value>) -> Result<Self> {
            let x = map.get("x").and_then(Value::as_int64).ok_or_else(|| Error::type_mismatch("Int64", "missing"))?;
            let y = map.get("y").and_then(Value::as_int64).ok_or_else(|| Error::type_mismatch("Int64", "missing"))?;
            Ok(Point { x: x.as_i64().unwrap(), y: y.as_i64().unwrap() })
        }
    }

    #[test]
    fn model_hook_roundtrips() {
        let p = Point { x: 1, y: 2 };
        let encoded = encode_model(&p);
        let decoded: Point = decode_model(encoded).unwrap();
        assert_eq!(decoded.x, 1);
        assert_eq!(decoded.y, 2);
    }

    #[test]
    fn model_hook_rejects_non_map() {
        let result: Result<Point> = decode_model(Value::Null);
        assert!(result.is_err());
    }
}
