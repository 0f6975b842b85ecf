//! The encoder: polymorphic dispatch, adaptive size-class selection, the
//! numeric-list promotion heuristic, and the ASCII-fast-path/opaque-bytes
//! rollback machinery (§4.2).
use byteorder::{BigEndian, WriteBytesExt};
use indexmap::{IndexMap, IndexSet};

use crate::bigint::BigInteger;
use crate::config::Config;
use crate::depth_tracking::DepthTracker;
use crate::error::{Error, Result};
use crate::integer::Integer;
use crate::marker::{ExtType, Marker};
use crate::numeric::IntInteropMode;
use crate::typed_array::{alignment_for, padding_for, BoolBitList, TypedArray};
use crate::value::Value;

/// Encodes a `Value` tree into the wire format described in §4.1. Owns a
/// growable output buffer that is reused across calls to `pack` via
/// `reset`; two concurrent callers must use two `Encoder`s (§5).
pub struct Encoder {
    buf: Vec<u8>,
    config: Config,
    depth: DepthTracker,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let buf = Vec::with_capacity(config.initial_capacity);
        let depth = DepthTracker::new(config.max_depth);
        Self { buf, config, depth }
    }

    /// Replace the configuration and clear the buffer, as if freshly
    /// constructed with `with_config`.
    pub fn set_config(&mut self, config: Config) {
        self.depth = DepthTracker::new(config.max_depth);
        self.config = config;
        self.buf.clear();
    }

    /// Clear the output buffer without releasing its capacity. Does not
    /// change the configuration.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.depth = DepthTracker::new(self.config.max_depth);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resets the buffer, encodes `value`, and returns a slice into the
    /// internal buffer. The slice is only valid until the next call to
    /// `pack` or `reset`; callers who need an owned, exactly-sized buffer
    /// should use `pack_trimmed` instead.
    pub fn pack(&mut self, value: &Value) -> Result<&[u8]> {
        let _span = tracing::trace_span!("fog_wire::pack").entered();
        self.reset();
        self.encode_value(value)?;
        Ok(&self.buf)
    }

    /// Like `pack`, but consumes the encoder's work into a freshly
    /// allocated, exactly-sized `Vec<u8>`. Any zero-copy views a caller
    /// might have produced from a *previous* `pack` on this encoder are
    /// unaffected, since this allocates a new buffer rather than shrinking
    /// the existing one in place.
    pub fn pack_trimmed(&mut self, value: &Value) -> Result<Vec<u8>> {
        self.pack(value)?;
        Ok(self.buf.clone())
    }

    fn encode_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.buf.push(Marker::Null.into()),
            Value::Bool(b) => self.buf.push(if *b { Marker::True.into() } else { Marker::False.into() }),
            Value::Int64(i) => self.encode_integer(*i)?,
            Value::BigInteger(b) => self.encode_big_integer(b, ExtType::BigInt)?,
            Value::Float64(f) => self.encode_float(*f),
            Value::Bytes(b) => self.encode_binary(b)?,
            Value::Text(s) => self.encode_str(s)?,
            Value::TypedArray(t) => self.encode_typed_array(t)?,
            Value::BoolBitList(b) => self.encode_bool_bit_list(b)?,
            Value::DateTime(d) => self.encode_ext_fixed(ExtType::DateTime, &d.to_wire_bytes())?,
            Value::Duration(d) => self.encode_ext_fixed(ExtType::Duration, &d.to_wire_bytes())?,
            Value::Uri(u) => self.encode_uri(u)?,
            Value::Set(s) => self.encode_set(s)?,
            Value::Map(m) => self.encode_map(m)?,
            Value::List(l) => self.encode_list(l)?,
            Value::ExtUnknown { ext_type, payload } => self.encode_ext_unknown(*ext_type, payload)?,
        }
        Ok(())
    }

    // ---- integers ----

    fn encode_integer(&mut self, i: Integer) -> Result<()> {
        match self.config.int_interop_mode {
            IntInteropMode::Off => {
                self.write_native_int(i);
            }
            IntInteropMode::PromoteWideToBigInt => {
                if i.in_safe_window() {
                    self.write_native_int(i);
                } else {
                    let big = BigInteger::from(i);
                    self.encode_big_integer(&big, ExtType::WideInt)?;
                }
            }
            IntInteropMode::RequireBigIntForWide => {
                if i.in_safe_window() {
                    self.write_native_int(i);
                } else {
                    return Err(Error::unsupported_type(format!(
                        "integer {} is outside the safe window and intInteropMode is requireBigIntForWide; pass a BigInteger explicitly",
                        i
                    )));
                }
            }
        }
        Ok(())
    }

    /// Tightest fixed-width encoding for a host integer, ignoring interop
    /// policy (the caller has already decided this value may go out as a
    /// native int).
    fn write_native_int(&mut self, i: Integer) {
        if i.is_non_negative() {
            let v = i.as_u64().expect("non-negative Integer always fits u64");
            if v <= 0x7F {
                self.buf.push(Marker::PosFixInt(v as u8).into());
            } else if v <= u8::MAX as u64 {
                self.buf.push(Marker::UInt8.into());
                self.buf.push(v as u8);
            } else if v <= u16::MAX as u64 {
                self.buf.push(Marker::UInt16.into());
                self.buf.write_u16::<BigEndian>(v as u16).unwrap();
            } else if v <= u32::MAX as u64 {
                self.buf.push(Marker::UInt32.into());
                self.buf.write_u32::<BigEndian>(v as u32).unwrap();
            } else {
                self.buf.push(Marker::UInt64.into());
                self.buf.write_u64::<BigEndian>(v).unwrap();
            }
        } else {
            let v = i.as_i64().expect("negative Integer always fits i64");
            if v >= -32 {
                self.buf.push(Marker::NegFixInt(v as i8).into());
            } else if v >= i8::MIN as i64 {
                self.buf.push(Marker::Int8.into());
                self.buf.push(v as i8 as u8);
            } else if v >= i16::MIN as i64 {
                self.buf.push(Marker::Int16.into());
                self.buf.write_i16::<BigEndian>(v as i16).unwrap();
            } else if v >= i32::MIN as i64 {
                self.buf.push(Marker::Int32.into());
                self.buf.write_i32::<BigEndian>(v as i32).unwrap();
            } else {
                self.buf.push(Marker::Int64.into());
                self.buf.write_i64::<BigEndian>(v).unwrap();
            }
        }
    }

    fn encode_big_integer(&mut self, b: &BigInteger, ext_type: ExtType) -> Result<()> {
        let payload = b.to_wire_bytes();
        let magnitude_len = payload.len() - 1;
        if magnitude_len > self.config.max_big_int_magnitude_bytes {
            return Err(Error::limit_exceeded(
                "maxBigIntMagnitudeBytes",
                self.config.max_big_int_magnitude_bytes as u64,
                magnitude_len as u64,
            ));
        }
        self.write_ext_variable(ext_type, &payload)
    }

    // ---- floats ----

    fn encode_float(&mut self, f: f64) {
        if self.config.prefer_float32 && !f.is_nan() {
            let narrowed = f as f32;
            if narrowed as f64 == f {
                self.buf.push(Marker::F32.into());
                self.buf.write_f32::<BigEndian>(narrowed).unwrap();
                return;
            }
        }
        self.buf.push(Marker::F64.into());
        self.buf.write_f64::<BigEndian>(f).unwrap();
    }

    // ---- strings: ASCII fast path with rollback ----

    fn encode_str(&mut self, s: &str) -> Result<()> {
        if s.len() as u64 > self.config.max_string_utf8_bytes as u64 {
            return Err(Error::limit_exceeded("maxStringUtf8Bytes", self.config.max_string_utf8_bytes as u64, s.len() as u64));
        }
        let mark = self.buf.len();
        // Optimistically assume the code-unit count equals the eventual
        // UTF-8 byte length (true for ASCII) and write the string header
        // and bytes in one pass.
        self.write_str_header(s.len());
        let mut all_ascii = true;
        for b in s.bytes() {
            if b > 0x7F {
                all_ascii = false;
                break;
            }
            self.buf.push(b);
        }
        if !all_ascii {
            tracing::trace!(offset = mark, "encode_str: non-ASCII byte found, rolling back to re-encode");
            self.buf.truncate(mark);
            self.write_str_header(s.len());
            self.buf.extend_from_slice(s.as_bytes());
        }
        Ok(())
    }

    fn write_str_header(&mut self, byte_len: usize) {
        if byte_len <= 0x1F {
            self.buf.push(Marker::FixStr(byte_len as u8).into());
        } else if byte_len <= u8::MAX as usize {
            self.buf.push(Marker::Str8.into());
            self.buf.push(byte_len as u8);
        } else if byte_len <= u16::MAX as usize {
            self.buf.push(Marker::Str16.into());
            self.buf.write_u16::<BigEndian>(byte_len as u16).unwrap();
        } else {
            self.buf.push(Marker::Str32.into());
            self.buf.write_u32::<BigEndian>(byte_len as u32).unwrap();
        }
    }

    // ---- binary ----

    fn encode_binary(&mut self, b: &[u8]) -> Result<()> {
        if b.len() as u64 > self.config.max_binary_bytes as u64 {
            return Err(Error::limit_exceeded("maxBinaryBytes", self.config.max_binary_bytes as u64, b.len() as u64));
        }
        self.write_bin_header(b.len());
        self.buf.extend_from_slice(b);
        Ok(())
    }

    fn write_bin_header(&mut self, len: usize) {
        if len <= u8::MAX as usize {
            self.buf.push(Marker::Bin8.into());
            self.buf.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.buf.push(Marker::Bin16.into());
            self.buf.write_u16::<BigEndian>(len as u16).unwrap();
        } else {
            self.buf.push(Marker::Bin32.into());
            self.buf.write_u32::<BigEndian>(len as u32).unwrap();
        }
    }

    // ---- ext framing helpers ----

    /// Writes the ext-family marker/length for `payload` (which does not
    /// include the ext-type byte), followed by the ext-type byte and the
    /// payload itself. Per §4.1, the ext length field reports only the
    /// bytes *after* the ext-type byte -- `payload.len()`, not
    /// `payload.len() + 1` -- matching `write_typed_array_header`'s
    /// treatment of the count/pad/data region.
    fn write_ext_variable(&mut self, ext_type: ExtType, payload: &[u8]) -> Result<()> {
        let total = payload.len() + 1;
        if total as u64 > self.config.max_ext_payload_bytes as u64 {
            return Err(Error::limit_exceeded("maxExtPayloadBytes", self.config.max_ext_payload_bytes as u64, total as u64));
        }
        Marker::encode_ext_marker(&mut self.buf, payload.len());
        self.buf.push(ext_type.into());
        self.buf.extend_from_slice(payload);
        Ok(())
    }

    fn encode_ext_fixed(&mut self, ext_type: ExtType, payload: &[u8]) -> Result<()> {
        self.write_ext_variable(ext_type, payload)
    }

    fn encode_ext_unknown(&mut self, ext_type: u8, payload: &[u8]) -> Result<()> {
        self.write_ext_variable(ExtType::Unknown(ext_type), payload)
    }

    fn encode_uri(&mut self, u: &crate::uri::Uri) -> Result<()> {
        let text = u.as_str();
        if text.len() as u64 > self.config.max_uri_utf8_bytes as u64 {
            return Err(Error::limit_exceeded("maxUriUtf8Bytes", self.config.max_uri_utf8_bytes as u64, text.len() as u64));
        }
        self.write_ext_variable(ExtType::Uri, text.as_bytes())
    }

    // ---- typed arrays & bool bit lists ----

    fn encode_typed_array(&mut self, t: &TypedArray) -> Result<()> {
        let element_size = t.element_size();
        let align = alignment_for(element_size);
        let data_len = t.len() * element_size;
        let pad = self.write_typed_array_header(t.ext_type(), t.len(), align, data_len)?;
        self.buf.extend(std::iter::repeat(0u8).take(pad));
        write_typed_array_data(&mut self.buf, t);
        Ok(())
    }

    /// Writes the ext-family marker/length, ext-type byte, u32 count field,
    /// selecting the smallest ext class whose length field covers
    /// `4 + pad + data_len` once the header's own width is accounted for
    /// (§4.1's padding formula, computed per candidate class since the
    /// header length -- and therefore the padding -- depends on which
    /// class is chosen). Returns the pad byte count so the caller can
    /// write it.
    fn write_typed_array_header(&mut self, ext_type: ExtType, count: usize, align: usize, data_len: usize) -> Result<usize> {
        // (marker_len, length_field_width, max_len)
        const CLASSES: [(usize, u64); 3] = [(1, u8::MAX as u64), (2, u16::MAX as u64), (4, u32::MAX as u64)];
        for (len_width, max_len) in CLASSES {
            let header_len = self.buf.len() + 1 /* ext marker */ + len_width + 1 /* ext type */ + 4 /* count */;
            let pad = padding_for(header_len, align);
            let payload_len = 4 + pad + data_len;
            if payload_len as u64 <= max_len {
                if (payload_len + 1) as u64 > self.config.max_ext_payload_bytes as u64 {
                    return Err(Error::limit_exceeded(
                        "maxExtPayloadBytes",
                        self.config.max_ext_payload_bytes as u64,
                        (payload_len + 1) as u64,
                    ));
                }
                match len_width {
                    1 => {
                        self.buf.push(Marker::Ext8.into());
                        self.buf.push(payload_len as u8);
                    }
                    2 => {
                        self.buf.push(Marker::Ext16.into());
                        self.buf.write_u16::<BigEndian>(payload_len as u16).unwrap();
                    }
                    _ => {
                        self.buf.push(Marker::Ext32.into());
                        self.buf.write_u32::<BigEndian>(payload_len as u32).unwrap();
                    }
                }
                self.buf.push(ext_type.into());
                self.buf.write_u32::<BigEndian>(count as u32).unwrap();
                return Ok(pad);
            }
        }
        unreachable!("ext32's u32 length field always admits any in-memory payload");
    }

    fn encode_bool_bit_list(&mut self, b: &BoolBitList) -> Result<()> {
        let payload_len = 4 + b.as_bytes().len();
        let total = payload_len + 1;
        if total as u64 > self.config.max_ext_payload_bytes as u64 {
            return Err(Error::limit_exceeded("maxExtPayloadBytes", self.config.max_ext_payload_bytes as u64, total as u64));
        }
        Marker::encode_ext_marker(&mut self.buf, payload_len);
        self.buf.push(ExtType::BoolList.into());
        self.buf.write_u32::<BigEndian>(b.len() as u32).unwrap();
        self.buf.extend_from_slice(b.as_bytes());
        Ok(())
    }

    // ---- collections ----

    fn encode_list(&mut self, values: &[Value]) -> Result<()> {
        if let Some(promoted) = promote_numeric_list(values, &self.config) {
            return self.encode_promoted(promoted);
        }
        if values.len() as u64 > self.config.max_array_length as u64 {
            return Err(Error::limit_exceeded("maxArrayLength", self.config.max_array_length as u64, values.len() as u64));
        }
        self.write_array_header(values.len());
        self.depth.enter()?;
        for v in values {
            self.encode_value(v)?;
        }
        self.depth.exit();
        Ok(())
    }

    fn write_array_header(&mut self, len: usize) {
        if len <= 0x0F {
            self.buf.push(Marker::FixArray(len as u8).into());
        } else if len <= u16::MAX as usize {
            self.buf.push(Marker::Array16.into());
            self.buf.write_u16::<BigEndian>(len as u16).unwrap();
        } else {
            self.buf.push(Marker::Array32.into());
            self.buf.write_u32::<BigEndian>(len as u32).unwrap();
        }
    }

    fn encode_promoted(&mut self, promoted: Promoted) -> Result<()> {
        match promoted {
            Promoted::OpaqueBytes(bytes) => self.encode_binary(&bytes),
            Promoted::Typed(t) => self.encode_typed_array(&t),
            Promoted::Bools(list) => self.encode_bool_bit_list(&list),
        }
    }

    fn encode_map(&mut self, m: &IndexMap<Value, Value>) -> Result<()> {
        if m.len() as u64 > self.config.max_map_length as u64 {
            return Err(Error::limit_exceeded("maxMapLength", self.config.max_map_length as u64, m.len() as u64));
        }
        self.write_map_header(m.len());
        self.depth.enter()?;
        let all_text_keys = m.keys().all(|k| matches!(k, Value::Text(_)));
        if all_text_keys && self.config.deterministic_maps {
            let mut entries: Vec<(&str, &Value)> = m
                .iter()
                .map(|(k, v)| match k {
                    Value::Text(s) => (s.as_str(), v),
                    _ => unreachable!("all_text_keys checked above"),
                })
                .collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            for (k, v) in entries {
                self.encode_str(k)?;
                self.encode_value(v)?;
            }
        } else {
            for (k, v) in m {
                self.encode_value(k)?;
                self.encode_value(v)?;
            }
        }
        self.depth.exit();
        Ok(())
    }

    fn write_map_header(&mut self, len: usize) {
        if len <= 0x0F {
            self.buf.push(Marker::FixMap(len as u8).into());
        } else if len <= u16::MAX as usize {
            self.buf.push(Marker::Map16.into());
            self.buf.write_u16::<BigEndian>(len as u16).unwrap();
        } else {
            self.buf.push(Marker::Map32.into());
            self.buf.write_u32::<BigEndian>(len as u32).unwrap();
        }
    }

    /// Sets are always carried via the `set` ext type, whose length isn't
    /// known until every element has been encoded -- so the ext length
    /// field is written as a placeholder and patched after the fact.
    fn encode_set(&mut self, s: &IndexSet<Value>) -> Result<()> {
        let mark = self.buf.len();
        // Reserve worst-case ext32 header; patched/shrunk below.
        self.buf.push(Marker::Ext32.into());
        self.buf.write_u32::<BigEndian>(0).unwrap();
        self.buf.push(ExtType::Set.into());
        self.buf.write_u32::<BigEndian>(s.len() as u32).unwrap();
        self.depth.enter()?;
        for v in s {
            self.encode_value(v)?;
        }
        self.depth.exit();

        // `body` is [ext-type byte, count, elements...]. The ext length
        // field reports only what follows the ext-type byte (§4.1), so it
        // is `body.len() - 1`; `body.len()` itself (type byte included) is
        // what `maxExtPayloadBytes` caps.
        let body: Vec<u8> = self.buf.split_off(mark + 5);
        self.buf.truncate(mark);
        if body.len() as u64 > self.config.max_ext_payload_bytes as u64 {
            return Err(Error::limit_exceeded("maxExtPayloadBytes", self.config.max_ext_payload_bytes as u64, body.len() as u64));
        }
        Marker::encode_ext_marker(&mut self.buf, body.len() - 1);
        self.buf.extend_from_slice(&body);
        Ok(())
    }
}

enum Promoted {
    OpaqueBytes(Vec<u8>),
    Typed(TypedArray),
    Bools(BoolBitList),
}

/// The numeric-list promotion heuristic (§4.2): a generic `List` of
/// integers, floats, or bools is instead emitted as a typed array (or, for
/// small non-negative byte-valued lists, the even more compact opaque-bytes
/// path) when every element uniformly fits one of the wire's numeric
/// kinds. Implemented as a single classification pass over the
/// already-materialized `Vec<Value>` -- unlike the source language's lazy
/// `Iterable`, a Rust `Value::List` has no incremental-write-then-rewind
/// need since the whole slice is available up front; the resulting wire
/// bytes are identical to what a byte-level rollback would produce.
fn promote_numeric_list(values: &[Value], config: &Config) -> Option<Promoted> {
    if values.len() < config.numeric_list_promotion_min_length {
        return None;
    }
    if values.iter().all(|v| matches!(v, Value::Bool(_))) {
        let bools: Vec<bool> = values.iter().map(|v| v.as_bool().unwrap()).collect();
        return Some(Promoted::Bools(BoolBitList::from_bools(&bools)));
    }
    if values.iter().all(|v| matches!(v, Value::Int64(_))) {
        return promote_integer_list(values, config);
    }
    if values.iter().all(|v| matches!(v, Value::Float64(_))) {
        let floats: Vec<f64> = values.iter().map(|v| v.as_float64().unwrap()).collect();
        if config.prefer_float32 && floats.iter().all(|f| (*f as f32) as f64 == *f) {
            return Some(Promoted::Typed(TypedArray::Float32(floats.iter().map(|f| *f as f32).collect())));
        }
        return Some(Promoted::Typed(TypedArray::Float64(floats)));
    }
    None
}

fn promote_integer_list(values: &[Value], config: &Config) -> Option<Promoted> {
    let ints: Vec<Integer> = values.iter().map(|v| v.as_int64().unwrap()).collect();

    if config.int_interop_mode == IntInteropMode::RequireBigIntForWide && ints.iter().any(|i| !i.in_safe_window()) {
        return None;
    }

    if ints.iter().all(|i| i.is_non_negative() && i.as_u64().unwrap() <= u8::MAX as u64) {
        return Some(Promoted::OpaqueBytes(ints.iter().map(|i| i.as_u64().unwrap() as u8).collect()));
    }

    let fits = |pred: &dyn Fn(i128) -> bool| ints.iter().all(|i| pred(i.as_i64().map(|v| v as i128).unwrap_or_else(|| i.as_u64().unwrap() as i128)));

    if fits(&|v| (-128..=127).contains(&v)) {
        return Some(Promoted::Typed(TypedArray::Int8(ints.iter().map(|i| signed_i128(i) as i8).collect())));
    }
    if fits(&|v| (0..=u16::MAX as i128).contains(&v)) {
        return Some(Promoted::Typed(TypedArray::Uint16(ints.iter().map(|i| signed_i128(i) as u16).collect())));
    }
    if fits(&|v| (i16::MIN as i128..=i16::MAX as i128).contains(&v)) {
        return Some(Promoted::Typed(TypedArray::Int16(ints.iter().map(|i| signed_i128(i) as i16).collect())));
    }
    if fits(&|v| (0..=u32::MAX as i128).contains(&v)) {
        return Some(Promoted::Typed(TypedArray::Uint32(ints.iter().map(|i| signed_i128(i) as u32).collect())));
    }
    if fits(&|v| (i32::MIN as i128..=i32::MAX as i128).contains(&v)) {
        return Some(Promoted::Typed(TypedArray::Int32(ints.iter().map(|i| signed_i128(i) as i32).collect())));
    }
    if ints.iter().all(|i| i.is_non_negative()) {
        return Some(Promoted::Typed(TypedArray::Uint64(ints.iter().map(|i| i.as_u64().unwrap()).collect())));
    }
    Some(Promoted::Typed(TypedArray::Int64(ints.iter().map(|i| i.as_i64().unwrap()).collect())))
}

fn signed_i128(i: &Integer) -> i128 {
    i.as_i64().map(|v| v as i128).unwrap_or_else(|| i.as_u64().unwrap() as i128)
}

fn write_typed_array_data(buf: &mut Vec<u8>, t: &TypedArray) {
    match t {
        TypedArray::Int8(v) => buf.extend(v.iter().map(|x| *x as u8)),
        TypedArray::Uint16(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_ne_bytes())),
        TypedArray::Int16(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_ne_bytes())),
        TypedArray::Uint32(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_ne_bytes())),
        TypedArray::Int32(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_ne_bytes())),
        TypedArray::Uint64(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_ne_bytes())),
        TypedArray::Int64(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_ne_bytes())),
        TypedArray::Float32(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_ne_bytes())),
        TypedArray::Float64(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_ne_bytes())),
    }
}

/// One-shot convenience matching §6's minimum library surface:
/// `pack(value, config?, trimOnFinish?) -> bytes`. Always returns an
/// owned, exactly-sized buffer (there is no internal buffer to reuse for
/// a one-shot call).
pub fn pack(value: &Value, config: Option<Config>) -> Result<Vec<u8>> {
    let mut encoder = Encoder::with_config(config.unwrap_or_default());
    encoder.pack(value)?;
    Ok(encoder.buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn scenario_a_pack_42() {
        let bytes = pack(&Value::from(42i64), None).unwrap();
        assert_eq!(bytes, vec![0x2A]);
    }

    #[test]
    fn scenario_b_pack_hello() {
        let bytes = pack(&Value::from("Hello"), None).unwrap();
        assert_eq!(bytes, vec![0xA5, b'H', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn scenario_c_uint8_list_goes_opaque_bytes() {
        let list = Value::List((1..=8).map(Value::from).collect());
        let bytes = pack(&list, None).unwrap();
        assert_eq!(bytes, vec![0xC4, 0x08, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn scenario_d_deterministic_map_sorts_by_key() {
        let config = Config::new().deterministic_maps(true);
        let mut a = IndexMap::new();
        a.insert(Value::from("a"), Value::from(1i64));
        a.insert(Value::from("b"), Value::from(2i64));
        let mut b = IndexMap::new();
        b.insert(Value::from("b"), Value::from(2i64));
        b.insert(Value::from("a"), Value::from(1i64));

        let bytes_a = pack(&Value::Map(a), Some(config.clone())).unwrap();
        let bytes_b = pack(&Value::Map(b), Some(config)).unwrap();
        assert_eq!(bytes_a, bytes_b);
        assert_eq!(bytes_a, vec![0x82, 0xA1, b'a', 0x01, 0xA1, b'b', 0x02]);
    }

    #[test]
    fn non_deterministic_maps_preserve_insertion_order_bytes() {
        let mut a = IndexMap::new();
        a.insert(Value::from("a"), Value::from(1i64));
        a.insert(Value::from("b"), Value::from(2i64));
        let mut b = IndexMap::new();
        b.insert(Value::from("b"), Value::from(2i64));
        b.insert(Value::from("a"), Value::from(1i64));

        let bytes_a = pack(&Value::Map(a), None).unwrap();
        let bytes_b = pack(&Value::Map(b), None).unwrap();
        assert_ne!(bytes_a, bytes_b);
    }

    #[test]
    fn scenario_f_datetime_ext8() {
        let dt = crate::datetime::DateTime::new(1_696_075_200_000_000, true);
        let bytes = pack(&Value::DateTime(dt), None).unwrap();
        assert_eq!(bytes[0], 0xC7); // ext8
        assert_eq!(bytes[1], 9); // payload length
        assert_eq!(bytes[2], 0x07); // dateTime ext type
        assert_eq!(bytes[3], 0x01); // utc flag
    }

    #[test]
    fn require_bigint_for_wide_rejects_wide_native_int() {
        let config = Config::new().int_interop_mode(IntInteropMode::RequireBigIntForWide);
        let v = Value::from(1i64 << 60);
        assert!(pack(&v, Some(config)).is_err());
    }

    #[test]
    fn promote_wide_to_bigint_roundtrips_via_wideint_ext() {
        let config = Config::new().int_interop_mode(IntInteropMode::PromoteWideToBigInt);
        let v = Value::from(1i64 << 60);
        let bytes = pack(&v, Some(config)).unwrap();
        // ext8, 1-byte ext-type, wideInt tag
        assert_eq!(bytes[0], 0xC7);
        assert_eq!(bytes[2], ExtType::WideInt.into_u8());
    }

    #[test]
    fn off_mode_roundtrips_wide_int_natively() {
        let v = Value::from(1i64 << 60);
        let bytes = pack(&v, None).unwrap();
        assert_eq!(bytes[0], Marker::UInt64.into_u8());
    }

    #[test]
    fn max_depth_rejects_deep_nesting() {
        let config = Config::new().max_depth(1);
        let nested = Value::List(vec![Value::List(vec![Value::List(vec![Value::from("x")])])]);
        assert!(pack(&nested, Some(config)).is_err());
    }

    #[test]
    fn cap_enforcement_limit_exceeded() {
        let config = Config::new().max_string_utf8_bytes(2);
        assert!(pack(&Value::from("abc"), Some(config)).is_err());
    }

    #[test]
    fn bigint_zero_encodes_with_empty_magnitude() {
        let bytes = pack(&Value::BigInteger(BigInteger::zero()), None).unwrap();
        // ext8 (canonical form, never fixext -- see DESIGN.md), length 1
        // (the sign byte; the length field excludes the ext-type byte
        // itself), bigInt tag, sign byte.
        assert_eq!(bytes, vec![0xC7, 0x01, ExtType::BigInt.into_u8(), 0x00]);
    }
}
