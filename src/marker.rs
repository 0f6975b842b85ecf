//! The wire-format prefix taxonomy and the ext-type registry.

/// Wire format markers. For internal use only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    PosFixInt(u8),
    FixMap(u8),
    FixArray(u8),
    FixStr(u8),
    Null,
    /// `0xC1`, reserved. The decoder must fail on this prefix.
    Reserved,
    False,
    True,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    F32,
    F64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
    NegFixInt(i8),
}

impl Marker {
    /// Construct a marker from a single prefix byte.
    pub fn from_u8(n: u8) -> Marker {
        match n {
            0x00..=0x7f => Marker::PosFixInt(n),
            0x80..=0x8f => Marker::FixMap(n & 0x0F),
            0x90..=0x9f => Marker::FixArray(n & 0x0F),
            0xa0..=0xbf => Marker::FixStr(n & 0x1F),
            0xc0 => Marker::Null,
            0xc1 => Marker::Reserved,
            0xc2 => Marker::False,
            0xc3 => Marker::True,
            0xc4 => Marker::Bin8,
            0xc5 => Marker::Bin16,
            0xc6 => Marker::Bin32,
            0xc7 => Marker::Ext8,
            0xc8 => Marker::Ext16,
            0xc9 => Marker::Ext32,
            0xca => Marker::F32,
            0xcb => Marker::F64,
            0xcc => Marker::UInt8,
            0xcd => Marker::UInt16,
            0xce => Marker::UInt32,
            0xcf => Marker::UInt64,
            0xd0 => Marker::Int8,
            0xd1 => Marker::Int16,
            0xd2 => Marker::Int32,
            0xd3 => Marker::Int64,
            0xd4 => Marker::FixExt1,
            0xd5 => Marker::FixExt2,
            0xd6 => Marker::FixExt4,
            0xd7 => Marker::FixExt8,
            0xd8 => Marker::FixExt16,
            0xd9 => Marker::Str8,
            0xda => Marker::Str16,
            0xdb => Marker::Str32,
            0xdc => Marker::Array16,
            0xdd => Marker::Array32,
            0xde => Marker::Map16,
            0xdf => Marker::Map32,
            0xe0..=0xff => Marker::NegFixInt(n as i8),
        }
    }

    /// Converts a marker back into its single-byte representation. Assumes
    /// the content of the marker (fixint value, fix-family length) is
    /// already masked appropriately by the caller.
    pub fn into_u8(self) -> u8 {
        match self {
            Marker::PosFixInt(val) => val,
            Marker::FixMap(len) => 0x80 | len,
            Marker::FixArray(len) => 0x90 | len,
            Marker::FixStr(len) => 0xa0 | len,
            Marker::Null => 0xc0,
            Marker::Reserved => 0xc1,
            Marker::False => 0xc2,
            Marker::True => 0xc3,
            Marker::Bin8 => 0xc4,
            Marker::Bin16 => 0xc5,
            Marker::Bin32 => 0xc6,
            Marker::Ext8 => 0xc7,
            Marker::Ext16 => 0xc8,
            Marker::Ext32 => 0xc9,
            Marker::F32 => 0xca,
            Marker::F64 => 0xcb,
            Marker::UInt8 => 0xcc,
            Marker::UInt16 => 0xcd,
            Marker::UInt32 => 0xce,
            Marker::UInt64 => 0xcf,
            Marker::Int8 => 0xd0,
            Marker::Int16 => 0xd1,
            Marker::Int32 => 0xd2,
            Marker::Int64 => 0xd3,
            Marker::FixExt1 => 0xd4,
            Marker::FixExt2 => 0xd5,
            Marker::FixExt4 => 0xd6,
            Marker::FixExt8 => 0xd7,
            Marker::FixExt16 => 0xd8,
            Marker::Str8 => 0xd9,
            Marker::Str16 => 0xda,
            Marker::Str32 => 0xdb,
            Marker::Array16 => 0xdc,
            Marker::Array32 => 0xdd,
            Marker::Map16 => 0xde,
            Marker::Map32 => 0xdf,
            Marker::NegFixInt(val) => val as u8,
        }
    }

    /// Write the smallest ext-family header (Ext8/16/32, or fixext if `len`
    /// is one of the fixed sizes and `allow_fixext` is set) for a payload of
    /// `len` bytes (ext-type byte included in `len`).
    pub fn encode_ext_marker(buf: &mut Vec<u8>, len: usize) {
        use byteorder::{BigEndian, WriteBytesExt};
        if len <= u8::MAX as usize {
            buf.push(Marker::Ext8.into());
            buf.push(len as u8);
        } else if len <= u16::MAX as usize {
            buf.push(Marker::Ext16.into());
            buf.write_u16::<BigEndian>(len as u16).expect("write to Vec always succeeds");
        } else {
            buf.push(Marker::Ext32.into());
            buf.write_u32::<BigEndian>(len as u32).expect("write to Vec always succeeds");
        }
    }

    /// `true` if this marker's byte range is part of the string family
    /// (fixstr, str8/16/32) -- used by the decoder's map string-keyed fast
    /// path to peek a key's prefix without consuming it.
    pub fn is_str_prefix(self) -> bool {
        matches!(self, Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32)
    }
}

impl From<u8> for Marker {
    fn from(val: u8) -> Marker {
        Marker::from_u8(val)
    }
}

impl From<Marker> for u8 {
    fn from(val: Marker) -> u8 {
        val.into_u8()
    }
}

/// The stable ext-type byte registry. Once assigned, a byte's semantics
/// never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtType {
    BigInt,
    Duration,
    WideInt,
    BoolList,
    Uri,
    Set,
    DateTime,
    Int8List,
    Uint16List,
    Int16List,
    Uint32List,
    Int32List,
    Uint64List,
    Int64List,
    Float32List,
    Float64List,
    /// Not part of the registry: carries any ext-type byte this decoder
    /// does not recognize, so it can round-trip as `Value::ExtUnknown`.
    Unknown(u8),
}

impl ExtType {
    pub fn into_u8(self) -> u8 {
        match self {
            ExtType::BigInt => 0x01,
            ExtType::Duration => 0x02,
            ExtType::WideInt => 0x03,
            ExtType::BoolList => 0x04,
            ExtType::Uri => 0x05,
            ExtType::Set => 0x06,
            ExtType::DateTime => 0x07,
            ExtType::Int8List => 0x10,
            ExtType::Uint16List => 0x11,
            ExtType::Int16List => 0x12,
            ExtType::Uint32List => 0x13,
            ExtType::Int32List => 0x14,
            ExtType::Uint64List => 0x15,
            ExtType::Int64List => 0x16,
            ExtType::Float32List => 0x17,
            ExtType::Float64List => 0x18,
            ExtType::Unknown(b) => b,
        }
    }

    pub fn from_u8(v: u8) -> ExtType {
        match v {
            0x01 => ExtType::BigInt,
            0x02 => ExtType::Duration,
            0x03 => ExtType::WideInt,
            0x04 => ExtType::BoolList,
            0x05 => ExtType::Uri,
            0x06 => ExtType::Set,
            0x07 => ExtType::DateTime,
            0x10 => ExtType::Int8List,
            0x11 => ExtType::Uint16List,
            0x12 => ExtType::Int16List,
            0x13 => ExtType::Uint32List,
            0x14 => ExtType::Int32List,
            0x15 => ExtType::Uint64List,
            0x16 => ExtType::Int64List,
            0x17 => ExtType::Float32List,
            0x18 => ExtType::Float64List,
            other => ExtType::Unknown(other),
        }
    }
}

impl From<ExtType> for u8 {
    fn from(val: ExtType) -> u8 {
        val.into_u8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_roundtrip() {
        for b in 0u16..=255 {
            let b = b as u8;
            let m = Marker::from_u8(b);
            match m {
                Marker::PosFixInt(_) | Marker::FixMap(_) | Marker::FixArray(_) | Marker::FixStr(_) | Marker::NegFixInt(_) => {
                    assert_eq!(m.into_u8(), b);
                }
                _ => assert_eq!(m.into_u8(), b, "marker {:?} for byte 0x{:02X}", m, b),
            }
        }
    }

    #[test]
    fn reserved_is_0xc1() {
        assert_eq!(Marker::from_u8(0xc1), Marker::Reserved);
    }

    #[test]
    fn ext_type_registry_roundtrip() {
        let kinds = [
            ExtType::BigInt,
            ExtType::Duration,
            ExtType::WideInt,
            ExtType::BoolList,
            ExtType::Uri,
            ExtType::Set,
            ExtType::DateTime,
            ExtType::Int8List,
            ExtType::Uint16List,
            ExtType::Int16List,
            ExtType::Uint32List,
            ExtType::Int32List,
            ExtType::Uint64List,
            ExtType::Int64List,
            ExtType::Float32List,
            ExtType::Float64List,
        ];
        for k in kinds {
            assert_eq!(ExtType::from_u8(k.into_u8()), k);
        }
    }

    #[test]
    fn unknown_ext_type_roundtrips_its_byte() {
        assert_eq!(ExtType::from_u8(0x42), ExtType::Unknown(0x42));
        assert_eq!(ExtType::Unknown(0x42).into_u8(), 0x42);
    }
}
