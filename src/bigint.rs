//! Arbitrary-precision integers (`Value::BigInteger`), encoded as a sign
//! byte followed by big-endian minimal magnitude bytes.
use num_bigint::{BigInt, Sign};

use crate::error::{Error, Result};

/// An arbitrary-precision integer, as carried by `Value::BigInteger` and
/// the `bigInt`/`wideInt` ext types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BigInteger(BigInt);

impl BigInteger {
    pub fn zero() -> Self {
        BigInteger(BigInt::from(0))
    }

    pub fn from_bigint(v: BigInt) -> Self {
        BigInteger(v)
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    pub fn into_bigint(self) -> BigInt {
        self.0
    }

    /// `true` when this value fits within `±(2^53 - 1)`, the safe window.
    pub fn in_safe_window(&self) -> bool {
        let safe_max = BigInt::from((1i64 << 53) - 1);
        let safe_min = -safe_max.clone();
        self.0 >= safe_min && self.0 <= safe_max
    }

    /// `true` when this value fits in an `i64`/`u64`.
    pub fn fits_host_word(&self) -> bool {
        self.0 >= BigInt::from(i64::MIN) && self.0 <= BigInt::from(u64::MAX)
    }

    pub fn as_i64(&self) -> Option<i64> {
        use num_traits::cast::ToPrimitive;
        self.0.to_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        use num_traits::cast::ToPrimitive;
        self.0.to_u64()
    }

    /// Sign byte (`0x00` non-negative, `0x01` negative) plus big-endian,
    /// minimal magnitude bytes. Zero is encoded with an empty magnitude.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        let (sign, magnitude) = self.0.to_bytes_be();
        let sign_byte = if sign == Sign::Minus { 0x01 } else { 0x00 };
        let mut out = Vec::with_capacity(1 + magnitude.len());
        out.push(sign_byte);
        out.extend_from_slice(&magnitude);
        out
    }

    /// Parse the sign-byte + big-endian-magnitude wire shape shared by
    /// `bigInt` and `wideInt`.
    pub fn from_wire_bytes(offset: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::invalid_ext_payload(offset, 0x01, "bigInt payload is empty, expected at least a sign byte"));
        }
        let sign_byte = bytes[0];
        let magnitude = &bytes[1..];
        let sign = match sign_byte {
            0x00 => Sign::Plus,
            0x01 => Sign::Minus,
            other => {
                return Err(Error::invalid_ext_payload(
                    offset,
                    0x01,
                    format!("sign byte must be 0x00 or 0x01, got 0x{:02X}", other),
                ))
            }
        };
        let sign = if magnitude.is_empty() { Sign::NoSign } else { sign };
        Ok(BigInteger(BigInt::from_bytes_be(sign, magnitude)))
    }
}

impl From<i64> for BigInteger {
    fn from(v: i64) -> Self {
        BigInteger(BigInt::from(v))
    }
}

impl From<u64> for BigInteger {
    fn from(v: u64) -> Self {
        BigInteger(BigInt::from(v))
    }
}

impl From<crate::integer::Integer> for BigInteger {
    fn from(v: crate::integer::Integer) -> Self {
        if v.is_non_negative() {
            BigInteger(BigInt::from(v.as_u64().unwrap()))
        } else {
            BigInteger(BigInt::from(v.as_i64().unwrap()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_encodes_empty_magnitude() {
        assert_eq!(BigInteger::zero().to_wire_bytes(), vec![0x00]);
    }

    #[test]
    fn roundtrip() {
        for v in [0i64, 1, -1, i64::MAX, i64::MIN, 1 << 60, -(1 << 60)] {
            let b = BigInteger::from(v);
            let bytes = b.to_wire_bytes();
            let back = BigInteger::from_wire_bytes(0, &bytes).unwrap();
            assert_eq!(b, back);
        }
    }

    #[test]
    fn magnitude_has_no_leading_zero() {
        let b = BigInteger::from(255i64);
        let bytes = b.to_wire_bytes();
        assert_eq!(bytes, vec![0x00, 0xFF]);
    }

    #[test]
    fn rejects_bad_sign_byte() {
        assert!(BigInteger::from_wire_bytes(0, &[0x02, 0x01]).is_err());
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(BigInteger::from_wire_bytes(0, &[]).is_err());
    }
}
