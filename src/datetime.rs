//! `DateTime` and `Duration` value kinds: plain microsecond counters, not a
//! full calendar library -- the wire shape is a 9-byte (utc flag + int64)
//! or 8-byte (int64) ext payload, nothing richer.

/// Epoch microseconds plus a UTC/local flag. `fromMicrosecondsSinceEpoch`
/// equivalents belong to the caller; this type only carries what the wire
/// format needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateTime {
    micros_since_epoch: i64,
    is_utc: bool,
}

impl DateTime {
    pub fn new(micros_since_epoch: i64, is_utc: bool) -> Self {
        Self { micros_since_epoch, is_utc }
    }

    pub fn micros_since_epoch(&self) -> i64 {
        self.micros_since_epoch
    }

    pub fn is_utc(&self) -> bool {
        self.is_utc
    }

    /// 1 flag byte + 8 big-endian microsecond bytes, the `dateTime` ext
    /// payload shape.
    pub fn to_wire_bytes(&self) -> [u8; 9] {
        let mut out = [0u8; 9];
        out[0] = self.is_utc as u8;
        out[1..].copy_from_slice(&self.micros_since_epoch.to_be_bytes());
        out
    }

    pub fn from_wire_bytes(bytes: &[u8; 9]) -> Self {
        let is_utc = bytes[0] != 0;
        let mut micros = [0u8; 8];
        micros.copy_from_slice(&bytes[1..]);
        Self { micros_since_epoch: i64::from_be_bytes(micros), is_utc }
    }
}

/// A signed microsecond duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Duration {
    micros: i64,
}

impl Duration {
    pub fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    pub fn as_micros(&self) -> i64 {
        self.micros
    }

    pub fn to_wire_bytes(&self) -> [u8; 8] {
        self.micros.to_be_bytes()
    }

    pub fn from_wire_bytes(bytes: &[u8; 8]) -> Self {
        Self { micros: i64::from_be_bytes(*bytes) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_time_wire_shape_matches_spec_scenario_f() {
        let dt = DateTime::new(1_696_075_200_000_000, true);
        let bytes = dt.to_wire_bytes();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[1..], &1_696_075_200_000_000i64.to_be_bytes());
        assert_eq!(DateTime::from_wire_bytes(&bytes), dt);
    }

    #[test]
    fn duration_roundtrip() {
        let d = Duration::from_micros(-42);
        assert_eq!(Duration::from_wire_bytes(&d.to_wire_bytes()), d);
    }
}
