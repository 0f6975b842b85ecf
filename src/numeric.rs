//! Runtime-detected numeric facts and the cross-runtime integer interop
//! policy (§4.4).

/// How wire integers outside 64 bits, or wire 64-bit scalars outside the
/// safe window, interoperate with native host integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IntInteropMode {
    /// On a 64-bit host, wide wire integers become host integers whenever
    /// representable as `i64`/`u64`; otherwise `BigInteger`.
    #[default]
    Off,
    /// Any wire integer outside the safe window surfaces as `BigInteger`
    /// regardless of host width; encode converts out-of-window host
    /// integers to `BigInteger` and emits them via the `bigInt` ext.
    PromoteWideToBigInt,
    /// Encoding a host integer outside the safe window fails; decoding
    /// treats out-of-window values as `BigInteger`.
    RequireBigIntForWide,
}

/// Facts about the runtime that do not change for the process's lifetime:
/// whether the host's "safe" integer window is the full 64-bit range or
/// the float-backed `±(2^53 - 1)` window, and host byte order.
///
/// Every realistic Rust compilation target has a native 64-bit integer
/// type, so the float-backed branch is never the detected default here —
/// it only matters as a behavior `IntInteropMode` can still select, not as
/// something `NumericRuntime::detect` itself would choose on this
/// language's targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumericRuntime {
    safe_window_only: bool,
}

impl NumericRuntime {
    /// Detect runtime numeric facts. On every Rust compilation target this
    /// returns `safe_window_only: false` (native 64-bit integers are always
    /// available), but the field exists so `IntInteropMode` can still be
    /// exercised against a "JS-like" host for porting parity.
    pub fn detect() -> Self {
        NumericRuntime { safe_window_only: false }
    }

    /// Construct a runtime that behaves as if native integer precision were
    /// limited to the float-backed safe window, for testing the JS-like
    /// code paths without a JS-like host.
    pub fn with_safe_window_only(safe_window_only: bool) -> Self {
        NumericRuntime { safe_window_only }
    }

    pub fn safe_window_only(&self) -> bool {
        self.safe_window_only
    }

    /// `true` if `host` byte order is little-endian. Informational only:
    /// per §4.1, a decoder refusing a zero-copy view across writer/reader
    /// endianness mismatch is "stated as a constraint, not an algorithm",
    /// so `Decoder`'s zero-copy check (`decoder.rs::aligned_view`) is
    /// pointer-alignment-only and never calls this. It's exposed for
    /// callers who want to assert the same-endianness constraint
    /// themselves before trusting a zero-copy view across process/host
    /// boundaries.
    pub fn host_is_little_endian() -> bool {
        cfg!(target_endian = "little")
    }
}

impl Default for NumericRuntime {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_is_native_width_on_this_target() {
        assert!(!NumericRuntime::detect().safe_window_only());
    }
}
