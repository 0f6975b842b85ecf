//! Library error types.
use std::collections::BTreeMap;
use std::fmt;

/// A fog-wire Result, normally returning a fog-wire [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A single structured detail attached to an [`Error`].
#[derive(Clone, Debug, PartialEq)]
pub enum Detail {
    Text(String),
    UInt(u64),
    Int(i64),
}

impl From<&str> for Detail {
    fn from(v: &str) -> Self {
        Detail::Text(v.to_string())
    }
}
impl From<String> for Detail {
    fn from(v: String) -> Self {
        Detail::Text(v)
    }
}
impl From<u64> for Detail {
    fn from(v: u64) -> Self {
        Detail::UInt(v)
    }
}
impl From<usize> for Detail {
    fn from(v: usize) -> Self {
        Detail::UInt(v as u64)
    }
}
impl From<i64> for Detail {
    fn from(v: i64) -> Self {
        Detail::Int(v)
    }
}

/// Stable error kind, matching the codec's error taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A value's runtime kind has no wire mapping. Encode only.
    UnsupportedType,
    /// Depth counter exceeded `maxDepth`. Encode or decode.
    MaxDepthExceeded,
    /// A length or byte count exceeded a configured cap. Encode only.
    LimitExceeded,
    /// A reader needed N bytes but fewer remained. Decode only.
    TruncatedInput,
    /// Prefix byte is `0xC1` or otherwise absent from the table. Decode only.
    UnknownPrefix,
    /// A length, sub-field, or alignment constraint inside an ext payload was violated. Decode only.
    InvalidExtPayload,
    /// Ext-payload length didn't match what the body wrote or read. Decode only.
    TrailingBytes,
    /// Decoded shape didn't match what a typed API requested. Decode only.
    TypeMismatch,
}

impl Kind {
    /// The stable string code used in error messages and `details`.
    pub fn code(self) -> &'static str {
        match self {
            Kind::UnsupportedType => "unsupported-type",
            Kind::MaxDepthExceeded => "max-depth-exceeded",
            Kind::LimitExceeded => "limit-exceeded",
            Kind::TruncatedInput => "truncated-input",
            Kind::UnknownPrefix => "unknown-prefix",
            Kind::InvalidExtPayload => "invalid-ext-payload",
            Kind::TrailingBytes => "trailing-bytes",
            Kind::TypeMismatch => "type-mismatch",
        }
    }
}

/// A fog-wire error. Carries a stable kind, a human message, an optional
/// byte offset (decode errors), a structured details map, and -- when this
/// error wraps an underlying failure (e.g. a `url::ParseError`) -- that
/// failure, retrievable via `source()`, the way the teacher's `Error`
/// delegates `CryptoError`/`Compression` through `source()` instead of
/// flattening them to a string.
#[derive(Debug)]
pub struct Error {
    kind: Kind,
    message: String,
    offset: Option<usize>,
    details: BTreeMap<&'static str, Detail>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            offset: None,
            details: BTreeMap::new(),
            source: None,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_detail(mut self, key: &'static str, value: impl Into<Detail>) -> Self {
        self.details.insert(key, value.into());
        self
    }

    /// Attach the underlying error this one wraps, so callers can walk the
    /// chain with `std::error::Error::source` instead of only seeing the
    /// formatted message.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn details(&self) -> &BTreeMap<&'static str, Detail> {
        &self.details
    }

    pub(crate) fn unsupported_type(what: impl Into<String>) -> Self {
        Error::new(Kind::UnsupportedType, format!("unsupported value type: {}", what.into()))
    }

    pub(crate) fn max_depth_exceeded(max_depth: usize) -> Self {
        Error::new(Kind::MaxDepthExceeded, format!("nesting depth exceeded limit of {}", max_depth))
            .with_detail("max_depth", max_depth)
    }

    pub(crate) fn limit_exceeded(limit_name: &'static str, limit: u64, actual: u64) -> Self {
        Error::new(
            Kind::LimitExceeded,
            format!("{} of {} exceeds configured limit of {}", limit_name, actual, limit),
        )
        .with_detail("limit_name", limit_name)
        .with_detail("limit", limit)
        .with_detail("actual", actual)
    }

    pub(crate) fn truncated(offset: usize, needed: usize, remaining: usize) -> Self {
        Error::new(
            Kind::TruncatedInput,
            format!("needed {} bytes at offset {}, only {} remain", needed, offset, remaining),
        )
        .with_offset(offset)
        .with_detail("needed", needed as u64)
        .with_detail("remaining", remaining as u64)
    }

    pub(crate) fn unknown_prefix(offset: usize, prefix: u8) -> Self {
        Error::new(Kind::UnknownPrefix, format!("unrecognized prefix byte 0x{:02X} at offset {}", prefix, offset))
            .with_offset(offset)
            .with_detail("prefix", prefix as u64)
    }

    pub(crate) fn invalid_ext_payload(offset: usize, ext_type: u8, reason: impl Into<String>) -> Self {
        Error::new(Kind::InvalidExtPayload, format!("invalid payload for ext type 0x{:02X}: {}", ext_type, reason.into()))
            .with_offset(offset)
            .with_detail("ext_type", ext_type as u64)
    }

    pub(crate) fn trailing_bytes(offset: usize, expected: usize, actual: usize) -> Self {
        Error::new(
            Kind::TrailingBytes,
            format!("ext payload declared {} bytes but body consumed {}", expected, actual),
        )
        .with_offset(offset)
        .with_detail("expected", expected as u64)
        .with_detail("actual", actual as u64)
    }

    pub(crate) fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Error::new(Kind::TypeMismatch, format!("expected {}, found {}", expected, found))
            .with_detail("expected", expected)
            .with_detail("found", found)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.code(), self.message)?;
        if let Some(offset) = self.offset {
            write!(f, " (at offset {})", offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
