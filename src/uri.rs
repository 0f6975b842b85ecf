//! The `Uri` value kind: normalized URI text, carried via the `uri` ext
//! type as UTF-8 bytes.
use std::fmt;

use url::Url;

use crate::error::{Error, Result};

/// A parsed, normalized URI. Stored as the parsed `url::Url` so that
/// re-encoding always emits the normalized form, matching invariant-style
/// expectations that two textually-different-but-equivalent URIs compare
/// and encode identically.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Uri(Url);

impl Uri {
    pub fn parse(offset: usize, text: &str) -> Result<Self> {
        Url::parse(text).map(Uri).map_err(|e| {
            let message = format!("invalid URI: {}", e);
            Error::invalid_ext_payload(offset, 0x05, message).with_source(e)
        })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_url(self) -> Url {
        self.0
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for Uri {
    type Error = Error;
    fn try_from(s: &str) -> Result<Self> {
        Uri::parse(0, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_uri() {
        let u = Uri::parse(0, "https://example.com/a?b=c").unwrap();
        assert_eq!(u.as_str(), "https://example.com/a?b=c");
    }

    #[test]
    fn rejects_invalid_uri() {
        assert!(Uri::parse(0, "not a uri").is_err());
    }
}
