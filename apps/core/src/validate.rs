use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

const OCTET: &str = "(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

fn ipv4_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let pattern = format!("^{OCTET}\\.{OCTET}\\.{OCTET}\\.{OCTET}$");
        #[allow(clippy::expect_used)]
        Regex::new(&pattern).expect("IPv4 pattern must compile")
    })
}

/// Dotted-quad check. Octets like `01` are accepted by the grammar.
pub fn is_valid_ipv4(candidate: &str) -> bool {
    ipv4_pattern().is_match(candidate)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid IPv4 address: {0:?}")]
pub struct InvalidAddress(pub String);

/// An address that has passed [`is_valid_ipv4`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ipv4Query(String);

impl Ipv4Query {
    /// Trims `raw` and validates it.
    pub fn parse(raw: &str) -> Result<Self, InvalidAddress> {
        let trimmed = raw.trim();
        if is_valid_ipv4(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidAddress(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Ipv4Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ipv4Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
