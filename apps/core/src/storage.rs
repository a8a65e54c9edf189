//! Encoding of the last searched address, shared by every storage backend.
//!
//! The value lives under [`LAST_QUERY_KEY`] as a JSON string, so a browser
//! profile written by the original widget stays readable.

use crate::validate::{InvalidAddress, Ipv4Query};

pub const LAST_QUERY_KEY: &str = "ip-address";
pub const DEFAULT_LAST_QUERY: &str = "101.11.201.22";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoredQueryError {
    #[error("stored value is not a JSON string: {0}")]
    Json(String),
    #[error(transparent)]
    Invalid(#[from] InvalidAddress),
}

pub fn encode_last_query(query: &Ipv4Query) -> String {
    // A JSON string literal; serializing a &str cannot fail.
    serde_json::Value::String(query.as_str().to_string()).to_string()
}

pub fn decode_last_query(raw: &str) -> Result<Ipv4Query, StoredQueryError> {
    let value: String =
        serde_json::from_str(raw).map_err(|e| StoredQueryError::Json(e.to_string()))?;
    Ok(Ipv4Query::parse(&value)?)
}

/// The stored address, or `fallback` when nothing has been saved yet.
pub fn resolve_last_query(raw: Option<&str>, fallback: &str) -> Result<String, StoredQueryError> {
    match raw {
        Some(raw) => decode_last_query(raw).map(Ipv4Query::into_inner),
        None => Ok(fallback.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_json_string() -> Result<(), InvalidAddress> {
        let query = Ipv4Query::parse("10.0.0.1")?;
        assert_eq!(encode_last_query(&query), "\"10.0.0.1\"");
        Ok(())
    }

    #[test]
    fn round_trips_through_codec() -> Result<(), Box<dyn std::error::Error>> {
        let query = Ipv4Query::parse("172.16.4.20")?;
        let decoded = decode_last_query(&encode_last_query(&query))?;
        assert_eq!(decoded, query);
        Ok(())
    }

    #[test]
    fn missing_value_uses_fallback() -> Result<(), StoredQueryError> {
        assert_eq!(resolve_last_query(None, DEFAULT_LAST_QUERY)?, "101.11.201.22");
        Ok(())
    }

    #[test]
    fn bare_unquoted_value_is_rejected() {
        assert!(matches!(
            decode_last_query("1.2.3.4"),
            Err(StoredQueryError::Json(_))
        ));
    }

    #[test]
    fn stored_garbage_address_is_rejected() {
        assert!(matches!(
            resolve_last_query(Some("\"999.0.0.1\""), DEFAULT_LAST_QUERY),
            Err(StoredQueryError::Invalid(_))
        ));
    }
}
