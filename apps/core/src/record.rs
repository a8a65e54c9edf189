use serde::{Deserialize, Serialize};

/// What the geolocation provider knows about one address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupRecord {
    pub ip: String,
    pub country: String,
    pub region: String,
    pub timezone: String,
    pub isp: String,
    pub lat: f64,
    pub lng: f64,
}

impl LookupRecord {
    /// `"{country} {region}"`, the way the location slot shows it.
    pub fn location_label(&self) -> String {
        format!("{} {}", self.country, self.region)
    }
}

/// Wire shape of `GET /api/v2/country,city`. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoResponse {
    pub ip: String,
    pub isp: String,
    pub location: GeoLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoLocation {
    pub country: String,
    pub region: String,
    pub timezone: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<GeoResponse> for LookupRecord {
    fn from(response: GeoResponse) -> Self {
        let GeoResponse {
            ip,
            isp,
            location:
                GeoLocation {
                    country,
                    region,
                    timezone,
                    lat,
                    lng,
                },
        } = response;

        Self {
            ip,
            country,
            region,
            timezone,
            isp,
            lat,
            lng,
        }
    }
}

/// Anything that can go wrong between sending the request and holding a
/// [`LookupRecord`]. The UI reports every variant the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("provider answered with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("invalid lookup url: {0}")]
    Url(String),
}

/// Parses a provider response body.
pub fn parse_response(body: &str) -> Result<LookupRecord, LookupError> {
    serde_json::from_str::<GeoResponse>(body)
        .map(LookupRecord::from)
        .map_err(|e| LookupError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE: &str = r#"{
        "ip": "8.8.8.8",
        "isp": "Google",
        "as": { "asn": 15169, "name": "GOOGLE" },
        "location": {
            "country": "US",
            "region": "CA",
            "city": "Mountain View",
            "timezone": "UTC-08:00",
            "lat": 37.4,
            "lng": -122.1
        }
    }"#;

    #[test]
    fn maps_nested_location_fields() -> Result<(), LookupError> {
        let record = parse_response(GOOGLE)?;
        assert_eq!(record.ip, "8.8.8.8");
        assert_eq!(record.isp, "Google");
        assert_eq!(record.country, "US");
        assert_eq!(record.region, "CA");
        assert_eq!(record.timezone, "UTC-08:00");
        assert!((record.lat - 37.4).abs() < f64::EPSILON);
        assert!((record.lng + 122.1).abs() < f64::EPSILON);
        assert_eq!(record.location_label(), "US CA");
        Ok(())
    }

    #[test]
    fn missing_location_is_a_decode_error() {
        let result = parse_response(r#"{"ip": "1.1.1.1", "isp": "Cloudflare"}"#);
        assert!(matches!(result, Err(LookupError::Decode(_))));
    }

    #[test]
    fn provider_error_body_is_a_decode_error() {
        let result = parse_response(r#"{"code": 403, "messages": "Access restricted."}"#);
        assert!(matches!(result, Err(LookupError::Decode(_))));
    }

    #[test]
    fn string_coordinates_are_rejected() {
        let body = r#"{"ip":"1.1.1.1","isp":"x","location":{"country":"AU","region":"NSW","timezone":"+10:00","lat":"-33.8","lng":151.2}}"#;
        assert!(matches!(parse_response(body), Err(LookupError::Decode(_))));
    }
}
