use super::LocationLookup;
use futures::future::BoxFuture;
use futures::FutureExt;
use ip_tracker_core::record::parse_response;
use ip_tracker_core::{LookupError, LookupRecord, TrackerConfig};
use log::debug;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Geolocation provider client. One GET per lookup, no retry.
#[derive(Debug, Clone)]
pub struct GeoClient {
    http: Client,
    config: Arc<TrackerConfig>,
}

impl GeoClient {
    pub fn new(config: TrackerConfig, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
        })
    }

    pub async fn lookup(&self, address: &str) -> Result<LookupRecord, LookupError> {
        lookup(self.http.clone(), Arc::clone(&self.config), address.to_string()).await
    }
}

async fn lookup(
    http: Client,
    config: Arc<TrackerConfig>,
    address: String,
) -> Result<LookupRecord, LookupError> {
    let url = config.lookup_url(&address)?;
    debug!("Looking up {address} at {}", config.endpoint);

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| LookupError::Transport(e.without_url().to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status(status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| LookupError::Transport(e.without_url().to_string()))?;

    parse_response(&body)
}

impl LocationLookup for GeoClient {
    fn fetch_location(&self, address: &str) -> BoxFuture<'static, Result<LookupRecord, LookupError>> {
        lookup(self.http.clone(), Arc::clone(&self.config), address.to_string()).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned HTTP response and reports the request line it received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> Result<(String, oneshot::Receiver<String>), std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buffer = vec![0_u8; 4096];
            let read = socket.read(&mut buffer).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buffer[..read]).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();

            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            let _ = tx.send(request_line);
        });

        Ok((format!("http://{addr}/api/v2/country,city"), rx))
    }

    fn client_for(endpoint: String) -> Result<GeoClient, reqwest::Error> {
        GeoClient::new(
            TrackerConfig {
                endpoint,
                api_key: "at_test".to_string(),
                ..TrackerConfig::default()
            },
            Some(Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn test_lookup_maps_response() -> Result<(), Box<dyn std::error::Error>> {
        let (endpoint, request_line) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"ip":"8.8.8.8","isp":"Google","location":{"country":"US","region":"CA","timezone":"UTC-08:00","lat":37.4,"lng":-122.1}}"#,
        )
        .await?;

        let record = client_for(endpoint)?.lookup("8.8.8.8").await?;

        assert_eq!(record.ip, "8.8.8.8");
        assert_eq!(record.location_label(), "US CA");
        assert_eq!(
            request_line.await?,
            "GET /api/v2/country,city?apiKey=at_test&ipAddress=8.8.8.8 HTTP/1.1"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let (endpoint, _) = serve_once(
            "HTTP/1.1 403 Forbidden",
            r#"{"code":403,"messages":"Access restricted. Check credits balance or enter the correct API key."}"#,
        )
        .await?;

        let result = client_for(endpoint)?.fetch_location("8.8.8.8").await;

        assert_eq!(result, Err(LookupError::Status(403)));

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() -> Result<(), Box<dyn std::error::Error>> {
        let (endpoint, _) = serve_once("HTTP/1.1 200 OK", r#"{"ip":"8.8.8.8"}"#).await?;

        let result = client_for(endpoint)?.lookup("8.8.8.8").await;

        assert!(matches!(result, Err(LookupError::Decode(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_a_transport_error() -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let result = client_for(format!("http://{addr}/api"))?.lookup("8.8.8.8").await;

        assert!(matches!(result, Err(LookupError::Transport(_))));

        Ok(())
    }
}
