use serde_json::Value;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Request timeout: {0}")]
    Timeout(reqwest::Error),
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("HTTP error: {0}")]
    Status(reqwest::Error),
    #[error("Parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err)
        } else if err.is_status() {
            FetchError::Status(err)
        } else {
            FetchError::Network(err)
        }
    }
}

/// Issues GET requests and decodes the body as untyped JSON.
///
/// Every call goes to the network; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// Fetches `url` and decodes the response, surfacing every failure as a
    /// [`FetchError`].
    pub async fn try_fetch(&self, url: &str) -> Result<Value, FetchError> {
        let url = parse_url(url)?;
        debug!(%url, "GET");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(%status, "response received");

        let body = response.error_for_status()?.bytes().await?;
        trace!(len = body.len(), "body read");

        Ok(serde_json::from_slice(&body)?)
    }

    /// Like [`Fetcher::try_fetch`], but reports a failure as an `Error:` line
    /// on `err` and returns `None` instead.
    ///
    /// Only a failure to write that line is returned as an error.
    pub async fn fetch<W: Write>(&self, url: &str, err: &mut W) -> io::Result<Option<Value>> {
        match self.try_fetch(url).await {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                debug!(error = ?e, "fetch failed");
                writeln!(err, "Error: {}", e)?;
                Ok(None)
            }
        }
    }
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    if url.is_empty() {
        return Err(FetchError::InvalidUrl("URL cannot be empty".to_string()));
    }

    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl(format!(
            "unsupported scheme `{}` in {}",
            scheme, url
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/hero-position/"))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn endpoint(mock_server: &MockServer) -> String {
        format!("{}/api/hero-position/?role=marksman&lane=gold", mock_server.uri())
    }

    #[tokio::test]
    async fn test_decodes_json_body() {
        let mock_server = serve(ResponseTemplate::new(200).set_body_json(json!({"a": 1}))).await;
        let fetcher = Fetcher::new().unwrap();

        let data = fetcher.try_fetch(&endpoint(&mock_server)).await.unwrap();

        assert_eq!(data, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_not_found_is_status_error() {
        let mock_server = serve(ResponseTemplate::new(404)).await;
        let fetcher = Fetcher::new().unwrap();

        let result = fetcher.try_fetch(&endpoint(&mock_server)).await;

        assert!(matches!(result, Err(FetchError::Status(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let mock_server =
            serve(ResponseTemplate::new(503).set_body_json(json!({"detail": "down"}))).await;
        let fetcher = Fetcher::new().unwrap();

        let result = fetcher.try_fetch(&endpoint(&mock_server)).await;

        assert!(matches!(result, Err(FetchError::Status(_))));
    }

    #[tokio::test]
    async fn test_html_body_is_decode_error() {
        let mock_server = serve(
            ResponseTemplate::new(200).set_body_string("<html><body>Bad Gateway</body></html>"),
        )
        .await;
        let fetcher = Fetcher::new().unwrap();

        let result = fetcher.try_fetch(&endpoint(&mock_server)).await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let fetcher = Fetcher::new().unwrap();

        let result = fetcher
            .try_fetch(&format!("http://127.0.0.1:{}/api/hero-position/", port))
            .await;

        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let fetcher = Fetcher::new().unwrap();

        assert!(matches!(fetcher.try_fetch("").await, Err(FetchError::InvalidUrl(_))));
        assert!(matches!(fetcher.try_fetch("not a url").await, Err(FetchError::InvalidUrl(_))));
        assert!(matches!(
            fetcher.try_fetch("ftp://example.com/data.json").await,
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_every_call_hits_the_network() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/hero-position/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .expect(2)
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let first = fetcher.try_fetch(&endpoint(&mock_server)).await.unwrap();
        let second = fetcher.try_fetch(&endpoint(&mock_server)).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fetch_reports_error_and_returns_none() {
        let mock_server = serve(ResponseTemplate::new(404)).await;
        let fetcher = Fetcher::new().unwrap();
        let mut err = Vec::new();

        let data = fetcher.fetch(&endpoint(&mock_server), &mut err).await.unwrap();

        assert!(data.is_none());
        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("Error: HTTP error:"), "{}", err);
        assert!(err.contains("404"), "{}", err);
        assert!(err.ends_with('\n'));
        assert_eq!(err.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_success_writes_nothing_to_error_channel() {
        let mock_server = serve(ResponseTemplate::new(200).set_body_json(json!({"a": 1}))).await;
        let fetcher = Fetcher::new().unwrap();
        let mut err = Vec::new();

        let data = fetcher.fetch(&endpoint(&mock_server), &mut err).await.unwrap();

        assert_eq!(data, Some(json!({"a": 1})));
        assert!(err.is_empty());
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_logs_request_and_status() {
        let mock_server = serve(ResponseTemplate::new(200).set_body_json(json!(null))).await;
        let fetcher = Fetcher::new().unwrap();

        fetcher.try_fetch(&endpoint(&mock_server)).await.unwrap();

        assert!(logs_contain("GET"));
        assert!(logs_contain("response received"));
    }
}
