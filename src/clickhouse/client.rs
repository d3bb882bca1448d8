//! ClickHouse HTTP interface client
//!
//! Queries are POSTed as the request body; the raw response body is
//! handed back untouched so callers can parse TabSeparated or RowBinary
//! output themselves.

use bytes::Bytes;
use reqwest::Client;
use std::time::{Duration, Instant};

use crate::clickhouse::error::{ClickHouseError, ClickHouseResult};

/// HTTP client bound to one ClickHouse endpoint
#[derive(Debug, Clone)]
pub struct ClickHouseClient {
    client: Client,
    url: String,
}

impl ClickHouseClient {
    /// Create a client for `url` whose requests fail after `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration) -> ClickHouseResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClickHouseError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Run `sql` and return the raw response body.
    ///
    /// No retries: a failed or timed out query is reported as is.
    /// Dropping the returned future aborts the request.
    pub async fn query(&self, sql: &str) -> ClickHouseResult<Bytes> {
        let query_id = uuid::Uuid::new_v4().to_string();
        let start = Instant::now();

        tracing::debug!(query_id = %query_id, sql = %sql, "Sending ClickHouse query");

        let response = self
            .client
            .post(&self.url)
            .query(&[("query_id", query_id.as_str())])
            .body(sql.to_string())
            .send()
            .await
            .map_err(ClickHouseError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(
                query_id = %query_id,
                status = status.as_u16(),
                "ClickHouse query failed"
            );
            return Err(ClickHouseError::Api {
                status: status.as_u16(),
                message: message.trim_end().to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(ClickHouseError::from_reqwest)?;

        tracing::debug!(
            query_id = %query_id,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ClickHouse query finished"
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, method, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_query_returns_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string("SELECT 1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"1\n".to_vec()))
            .mount(&server)
            .await;

        let client = ClickHouseClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let body = client.query("SELECT 1").await.unwrap();
        assert_eq!(&body[..], b"1\n");
    }

    #[tokio::test]
    async fn test_query_sets_query_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param_is_missing("query_id"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = ClickHouseClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        assert!(client.query("SELECT 1").await.is_ok());
    }

    #[tokio::test]
    async fn test_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("Code: 60. Table doesn't exist\n"),
            )
            .mount(&server)
            .await;

        let client = ClickHouseClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        match client.query("SELECT 1").await {
            Err(ClickHouseError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Code: 60. Table doesn't exist");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = ClickHouseClient::new(server.uri(), Duration::from_millis(100)).unwrap();
        assert!(matches!(
            client.query("SELECT 1").await,
            Err(ClickHouseError::Timeout)
        ));
    }
}
