use crate::{
    error::{BridgeError, Result},
    source::{FetchRequest, SourceClient, SourceRecord},
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const REST_PREFIX: &str = "rest/v1";
const MAX_ERROR_BODY: usize = 200;

/// `SourceClient` backed by a Supabase project's PostgREST endpoint.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(url: impl Into<String>, api_key: &str) -> Result<Self> {
        Self::with_timeout(url, api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(url: impl Into<String>, api_key: &str, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let base_url = url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BridgeError::InvalidConfig(
                "Supabase URL cannot be empty".to_string(),
            ));
        }

        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| BridgeError::InvalidConfig(format!("Invalid API key: {}", e)))?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| BridgeError::InvalidConfig(format!("Invalid API key: {}", e)))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::SourceUnavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, table)
    }

    async fn get_rows(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<SourceRecord>> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(query)
            .send()
            .await
            .map_err(|e| map_transport_error(table, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(table, status, &body));
        }

        response
            .json::<Vec<SourceRecord>>()
            .await
            .map_err(|e| BridgeError::query_failed(table, format!("undecodable response: {}", e)))
    }
}

#[async_trait]
impl SourceClient for SupabaseClient {
    async fn fetch_latest(&self, request: &FetchRequest) -> Result<Vec<SourceRecord>> {
        let direction = if request.descending { "desc" } else { "asc" };
        let query = [
            ("select", "*".to_string()),
            ("order", format!("{}.{}", request.order_by, direction)),
            ("limit", request.limit.to_string()),
        ];

        let rows = self.get_rows(&request.table, &query).await?;
        debug!("Fetched {} row(s) from '{}'", rows.len(), request.table);
        Ok(rows)
    }

    async fn probe(&self, table: &str) -> Result<()> {
        let query = [("select", "*".to_string()), ("limit", "1".to_string())];
        self.get_rows(table, &query).await.map(|_| ())
    }
}

fn map_transport_error(table: &str, err: reqwest::Error) -> BridgeError {
    if err.is_connect() || err.is_timeout() {
        BridgeError::SourceUnavailable(format!("{} (table '{}')", err, table))
    } else {
        BridgeError::query_failed(table, err)
    }
}

fn map_status(table: &str, status: StatusCode, body: &str) -> BridgeError {
    let body: String = body.chars().take(MAX_ERROR_BODY).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BridgeError::SourceUnavailable(format!(
            "access to '{}' denied ({}): {}",
            table, status, body
        )),
        _ => BridgeError::query_failed(table, format!("HTTP {}: {}", status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_rejects_empty_url() {
        let err = SupabaseClient::new("", "key").err().unwrap();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
    }

    #[test]
    fn test_trims_trailing_slash() {
        let client = SupabaseClient::new("https://example.supabase.co/", "key").unwrap();
        assert_eq!(client.base_url(), "https://example.supabase.co");
        assert_eq!(
            client.table_url("data_lake_metrics"),
            "https://example.supabase.co/rest/v1/data_lake_metrics"
        );
    }

    #[tokio::test]
    async fn test_fetch_latest_with_mock_server() {
        let mut server = Server::new_async().await;
        let body = json!([
            {"timestamp": "2024-05-01T10:00:00", "space_used_gb": 512.3, "access_count": 120, "access_time_ms": 45.0}
        ])
        .to_string();

        let mock = server
            .mock("GET", "/rest/v1/data_lake_metrics")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("order".into(), "timestamp.desc".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .match_header("apikey", "test-key")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "test-key").unwrap();
        let rows = client
            .fetch_latest(&FetchRequest::latest("data_lake_metrics", "timestamp"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].numeric("space_used_gb"), Ok(512.3));
        assert_eq!(rows[0].numeric("access_count"), Ok(120.0));
    }

    #[tokio::test]
    async fn test_empty_table_returns_no_rows() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/data_warehouse_metrics")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "test-key").unwrap();
        let rows = client
            .fetch_latest(&FetchRequest::latest("data_warehouse_metrics", "timestamp"))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_auth_failure_is_unavailable() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/data_lake_metrics")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message":"Invalid API key"}"#)
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "wrong").unwrap();
        let err = client.probe("data_lake_metrics").await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_server_error_is_query_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/data_lake_metrics")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"message":"column data_lake_metrics.timestamp does not exist"}"#)
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "test-key").unwrap();
        let err = client
            .fetch_latest(&FetchRequest::latest("data_lake_metrics", "timestamp"))
            .await
            .unwrap_err();

        match err {
            BridgeError::SourceQueryFailed { table, reason } => {
                assert_eq!(table, "data_lake_metrics");
                assert!(reason.contains("400"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_query_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/data_lake_metrics")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = SupabaseClient::new(server.url(), "test-key").unwrap();
        let err = client
            .fetch_latest(&FetchRequest::latest("data_lake_metrics", "timestamp"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::SourceQueryFailed { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_unavailable() {
        let client = SupabaseClient::with_timeout("http://127.0.0.1:1", "key", Duration::from_secs(2))
            .unwrap();
        let err = client.probe("data_lake_metrics").await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
