//! HTTPS client for an Algolia-compatible hosted index.

use reqwest::{Client, Request};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{
    HIGHLIGHT_POST_TAG, HIGHLIGHT_PRE_TAG, SearchBackend, SearchError, SearchRequest,
    SearchResponse,
};
use crate::config::ServiceConfig;

const APP_ID_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";

#[derive(Debug, Clone)]
pub struct AlgoliaClient {
    http: Client,
    endpoint: String,
    app_id: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl AlgoliaClient {
    pub fn new(service: &ServiceConfig) -> Result<Self, SearchError> {
        let timeout = Duration::from_millis(service.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("searchbox/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SearchError::Http(format!("building http client: {e}")))?;
        Ok(Self {
            http,
            endpoint: query_endpoint(service),
            app_id: service.app_id.clone(),
            api_key: service.api_key.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The HTTP request for `request`, without sending it.
    pub fn build_request(&self, request: &SearchRequest) -> Result<Request, SearchError> {
        self.http
            .post(&self.endpoint)
            .header(APP_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&query_body(request))
            .build()
            .map_err(|e| SearchError::Http(e.to_string()))
    }

    async fn execute(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let started = Instant::now();
        let http_request = self.build_request(&request)?;
        let response = self
            .http
            .execute(http_request)
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            return Err(SearchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let parsed = parse_response(&body)?;
        debug!(
            component = "algolia",
            operation = "search",
            query_len = request.query.chars().count(),
            hits = parsed.items.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "search completed"
        );
        Ok(parsed)
    }

    fn transport_error(&self, e: reqwest::Error) -> SearchError {
        if e.is_timeout() {
            SearchError::Timeout(self.timeout)
        } else {
            SearchError::Http(e.to_string())
        }
    }
}

impl SearchBackend for AlgoliaClient {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl std::future::Future<Output = Result<SearchResponse, SearchError>> + Send {
        self.execute(request)
    }
}

fn query_endpoint(service: &ServiceConfig) -> String {
    let host = match &service.host {
        Some(host) if !host.trim().is_empty() => {
            let host = host.trim().trim_end_matches('/');
            if host.starts_with("http://") || host.starts_with("https://") {
                host.to_string()
            } else {
                format!("https://{host}")
            }
        }
        _ => format!("https://{}-dsn.algolia.net", service.app_id.to_ascii_lowercase()),
    };
    format!(
        "{host}/1/indexes/{}/query",
        urlencoding::encode(&service.index)
    )
}

fn query_body(request: &SearchRequest) -> Value {
    json!({
        "query": request.query,
        "hitsPerPage": request.count,
        "attributesToRetrieve": request.fields,
        "attributesToHighlight": request.highlight_fields,
        "highlightPreTag": HIGHLIGHT_PRE_TAG,
        "highlightPostTag": HIGHLIGHT_POST_TAG,
    })
}

/// Decode a search response body.
pub fn parse_response(body: &[u8]) -> Result<SearchResponse, SearchError> {
    serde_json::from_slice(body).map_err(|e| SearchError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ServiceConfig {
        ServiceConfig {
            app_id: "8FK79GDKP2".into(),
            api_key: "search-key".into(),
            index: "products v3".into(),
            host: None,
            timeout_ms: 1500,
        }
    }

    fn request() -> SearchRequest {
        SearchRequest {
            query: "scaun".into(),
            count: 15,
            fields: vec!["objectID".into(), "product name".into()],
            highlight_fields: vec!["product name".into()],
        }
    }

    #[test]
    fn endpoint_uses_dsn_host_and_encoded_index() {
        let client = AlgoliaClient::new(&service()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://8fk79gdkp2-dsn.algolia.net/1/indexes/products%20v3/query"
        );
    }

    #[test]
    fn host_override() {
        let mut svc = service();
        svc.host = Some("http://127.0.0.1:7700/".into());
        let client = AlgoliaClient::new(&svc).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:7700/1/indexes/products%20v3/query"
        );
    }

    #[test]
    fn request_carries_credentials_and_options() {
        let client = AlgoliaClient::new(&service()).unwrap();
        let req = client.build_request(&request()).unwrap();
        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.headers()[APP_ID_HEADER], "8FK79GDKP2");
        assert_eq!(req.headers()[API_KEY_HEADER], "search-key");

        let body: Value =
            serde_json::from_slice(req.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
        assert_eq!(body["query"], "scaun");
        assert_eq!(body["hitsPerPage"], 15);
        assert_eq!(body["attributesToRetrieve"][1], "product name");
        assert_eq!(body["attributesToHighlight"][0], "product name");
        assert_eq!(body["highlightPreTag"], HIGHLIGHT_PRE_TAG);
    }

    #[test]
    fn parses_hits_and_metadata() {
        let body = br#"{
            "hits": [{"objectID": "1", "product name": "Scaun",
                      "_highlightResult": {"product name": {"value": "Scaun"}}}],
            "nbHits": 1, "processingTimeMS": 3, "query": "sca"
        }"#;
        let resp = parse_response(body).unwrap();
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.nb_hits, Some(1));
        assert_eq!(resp.processing_time_ms, Some(3));
        assert!(resp.items[0].highlight.is_some());
    }

    #[test]
    fn malformed_body_is_decode_error() {
        assert!(matches!(
            parse_response(b"<html>"),
            Err(SearchError::Decode(_))
        ));
    }
}
