//! Shared helpers for integration tests.

use parking_lot::Mutex;
use searchbox::config::SearchBoxConfig;
use searchbox::model::ResultItem;
use searchbox::search::{SearchBackend, SearchError, SearchRequest, SearchResponse};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// How the scripted service answers one query.
#[allow(dead_code)]
#[derive(Clone)]
pub struct Script {
    pub delay: Duration,
    pub result: Result<SearchResponse, SearchError>,
}

/// In-memory search service with per-query latency and answers.
/// Unscripted queries answer immediately with no hits.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedBackend {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<SearchRequest>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, query: &str, delay_ms: u64, titles: &[&str]) -> Self {
        let items = titles.iter().map(|t| product(t)).collect();
        self.scripts.lock().insert(
            query.to_string(),
            Script {
                delay: Duration::from_millis(delay_ms),
                result: Ok(SearchResponse::from_items(items)),
            },
        );
        self
    }

    pub fn fail(self, query: &str, delay_ms: u64, error: SearchError) -> Self {
        self.scripts.lock().insert(
            query.to_string(),
            Script {
                delay: Duration::from_millis(delay_ms),
                result: Err(error),
            },
        );
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls.lock().iter().map(|r| r.query.clone()).collect()
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.calls.lock().clone()
    }
}

impl SearchBackend for ScriptedBackend {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send {
        let script = self
            .scripts
            .lock()
            .get(&request.query)
            .cloned()
            .unwrap_or(Script {
                delay: Duration::ZERO,
                result: Ok(SearchResponse::default()),
            });
        self.calls.lock().push(request);
        async move {
            if !script.delay.is_zero() {
                tokio::time::sleep(script.delay).await;
            }
            script.result
        }
    }
}

/// A record shaped like the dashboard-managed product index.
#[allow(dead_code)]
pub fn product(title: &str) -> ResultItem {
    let slug = title.to_lowercase().replace(' ', "-");
    let attributes = json!({
        "objectID": slug,
        "product name": title,
        "product url": format!("https://shop.example.ro/{slug}"),
        "price_gross": 450,
        "stock": 3,
    });
    match attributes {
        serde_json::Value::Object(map) => ResultItem::from_attributes(map),
        _ => unreachable!(),
    }
}

/// Config that passes validation; timings are the defaults (2 chars, 200ms).
#[allow(dead_code)]
pub fn valid_config() -> SearchBoxConfig {
    let mut config = SearchBoxConfig::default();
    config.service.app_id = "TESTAPP".into();
    config.service.api_key = "test-search-key".into();
    config.service.index = "products_v3".into();
    config
}

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
