use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use searchbox::config::SearchBoxConfig;
use searchbox::controller::DropdownContent;
use searchbox::model::ResultItem;
use searchbox::render::{highlight_segments, html_escape, render_dropdown};
use searchbox::search::{HIGHLIGHT_POST_TAG, HIGHLIGHT_PRE_TAG, SearchResponse};
use serde_json::json;
use std::hint::black_box;

fn config() -> SearchBoxConfig {
    let mut config = SearchBoxConfig::default();
    config.service.app_id = "BENCH".into();
    config.service.api_key = "bench-key".into();
    config.service.index = "products".into();
    config
}

fn hits(n: usize) -> SearchResponse {
    let items = (0..n)
        .map(|i| {
            let value = json!({
                "objectID": i.to_string(),
                "product name": format!("Scaun birou <ergonomic> & confortabil {i}"),
                "product url": format!("https://shop.example.ro/p/{i}"),
                "main image url": format!("https://cdn.example.ro/img/{i}.jpg"),
                "price_gross": 1299.0 + i as f64,
                "sale_price": if i % 3 == 0 { json!(999) } else { json!(null) },
                "stock": i % 4,
                "manufacturer": "Kring",
                "ean": 8.44731E+12,
                "_highlightResult": {
                    "product name": {
                        "value": format!("{HIGHLIGHT_PRE_TAG}Scaun{HIGHLIGHT_POST_TAG} birou <ergonomic> & confortabil {i}")
                    }
                }
            });
            serde_json::from_value::<ResultItem>(value).unwrap()
        })
        .collect();
    SearchResponse::from_items(items)
}

/// Resolve and render a full dropdown, as done once per completed search.
fn bench_render_dropdown(c: &mut Criterion) {
    let config = config();
    let mut group = c.benchmark_group("render_dropdown");
    for n in [1usize, 15, 100] {
        let response = hits(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &response, |b, response| {
            b.iter(|| {
                let content = DropdownContent::from_response("scaun", black_box(response), &config);
                black_box(render_dropdown(&content, &config))
            })
        });
    }
    group.finish();
}

fn bench_escape(c: &mut Criterion) {
    let text = "Masă <extensibilă> \"Nordic\" & 6 scaune 'Oslo' ".repeat(20);
    c.bench_function("html_escape_1k", |b| b.iter(|| html_escape(black_box(&text))));
}

fn bench_highlight_segments(c: &mut Criterion) {
    let value = format!(
        "{HIGHLIGHT_PRE_TAG}Scaun{HIGHLIGHT_POST_TAG} de birou {HIGHLIGHT_PRE_TAG}ergo{HIGHLIGHT_POST_TAG}nomic"
    );
    c.bench_function("highlight_segments", |b| {
        b.iter(|| highlight_segments(black_box(&value)))
    });
}

criterion_group!(
    benches,
    bench_render_dropdown,
    bench_escape,
    bench_highlight_segments
);
criterion_main!(benches);
