//! Dropdown markup.
//!
//! Every value that came from the search service or the user goes through
//! [`SafeMarkup`] escaping; the only unescaped strings are the literals below.

use std::time::Instant;
use tracing::trace;

use super::display::DisplayItem;
use super::escape::SafeMarkup;
use super::price::PriceLabel;
use super::stock::StockStatus;
use crate::config::{DropdownConfig, SearchBoxConfig};
use crate::controller::DropdownContent;
use crate::navigate::results_url;

/// Markup for a single result row.
pub fn render_item(item: &DisplayItem, labels: &DropdownConfig) -> SafeMarkup {
    let mut html = SafeMarkup::trusted("<a");
    html.push_attr("href", &item.url);
    html.push_attr("class", "searchbox-result-item");
    if let Some(id) = &item.object_id {
        html.push_attr("data-object-id", id);
    }
    if let Some(ean) = &item.ean {
        html.push_attr("data-ean", ean);
    }
    html.push_trusted(">");

    html.push_trusted(r#"<div class="searchbox-result-image"><img"#);
    html.push_attr("src", &item.image);
    html.push_attr("alt", &item.title);
    html.push_attr("loading", "lazy");
    html.push_attr("data-fallback", &labels.placeholder_image);
    html.push_trusted(
        r#" onerror="this.onerror=null;this.src=this.dataset.fallback"></div>"#,
    );

    html.push_trusted(r#"<div class="searchbox-result-content">"#);
    html.push_trusted(r#"<div class="searchbox-result-title">"#);
    for segment in &item.title_segments {
        if segment.matched {
            html.push_trusted("<mark>");
            html.push_text(&segment.text);
            html.push_trusted("</mark>");
        } else {
            html.push_text(&segment.text);
        }
    }
    html.push_trusted("</div>");

    if let Some(manufacturer) = &item.manufacturer {
        html.push_trusted(r#"<div class="searchbox-manufacturer">"#);
        html.push_text(manufacturer);
        html.push_trusted("</div>");
    }

    html.push_trusted(r#"<div class="searchbox-result-meta">"#);
    html.push(&render_price(&item.price, labels));
    html.push_trusted("</div>");

    match item.stock {
        Some(StockStatus::InStock) => {
            html.push_trusted(r#"<div class="searchbox-stock">"#);
            html.push_text(&labels.in_stock);
            html.push_trusted("</div>");
        }
        Some(StockStatus::OutOfStock) => {
            html.push_trusted(r#"<div class="searchbox-stock out-of-stock">"#);
            html.push_text(&labels.out_of_stock);
            html.push_trusted("</div>");
        }
        None => {}
    }

    html.push_trusted("</div></a>");
    html
}

fn render_price(price: &PriceLabel, labels: &DropdownConfig) -> SafeMarkup {
    let mut html = SafeMarkup::new();
    match price {
        PriceLabel::Discounted { sale, regular } => {
            html.push_trusted(r#"<span class="searchbox-price-sale">"#);
            html.push_text(sale);
            html.push_trusted(r#"</span><span class="searchbox-price-original">"#);
            html.push_text(regular);
            html.push_trusted("</span>");
        }
        PriceLabel::Regular { price } => {
            html.push_trusted(r#"<span class="searchbox-price">"#);
            html.push_text(price);
            html.push_trusted("</span>");
        }
        PriceLabel::OnRequest => {
            html.push_trusted(r#"<span class="searchbox-price">"#);
            html.push_text(&labels.price_on_request);
            html.push_trusted("</span>");
        }
    }
    html
}

/// Markup for the whole dropdown body. Rebuilt from scratch on every call.
pub fn render_dropdown(content: &DropdownContent, config: &SearchBoxConfig) -> SafeMarkup {
    let started = Instant::now();
    let labels = &config.dropdown;
    let mut html = SafeMarkup::new();

    match content {
        DropdownContent::Empty => {}
        DropdownContent::NoResults { query } => {
            html.push_trusted(r#"<div class="searchbox-no-results"><p>"#);
            html.push_text(&labels.no_results);
            html.push_trusted(" \"<strong>");
            html.push_text(query);
            html.push_trusted("</strong>\"</p></div>");
        }
        DropdownContent::Results {
            query,
            items,
            total,
        } => {
            html.push_trusted(r#"<div class="searchbox-results-list">"#);
            for item in items {
                html.push(&render_item(item, labels));
            }
            if let Some(url) = results_url(&config.results, query) {
                html.push_trusted(r#"<div class="searchbox-results-footer"><a"#);
                html.push_attr("href", &url);
                html.push_attr("class", "searchbox-view-all");
                html.push_trusted(">");
                html.push_text(&labels.view_all);
                if let Some(total) = total {
                    html.push_text(&format!(" ({total})"));
                }
                html.push_trusted("</a></div>");
            }
            if labels.show_powered_by {
                html.push_trusted(
                    r#"<div class="searchbox-powered-by">Powered by <a href="https://www.algolia.com/" target="_blank" rel="noopener">Algolia</a></div>"#,
                );
            }
            html.push_trusted("</div>");
        }
    }

    trace!(
        component = "renderer",
        operation = "render_dropdown",
        duration_us = started.elapsed().as_micros() as u64,
        bytes = html.as_str().len(),
        "Dropdown rendered"
    );
    html
}
