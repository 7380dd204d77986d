//! Resolve a raw result record into display values.
//!
//! All backend-specific naming goes through the configured [`FieldMap`];
//! everything downstream of [`resolve`] works on [`DisplayItem`].

use serde::Serialize;

use super::ean::normalize_ean;
use super::price::{PriceLabel, choose_price};
use super::stock::{StockStatus, stock_status};
use crate::config::SearchBoxConfig;
use crate::model::{LogicalField, ResultItem};
use crate::search::{HIGHLIGHT_POST_TAG, HIGHLIGHT_PRE_TAG};

/// A run of title text; `matched` runs are highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleSegment {
    pub text: String,
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub title: String,
    pub title_segments: Vec<TitleSegment>,
    pub url: String,
    pub image: String,
    pub image_is_placeholder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub price: PriceLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<StockStatus>,
}

pub fn resolve(item: &ResultItem, config: &SearchBoxConfig) -> DisplayItem {
    let fields = &config.fields;

    let title = item
        .text(fields, LogicalField::Title)
        .unwrap_or_else(|| config.dropdown.fallback_title.clone());
    let title_segments = match item.highlighted(fields, LogicalField::Title) {
        Some(highlighted) => highlight_segments(highlighted),
        None => vec![TitleSegment {
            text: title.clone(),
            matched: false,
        }],
    };

    let image = item
        .text(fields, LogicalField::Image)
        .filter(|url| is_safe_link(url, true));
    let (image, image_is_placeholder) = match image {
        Some(url) => (url, false),
        None => (config.dropdown.placeholder_image.clone(), true),
    };

    let choice = choose_price(
        item.number(fields, LogicalField::Price),
        item.number(fields, LogicalField::SalePrice),
    );
    let currency = item.text(fields, LogicalField::Currency);
    let price = config.price.format().label(choice, currency.as_deref());

    let stock = stock_status(
        &config.stock,
        item.get(fields, LogicalField::Stock),
        item.get(fields, LogicalField::Availability),
    );

    DisplayItem {
        object_id: item.text(fields, LogicalField::ObjectId),
        title,
        title_segments,
        url: item
            .text(fields, LogicalField::Url)
            .filter(|url| is_safe_link(url, false))
            .unwrap_or_else(|| "#".to_string()),
        image,
        image_is_placeholder,
        manufacturer: item.text(fields, LogicalField::Manufacturer),
        ean: item.get(fields, LogicalField::Ean).and_then(normalize_ean),
        sku: item.text(fields, LogicalField::Sku),
        price,
        stock,
    }
}

/// Whether an index-supplied link may be placed in `href`/`src`.
///
/// Relative references always pass. Absolute ones must be `http(s)`, or
/// `data:image/` when `data_image` is set. Control characters are dropped
/// before the scheme is read, as browsers do.
pub fn is_safe_link(url: &str, data_image: bool) -> bool {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim_start()
        .to_ascii_lowercase();
    match cleaned.find([':', '/', '?', '#']) {
        Some(i) if cleaned[i..].starts_with(':') => {
            matches!(&cleaned[..i], "http" | "https")
                || (data_image && cleaned.starts_with("data:image/"))
        }
        _ => true,
    }
}

/// Split a highlighted value into matched / unmatched runs.
///
/// Understands the sentinel tags this crate requests and, for backends
/// that ignore them, the service's default `<em>` tags. The returned text
/// is still raw and must be escaped by the caller.
pub fn highlight_segments(value: &str) -> Vec<TitleSegment> {
    let (pre, post) = if value.contains(HIGHLIGHT_PRE_TAG) {
        (HIGHLIGHT_PRE_TAG, HIGHLIGHT_POST_TAG)
    } else {
        ("<em>", "</em>")
    };

    let mut segments = Vec::new();
    let mut rest = value;
    while let Some(start) = rest.find(pre) {
        push_segment(&mut segments, &rest[..start], false);
        let after = &rest[start + pre.len()..];
        match after.find(post) {
            Some(end) => {
                push_segment(&mut segments, &after[..end], true);
                rest = &after[end + post.len()..];
            }
            None => {
                rest = after;
                break;
            }
        }
    }
    push_segment(&mut segments, rest, false);
    segments
}

fn push_segment(segments: &mut Vec<TitleSegment>, text: &str, matched: bool) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.matched == matched => last.text.push_str(text),
        _ => segments.push(TitleSegment {
            text: text.to_string(),
            matched,
        }),
    }
}
