//! Stock label derived from quantity and/or availability status.

use serde::Serialize;
use serde_json::Value;

use crate::config::{StockConfig, StockRule};
use crate::model::types::parse_leading_float;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

/// Returns `None` when the configured attributes carry no usable signal.
pub fn stock_status(
    config: &StockConfig,
    quantity: Option<&Value>,
    availability: Option<&Value>,
) -> Option<StockStatus> {
    let from_quantity = quantity.and_then(quantity_in_stock);
    let from_status = availability.and_then(|v| status_in_stock(config, v));
    let in_stock = match config.rule {
        StockRule::None => return None,
        StockRule::Quantity => from_quantity?,
        StockRule::Status => from_status?,
        StockRule::QuantityAndStatus => match (from_quantity, from_status) {
            (None, None) => return None,
            (q, s) => q.unwrap_or(false) && s.unwrap_or(false),
        },
    };
    Some(if in_stock {
        StockStatus::InStock
    } else {
        StockStatus::OutOfStock
    })
}

fn quantity_in_stock(value: &Value) -> Option<bool> {
    match value {
        Value::Number(n) => n.as_f64().map(|q| q > 0.0),
        Value::String(s) => parse_leading_float(s).map(|q| q > 0.0),
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

fn status_in_stock(config: &StockConfig, value: &Value) -> Option<bool> {
    let status = value.as_str()?.trim();
    if status.is_empty() {
        return None;
    }
    Some(
        config
            .in_stock_values
            .iter()
            .any(|v| v.trim().eq_ignore_ascii_case(status)),
    )
}
