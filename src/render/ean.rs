//! EAN clean-up. Spreadsheet exports turn long barcodes into scientific
//! notation (`8.44731E+12`); expand those back into digits.

use serde_json::Value;

pub fn normalize_ean(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                return Some(i.to_string());
            }
            if let Some(f) = n.as_f64()
                && f.is_finite()
                && f >= 0.0
                && f.fract() == 0.0
            {
                return Some(format!("{f:.0}"));
            }
            n.to_string()
        }
        _ => return None,
    };
    if raw.is_empty() {
        return None;
    }
    if raw.contains(['e', 'E'])
        && let Ok(num) = raw.parse::<f64>()
        && num.is_finite()
        && num >= 0.0
    {
        return Some(format!("{num:.0}"));
    }
    Some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_scientific_notation() {
        assert_eq!(normalize_ean(&json!("8.44731E+12")).as_deref(), Some("8447310000000"));
        assert_eq!(normalize_ean(&json!("5.9e+12")).as_deref(), Some("5900000000000"));
        assert_eq!(normalize_ean(&json!(8.44731e12)).as_deref(), Some("8447310000000"));
    }

    #[test]
    fn keeps_plain_codes() {
        assert_eq!(normalize_ean(&json!("5949123456789")).as_deref(), Some("5949123456789"));
        assert_eq!(normalize_ean(&json!(5949123456789u64)).as_deref(), Some("5949123456789"));
        assert_eq!(normalize_ean(&json!("")), None);
        assert_eq!(normalize_ean(&json!(null)), None);
    }
}
