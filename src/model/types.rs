//! Result records and the logical-field mapping used to read them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Logical attributes the dropdown knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    ObjectId,
    Title,
    Url,
    Image,
    Price,
    SalePrice,
    Currency,
    Stock,
    Availability,
    Manufacturer,
    Ean,
    Sku,
    Category,
}

impl LogicalField {
    pub const ALL: [LogicalField; 13] = [
        LogicalField::ObjectId,
        LogicalField::Title,
        LogicalField::Url,
        LogicalField::Image,
        LogicalField::Price,
        LogicalField::SalePrice,
        LogicalField::Currency,
        LogicalField::Stock,
        LogicalField::Availability,
        LogicalField::Manufacturer,
        LogicalField::Ean,
        LogicalField::Sku,
        LogicalField::Category,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogicalField::ObjectId => "object_id",
            LogicalField::Title => "title",
            LogicalField::Url => "url",
            LogicalField::Image => "image",
            LogicalField::Price => "price",
            LogicalField::SalePrice => "sale_price",
            LogicalField::Currency => "currency",
            LogicalField::Stock => "stock",
            LogicalField::Availability => "availability",
            LogicalField::Manufacturer => "manufacturer",
            LogicalField::Ean => "ean",
            LogicalField::Sku => "sku",
            LogicalField::Category => "category",
        }
    }
}

/// One backend key, or an ordered list of keys where the first present one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldKeys {
    One(String),
    Many(Vec<String>),
}

impl FieldKeys {
    pub fn keys(&self) -> &[String] {
        match self {
            FieldKeys::One(key) => std::slice::from_ref(key),
            FieldKeys::Many(keys) => keys,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys().iter().all(|k| k.trim().is_empty())
    }
}

impl Default for FieldKeys {
    fn default() -> Self {
        FieldKeys::Many(Vec::new())
    }
}

impl From<&str> for FieldKeys {
    fn from(key: &str) -> Self {
        FieldKeys::One(key.to_string())
    }
}

impl From<&[&str]> for FieldKeys {
    fn from(keys: &[&str]) -> Self {
        FieldKeys::Many(keys.iter().map(|k| k.to_string()).collect())
    }
}

/// Table from logical field to backend attribute name(s).
///
/// Different indexes name the same attribute differently (`"product name"`
/// vs `title`, `"main image url"` vs `image_url`). Rendering reads records
/// only through this table. Fields omitted from a config file keep the
/// defaults below; map a field to `[]` to switch it off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub object_id: FieldKeys,
    pub title: FieldKeys,
    pub url: FieldKeys,
    pub image: FieldKeys,
    pub price: FieldKeys,
    pub sale_price: FieldKeys,
    pub currency: FieldKeys,
    pub stock: FieldKeys,
    pub availability: FieldKeys,
    pub manufacturer: FieldKeys,
    pub ean: FieldKeys,
    pub sku: FieldKeys,
    pub category: FieldKeys,
}

impl Default for FieldMap {
    /// Attribute names of the dashboard-managed product index.
    fn default() -> Self {
        Self {
            object_id: "objectID".into(),
            title: "product name".into(),
            url: "product url".into(),
            image: "main image url".into(),
            price: (&["price_gross", "price"][..]).into(),
            sale_price: "sale_price".into(),
            currency: FieldKeys::default(),
            stock: "stock".into(),
            availability: FieldKeys::default(),
            manufacturer: "manufacturer".into(),
            ean: "ean".into(),
            sku: FieldKeys::default(),
            category: "category".into(),
        }
    }
}

impl FieldMap {
    /// Mapping used by indexes synced with snake_case attribute names.
    pub fn snake_case() -> Self {
        Self {
            object_id: "objectID".into(),
            title: "title".into(),
            url: "url".into(),
            image: "image_url".into(),
            price: "price_gross".into(),
            sale_price: "sale_price".into(),
            currency: "currency".into(),
            stock: "stock".into(),
            availability: "availability".into(),
            manufacturer: FieldKeys::default(),
            ean: FieldKeys::default(),
            sku: "sku".into(),
            category: FieldKeys::default(),
        }
    }

    pub fn keys(&self, field: LogicalField) -> &[String] {
        let keys = match field {
            LogicalField::ObjectId => &self.object_id,
            LogicalField::Title => &self.title,
            LogicalField::Url => &self.url,
            LogicalField::Image => &self.image,
            LogicalField::Price => &self.price,
            LogicalField::SalePrice => &self.sale_price,
            LogicalField::Currency => &self.currency,
            LogicalField::Stock => &self.stock,
            LogicalField::Availability => &self.availability,
            LogicalField::Manufacturer => &self.manufacturer,
            LogicalField::Ean => &self.ean,
            LogicalField::Sku => &self.sku,
            LogicalField::Category => &self.category,
        };
        keys.keys()
    }

    /// Every mapped backend key, in field order, without duplicates.
    /// `objectID` is always requested.
    pub fn retrieve_keys(&self) -> Vec<String> {
        let mut out: Vec<String> = vec!["objectID".to_string()];
        for field in LogicalField::ALL {
            for key in self.keys(field) {
                if !key.trim().is_empty() && !out.contains(key) {
                    out.push(key.clone());
                }
            }
        }
        out
    }

    /// Keys the service should highlight (the title attribute).
    pub fn highlight_keys(&self) -> Vec<String> {
        self.keys(LogicalField::Title)
            .iter()
            .filter(|k| !k.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// One match returned by the search service. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(
        rename = "_highlightResult",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub highlight: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ResultItem {
    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            highlight: None,
            attributes,
        }
    }

    /// First mapped value that is present, non-null and not an empty string.
    pub fn get(&self, fields: &FieldMap, field: LogicalField) -> Option<&Value> {
        fields.keys(field).iter().find_map(|key| {
            self.attributes.get(key).filter(|v| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
        })
    }

    /// Mapped value rendered as text. Numbers and booleans are stringified.
    pub fn text(&self, fields: &FieldMap, field: LogicalField) -> Option<String> {
        match self.get(fields, field)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Mapped value read as a number; numeric strings are accepted.
    pub fn number(&self, fields: &FieldMap, field: LogicalField) -> Option<f64> {
        match self.get(fields, field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_leading_float(s),
            _ => None,
        }
    }

    /// Highlighted form of the first mapped key that has a highlight entry.
    /// `None` when the service reports no match for it (`matchLevel: "none"`),
    /// so the raw value is shown verbatim.
    pub fn highlighted(&self, fields: &FieldMap, field: LogicalField) -> Option<&str> {
        let highlight = self.highlight.as_ref()?;
        let entry = fields.keys(field).iter().find_map(|key| highlight.get(key))?;
        if entry.get("matchLevel").and_then(Value::as_str) == Some("none") {
            return None;
        }
        entry
            .get("value")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// Parse the longest numeric prefix of `s` (`"129.90 RON"` → 129.9).
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let prefix: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .collect();
    let mut end = prefix.len();
    while end > 0 {
        if let Ok(v) = prefix[..end].parse::<f64>()
            && v.is_finite()
        {
            return Some(v);
        }
        end -= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> ResultItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn first_present_key_wins() {
        let fields = FieldMap::default();
        let hit = item(json!({"price": "450", "price_gross": null}));
        assert_eq!(hit.number(&fields, LogicalField::Price), Some(450.0));

        let hit = item(json!({"price": "450", "price_gross": 500}));
        assert_eq!(hit.number(&fields, LogicalField::Price), Some(500.0));
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let fields = FieldMap::default();
        let hit = item(json!({"main image url": "  "}));
        assert!(hit.get(&fields, LogicalField::Image).is_none());
    }

    #[test]
    fn highlight_result_is_split_from_attributes() {
        let hit = item(json!({
            "product name": "Scaun",
            "_highlightResult": {"product name": {"value": "<em>Sca</em>un", "matchLevel": "partial"}}
        }));
        let fields = FieldMap::default();
        assert_eq!(
            hit.highlighted(&fields, LogicalField::Title),
            Some("<em>Sca</em>un")
        );
        assert!(!hit.attributes.contains_key("_highlightResult"));
    }

    #[test]
    fn unmatched_highlight_is_ignored() {
        let hit = item(json!({
            "product name": "Lampa <em>Nordic</em>",
            "_highlightResult": {
                "product name": {"value": "Lampa <em>Nordic</em>", "matchLevel": "none", "matchedWords": []}
            }
        }));
        assert_eq!(hit.highlighted(&FieldMap::default(), LogicalField::Title), None);
    }

    #[test]
    fn retrieve_keys_are_deduplicated_and_include_object_id() {
        let fields = FieldMap::default();
        let keys = fields.retrieve_keys();
        assert_eq!(keys[0], "objectID");
        assert_eq!(keys.iter().filter(|k| *k == "objectID").count(), 1);
        assert!(keys.contains(&"product name".to_string()));
        assert!(keys.contains(&"price_gross".to_string()));
        assert!(keys.contains(&"price".to_string()));
        assert_eq!(fields.highlight_keys(), vec!["product name".to_string()]);
    }

    #[test]
    fn leading_float_parsing() {
        assert_eq!(parse_leading_float("129.90 RON"), Some(129.9));
        assert_eq!(parse_leading_float("8.44731E+12"), Some(8.44731e12));
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float(""), None);
    }
}
