//! Search box configuration.
//!
//! Everything site-specific (credentials, index, destination routing, field
//! names, price locale) comes from a TOML file, optionally overridden by
//! environment variables.
//!
//! ```toml
//! [service]
//! app_id = "8FK79GDKP2"
//! api_key = "env:SBX_SEARCH_KEY"
//! index = "products_v3"
//!
//! [input]
//! min_chars = 2
//! debounce_ms = 200
//!
//! [results]
//! base_path = "/catalog/q"
//! url_style = "path"
//!
//! [fields]
//! title = "product name"
//! price = ["price_gross", "price"]
//!
//! [price]
//! locale = "ro-RO"
//! currency = "RON"
//! decimals = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::model::{FieldMap, LogicalField};
use crate::render::price::{CurrencyPosition, PriceFormat};

/// Shown when an item has no image. Inline so it works without a CDN.
pub const NO_IMAGE_PLACEHOLDER: &str = "data:image/svg+xml,%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%2280%22 height=%2280%22 viewBox=%220 0 80 80%22%3E%3Crect fill=%22%23f0f0f0%22 width=%2280%22 height=%2280%22/%3E%3Ctext x=%2250%25%22 y=%2250%25%22 dominant-baseline=%22middle%22 text-anchor=%22middle%22 font-family=%22Arial%22 font-size=%2212%22 fill=%22%23999%22%3ENo Image%3C/text%3E%3C/svg%3E";

const CONFIG_FILE_NAME: &str = "searchbox.toml";

/// Upper bound for `price.decimals`.
pub const MAX_PRICE_DECIMALS: u8 = 6;

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Validation outcome, serializable for `sbx config --json`.
#[derive(Debug, Serialize)]
pub struct ConfigValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Remote search service credentials and routing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Application identifier. Supports "env:VAR_NAME".
    pub app_id: String,
    /// Search-only API key. Supports "env:VAR_NAME".
    pub api_key: String,
    pub index: String,
    /// Overrides `{app_id}-dsn.algolia.net`.
    pub host: Option<String>,
    pub timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            api_key: String::new(),
            index: String::new(),
            host: None,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfig {
    /// Selector the page host uses to find the existing input element.
    pub selector: String,
    pub min_chars: usize,
    pub debounce_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            selector: ".search-inline__input, input[data-search-input]".to_string(),
            min_chars: 2,
            debounce_ms: 200,
        }
    }
}

/// How the query is attached to the results page path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UrlStyle {
    /// `{base}/{query}`
    #[default]
    Path,
    /// `{base}?q={query}`
    Query,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResultsConfig {
    pub base_path: String,
    pub url_style: UrlStyle,
    pub query_param: String,
    /// Scheme and host prepended when opening a results page outside the
    /// site itself, e.g. `https://shop.example.ro`.
    pub origin: Option<String>,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            base_path: "/catalog/q".to_string(),
            url_style: UrlStyle::Path,
            query_param: "q".to_string(),
            origin: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DropdownConfig {
    pub hits_per_page: usize,
    pub placeholder_image: String,
    pub fallback_title: String,
    pub no_results: String,
    pub view_all: String,
    pub price_on_request: String,
    pub in_stock: String,
    pub out_of_stock: String,
    pub show_powered_by: bool,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            hits_per_page: 15,
            placeholder_image: NO_IMAGE_PLACEHOLDER.to_string(),
            fallback_title: "Produs".to_string(),
            no_results: "Nu am găsit rezultate pentru".to_string(),
            view_all: "Vezi toate rezultatele →".to_string(),
            price_on_request: "Preț la cerere".to_string(),
            in_stock: "În stoc".to_string(),
            out_of_stock: "Stoc epuizat".to_string(),
            show_powered_by: false,
        }
    }
}

/// Locale preset plus optional overrides for price formatting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PriceConfig {
    pub locale: String,
    pub currency: String,
    pub decimals: Option<u8>,
    pub thousands_sep: Option<String>,
    pub decimal_sep: Option<String>,
    pub currency_position: Option<CurrencyPosition>,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            locale: "ro-RO".to_string(),
            currency: "RON".to_string(),
            decimals: Some(0),
            thousands_sep: None,
            decimal_sep: None,
            currency_position: None,
        }
    }
}

impl PriceConfig {
    pub fn format(&self) -> PriceFormat {
        let mut format = PriceFormat::for_locale(&self.locale);
        format.currency = self.currency.clone();
        if let Some(d) = self.decimals {
            format.decimals = d;
        }
        if let Some(sep) = &self.thousands_sep {
            format.thousands_sep = sep.clone();
        }
        if let Some(sep) = &self.decimal_sep {
            format.decimal_sep = sep.clone();
        }
        if let Some(pos) = self.currency_position {
            format.currency_position = pos;
        }
        format
    }
}

/// How the stock/availability attributes are interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockRule {
    /// Numeric quantity; in stock when > 0.
    #[default]
    Quantity,
    /// Enumerated status matched against `in_stock_values`.
    Status,
    /// Both must agree (quantity > 0 and status in stock).
    QuantityAndStatus,
    /// Never show a stock label.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StockConfig {
    pub rule: StockRule,
    pub in_stock_values: Vec<String>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            rule: StockRule::Quantity,
            in_stock_values: vec!["in stock".to_string(), "instock".to_string()],
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SearchBoxConfig {
    pub service: ServiceConfig,
    pub input: InputConfig,
    pub results: ResultsConfig,
    pub dropdown: DropdownConfig,
    pub fields: FieldMap,
    pub price: PriceConfig,
    pub stock: StockConfig,
}

impl SearchBoxConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields defaults (credentials may still come
    /// from the environment); a missing explicit file is an error.
    /// Environment overrides and `env:` references are applied afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = default_config_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    debug!(path = %default.display(), "no config file; using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        config.resolve_env_vars()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// `SBX_APP_ID`, `SBX_API_KEY`, `SBX_INDEX` and `SBX_RESULTS_PATH`
    /// take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = dotenvy::var("SBX_APP_ID") {
            self.service.app_id = v;
        }
        if let Ok(v) = dotenvy::var("SBX_API_KEY") {
            self.service.api_key = v;
        }
        if let Ok(v) = dotenvy::var("SBX_INDEX") {
            self.service.index = v;
        }
        if let Ok(v) = dotenvy::var("SBX_RESULTS_PATH") {
            self.results.base_path = v;
        }
    }

    /// Values starting with "env:" are replaced by that environment variable.
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        for value in [&mut self.service.app_id, &mut self.service.api_key] {
            if let Some(env_var) = value.strip_prefix("env:") {
                let env_var = env_var.to_string();
                *value = dotenvy::var(&env_var).map_err(|_| ConfigError::EnvVarNotFound(env_var))?;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.service.app_id.trim().is_empty() {
            errors.push(
                "service.app_id is required (or set SBX_APP_ID / use \"env:VAR_NAME\")".to_string(),
            );
        }
        if self.service.api_key.trim().is_empty() {
            errors.push(
                "service.api_key is required (or set SBX_API_KEY / use \"env:VAR_NAME\")"
                    .to_string(),
            );
        }
        if self.service.index.trim().is_empty() {
            errors.push("service.index is required (or set SBX_INDEX)".to_string());
        }
        if self.input.min_chars == 0 {
            errors.push("input.min_chars must be at least 1".to_string());
        }
        if !(1..=1000).contains(&self.dropdown.hits_per_page) {
            errors.push(format!(
                "dropdown.hits_per_page must be between 1 and 1000 (got {})",
                self.dropdown.hits_per_page
            ));
        }
        if self.fields.keys(LogicalField::Title).is_empty() || self.fields.title.is_empty() {
            errors.push("fields.title must name at least one attribute".to_string());
        }
        if let Some(decimals) = self.price.decimals
            && decimals > MAX_PRICE_DECIMALS
        {
            errors.push(format!(
                "price.decimals must be at most {MAX_PRICE_DECIMALS} (got {decimals})"
            ));
        }
        if self.results.base_path.trim().is_empty() {
            errors.push("results.base_path must not be empty".to_string());
        }
        if self.results.url_style == UrlStyle::Query && self.results.query_param.trim().is_empty()
        {
            errors.push("results.query_param must not be empty for url_style = query".to_string());
        }

        if self.input.debounce_ms > 2000 {
            warnings.push(format!(
                "input.debounce_ms = {} makes the dropdown feel unresponsive",
                self.input.debounce_ms
            ));
        }
        for field in LogicalField::ALL {
            if self.fields.keys(field).iter().any(|k| k.trim().is_empty()) {
                warnings.push(format!(
                    "fields.{} contains an empty attribute name; it is ignored",
                    field.as_str()
                ));
            }
        }
        if self.fields.price.is_empty() && self.fields.sale_price.is_empty() {
            warnings.push("no price attribute mapped; every item shows price on request".into());
        }

        ConfigValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Validate and turn errors into a `ConfigError::Invalid`.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        let result = self.validate();
        if result.valid {
            Ok(())
        } else {
            Err(ConfigError::Invalid(result.errors))
        }
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.service.api_key.is_empty() {
            copy.service.api_key = "***".to_string();
        }
        copy
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.input.debounce_ms)
    }
}

pub fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("com", "searchbox", "searchbox").map_or_else(
        || PathBuf::from(CONFIG_FILE_NAME),
        |dirs| dirs.config_dir().join(CONFIG_FILE_NAME),
    )
}
