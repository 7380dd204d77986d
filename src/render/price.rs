//! Display-price selection and locale formatting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyPosition {
    Prefix,
    Suffix,
}

/// Number formatting convention for prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormat {
    pub thousands_sep: String,
    pub decimal_sep: String,
    pub decimals: u8,
    pub currency: String,
    pub currency_position: CurrencyPosition,
}

impl PriceFormat {
    /// Conventions for a handful of locales; anything else gets en-US.
    pub fn for_locale(locale: &str) -> Self {
        let (thousands, decimal, position) = match locale.to_ascii_lowercase().as_str() {
            "ro-ro" | "ro" | "de-de" | "de" | "it-it" | "it" => (".", ",", CurrencyPosition::Suffix),
            "fr-fr" | "fr" => ("\u{202f}", ",", CurrencyPosition::Suffix),
            _ => (",", ".", CurrencyPosition::Prefix),
        };
        Self {
            thousands_sep: thousands.to_string(),
            decimal_sep: decimal.to_string(),
            decimals: 2,
            currency: String::new(),
            currency_position: position,
        }
    }

    /// Round half away from zero and group the integer digits.
    pub fn format_number(&self, value: f64) -> String {
        let factor = 10f64.powi(i32::from(self.decimals));
        let rounded = (value.abs() * factor).round() / factor;
        let fixed = format!("{:.*}", usize::from(self.decimals), rounded);
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut grouped = String::with_capacity(fixed.len() + 4);
        if value < 0.0 && rounded != 0.0 {
            grouped.push('-');
        }
        let digits = int_part.len();
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (digits - i) % 3 == 0 {
                grouped.push_str(&self.thousands_sep);
            }
            grouped.push(c);
        }
        if let Some(frac) = frac_part {
            grouped.push_str(&self.decimal_sep);
            grouped.push_str(frac);
        }
        grouped
    }

    /// Number plus currency. `currency` overrides the configured one.
    pub fn format(&self, value: f64, currency: Option<&str>) -> String {
        let number = self.format_number(value);
        let currency = currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.currency)
            .trim();
        if currency.is_empty() {
            return number;
        }
        match self.currency_position {
            CurrencyPosition::Suffix => format!("{number} {currency}"),
            CurrencyPosition::Prefix if is_symbol(currency) => format!("{currency}{number}"),
            CurrencyPosition::Prefix => format!("{currency} {number}"),
        }
    }

    pub fn label(&self, choice: PriceChoice, currency: Option<&str>) -> PriceLabel {
        match choice {
            PriceChoice::Discounted { sale, regular } => PriceLabel::Discounted {
                sale: self.format(sale, currency),
                regular: self.format(regular, currency),
            },
            PriceChoice::Regular(price) => PriceLabel::Regular {
                price: self.format(price, currency),
            },
            PriceChoice::OnRequest => PriceLabel::OnRequest,
        }
    }
}

fn is_symbol(currency: &str) -> bool {
    currency.chars().count() == 1 && !currency.chars().all(char::is_alphanumeric)
}

/// Which price(s) an item shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceChoice {
    /// Sale price strictly below the regular price: both are shown.
    Discounted { sale: f64, regular: f64 },
    Regular(f64),
    OnRequest,
}

pub fn choose_price(regular: Option<f64>, sale: Option<f64>) -> PriceChoice {
    let regular = regular.filter(|p| *p > 0.0);
    let sale = sale.filter(|p| *p > 0.0);
    match (regular, sale) {
        (Some(regular), Some(sale)) if sale < regular => PriceChoice::Discounted { sale, regular },
        (Some(regular), _) => PriceChoice::Regular(regular),
        (None, Some(sale)) => PriceChoice::Regular(sale),
        (None, None) => PriceChoice::OnRequest,
    }
}

/// Formatted prices ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceLabel {
    Discounted { sale: String, regular: String },
    Regular { price: String },
    OnRequest,
}
