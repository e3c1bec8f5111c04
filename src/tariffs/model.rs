//! Tariff records as they appear in `config/tariffs.toml`.

use serde::{Deserialize, Serialize};

/// Commission rate assumed for a marketplace missing from the table.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.10;
/// Average order value assumed for a marketplace missing from the table.
pub const DEFAULT_AVERAGE_ORDER_VALUE: f64 = 1000.0;

/// Per-marketplace commission terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceTariff {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    /// Fraction of order value kept by the marketplace, before volume discount.
    pub commission_rate: f64,
    /// Used to estimate gross order value; the bot never asks for real prices.
    pub average_order_value: f64,
    #[serde(default)]
    pub features: Vec<String>,
}

impl MarketplaceTariff {
    /// Baseline terms for a marketplace code the table does not know.
    pub fn fallback(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_string(),
            icon: String::new(),
            commission_rate: DEFAULT_COMMISSION_RATE,
            average_order_value: DEFAULT_AVERAGE_ORDER_VALUE,
            features: Vec::new(),
        }
    }

    /// Name with icon, as shown on buttons and in results.
    pub fn label(&self) -> String {
        display_label(&self.icon, &self.name, &self.code)
    }
}

/// How a service rate combines with monthly order volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    PerOrder,
    Monthly,
    PerItem,
    Percentage,
    /// Any tag the calculator has no rule for.
    #[serde(other)]
    Unsupported,
}

impl RateType {
    /// Unit suffix for a rate in rubles, `None` when the rate prints bare.
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            RateType::PerOrder => Some("руб/заказ"),
            RateType::Monthly => Some("руб/месяц"),
            RateType::PerItem => Some("руб/товар"),
            RateType::Percentage | RateType::Unsupported => None,
        }
    }
}

/// Price of one fulfillment add-on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTariff {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub rate: f64,
    pub rate_type: RateType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ServiceTariff {
    /// Zero-cost record for a service code the table does not know.
    pub fn fallback(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_string(),
            icon: String::new(),
            rate: 0.0,
            rate_type: RateType::PerOrder,
            description: String::new(),
            features: Vec::new(),
        }
    }

    pub fn label(&self) -> String {
        display_label(&self.icon, &self.name, &self.code)
    }

    /// Rate with its unit, e.g. `5 руб/заказ`.
    pub fn rate_text(&self) -> String {
        format_rate(self.rate, self.rate_type)
    }
}

pub fn format_rate(rate: f64, rate_type: RateType) -> String {
    match rate_type.unit() {
        Some(unit) => format!("{} {}", trim_number(rate), unit),
        None => trim_number(rate),
    }
}

/// `5` for whole numbers, `0.5` otherwise.
pub fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn display_label(icon: &str, name: &str, code: &str) -> String {
    let name = if name.is_empty() { code } else { name };
    if icon.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", icon, name)
    }
}
