use serde::{Deserialize, Serialize};

/// Product metadata as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    /// Price in millionths of the currency unit (1.99 -> 1_990_000).
    pub price_micros: i64,
    /// ISO 4217 currency code.
    pub currency_iso_4217: String,
    /// Price string already localized by the catalog for the storefront's
    /// locale, if it provides one.
    pub localized_price: Option<String>,
}
