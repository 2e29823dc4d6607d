use super::product::Product;

/// A display-ready purchase option built from a catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasableOption {
    pub product: Product,
    /// Computed once from the product's currency at construction time.
    pub formatted_price: String,
}

impl PurchasableOption {
    pub(crate) fn from_product(product: Product) -> Self {
        let formatted_price = product
            .localized_price
            .clone()
            .unwrap_or_else(|| format_price(product.price_micros, &product.currency_iso_4217));
        Self {
            product,
            formatted_price,
        }
    }

    pub fn product_id(&self) -> &str {
        &self.product.product_id
    }
}

fn format_price(price_micros: i64, currency: &str) -> String {
    let cents = (price_micros as i128 + price_micros.signum() as i128 * 5_000) / 10_000;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{sign}{}.{:02} {currency}", cents / 100, cents % 100)
}
