use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::entities::{product::Product, store_error::StoreError};

/// The platform product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetches metadata for the given product identifiers.
    ///
    /// Products are returned in the catalog's order. Identifiers the catalog
    /// does not know are left out.
    async fn request_products(
        &self,
        product_ids: HashSet<String>,
    ) -> Result<Vec<Product>, StoreError>;
}
