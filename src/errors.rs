use thiserror::Error;

use crate::domain::entities::store_error::StoreError;

/// Domain of the sentinel error reported when a verification round trip
/// produced neither a response nor an error.
pub const INTERNAL_ERROR_DOMAIN: &str = "purchase";
pub const INTERNAL_ERROR_CODE: i64 = 1;

#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("Verification callout failed to send: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Verification callout returned with non-200 status code {status}: {body}")]
    ServerStatus { status: u16, body: String },

    #[error("Failed to parse verification response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Verification server returned an empty body.")]
    EmptyResponse,

    #[error("Payment queue reported an error: {0}")]
    Queue(StoreError),

    #[error("Can not find response ({domain}, code {code}).")]
    Internal { domain: &'static str, code: i64 },

    #[error("Purchases have not been started; call start() with an app key first.")]
    NotStarted,

    #[error("Product '{0}' is not among the loaded purchase options.")]
    UnknownProduct(String),

    #[error("Invalid verification server URL: {0}")]
    InvalidServerUrl(#[from] url::ParseError),

    #[error("Missing configuration value '{0}'.")]
    MissingConfig(&'static str),
}

impl PurchaseError {
    pub fn internal() -> Self {
        PurchaseError::Internal {
            domain: INTERNAL_ERROR_DOMAIN,
            code: INTERNAL_ERROR_CODE,
        }
    }
}

impl From<StoreError> for PurchaseError {
    fn from(error: StoreError) -> Self {
        PurchaseError::Queue(error)
    }
}
