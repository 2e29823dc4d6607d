use async_trait::async_trait;
use url::Url;

use crate::{domain::entities::verification_response::VerificationResponse, errors::PurchaseError};

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    /// Sends the receipt to the verification server and returns the
    /// subscription status it computed.
    ///
    /// `Ok(None)` means the server answered without a body.
    async fn verify(
        &self,
        server_url: &Url,
        receipt_base64: String,
        app_key: String,
    ) -> Result<Option<VerificationResponse>, PurchaseError>;
}
