use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};
use url::Url;

use crate::{
    data::models::verification_server::{
        verification_request_model::VerificationRequestModel,
        verification_response_model::VerificationResponseModel,
    },
    errors::PurchaseError,
};

#[async_trait]
pub(crate) trait VerificationServerDatasource: Send + Sync {
    /// POSTs the receipt and app key to the verification server.
    ///
    /// url:
    ///   The configured verification endpoint.
    /// request:
    ///   Receipt (base64) and app key.
    ///
    /// Returns `Ok(None)` if the server answered successfully but with an
    /// empty body.
    ///
    /// A non-2xx status is reported as [`PurchaseError::ServerStatus`]
    /// without decoding the body, even if it carries a well-formed
    /// subscription status. Callers such as `is_subscribed` therefore see
    /// an error rather than the server's flag in that case.
    async fn verify(
        &self,
        url: &Url,
        request: &VerificationRequestModel,
    ) -> Result<Option<VerificationResponseModel>, PurchaseError>;
}

pub(crate) struct VerificationServerDatasourceImpl {
    client: reqwest::Client,
}

#[async_trait]
impl VerificationServerDatasource for VerificationServerDatasourceImpl {
    async fn verify(
        &self,
        url: &Url,
        request: &VerificationRequestModel,
    ) -> Result<Option<VerificationResponseModel>, PurchaseError> {
        debug!(%url, "sending receipt verification callout");
        let response = self
            .client
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "verification callout failed to send");
                PurchaseError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                warn!(%url, error = %e, "failed to read body of non-200 verification response");
                String::new()
            });
            warn!(%url, status = status.as_u16(), "verification callout returned non-200 status");
            return Err(PurchaseError::ServerStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            warn!(%url, "verification callout returned an empty body");
            return Ok(None);
        }
        serde_json::from_slice(&body).map(Some).map_err(|e| {
            warn!(%url, error = %e, "failed to parse verification response");
            PurchaseError::Decode(e)
        })
    }
}

impl VerificationServerDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}
