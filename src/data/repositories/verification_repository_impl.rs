use async_trait::async_trait;
use url::Url;

use crate::{
    data::{
        datasources::verification_server_datasource::{
            VerificationServerDatasource, VerificationServerDatasourceImpl,
        },
        models::verification_server::{
            verification_request_model::VerificationRequestModel,
            verification_response_model::VerificationResponseModel,
        },
    },
    domain::{
        entities::verification_response::VerificationResponse,
        repositories::verification_repository::VerificationRepository,
    },
    errors::PurchaseError,
};

pub(crate) struct VerificationRepositoryImpl<D: VerificationServerDatasource> {
    verification_server_datasource: D,
}

#[async_trait]
impl<D: VerificationServerDatasource> VerificationRepository for VerificationRepositoryImpl<D> {
    async fn verify(
        &self,
        server_url: &Url,
        receipt_base64: String,
        app_key: String,
    ) -> Result<Option<VerificationResponse>, PurchaseError> {
        let request = VerificationRequestModel {
            receipt: receipt_base64,
            key: app_key,
        };
        Ok(self
            .verification_server_datasource
            .verify(server_url, &request)
            .await?
            .map(VerificationResponse::from_model))
    }
}

impl VerificationRepositoryImpl<VerificationServerDatasourceImpl> {
    pub(crate) fn new() -> Self {
        Self {
            verification_server_datasource: VerificationServerDatasourceImpl::new(),
        }
    }
}

impl VerificationResponse {
    fn from_model(m: VerificationResponseModel) -> Self {
        Self {
            is_subscribed: m.is_subscribed,
            date_end: m.date_end,
            server_date: m.server_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    struct RecordingDatasource {
        requests: Mutex<Vec<VerificationRequestModel>>,
    }

    #[async_trait]
    impl VerificationServerDatasource for RecordingDatasource {
        async fn verify(
            &self,
            _url: &Url,
            request: &VerificationRequestModel,
        ) -> Result<Option<VerificationResponseModel>, PurchaseError> {
            self.requests.lock().push(request.clone());
            Ok(Some(serde_json::from_str(
                r#"{"isSubscribed":false,"dateEnd":1700000000,"serverDate":1700000500}"#,
            )?))
        }
    }

    #[tokio::test]
    async fn builds_request_and_maps_response() {
        let repository = VerificationRepositoryImpl {
            verification_server_datasource: RecordingDatasource {
                requests: Mutex::new(Vec::new()),
            },
        };
        let url = Url::parse("https://verify.example.com/receipt").unwrap();

        let response = repository
            .verify(&url, "UkVDRUlQVA==".to_string(), "K".to_string())
            .await
            .unwrap()
            .unwrap();

        assert!(!response.is_subscribed);
        assert_eq!(response.date().timestamp(), 1_700_000_000);
        assert_eq!(response.server().timestamp(), 1_700_000_500);

        let requests = repository.verification_server_datasource.requests.lock();
        assert_eq!(
            *requests,
            vec![VerificationRequestModel {
                receipt: "UkVDRUlQVA==".to_string(),
                key: "K".to_string(),
            }]
        );
    }
}
