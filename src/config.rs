use serde::Deserialize;
use url::Url;

use crate::errors::PurchaseError;

pub const SERVER_URL_KEY: &str = "IAP_VERIFICATION_SERVER_URL";
pub const APP_KEY_KEY: &str = "IAP_APP_KEY";

/// Settings needed to talk to the verification server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PurchaseConfig {
    pub server_url: Url,
    pub app_key: String,
}

impl PurchaseConfig {
    /// Reads `IAP_VERIFICATION_SERVER_URL` and `IAP_APP_KEY` from the
    /// environment.
    pub fn from_env() -> Result<Self, PurchaseError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PurchaseError> {
        let server_url = lookup(SERVER_URL_KEY).ok_or(PurchaseError::MissingConfig(SERVER_URL_KEY))?;
        let app_key = lookup(APP_KEY_KEY).ok_or(PurchaseError::MissingConfig(APP_KEY_KEY))?;
        Ok(Self {
            server_url: Url::parse(&server_url)?,
            app_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_both_values() {
        let config = PurchaseConfig::from_lookup(lookup(&[
            (SERVER_URL_KEY, "https://verify.example.com/receipt"),
            (APP_KEY_KEY, "K"),
        ]))
        .unwrap();
        assert_eq!(config.server_url.as_str(), "https://verify.example.com/receipt");
        assert_eq!(config.app_key, "K");
    }

    #[test]
    fn reports_missing_values() {
        let result = PurchaseConfig::from_lookup(lookup(&[(APP_KEY_KEY, "K")]));
        assert!(matches!(result, Err(PurchaseError::MissingConfig(SERVER_URL_KEY))));
    }

    #[test]
    fn rejects_invalid_url() {
        let result = PurchaseConfig::from_lookup(lookup(&[
            (SERVER_URL_KEY, "not a url"),
            (APP_KEY_KEY, "K"),
        ]));
        assert!(matches!(result, Err(PurchaseError::InvalidServerUrl(_))));
    }

    #[test]
    fn deserializes_from_json() {
        let config: PurchaseConfig = serde_json::from_str(
            r#"{"server_url":"https://verify.example.com/receipt","app_key":"K"}"#,
        )
        .unwrap();
        assert_eq!(config.app_key, "K");
    }
}
