use std::fmt;

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Error domain used by the platform store for its own failure codes.
pub const STORE_ERROR_DOMAIN: &str = "SKErrorDomain";

/// A failure reported by the payment queue or product catalog.
///
/// Errors from other domains (for example a network failure while loading
/// the catalog) are carried with their own domain and never map to a
/// [`StoreErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreError {
    pub domain: String,
    pub code: i64,
    pub message: String,
}

impl StoreError {
    pub fn new(domain: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: message.into(),
        }
    }

    /// Shorthand for an error in the store's own domain.
    pub fn store(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self::new(STORE_ERROR_DOMAIN, code as i64, message)
    }

    /// The known store failure reason, if this error belongs to the store
    /// domain and carries a recognized code.
    pub fn store_code(&self) -> Option<StoreErrorCode> {
        if self.domain != STORE_ERROR_DOMAIN {
            return None;
        }
        StoreErrorCode::try_from(self.code).ok()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, code {})", self.message, self.domain, self.code)
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i64)]
pub enum StoreErrorCode {
    Unknown = 0,
    /// The client is not allowed to issue the request.
    ClientInvalid = 1,
    /// The user cancelled the payment request.
    PaymentCancelled = 2,
    /// The purchase identifier was invalid.
    PaymentInvalid = 3,
    /// This device is not allowed to make the payment.
    PaymentNotAllowed = 4,
    /// The product is not available in the current storefront.
    StoreProductNotAvailable = 5,
    CloudServicePermissionDenied = 6,
    CloudServiceNetworkConnectionFailed = 7,
    CloudServiceRevoked = 8,
    /// The user has not yet acknowledged the store's privacy policy.
    PrivacyAcknowledgementRequired = 9,
    UnauthorizedRequestData = 10,
    InvalidOfferIdentifier = 11,
    InvalidSignature = 12,
    MissingOfferParams = 13,
    InvalidOfferPrice = 14,
}

impl TryFrom<i64> for StoreErrorCode {
    type Error = i64;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => StoreErrorCode::Unknown,
            1 => StoreErrorCode::ClientInvalid,
            2 => StoreErrorCode::PaymentCancelled,
            3 => StoreErrorCode::PaymentInvalid,
            4 => StoreErrorCode::PaymentNotAllowed,
            5 => StoreErrorCode::StoreProductNotAvailable,
            6 => StoreErrorCode::CloudServicePermissionDenied,
            7 => StoreErrorCode::CloudServiceNetworkConnectionFailed,
            8 => StoreErrorCode::CloudServiceRevoked,
            9 => StoreErrorCode::PrivacyAcknowledgementRequired,
            10 => StoreErrorCode::UnauthorizedRequestData,
            11 => StoreErrorCode::InvalidOfferIdentifier,
            12 => StoreErrorCode::InvalidSignature,
            13 => StoreErrorCode::MissingOfferParams,
            14 => StoreErrorCode::InvalidOfferPrice,
            other => return Err(other),
        })
    }
}

impl StoreErrorCode {
    /// Localization key of the human-readable description for this code.
    pub fn localization_key(&self) -> &'static str {
        match self {
            StoreErrorCode::CloudServicePermissionDenied => "denied",
            StoreErrorCode::CloudServiceRevoked => "revoked",
            StoreErrorCode::InvalidOfferIdentifier => "invalid id",
            StoreErrorCode::InvalidOfferPrice => "invalid price",
            StoreErrorCode::InvalidSignature => "invalid signature",
            StoreErrorCode::MissingOfferParams => "missing params",
            StoreErrorCode::PaymentCancelled => "cancelled",
            StoreErrorCode::PaymentInvalid => "invalid",
            StoreErrorCode::PaymentNotAllowed => "not allowed",
            StoreErrorCode::PrivacyAcknowledgementRequired => "privacy required",
            StoreErrorCode::StoreProductNotAvailable => "not available",
            StoreErrorCode::UnauthorizedRequestData => "unauth",
            StoreErrorCode::Unknown => "unknown",
            StoreErrorCode::ClientInvalid => "client invalid",
            StoreErrorCode::CloudServiceNetworkConnectionFailed => "service failed",
        }
    }
}
