use serde::{Deserialize, Serialize};

/// Body of the POST sent to the verification server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct VerificationRequestModel {
    /// The App Store receipt, base64-encoded. Empty if the device has no
    /// receipt.
    pub(crate) receipt: String,
    /// Key identifying the application to the verification server.
    pub(crate) key: String,
}
