use crate::errors::PurchaseError;

/// Result of asking whether the user currently has an active subscription.
///
/// On any failure `is_subscribed` is `false` and `error` says why.
#[derive(Debug)]
pub struct SubscriptionCheck {
    pub is_subscribed: bool,
    pub error: Option<PurchaseError>,
}

impl SubscriptionCheck {
    pub(crate) fn subscribed(is_subscribed: bool) -> Self {
        Self {
            is_subscribed,
            error: None,
        }
    }

    pub(crate) fn failed(error: PurchaseError) -> Self {
        Self {
            is_subscribed: false,
            error: Some(error),
        }
    }
}
