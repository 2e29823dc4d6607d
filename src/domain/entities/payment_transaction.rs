use serde::{Deserialize, Serialize};

use super::store_error::StoreError;

/// Identifier assigned by the payment queue. Must be unique per
/// transaction; a purchased or restored transaction whose id was recently
/// finished is treated as a re-delivery and not finished again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionState {
    /// The payment is being processed by the store.
    Purchasing,
    /// The payment went through; the transaction must be finished.
    Purchased,
    /// A previously completed transaction re-delivered by a restore; must be
    /// finished.
    Restored,
    /// The payment failed; the transaction must be finished.
    Failed,
    /// Awaiting an external action, such as parental approval.
    Deferred,
}

impl TransactionState {
    /// Whether a transaction in this state has to be acknowledged to the
    /// payment queue. Finishing a transaction in any other state is a
    /// protocol violation.
    pub fn requires_finish(&self) -> bool {
        matches!(
            self,
            TransactionState::Purchased | TransactionState::Restored | TransactionState::Failed
        )
    }
}

/// A unit of purchase work tracked by the payment queue.
///
/// Transactions are owned by the queue; this crate only observes them and
/// finishes the ones in a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransaction {
    pub id: TransactionId,
    pub product_id: String,
    pub state: TransactionState,
    /// Only set when `state` is [`TransactionState::Failed`].
    pub error: Option<StoreError>,
}

/// A request submitted to the payment queue to buy a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub product_id: String,
}

impl Payment {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
        }
    }
}
