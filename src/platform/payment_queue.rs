use std::sync::Arc;

use crate::domain::entities::{
    payment_transaction::{Payment, PaymentTransaction},
    product::Product,
    store_error::StoreError,
};

/// The platform payment queue.
///
/// Owns every transaction and delivers state changes to its registered
/// observer. Implementations wrap the platform store SDK.
pub trait PaymentQueue: Send + Sync {
    fn add_observer(&self, observer: Arc<dyn PaymentTransactionObserver>);

    fn remove_observer(&self);

    /// Submits a payment. The outcome arrives later as a transaction update.
    fn add_payment(&self, payment: Payment);

    /// Asks the store to re-deliver previously completed transactions.
    fn restore_completed_transactions(&self);

    /// Acknowledges that a transaction has been fully processed and may be
    /// removed from the queue. Must be called exactly once per transaction
    /// in a purchased, restored, or failed state.
    fn finish_transaction(&self, transaction: &PaymentTransaction);
}

/// Callbacks the payment queue delivers to its observer.
pub trait PaymentTransactionObserver: Send + Sync {
    fn updated_transactions(&self, queue: &dyn PaymentQueue, transactions: &[PaymentTransaction]);

    fn restore_completed_transactions_finished(&self, queue: &dyn PaymentQueue);

    fn restore_completed_transactions_failed(&self, queue: &dyn PaymentQueue, error: StoreError);

    /// Whether a payment started outside the app (for example from a store
    /// promotion) should be added to the queue.
    fn should_add_store_payment(
        &self,
        queue: &dyn PaymentQueue,
        payment: &Payment,
        product: &Product,
    ) -> bool;
}

/// Decides whether externally-initiated store payments may proceed.
pub trait PaymentAuthorizer: Send + Sync {
    fn should_add_store_payment(&self, payment: &Payment) -> bool;
}

impl<F> PaymentAuthorizer for F
where
    F: Fn(&Payment) -> bool + Send + Sync,
{
    fn should_add_store_payment(&self, payment: &Payment) -> bool {
        self(payment)
    }
}

/// Receives every raw transaction batch after it has been handled.
pub trait TransactionUpdateObserver: Send + Sync {
    fn transactions_updated(&self, queue: &dyn PaymentQueue, transactions: &[PaymentTransaction]);
}

impl<F> TransactionUpdateObserver for F
where
    F: Fn(&dyn PaymentQueue, &[PaymentTransaction]) + Send + Sync,
{
    fn transactions_updated(&self, queue: &dyn PaymentQueue, transactions: &[PaymentTransaction]) {
        self(queue, transactions)
    }
}
