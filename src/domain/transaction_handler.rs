use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    domain::entities::payment_transaction::{PaymentTransaction, TransactionId, TransactionState},
    localization::{describe, Localizer},
    notifications::{PurchaseEvent, PurchaseEventBus},
    platform::payment_queue::PaymentQueue,
};

/// Applies the per-state policy to transaction updates from the payment
/// queue.
///
/// Purchased, restored, and failed transactions are finished exactly once;
/// purchasing and deferred transactions are left open for a later update.
///
/// Re-deliveries of purchased and restored transactions are recognized by
/// [`TransactionId`], which the queue adapter must keep unique per
/// transaction. Only the most recent [`FINISHED_HISTORY_CAPACITY`] ids are
/// remembered. Failed transactions may have no identifier at all, so they
/// are always finished.
pub(crate) struct TransactionHandler {
    localizer: Arc<dyn Localizer>,
    finished: Mutex<FinishedHistory>,
}

pub(crate) const FINISHED_HISTORY_CAPACITY: usize = 256;

/// Bounded record of recently finished ids, evicting the oldest first.
struct FinishedHistory {
    order: VecDeque<TransactionId>,
    ids: HashSet<TransactionId>,
    capacity: usize,
}

impl FinishedHistory {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns false if `id` is already recorded.
    fn insert(&mut self, id: &TransactionId) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        self.order.push_back(id.clone());
        self.ids.insert(id.clone());
        true
    }
}

impl TransactionHandler {
    pub(crate) fn new(localizer: Arc<dyn Localizer>) -> Self {
        Self::with_history_capacity(localizer, FINISHED_HISTORY_CAPACITY)
    }

    fn with_history_capacity(localizer: Arc<dyn Localizer>, capacity: usize) -> Self {
        Self {
            localizer,
            finished: Mutex::new(FinishedHistory::new(capacity)),
        }
    }

    pub(crate) fn set_localizer(&mut self, localizer: Arc<dyn Localizer>) {
        self.localizer = localizer;
    }

    pub(crate) fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_ref()
    }

    /// Handles one delivered batch, in delivery order.
    pub(crate) fn handle_batch(
        &self,
        queue: &dyn PaymentQueue,
        transactions: &[PaymentTransaction],
        events: &PurchaseEventBus,
    ) {
        for transaction in transactions {
            debug!(
                transaction_id = %transaction.id.0,
                product_id = %transaction.product_id,
                state = ?transaction.state,
                "handling transaction update"
            );
            match transaction.state {
                TransactionState::Purchasing | TransactionState::Deferred => {}
                TransactionState::Purchased => {
                    if self.finish(queue, transaction) {
                        info!(product_id = %transaction.product_id, "purchase successful");
                        events.post(PurchaseEvent::PurchaseSuccessful);
                    }
                }
                TransactionState::Restored => {
                    self.finish(queue, transaction);
                }
                TransactionState::Failed => {
                    let description = describe(transaction.error.as_ref(), self.localizer());
                    if self.finish(queue, transaction) {
                        warn!(
                            product_id = %transaction.product_id,
                            error = ?transaction.error,
                            %description,
                            "purchase failed"
                        );
                        events.post(PurchaseEvent::PurchaseFailed {
                            error: transaction.error.clone(),
                            description,
                        });
                    }
                }
            }
        }
    }

    /// Finishes the transaction unless it was already finished. Returns
    /// whether it was finished by this call.
    fn finish(&self, queue: &dyn PaymentQueue, transaction: &PaymentTransaction) -> bool {
        debug_assert!(transaction.state.requires_finish());
        if transaction.state != TransactionState::Failed
            && !self.finished.lock().insert(&transaction.id)
        {
            warn!(
                transaction_id = %transaction.id.0,
                "transaction was already finished, ignoring re-delivery"
            );
            return false;
        }
        queue.finish_transaction(transaction);
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::{
        domain::entities::{
            payment_transaction::Payment,
            store_error::{StoreError, StoreErrorCode},
        },
        localization::KeyLocalizer,
        platform::payment_queue::PaymentTransactionObserver,
    };

    #[derive(Default)]
    pub(crate) struct FakeQueue {
        pub(crate) finished: Mutex<Vec<TransactionId>>,
        pub(crate) payments: Mutex<Vec<Payment>>,
        pub(crate) restore_requests: Mutex<usize>,
        pub(crate) observer: Mutex<Option<Arc<dyn PaymentTransactionObserver>>>,
    }

    impl PaymentQueue for FakeQueue {
        fn add_observer(&self, observer: Arc<dyn PaymentTransactionObserver>) {
            *self.observer.lock() = Some(observer);
        }

        fn remove_observer(&self) {
            *self.observer.lock() = None;
        }

        fn add_payment(&self, payment: Payment) {
            self.payments.lock().push(payment);
        }

        fn restore_completed_transactions(&self) {
            *self.restore_requests.lock() += 1;
        }

        fn finish_transaction(&self, transaction: &PaymentTransaction) {
            assert!(
                transaction.state.requires_finish(),
                "finished a transaction in state {:?}",
                transaction.state
            );
            self.finished.lock().push(transaction.id.clone());
        }
    }

    pub(crate) fn transaction(id: &str, state: TransactionState) -> PaymentTransaction {
        PaymentTransaction {
            id: TransactionId(id.to_string()),
            product_id: "sku".to_string(),
            state,
            error: None,
        }
    }

    fn ids(ids: &[&str]) -> Vec<TransactionId> {
        ids.iter().map(|id| TransactionId(id.to_string())).collect()
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<PurchaseEvent>) -> Vec<PurchaseEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn finishes_only_terminal_states() {
        let queue = FakeQueue::default();
        let events = PurchaseEventBus::default();
        let handler = TransactionHandler::new(Arc::new(KeyLocalizer));

        handler.handle_batch(
            &queue,
            &[
                transaction("1", TransactionState::Purchasing),
                transaction("2", TransactionState::Purchased),
                transaction("3", TransactionState::Restored),
                transaction("4", TransactionState::Failed),
                transaction("5", TransactionState::Deferred),
            ],
            &events,
        );

        assert_eq!(*queue.finished.lock(), ids(&["2", "3", "4"]));
    }

    #[test]
    fn redelivered_transactions_are_not_finished_twice() {
        let queue = FakeQueue::default();
        let events = PurchaseEventBus::default();
        let mut rx = events.subscribe();
        let handler = TransactionHandler::new(Arc::new(KeyLocalizer));

        let batch = [transaction("1", TransactionState::Purchased)];
        handler.handle_batch(&queue, &batch, &events);
        handler.handle_batch(&queue, &batch, &events);

        assert_eq!(*queue.finished.lock(), ids(&["1"]));
        assert_eq!(drain(&mut rx), vec![PurchaseEvent::PurchaseSuccessful]);
    }

    #[test]
    fn failed_transactions_sharing_an_id_are_each_finished() {
        let queue = FakeQueue::default();
        let events = PurchaseEventBus::default();
        let mut rx = events.subscribe();
        let handler = TransactionHandler::new(Arc::new(KeyLocalizer));

        handler.handle_batch(
            &queue,
            &[
                transaction("", TransactionState::Failed),
                transaction("", TransactionState::Failed),
            ],
            &events,
        );

        assert_eq!(*queue.finished.lock(), ids(&["", ""]));
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[test]
    fn finished_history_forgets_oldest_ids() {
        let queue = FakeQueue::default();
        let events = PurchaseEventBus::default();
        let handler = TransactionHandler::with_history_capacity(Arc::new(KeyLocalizer), 2);

        for id in ["1", "2", "3"] {
            handler.handle_batch(&queue, &[transaction(id, TransactionState::Restored)], &events);
        }
        assert_eq!(handler.finished.lock().order.len(), 2);

        // "3" is still remembered, "1" was evicted.
        handler.handle_batch(&queue, &[transaction("3", TransactionState::Restored)], &events);
        handler.handle_batch(&queue, &[transaction("1", TransactionState::Restored)], &events);
        assert_eq!(*queue.finished.lock(), ids(&["1", "2", "3", "1"]));
    }

    #[test]
    fn pending_transactions_can_finish_later() {
        let queue = FakeQueue::default();
        let events = PurchaseEventBus::default();
        let handler = TransactionHandler::new(Arc::new(KeyLocalizer));

        handler.handle_batch(&queue, &[transaction("1", TransactionState::Deferred)], &events);
        assert!(queue.finished.lock().is_empty());

        handler.handle_batch(&queue, &[transaction("1", TransactionState::Purchased)], &events);
        assert_eq!(*queue.finished.lock(), ids(&["1"]));
    }

    #[test]
    fn posts_outcomes_per_state() {
        let queue = FakeQueue::default();
        let events = PurchaseEventBus::default();
        let mut rx = events.subscribe();
        let handler = TransactionHandler::new(Arc::new(KeyLocalizer));

        let mut failed = transaction("3", TransactionState::Failed);
        failed.error = Some(StoreError::store(
            StoreErrorCode::PaymentCancelled,
            "user cancelled",
        ));
        handler.handle_batch(
            &queue,
            &[
                transaction("1", TransactionState::Purchased),
                transaction("2", TransactionState::Restored),
                failed.clone(),
            ],
            &events,
        );

        assert_eq!(
            drain(&mut rx),
            vec![
                PurchaseEvent::PurchaseSuccessful,
                PurchaseEvent::PurchaseFailed {
                    error: failed.error,
                    description: "cancelled".to_string(),
                },
            ]
        );
    }

    #[test]
    fn failure_without_error_is_described_as_unknown() {
        let queue = FakeQueue::default();
        let events = PurchaseEventBus::default();
        let mut rx = events.subscribe();
        let handler = TransactionHandler::new(Arc::new(KeyLocalizer));

        handler.handle_batch(&queue, &[transaction("1", TransactionState::Failed)], &events);

        assert_eq!(
            drain(&mut rx),
            vec![PurchaseEvent::PurchaseFailed {
                error: None,
                description: "unknown".to_string(),
            }]
        );
    }
}
