use std::{collections::HashSet, sync::Arc};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{info, warn};
use url::Url;

use crate::{
    config::PurchaseConfig,
    data::repositories::verification_repository_impl::VerificationRepositoryImpl,
    domain::{
        entities::{
            payment_transaction::{Payment, PaymentTransaction},
            product::Product,
            purchasable_option::PurchasableOption,
            store_error::StoreError,
            subscription_check::SubscriptionCheck,
            verification_response::VerificationResponse,
        },
        repositories::verification_repository::VerificationRepository,
        transaction_handler::TransactionHandler,
    },
    errors::PurchaseError,
    localization::{describe, KeyLocalizer, Localizer},
    notifications::{InlineContext, MainContext, PurchaseEvent, PurchaseEventBus},
    platform::{
        payment_queue::{
            PaymentAuthorizer, PaymentQueue, PaymentTransactionObserver, TransactionUpdateObserver,
        },
        product_catalog::ProductCatalog,
        receipt_source::ReceiptSource,
    },
};

/// Entry point for purchases, restores and subscription checks.
///
/// Build one instance at startup, configure it, wrap it in an [`Arc`] and
/// call [`PurchaseUtil::start`]. Configuration (server URL, main context,
/// localizer) must be complete before any purchase, restore or verify call;
/// concurrent reconfiguration is not supported.
///
/// While started, the payment queue holds a reference to the util. Call
/// [`PurchaseUtil::application_will_terminate`] to release it.
pub struct PurchaseUtil {
    queue: Arc<dyn PaymentQueue>,
    catalog: Arc<dyn ProductCatalog>,
    receipts: Arc<dyn ReceiptSource>,
    verification_repository: Arc<dyn VerificationRepository>,
    transaction_handler: TransactionHandler,
    events: PurchaseEventBus,
    server_url: RwLock<Url>,
    app_key: RwLock<Option<String>>,
    payment_authorizer: RwLock<Option<Arc<dyn PaymentAuthorizer>>>,
    transaction_update_observer: RwLock<Option<Arc<dyn TransactionUpdateObserver>>>,
    options: RwLock<Option<Vec<PurchasableOption>>>,
}

impl PurchaseUtil {
    pub fn new(
        queue: Arc<dyn PaymentQueue>,
        catalog: Arc<dyn ProductCatalog>,
        receipts: Arc<dyn ReceiptSource>,
        server_url: Url,
    ) -> Self {
        Self {
            queue,
            catalog,
            receipts,
            verification_repository: Arc::new(VerificationRepositoryImpl::new()),
            transaction_handler: TransactionHandler::new(Arc::new(KeyLocalizer)),
            events: PurchaseEventBus::new(Arc::new(InlineContext)),
            server_url: RwLock::new(server_url),
            app_key: RwLock::new(None),
            payment_authorizer: RwLock::new(None),
            transaction_update_observer: RwLock::new(None),
            options: RwLock::new(None),
        }
    }

    /// The app key in `config` is not applied until it is passed to
    /// [`PurchaseUtil::start`].
    pub fn from_config(
        config: &PurchaseConfig,
        queue: Arc<dyn PaymentQueue>,
        catalog: Arc<dyn ProductCatalog>,
        receipts: Arc<dyn ReceiptSource>,
    ) -> Self {
        Self::new(queue, catalog, receipts, config.server_url.clone())
    }

    /// Context all events are published on. Defaults to the calling thread.
    pub fn with_main_context(mut self, context: Arc<dyn MainContext>) -> Self {
        self.events.set_context(context);
        self
    }

    /// Localizer for failure descriptions. Defaults to returning the raw
    /// keys.
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.transaction_handler.set_localizer(localizer);
        self
    }

    /// Events buffered per subscriber. Defaults to
    /// [`crate::notifications::DEFAULT_EVENT_CAPACITY`].
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.events.set_capacity(capacity);
        self
    }

    pub fn with_verification_repository(
        mut self,
        verification_repository: Arc<dyn VerificationRepository>,
    ) -> Self {
        self.verification_repository = verification_repository;
        self
    }

    /// Stores the app key and strategies, then registers with the payment
    /// queue. Transaction updates are handled from this point on.
    pub fn start(
        self: &Arc<Self>,
        app_key: impl Into<String>,
        payment_authorizer: Option<Arc<dyn PaymentAuthorizer>>,
        transaction_update_observer: Option<Arc<dyn TransactionUpdateObserver>>,
    ) {
        *self.app_key.write() = Some(app_key.into());
        *self.payment_authorizer.write() = payment_authorizer;
        *self.transaction_update_observer.write() = transaction_update_observer;
        self.queue.add_observer(self.clone());
        info!("purchases started, observing payment queue");
    }

    pub fn application_will_terminate(&self) {
        self.queue.remove_observer();
        info!("stopped observing payment queue");
    }

    /// Receiver for all purchase events posted from now on. A subscriber
    /// that falls more than the event capacity behind receives
    /// `RecvError::Lagged` and misses the oldest events; see
    /// [`PurchaseUtil::with_event_capacity`].
    pub fn subscribe(&self) -> broadcast::Receiver<PurchaseEvent> {
        self.events.subscribe()
    }

    pub fn server_url(&self) -> Url {
        self.server_url.read().clone()
    }

    pub fn set_server_url(&self, server_url: Url) {
        *self.server_url.write() = server_url;
    }

    pub fn set_server_url_str(&self, server_url: &str) -> Result<(), PurchaseError> {
        self.set_server_url(Url::parse(server_url)?);
        Ok(())
    }

    /// The raw purchase receipt, if the device has one.
    pub fn receipt(&self) -> Option<Vec<u8>> {
        self.receipts.receipt()
    }

    /// Options from the last successful [`PurchaseUtil::load`], or `None` if
    /// no load has completed yet.
    pub fn options(&self) -> Option<Vec<PurchasableOption>> {
        self.options.read().clone()
    }

    pub fn option(&self, product_id: &str) -> Option<PurchasableOption> {
        self.options
            .read()
            .as_ref()?
            .iter()
            .find(|o| o.product_id() == product_id)
            .cloned()
    }

    /// Requests product metadata from the catalog. The outcome is published
    /// as [`PurchaseEvent::OptionsLoaded`] or
    /// [`PurchaseEvent::OptionsFailedToLoad`]; the current options are kept
    /// on failure.
    pub async fn load<I, S>(&self, product_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let product_ids: HashSet<String> = product_ids.into_iter().map(Into::into).collect();
        match self.catalog.request_products(product_ids).await {
            Ok(products) => {
                let options: Vec<PurchasableOption> = products
                    .into_iter()
                    .map(PurchasableOption::from_product)
                    .collect();
                info!(count = options.len(), "purchase options loaded");
                *self.options.write() = Some(options);
                self.events.post(PurchaseEvent::OptionsLoaded);
            }
            Err(error) => {
                let description = describe(Some(&error), self.transaction_handler.localizer());
                warn!(%error, %description, "purchase options failed to load");
                self.events
                    .post(PurchaseEvent::OptionsFailedToLoad { error, description });
            }
        }
    }

    /// Submits a payment for the option's product. The outcome arrives
    /// later as a transaction update.
    pub fn purchase(&self, option: &PurchasableOption) {
        info!(product_id = option.product_id(), "submitting payment");
        self.queue.add_payment(Payment::new(option.product_id()));
    }

    pub fn purchase_product_id(&self, product_id: &str) -> Result<(), PurchaseError> {
        let option = self
            .option(product_id)
            .ok_or_else(|| PurchaseError::UnknownProduct(product_id.to_string()))?;
        self.purchase(&option);
        Ok(())
    }

    /// Asks the queue to restore completed transactions. With
    /// `verify_instantly`, also verifies the receipt right away, without
    /// waiting for the restore to complete, and returns the result.
    ///
    /// Restore completion is published separately as
    /// [`PurchaseEvent::RestoreSuccessful`] or [`PurchaseEvent::RestoreFailed`].
    pub async fn restore(
        &self,
        verify_instantly: bool,
    ) -> Option<Result<VerificationResponse, PurchaseError>> {
        info!(verify_instantly, "restoring completed transactions");
        self.queue.restore_completed_transactions();
        if verify_instantly {
            Some(self.verify().await)
        } else {
            None
        }
    }

    /// Sends the receipt to the verification server.
    pub async fn verify(&self) -> Result<VerificationResponse, PurchaseError> {
        self.verify_receipt().await?.ok_or(PurchaseError::EmptyResponse)
    }

    pub async fn is_subscribed(&self) -> SubscriptionCheck {
        match self.verify_receipt().await {
            Ok(Some(response)) => SubscriptionCheck::subscribed(response.is_subscribed),
            Ok(None) => SubscriptionCheck::failed(PurchaseError::internal()),
            Err(error) => SubscriptionCheck::failed(error),
        }
    }

    async fn verify_receipt(&self) -> Result<Option<VerificationResponse>, PurchaseError> {
        let app_key = self.app_key.read().clone().ok_or(PurchaseError::NotStarted)?;
        let server_url = self.server_url();
        let receipt = match self.receipt() {
            Some(data) => STANDARD.encode(data),
            None => {
                warn!("no receipt available, verifying with an empty receipt");
                String::new()
            }
        };
        self.verification_repository
            .verify(&server_url, receipt, app_key)
            .await
    }
}

impl PaymentTransactionObserver for PurchaseUtil {
    fn updated_transactions(&self, queue: &dyn PaymentQueue, transactions: &[PaymentTransaction]) {
        self.transaction_handler
            .handle_batch(queue, transactions, &self.events);
        let observer = self.transaction_update_observer.read().clone();
        if let Some(observer) = observer {
            observer.transactions_updated(queue, transactions);
        }
    }

    fn restore_completed_transactions_finished(&self, _queue: &dyn PaymentQueue) {
        info!("restore completed");
        self.events.post(PurchaseEvent::RestoreSuccessful);
    }

    fn restore_completed_transactions_failed(&self, _queue: &dyn PaymentQueue, error: StoreError) {
        warn!(%error, "restore failed");
        self.events.post(PurchaseEvent::RestoreFailed { error });
    }

    fn should_add_store_payment(
        &self,
        _queue: &dyn PaymentQueue,
        payment: &Payment,
        _product: &Product,
    ) -> bool {
        let authorizer = self.payment_authorizer.read().clone();
        authorizer.is_some_and(|a| a.should_add_store_payment(payment))
    }
}
