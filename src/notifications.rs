use std::sync::Arc;

use serde::Serialize;
use tokio::{
    runtime::Handle,
    sync::{broadcast, mpsc},
};
use tracing::{debug, warn};

use crate::domain::entities::store_error::StoreError;

/// Events buffered per subscriber before the slowest one starts lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Work handed to a [`MainContext`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Outcome events published to application observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PurchaseEvent {
    /// The purchase options finished loading from the catalog.
    OptionsLoaded,
    OptionsFailedToLoad {
        error: StoreError,
        description: String,
    },
    /// The queue finished re-delivering completed transactions.
    RestoreSuccessful,
    RestoreFailed {
        error: StoreError,
    },
    PurchaseSuccessful,
    PurchaseFailed {
        error: Option<StoreError>,
        description: String,
    },
}

impl PurchaseEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PurchaseEvent::OptionsLoaded => "InAppServiceOptionsLoadedNotification",
            PurchaseEvent::OptionsFailedToLoad { .. } => "InAppServiceOptionsFailedToLoadNotification",
            PurchaseEvent::RestoreSuccessful => "InAppServiceRestoreSuccessfulNotification",
            PurchaseEvent::RestoreFailed { .. } => "InAppServiceRestoreFailedNotification",
            PurchaseEvent::PurchaseSuccessful => "InAppServicePurchaseSuccessfulNotification",
            PurchaseEvent::PurchaseFailed { .. } => "InAppServicePurchaseFailedNotification",
        }
    }
}

/// The scheduling context events are delivered on, typically the thread or
/// runtime the UI runs on.
pub trait MainContext: Send + Sync {
    /// Tasks dispatched from one thread must run in dispatch order.
    fn dispatch(&self, task: Task);
}

/// Runs tasks immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineContext;

impl MainContext for InlineContext {
    fn dispatch(&self, task: Task) {
        task()
    }
}

/// Runs tasks one at a time, in dispatch order, on a designated tokio
/// runtime.
#[derive(Debug, Clone)]
pub struct TokioContext {
    sender: mpsc::UnboundedSender<Task>,
}

impl TokioContext {
    /// Spawns the task draining dispatched work onto `handle`.
    pub fn new(handle: Handle) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        handle.spawn(async move {
            while let Some(task) = receiver.recv().await {
                task();
            }
        });
        Self { sender }
    }

    /// Uses the runtime of the caller. Panics outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl MainContext for TokioContext {
    fn dispatch(&self, task: Task) {
        if self.sender.send(task).is_err() {
            warn!("main context runtime has shut down, dropping event");
        }
    }
}

/// Broadcasts [`PurchaseEvent`]s to every subscriber, always through the
/// configured [`MainContext`].
pub struct PurchaseEventBus {
    sender: broadcast::Sender<PurchaseEvent>,
    context: Arc<dyn MainContext>,
}

impl PurchaseEventBus {
    pub fn new(context: Arc<dyn MainContext>) -> Self {
        Self::with_capacity(context, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(context: Arc<dyn MainContext>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, context }
    }

    /// A receiver for every event posted from now on.
    ///
    /// At most `capacity` events are buffered for a receiver. One that falls
    /// further behind gets [`broadcast::error::RecvError::Lagged`] and the
    /// oldest events are lost to it.
    pub fn subscribe(&self) -> broadcast::Receiver<PurchaseEvent> {
        self.sender.subscribe()
    }

    /// Replaces the channel; existing receivers stop getting events.
    pub fn set_capacity(&mut self, capacity: usize) {
        let (sender, _) = broadcast::channel(capacity);
        self.sender = sender;
    }

    pub fn set_context(&mut self, context: Arc<dyn MainContext>) {
        self.context = context;
    }

    pub fn post(&self, event: PurchaseEvent) {
        let sender = self.sender.clone();
        self.context.dispatch(Box::new(move || {
            let name = event.name();
            match sender.send(event) {
                Ok(receivers) => debug!(event = name, receivers, "posted purchase event"),
                Err(_) => debug!(event = name, "posted purchase event with no subscribers"),
            }
        }));
    }
}

impl Default for PurchaseEventBus {
    fn default() -> Self {
        Self::new(Arc::new(InlineContext))
    }
}
