use crate::notifications::Outbox;
use crate::storage::StateStorage;
use crate::tracker::HydrationTracker;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Mutex<HydrationTracker>>,
    pub outbox: Arc<Outbox>,
}

impl AppState {
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        let outbox = Arc::new(Outbox::new());
        let tracker = HydrationTracker::open(storage, outbox.clone());
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            outbox,
        }
    }
}
