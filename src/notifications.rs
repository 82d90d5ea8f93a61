use crate::models::Notification;
use crate::reminder::NotificationSink;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

// One pending notification per tag.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Mutex<BTreeMap<String, Notification>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notification> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *pending).into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for Outbox {
    fn deliver(&self, notification: Notification) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(notification.tag.clone(), notification);
    }
}
