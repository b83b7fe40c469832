//! In-crate test double for [`EventStore`].
//!
//! Does no ordering or aggregation of its own: `find` replays the seeded
//! events in seeded order and `count_by_kind` returns canned counts. Backend
//! ordering is covered by the `store` crate's conformance tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{EventFilter, EventStore, KindCount, StoreError, StoredEvent};

/// Records inserted events and the last filter seen, and can be told to fail
/// every call.
#[derive(Default)]
pub(crate) struct FakeEventStore {
    events: Mutex<Vec<StoredEvent>>,
    counts: Mutex<Vec<KindCount>>,
    last_filter: Mutex<Option<EventFilter>>,
    failure: Mutex<Option<String>>,
    insert_calls: Mutex<usize>,
}

impl FakeEventStore {
    pub(crate) fn with_events(events: Vec<StoredEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            ..Self::default()
        }
    }

    pub(crate) fn with_counts(counts: Vec<KindCount>) -> Self {
        Self {
            counts: Mutex::new(counts),
            ..Self::default()
        }
    }

    pub(crate) fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn events(&self) -> Vec<StoredEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn last_filter(&self) -> Option<EventFilter> {
        self.last_filter.lock().unwrap().clone()
    }

    pub(crate) fn insert_calls(&self) -> usize {
        *self.insert_calls.lock().unwrap()
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(StoreError::unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EventStore for FakeEventStore {
    async fn insert(&self, event: StoredEvent) -> Result<(), StoreError> {
        *self.insert_calls.lock().unwrap() += 1;
        self.check()?;
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn find(&self, filter: EventFilter) -> Result<Vec<StoredEvent>, StoreError> {
        *self.last_filter.lock().unwrap() = Some(filter.clone());
        self.check()?;
        let mut found: Vec<StoredEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| filter.kind.as_deref().map_or(true, |k| e.kind().as_str() == k))
            .cloned()
            .collect();
        if let Some(max) = filter.limit.max_documents() {
            found.truncate(max);
        }
        Ok(found)
    }

    async fn count_by_kind(&self) -> Result<Vec<KindCount>, StoreError> {
        self.check()?;
        Ok(self.counts.lock().unwrap().clone())
    }
}
