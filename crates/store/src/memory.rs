use async_trait::async_trait;
use events::{sort_kind_counts, EventFilter, EventStore, KindCount, StoreError, StoredEvent};
use tokio::sync::RwLock;

/// [`EventStore`] backed by a vector in process memory.
///
/// Documents are kept in insertion order; the position doubles as the
/// internal identifier and breaks timestamp ties.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    documents: RwLock<Vec<StoredEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, event: StoredEvent) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        documents.push(event);
        tracing::debug!(position = documents.len() - 1, "Inserted event document");
        Ok(())
    }

    async fn find(&self, filter: EventFilter) -> Result<Vec<StoredEvent>, StoreError> {
        let documents = self.documents.read().await;

        // Reverse insertion order first; the stable sort then keeps newer
        // inserts ahead of older ones with the same timestamp.
        let mut found: Vec<StoredEvent> = documents
            .iter()
            .rev()
            .filter(|event| match filter.kind.as_deref() {
                Some(kind) => event.kind().as_str() == kind,
                None => true,
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(max) = filter.limit.max_documents() {
            found.truncate(max);
        }
        Ok(found)
    }

    async fn count_by_kind(&self) -> Result<Vec<KindCount>, StoreError> {
        let documents = self.documents.read().await;

        let mut counts: Vec<KindCount> = Vec::new();
        for event in documents.iter() {
            let kind = event.kind();
            match counts.iter_mut().find(|c| c.kind == kind) {
                Some(group) => group.count += 1,
                None => counts.push(KindCount { kind, count: 1 }),
            }
        }
        sort_kind_counts(&mut counts);
        Ok(counts)
    }
}
