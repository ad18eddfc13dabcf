use crate::models::LinkRecord;
use crate::storage::{LinkStore, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// In-process link store backed by two sharded maps.
///
/// `codes` is the unique index. Every write that touches both maps locks the
/// code shard first and the record shard second, and a record is always
/// inserted before its code becomes visible in the index.
#[derive(Debug)]
pub struct InMemoryStorage {
    records: DashMap<i64, LinkRecord>,
    codes: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_next_id(1)
    }

    /// Start the id sequence at `next_id` instead of 1
    pub fn with_next_id(next_id: i64) -> Self {
        Self {
            records: DashMap::new(),
            codes: DashMap::new(),
            next_id: AtomicI64::new(next_id),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn new_record(&self, original_url: &str, short_code: Option<&str>) -> LinkRecord {
        LinkRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            short_code: short_code.map(str::to_string),
            original_url: original_url.to_string(),
            created_at: chrono::Utc::now().timestamp(),
            clicks: 0,
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkStore for InMemoryStorage {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn create_with_id(&self, original_url: &str) -> StorageResult<LinkRecord> {
        let record = self.new_record(original_url, None);
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn set_short_code(&self, id: i64, short_code: &str) -> StorageResult<()> {
        match self.codes.entry(short_code.to_string()) {
            Entry::Occupied(owner) if *owner.get() == id => Ok(()),
            Entry::Occupied(_) => Err(StorageError::AliasTaken(short_code.to_string())),
            Entry::Vacant(slot) => {
                let mut record = self.records.get_mut(&id).ok_or(StorageError::NotFound)?;
                if record.short_code.is_some() {
                    return Err(StorageError::CodeAlreadySet { id });
                }
                record.short_code = Some(short_code.to_string());
                drop(record);
                slot.insert(id);
                Ok(())
            }
        }
    }

    async fn create_with_alias(
        &self,
        original_url: &str,
        short_code: &str,
    ) -> StorageResult<LinkRecord> {
        match self.codes.entry(short_code.to_string()) {
            Entry::Occupied(_) => Err(StorageError::AliasTaken(short_code.to_string())),
            Entry::Vacant(slot) => {
                let record = self.new_record(original_url, Some(short_code));
                self.records.insert(record.id, record.clone());
                slot.insert(record.id);
                Ok(record)
            }
        }
    }

    async fn find_by_code(&self, short_code: &str) -> StorageResult<LinkRecord> {
        let id = *self
            .codes
            .get(short_code)
            .ok_or(StorageError::NotFound)?
            .value();

        self.records
            .get(&id)
            .map(|record| record.value().clone())
            .ok_or(StorageError::NotFound)
    }

    async fn increment_clicks(&self, id: i64) -> StorageResult<i64> {
        let mut record = self.records.get_mut(&id).ok_or(StorageError::NotFound)?;
        record.clicks += 1;
        Ok(record.clicks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn ids_are_strictly_increasing() {
        let store = InMemoryStorage::new();

        let a = store.create_with_id("https://a.com").await.unwrap();
        let b = store.create_with_alias("https://b.com", "bee").await.unwrap();
        let c = store.create_with_id("https://c.com").await.unwrap();

        assert_eq!(a.id, 1);
        assert!(a.id < b.id && b.id < c.id);
        assert_eq!(a.short_code, None);
        assert_eq!(a.clicks, 0);
    }

    #[tokio::test]
    async fn next_id_can_be_seeded() {
        let store = InMemoryStorage::with_next_id(5);
        let record = store.create_with_id("https://example.com").await.unwrap();
        assert_eq!(record.id, 5);
    }

    #[tokio::test]
    async fn set_and_find_short_code() {
        let store = InMemoryStorage::new();
        let record = store.create_with_id("https://example.com").await.unwrap();

        store.set_short_code(record.id, "abc").await.unwrap();

        let found = store.find_by_code("abc").await.unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(found.short_code.as_deref(), Some("abc"));
        assert_eq!(found.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn set_short_code_is_idempotent() {
        let store = InMemoryStorage::new();
        let record = store.create_with_id("https://example.com").await.unwrap();

        store.set_short_code(record.id, "abc").await.unwrap();
        store.set_short_code(record.id, "abc").await.unwrap();

        assert_eq!(store.find_by_code("abc").await.unwrap().id, record.id);
    }

    #[tokio::test]
    async fn set_short_code_conflict_leaves_both_records_unchanged() {
        let store = InMemoryStorage::new();
        let owner = store.create_with_alias("https://a.com", "taken").await.unwrap();
        let other = store.create_with_id("https://b.com").await.unwrap();

        let err = store.set_short_code(other.id, "taken").await.unwrap_err();
        assert!(matches!(err, StorageError::AliasTaken(code) if code == "taken"));

        assert_eq!(store.find_by_code("taken").await.unwrap().id, owner.id);
        assert_eq!(
            store.records.get(&other.id).unwrap().short_code,
            None,
            "loser must stay code-less"
        );
    }

    #[tokio::test]
    async fn set_short_code_rejects_reassignment() {
        let store = InMemoryStorage::new();
        let record = store.create_with_id("https://example.com").await.unwrap();
        store.set_short_code(record.id, "first").await.unwrap();

        let err = store.set_short_code(record.id, "second").await.unwrap_err();
        assert!(matches!(err, StorageError::CodeAlreadySet { id } if id == record.id));
        assert!(matches!(
            store.find_by_code("second").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn set_short_code_on_missing_record() {
        let store = InMemoryStorage::new();
        let err = store.set_short_code(42, "abc").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        assert!(matches!(
            store.find_by_code("abc").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_alias_is_rejected() {
        let store = InMemoryStorage::new();
        store.create_with_alias("https://a.com", "mylink").await.unwrap();

        let err = store
            .create_with_alias("https://b.com", "mylink")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AliasTaken(_)));
        assert_eq!(
            store.find_by_code("mylink").await.unwrap().original_url,
            "https://a.com"
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn find_missing_code() {
        let store = InMemoryStorage::new();
        assert!(matches!(
            store.find_by_code("nope").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn increment_clicks_returns_new_count() {
        let store = InMemoryStorage::new();
        let record = store.create_with_alias("https://a.com", "a").await.unwrap();

        assert_eq!(store.increment_clicks(record.id).await.unwrap(), 1);
        assert_eq!(store.increment_clicks(record.id).await.unwrap(), 2);
        assert_eq!(store.find_by_code("a").await.unwrap().clicks, 2);
    }

    #[tokio::test]
    async fn increment_clicks_missing_record() {
        let store = InMemoryStorage::new();
        assert!(matches!(
            store.increment_clicks(7).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn concurrent_alias_creation_has_one_winner() {
        let store = Arc::new(InMemoryStorage::new());
        let mut handles = vec![];

        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .create_with_alias(&format!("https://example{i}.com"), "race")
                    .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(StorageError::AliasTaken(_)) => {}
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryStorage::new());
        let id = store.create_with_alias("https://a.com", "hot").await.unwrap().id;
        let mut handles = vec![];

        for _ in 0..100 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.increment_clicks(id).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.find_by_code("hot").await.unwrap().clicks, 100);
    }
}
