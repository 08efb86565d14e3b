//! In-memory mock finder for testing.
//!
//! Records every lookup it receives so tests can assert how many round trips
//! the binder made, and can be switched into a failing mode to exercise the
//! error path.

use async_trait::async_trait;
use docref_core::{Document, DocrefError, DocrefResult, ObjectId, StorageError};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use crate::{Criteria, DocumentFinder};

/// In-memory document finder for testing.
#[derive(Debug)]
pub struct MockFinder<R> {
    documents: RwLock<HashMap<ObjectId, R>>,
    lookups: RwLock<Vec<Criteria>>,
    failure: RwLock<Option<DocrefError>>,
    latency: Option<Duration>,
}

impl<R> Default for MockFinder<R> {
    fn default() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            lookups: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
            latency: None,
        }
    }
}

impl<R: Document + Clone> MockFinder<R> {
    /// Create an empty mock finder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock finder holding `documents`.
    pub fn with_documents(documents: impl IntoIterator<Item = R>) -> Self {
        let documents = documents.into_iter().map(|d| (d.id(), d)).collect();
        Self {
            documents: RwLock::new(documents),
            ..Self::default()
        }
    }

    /// Delay every lookup by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store a document, replacing any with the same id.
    pub fn insert(&self, doc: R) -> DocrefResult<()> {
        self.documents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(doc.id(), doc);
        Ok(())
    }

    /// Remove a document by id.
    pub fn remove(&self, id: ObjectId) -> DocrefResult<Option<R>> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(documents.remove(&id))
    }

    /// Make every subsequent lookup fail with `error` until [`Self::recover`].
    pub fn fail_with(&self, error: impl Into<DocrefError>) -> DocrefResult<()> {
        *self
            .failure
            .write()
            .map_err(|_| StorageError::LockPoisoned)? = Some(error.into());
        Ok(())
    }

    /// Stop failing lookups.
    pub fn recover(&self) -> DocrefResult<()> {
        *self
            .failure
            .write()
            .map_err(|_| StorageError::LockPoisoned)? = None;
        Ok(())
    }

    /// Number of lookups issued so far.
    pub fn lookup_count(&self) -> DocrefResult<usize> {
        let lookups = self
            .lookups
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(lookups.len())
    }

    /// Every criteria received, in order.
    pub fn lookups(&self) -> DocrefResult<Vec<Criteria>> {
        let lookups = self
            .lookups
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(lookups.clone())
    }
}

#[async_trait]
impl<R: Document + Clone> DocumentFinder<R> for MockFinder<R> {
    async fn find_one(&self, criteria: &Criteria) -> DocrefResult<Option<R>> {
        self.lookups
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .push(*criteria);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let failure = self
            .failure
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone();
        if let Some(err) = failure {
            return Err(err);
        }

        let documents = self
            .documents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(documents.get(&criteria.id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: ObjectId,
        label: String,
    }

    impl Document for Tag {
        const MODEL_NAME: &'static str = "Tag";

        fn id(&self) -> ObjectId {
            self.id
        }
    }

    fn make_tag(n: u64) -> Tag {
        Tag {
            id: ObjectId::from_u64(n),
            label: format!("tag-{n}"),
        }
    }

    #[tokio::test]
    async fn test_find_one_hit_and_miss() {
        let finder = MockFinder::with_documents([make_tag(1), make_tag(2)]);

        let hit = finder
            .find_one(&Criteria::by_id(ObjectId::from_u64(2)))
            .await
            .expect("lookup should succeed");
        assert_eq!(hit, Some(make_tag(2)));

        let miss = finder
            .find_one(&Criteria::by_id(ObjectId::from_u64(3)))
            .await
            .expect("lookup should succeed");
        assert_eq!(miss, None);

        assert_eq!(finder.lookup_count().unwrap(), 2);
        assert_eq!(
            finder.lookups().unwrap(),
            vec![
                Criteria::by_id(ObjectId::from_u64(2)),
                Criteria::by_id(ObjectId::from_u64(3)),
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_mode_and_recovery() {
        let finder = MockFinder::with_documents([make_tag(1)]);
        let criteria = Criteria::by_id(ObjectId::from_u64(1));

        finder.fail_with(StorageError::LookupFailed {
            model_name: "Tag".to_string(),
            reason: "connection reset".to_string(),
        })
        .unwrap();
        let err = finder.find_one(&criteria).await.unwrap_err();
        assert!(matches!(
            err,
            DocrefError::Storage(StorageError::LookupFailed { .. })
        ));

        finder.recover().unwrap();
        let found = finder.find_one(&criteria).await.unwrap();
        assert!(found.is_some());
        assert_eq!(finder.lookup_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let finder: MockFinder<Tag> = MockFinder::new();
        finder.insert(make_tag(4)).unwrap();

        let removed = finder.remove(ObjectId::from_u64(4)).unwrap();
        assert_eq!(removed, Some(make_tag(4)));

        let found = finder
            .find_one(&Criteria::by_id(ObjectId::from_u64(4)))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_latency_still_answers() {
        let finder =
            MockFinder::with_documents([make_tag(1)]).with_latency(Duration::from_millis(5));
        let found = finder
            .find_one(&Criteria::by_id(ObjectId::from_u64(1)))
            .await
            .unwrap();
        assert_eq!(found.map(|t| t.label), Some("tag-1".to_string()));
    }

    #[tokio::test]
    async fn test_poisoned_locks_report_storage_error() {
        let finder = MockFinder::with_documents([make_tag(1)]);
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _documents = finder.documents.write().unwrap();
            let _lookups = finder.lookups.write().unwrap();
            panic!("writer panicked while holding the locks");
        }));
        assert!(poisoned.is_err());

        let poisoned_err = DocrefError::Storage(StorageError::LockPoisoned);
        assert_eq!(finder.insert(make_tag(2)), Err(poisoned_err.clone()));
        assert_eq!(finder.remove(ObjectId::from_u64(1)), Err(poisoned_err.clone()));
        assert_eq!(finder.lookup_count(), Err(poisoned_err.clone()));
        assert_eq!(finder.lookups(), Err(poisoned_err.clone()));
        assert_eq!(
            finder.find_one(&Criteria::by_id(ObjectId::from_u64(1))).await,
            Err(poisoned_err)
        );
    }
}
