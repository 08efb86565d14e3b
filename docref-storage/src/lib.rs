//! DOCREF Storage - Lookup Trait and Mock Implementation
//!
//! Defines the storage seam the reference binder issues lookups against.
//! Real backends live with the persistence framework; this crate only ships
//! the trait and an in-memory mock for tests.

pub mod mock;

pub use mock::MockFinder;

use async_trait::async_trait;
use docref_core::{Document, DocrefResult, ObjectId};
use std::fmt;

// ============================================================================
// CRITERIA
// ============================================================================

/// Lookup criteria: identity equal to `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Criteria {
    pub id: ObjectId,
}

impl Criteria {
    /// Criteria matching the document whose identity is `id`.
    pub fn by_id(id: ObjectId) -> Self {
        Self { id }
    }

    /// Whether `doc` satisfies these criteria.
    pub fn matches<R: Document>(&self, doc: &R) -> bool {
        doc.id() == self.id
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ _id: {} }}", self.id)
    }
}

// ============================================================================
// FINDER TRAIT
// ============================================================================

/// Storage lookup for a related document type.
///
/// `Ok(None)` means the lookup succeeded and nothing matched. Errors are
/// transport or storage failures and are surfaced to callers unchanged.
#[async_trait]
pub trait DocumentFinder<R: Document>: Send + Sync {
    /// Fetch at most one document matching `criteria`.
    async fn find_one(&self, criteria: &Criteria) -> DocrefResult<Option<R>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag {
        id: ObjectId,
    }

    impl Document for Tag {
        const MODEL_NAME: &'static str = "Tag";

        fn id(&self) -> ObjectId {
            self.id
        }
    }

    #[test]
    fn test_criteria_matches_by_identity() {
        let tag = Tag {
            id: ObjectId::from_u64(7),
        };
        assert!(Criteria::by_id(ObjectId::from_u64(7)).matches(&tag));
        assert!(!Criteria::by_id(ObjectId::from_u64(8)).matches(&tag));
    }

    #[test]
    fn test_criteria_display() {
        let criteria = Criteria::by_id(ObjectId::from_u64(5));
        assert_eq!(criteria.to_string(), "{ _id: 000000000000000000000005 }");
    }
}
