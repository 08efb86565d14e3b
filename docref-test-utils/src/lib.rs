//! DOCREF Test Utilities
//!
//! Centralized test infrastructure for the DOCREF workspace:
//! - `Author` / `Post` fixtures wired with an `authorId` → `author` relation
//! - Proptest generators for ids, documents and relation options
//! - Tracing initialisation shared by every test binary

// Re-export mock finder from its source crate
pub use docref_storage::{Criteria, DocumentFinder, MockFinder};

// Re-export core types for convenience
pub use docref_binder::{
    bind_reference, downcast_document, field_lens, DynDocument, FieldLens, ReferenceBinder,
    ReferenceSlot, Registrar, Schema,
};
pub use docref_core::{
    ConfigError, DocrefError, DocrefResult, Document, ObjectId, ReferenceError, RelationConfig,
    RelationOptions, SchemaError, StorageError,
};

use once_cell::sync::Lazy;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// FIXTURES
// ============================================================================

/// Related document fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

impl Document for Author {
    const MODEL_NAME: &'static str = "Author";

    fn id(&self) -> ObjectId {
        self.id
    }
}

/// Owning document fixture. `author` is the cache slot and is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<ObjectId>,
    #[serde(skip)]
    pub author: ReferenceSlot<Author>,
}

impl Document for Post {
    const MODEL_NAME: &'static str = "Post";

    fn id(&self) -> ObjectId {
        self.id
    }
}

/// Author whose id renders as the zero-padded form of `n`.
pub fn make_author(n: u64, name: &str) -> Author {
    Author {
        id: ObjectId::from_u64(n),
        name: name.to_string(),
    }
}

/// Post with a fresh id and the given author id.
pub fn make_post(title: &str, author_id: Option<ObjectId>) -> Post {
    Post {
        id: ObjectId::new(),
        title: title.to_string(),
        author_id,
        author: ReferenceSlot::empty(),
    }
}

/// `{ idKey: "authorId", virtualKey: "author", modelName: "Author" }`.
pub fn author_options() -> RelationOptions {
    RelationOptions::new("authorId", "author", "Author")
}

/// Binder for `Post.author_id` → `Author`, looking up through `finder`.
pub fn post_author_binder(
    finder: Arc<MockFinder<Author>>,
) -> DocrefResult<ReferenceBinder<Post, Author>> {
    ReferenceBinder::new(
        author_options(),
        field_lens!(Post, author_id),
        field_lens!(Post, author),
        finder,
    )
}

/// `Post` schema with the author relation plugged in.
pub fn post_schema(finder: Arc<MockFinder<Author>>) -> DocrefResult<Schema<Post>> {
    let mut schema = Schema::new(Post::MODEL_NAME);
    schema.plugin(bind_reference(post_author_binder(finder)?))?;
    Ok(schema)
}

// ============================================================================
// GENERATORS
// ============================================================================

/// Any object id.
pub fn arb_object_id() -> impl Strategy<Value = ObjectId> {
    any::<[u8; 12]>().prop_map(ObjectId::from_bytes)
}

/// Any author.
pub fn arb_author() -> impl Strategy<Value = Author> {
    (arb_object_id(), "[A-Z][a-z]{1,12} [A-Z][a-z]{1,12}")
        .prop_map(|(id, name)| Author { id, name })
}

/// Values that are not an `Author`.
pub fn arb_non_author() -> impl Strategy<Value = DynDocument> {
    prop_oneof![
        any::<String>().prop_map(|s| Arc::new(s) as DynDocument),
        any::<u64>().prop_map(|n| Arc::new(n) as DynDocument),
        arb_object_id().prop_map(|id| Arc::new(id) as DynDocument),
        "[a-z ]{1,20}".prop_map(|title| Arc::new(make_post(&title, None)) as DynDocument),
    ]
}

/// Relation options with at least one required key missing.
pub fn arb_incomplete_options() -> impl Strategy<Value = RelationOptions> {
    proptest::array::uniform3(any::<bool>())
        .prop_filter("at least one key missing", |present| present.iter().any(|p| !p))
        .prop_map(|present| RelationOptions {
            id_key: present[0].then(|| "authorId".to_string()),
            virtual_key: present[1].then(|| "author".to_string()),
            model_name: present[2].then(|| "Author".to_string()),
        })
}

// ============================================================================
// TRACING
// ============================================================================

/// Environment variable holding the test log filter.
pub const LOG_ENV: &str = "DOCREF_LOG";

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // Another subscriber may already be installed by the test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Install the test subscriber once per process. Safe to call from every test.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
