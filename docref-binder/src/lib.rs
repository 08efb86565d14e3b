//! DOCREF Binder - Lazy Reference Resolution
//!
//! Binds a related document to an owning document that stores its foreign
//! identifier. Each relation gets three behaviours:
//!
//! - a synchronous getter returning the attached document, or failing if none
//!   is attached yet
//! - a validated setter that attaches a document and keeps the identifier
//!   field consistent with it
//! - an async loader that fetches by identifier on first use and memoizes the
//!   result on the owning instance
//!
//! Invariant: whenever the cache slot is filled, the owning identifier field
//! equals the cached document's identity.
//!
//! # Example
//!
//! ```ignore
//! let binder = ReferenceBinder::new(
//!     RelationOptions::new("authorId", "author", "Author"),
//!     field_lens!(Post, author_id),
//!     field_lens!(Post, author),
//!     finder,
//! )?;
//!
//! let author = binder.load(&mut post).await?;
//! assert!(Arc::ptr_eq(&author, &binder.get(&post)?));
//! ```

pub mod binder;
pub mod lens;
pub mod schema;
pub mod slot;

pub use binder::ReferenceBinder;
pub use lens::FieldLens;
pub use schema::{bind_reference, downcast_document, DynDocument, Registrar, Schema};
pub use slot::ReferenceSlot;

pub use docref_core::{
    ConfigError, DocrefError, DocrefResult, Document, ObjectId, ReferenceError, RelationConfig,
    RelationOptions, SchemaError, StorageError,
};
pub use docref_storage::{Criteria, DocumentFinder};
