//! DOCREF Core - Identity, Configuration and Error Types
//!
//! Pure data structures shared by the storage seam and the reference binder.
//! This crate performs no I/O.

pub mod config;
pub mod error;
pub mod identity;

pub use config::{RelationConfig, RelationOptions, ID_KEY, MODEL_NAME_KEY, VIRTUAL_KEY};
pub use error::{
    ConfigError, DocrefError, DocrefResult, IdentityError, ReferenceError, SchemaError,
    StorageError,
};
pub use identity::{Document, ObjectId, Timestamp, OBJECT_ID_LEN};
