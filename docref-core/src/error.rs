//! Error types for DOCREF operations

use crate::ObjectId;
use thiserror::Error;

/// Identity parsing errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Invalid object id length: expected 24 hex characters, got {len}")]
    InvalidLength { len: usize },

    #[error("Invalid object id {value:?}: not a hex string")]
    InvalidHex { value: String },
}

/// Relation configuration errors, raised once at binder setup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required option: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for option {field}: {value:?} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed {format} relation options: {reason}")]
    Malformed { format: String, reason: String },
}

/// Reference access errors.
///
/// `Unloaded`, `TypeMismatch` and `Conflict` are usage errors returned
/// synchronously from the accessors. `NotFound` comes from the loader.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("{model_name} has not been loaded yet. Use {loader}() instead.")]
    Unloaded { model_name: String, loader: String },

    #[error("\"{virtual_key}\" must be a {model_name} model")]
    TypeMismatch {
        virtual_key: String,
        model_name: String,
    },

    #[error("{model_name} must be the same as identified by the \"{id_key}\" attribute")]
    Conflict {
        model_name: String,
        id_key: String,
        current: ObjectId,
        given: ObjectId,
    },

    #[error("{model_name} not found")]
    NotFound {
        model_name: String,
        id: Option<ObjectId>,
    },
}

/// Storage collaborator errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Lookup of {model_name} failed: {reason}")]
    LookupFailed { model_name: String, reason: String },

    #[error("Lookup of {model_name} by id {expected} returned document {got}")]
    UnexpectedMatch {
        model_name: String,
        expected: ObjectId,
        got: ObjectId,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Schema declaration and dispatch errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("\"{name}\" is already defined on schema {schema}")]
    AlreadyDefined { schema: String, name: String },

    #[error("Schema {schema} has no virtual property \"{name}\"")]
    UnknownProperty { schema: String, name: String },

    #[error("Schema {schema} has no method \"{name}\"")]
    UnknownMethod { schema: String, name: String },
}

/// Master error type for all DOCREF errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocrefError {
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Result type alias for DOCREF operations.
pub type DocrefResult<T> = Result<T, DocrefError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_option_message() {
        let err = ConfigError::MissingRequired {
            field: "idKey".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required option: idKey");
    }

    #[test]
    fn test_unloaded_message_names_loader() {
        let err = ReferenceError::Unloaded {
            model_name: "Author".to_string(),
            loader: "getAuthor".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Author has not been loaded yet. Use getAuthor() instead."
        );
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = ReferenceError::TypeMismatch {
            virtual_key: "author".to_string(),
            model_name: "Author".to_string(),
        };
        assert_eq!(err.to_string(), "\"author\" must be a Author model");
    }

    #[test]
    fn test_conflict_message() {
        let err = ReferenceError::Conflict {
            model_name: "Author".to_string(),
            id_key: "authorId".to_string(),
            current: ObjectId::from_u64(2),
            given: ObjectId::from_u64(1),
        };
        assert_eq!(
            err.to_string(),
            "Author must be the same as identified by the \"authorId\" attribute"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = ReferenceError::NotFound {
            model_name: "Author".to_string(),
            id: Some(ObjectId::from_u64(1)),
        };
        assert_eq!(err.to_string(), "Author not found");
    }

    #[test]
    fn test_master_error_wraps_source() {
        let err: DocrefError = StorageError::LockPoisoned.into();
        assert!(matches!(err, DocrefError::Storage(StorageError::LockPoisoned)));
        assert_eq!(err.to_string(), "Storage error: Storage lock poisoned");
    }
}
