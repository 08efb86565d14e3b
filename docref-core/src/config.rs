//! Relation configuration
//!
//! A relation is declared with three names: the identifier field on the owning
//! document, the virtual accessor name, and the related model name. Options
//! arrive as loosely-typed data ([`RelationOptions`], every key optional) and
//! are validated once into an immutable [`RelationConfig`].

use serde::{Deserialize, Serialize};

use crate::{ConfigError, DocrefResult};

/// Wire name of the identifier field option.
pub const ID_KEY: &str = "idKey";
/// Wire name of the virtual accessor option.
pub const VIRTUAL_KEY: &str = "virtualKey";
/// Wire name of the related model option.
pub const MODEL_NAME_KEY: &str = "modelName";

/// Unvalidated relation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl RelationOptions {
    /// Options with all three keys present.
    pub fn new(
        id_key: impl Into<String>,
        virtual_key: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            id_key: Some(id_key.into()),
            virtual_key: Some(virtual_key.into()),
            model_name: Some(model_name.into()),
        }
    }

    /// Parse options from a JSON object such as
    /// `{"idKey": "authorId", "virtualKey": "author", "modelName": "Author"}`.
    pub fn from_json(input: &str) -> DocrefResult<Self> {
        serde_json::from_str(input).map_err(|e| {
            ConfigError::Malformed {
                format: "JSON".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Parse options from a TOML table using the same camelCase keys.
    pub fn from_toml(input: &str) -> DocrefResult<Self> {
        toml::from_str(input).map_err(|e| {
            ConfigError::Malformed {
                format: "TOML".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Check that every required key is present and non-empty.
    ///
    /// Keys are checked in the order idKey, virtualKey, modelName; the first
    /// problem found is reported.
    pub fn validate(self) -> Result<RelationConfig, ConfigError> {
        let id_key = require(ID_KEY, self.id_key)?;
        let virtual_key = require(VIRTUAL_KEY, self.virtual_key)?;
        let model_name = require(MODEL_NAME_KEY, self.model_name)?;

        let loader_name = format!("get{model_name}");
        Ok(RelationConfig {
            id_key,
            virtual_key,
            model_name,
            loader_name,
        })
    }
}

fn require(field: &str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        None => Err(ConfigError::MissingRequired {
            field: field.to_string(),
        }),
        Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: v,
            reason: "must not be empty".to_string(),
        }),
        Some(v) => Ok(v),
    }
}

/// Validated, immutable relation configuration.
///
/// Shared read-only by every instance of the owning type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationConfig {
    id_key: String,
    virtual_key: String,
    model_name: String,
    loader_name: String,
}

impl RelationConfig {
    /// Name of the persisted identifier field, e.g. `authorId`.
    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    /// Name of the virtual accessor, e.g. `author`.
    pub fn virtual_key(&self) -> &str {
        &self.virtual_key
    }

    /// Name of the related model, e.g. `Author`.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Name of the async loader method, e.g. `getAuthor`.
    pub fn loader_name(&self) -> &str {
        &self.loader_name
    }
}

impl TryFrom<RelationOptions> for RelationConfig {
    type Error = ConfigError;

    fn try_from(options: RelationOptions) -> Result<Self, Self::Error> {
        options.validate()
    }
}

// =============================================================================
// TESTS
// =============================================================================
