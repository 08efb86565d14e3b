//! Reference binder: getter, validated setter and memoizing async loader.
//!
//! Per owning instance and relation the binder moves between two states:
//!
//! ```text
//! Unset ─── set() / load() ──→ Cached
//!                                 │
//!                     set() (same id) / load() ↺
//! ```
//!
//! Nothing moves a relation back to `Unset`; there is no invalidation.

use std::sync::Arc;

use docref_core::{
    ConfigError, DocrefResult, Document, ObjectId, ReferenceError, RelationConfig,
    RelationOptions, StorageError, MODEL_NAME_KEY,
};
use docref_storage::{Criteria, DocumentFinder};
use tracing::{debug, instrument, warn};

use crate::lens::FieldLens;
use crate::schema::DynDocument;
use crate::slot::ReferenceSlot;

/// Binds related document `R` onto owning document `O`.
///
/// Built once per relation and shared by every instance of `O`. The identifier
/// field (`Option<ObjectId>`, `None` meaning unset) is the persisted source of
/// truth; the [`ReferenceSlot`] is a process-local cache that never diverges
/// from it.
pub struct ReferenceBinder<O, R> {
    config: Arc<RelationConfig>,
    id_field: FieldLens<O, Option<ObjectId>>,
    slot: FieldLens<O, ReferenceSlot<R>>,
    finder: Arc<dyn DocumentFinder<R>>,
}

impl<O, R> ReferenceBinder<O, R>
where
    O: Send + Sync + 'static,
    R: Document,
{
    /// Validate `options` and build the binder.
    ///
    /// Fails with [`ConfigError::MissingRequired`] when a key is absent, and
    /// with [`ConfigError::InvalidValue`] when `modelName` does not name `R`.
    pub fn new(
        options: RelationOptions,
        id_field: FieldLens<O, Option<ObjectId>>,
        slot: FieldLens<O, ReferenceSlot<R>>,
        finder: Arc<dyn DocumentFinder<R>>,
    ) -> DocrefResult<Self> {
        let config = options.validate()?;
        if config.model_name() != R::MODEL_NAME {
            return Err(ConfigError::InvalidValue {
                field: MODEL_NAME_KEY.to_string(),
                value: config.model_name().to_string(),
                reason: format!("related document type is {}", R::MODEL_NAME),
            }
            .into());
        }

        Ok(Self {
            config: Arc::new(config),
            id_field,
            slot,
            finder,
        })
    }

    /// The validated relation options.
    pub fn config(&self) -> &RelationConfig {
        &self.config
    }

    /// Whether `owner` has a related document cached for its current identifier.
    pub fn is_loaded(&self, owner: &O) -> bool {
        self.cached(owner).is_some()
    }

    /// The persisted identifier of the related document, if set.
    pub fn related_id(&self, owner: &O) -> Option<ObjectId> {
        *self.id_field.get(owner)
    }

    /// Return the cached related document. Never performs I/O.
    ///
    /// A cached document whose identity no longer matches the identifier
    /// field counts as not loaded.
    pub fn get(&self, owner: &O) -> DocrefResult<Arc<R>> {
        self.cached(owner).ok_or_else(|| self.unloaded().into())
    }

    /// Attach `value`, writing its identity into the identifier field.
    ///
    /// Rejected with [`ReferenceError::Conflict`] if the identifier is already
    /// set to a different id; nothing is mutated in that case.
    pub fn set(&self, owner: &mut O, value: impl Into<Arc<R>>) -> DocrefResult<()> {
        let value = value.into();
        let id = value.id();

        if let Some(current) = self.related_id(owner) {
            if current != id {
                return Err(ReferenceError::Conflict {
                    model_name: self.config.model_name().to_string(),
                    id_key: self.config.id_key().to_string(),
                    current,
                    given: id,
                }
                .into());
            }
        }

        *self.id_field.get_mut(owner) = Some(id);
        self.slot.get_mut(owner).store(value);
        debug!(
            model = self.config.model_name(),
            virtual_key = self.config.virtual_key(),
            %id,
            "attached reference"
        );
        Ok(())
    }

    /// Type-erased setter; values that are not an `R` are rejected with
    /// [`ReferenceError::TypeMismatch`] before anything is mutated.
    pub fn set_dynamic(&self, owner: &mut O, value: DynDocument) -> DocrefResult<()> {
        let value = value
            .downcast::<R>()
            .map_err(|_| ReferenceError::TypeMismatch {
                virtual_key: self.config.virtual_key().to_string(),
                model_name: self.config.model_name().to_string(),
            })?;
        self.set(owner, value)
    }

    /// Return the related document, fetching it on first use.
    ///
    /// A cached document matching the identifier field is returned without
    /// touching storage. Otherwise one lookup is issued by identity; a match
    /// is cached and returned. On a storage error or a miss nothing is cached,
    /// so calling again retries.
    ///
    /// Takes `&mut O`, so two loads of the same instance cannot overlap.
    #[instrument(
        level = "debug",
        skip_all,
        fields(model = self.config.model_name(), virtual_key = self.config.virtual_key())
    )]
    pub async fn load(&self, owner: &mut O) -> DocrefResult<Arc<R>> {
        if let Some(cached) = self.cached(owner) {
            debug!("reference cache hit");
            return Ok(cached);
        }
        if self.slot.get(owner).is_loaded() {
            debug!("cached reference does not match identifier, reloading");
        }

        let Some(id) = self.related_id(owner) else {
            // Nothing can match an absent identity; skip the round trip.
            warn!("identifier field unset, reference cannot be resolved");
            return Err(self.not_found(None).into());
        };

        let criteria = Criteria::by_id(id);
        debug!(%criteria, "looking up reference");

        let found = match self.finder.find_one(&criteria).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, %id, "reference lookup failed");
                return Err(e);
            }
        };

        let Some(found) = found else {
            warn!(%id, "referenced document not found");
            return Err(self.not_found(Some(id)).into());
        };

        if found.id() != id {
            return Err(StorageError::UnexpectedMatch {
                model_name: self.config.model_name().to_string(),
                expected: id,
                got: found.id(),
            }
            .into());
        }

        let found = Arc::new(found);
        self.slot.get_mut(owner).store(Arc::clone(&found));
        debug!(%id, "reference loaded and cached");
        Ok(found)
    }

    fn cached(&self, owner: &O) -> Option<Arc<R>> {
        let cached = self.slot.get(owner).get()?;
        (self.related_id(owner) == Some(cached.id())).then(|| Arc::clone(cached))
    }

    fn unloaded(&self) -> ReferenceError {
        ReferenceError::Unloaded {
            model_name: self.config.model_name().to_string(),
            loader: self.config.loader_name().to_string(),
        }
    }

    fn not_found(&self, id: Option<ObjectId>) -> ReferenceError {
        ReferenceError::NotFound {
            model_name: self.config.model_name().to_string(),
            id,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
