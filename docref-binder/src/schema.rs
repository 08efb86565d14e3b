//! Name-based type descriptor for owning documents.
//!
//! A [`Schema`] holds the virtual properties and async methods declared on an
//! owning type, addressed by name. Relations are attached by applying the
//! [`Registrar`] returned from [`bind_reference`], once, at type-definition
//! time. Values cross this boundary type-erased as [`DynDocument`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use docref_core::{DocrefResult, Document, SchemaError};
use futures_util::future::{BoxFuture, FutureExt};

use crate::binder::ReferenceBinder;

/// Type-erased document passed through schema accessors.
pub type DynDocument = Arc<dyn Any + Send + Sync>;

/// Recover a concrete document from a [`DynDocument`].
pub fn downcast_document<R: Document>(value: DynDocument) -> Option<Arc<R>> {
    value.downcast::<R>().ok()
}

type Getter<O> = Box<dyn Fn(&O) -> DocrefResult<DynDocument> + Send + Sync>;
type Setter<O> = Box<dyn Fn(&mut O, DynDocument) -> DocrefResult<()> + Send + Sync>;
type Method<O> =
    Box<dyn for<'a> Fn(&'a mut O) -> BoxFuture<'a, DocrefResult<DynDocument>> + Send + Sync>;

struct VirtualProperty<O> {
    getter: Getter<O>,
    setter: Setter<O>,
}

/// Virtual properties and methods declared on owning type `O`.
pub struct Schema<O> {
    name: String,
    virtuals: HashMap<String, VirtualProperty<O>>,
    methods: HashMap<String, Method<O>>,
}

impl<O: Send + 'static> Schema<O> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            virtuals: HashMap::new(),
            methods: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a computed property with custom get/set logic.
    pub fn virtual_property<G, S>(
        &mut self,
        name: impl Into<String>,
        getter: G,
        setter: S,
    ) -> DocrefResult<&mut Self>
    where
        G: Fn(&O) -> DocrefResult<DynDocument> + Send + Sync + 'static,
        S: Fn(&mut O, DynDocument) -> DocrefResult<()> + Send + Sync + 'static,
    {
        let name = self.ensure_undefined(name.into())?;
        self.virtuals.insert(
            name,
            VirtualProperty {
                getter: Box::new(getter),
                setter: Box::new(setter),
            },
        );
        Ok(self)
    }

    /// Declare an async instance method.
    pub fn method<M>(&mut self, name: impl Into<String>, method: M) -> DocrefResult<&mut Self>
    where
        M: for<'a> Fn(&'a mut O) -> BoxFuture<'a, DocrefResult<DynDocument>>
            + Send
            + Sync
            + 'static,
    {
        let name = self.ensure_undefined(name.into())?;
        self.methods.insert(name, Box::new(method));
        Ok(self)
    }

    /// Apply a registration routine such as one built by [`bind_reference`].
    pub fn plugin(&mut self, registrar: Registrar<O>) -> DocrefResult<&mut Self> {
        registrar.apply(self)?;
        Ok(self)
    }

    pub fn has_virtual(&self, name: &str) -> bool {
        self.virtuals.contains_key(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Read virtual property `name`.
    pub fn get(&self, doc: &O, name: &str) -> DocrefResult<DynDocument> {
        let property = self.virtual_named(name)?;
        (property.getter)(doc)
    }

    /// Assign virtual property `name`.
    pub fn set(&self, doc: &mut O, name: &str, value: DynDocument) -> DocrefResult<()> {
        let property = self.virtual_named(name)?;
        (property.setter)(doc, value)
    }

    /// Invoke async method `name`.
    pub async fn call(&self, doc: &mut O, name: &str) -> DocrefResult<DynDocument> {
        let method = self.methods.get(name).ok_or_else(|| SchemaError::UnknownMethod {
            schema: self.name.clone(),
            name: name.to_string(),
        })?;
        method(doc).await
    }

    /// Build a document, applying virtual assignments in order.
    ///
    /// The first failing setter aborts construction.
    pub fn create<I, K>(&self, mut doc: O, assignments: I) -> DocrefResult<O>
    where
        I: IntoIterator<Item = (K, DynDocument)>,
        K: AsRef<str>,
    {
        for (name, value) in assignments {
            self.set(&mut doc, name.as_ref(), value)?;
        }
        Ok(doc)
    }

    fn ensure_undefined(&self, name: String) -> Result<String, SchemaError> {
        if self.virtuals.contains_key(&name) || self.methods.contains_key(&name) {
            return Err(SchemaError::AlreadyDefined {
                schema: self.name.clone(),
                name,
            });
        }
        Ok(name)
    }

    fn virtual_named(&self, name: &str) -> Result<&VirtualProperty<O>, SchemaError> {
        self.virtuals
            .get(name)
            .ok_or_else(|| SchemaError::UnknownProperty {
                schema: self.name.clone(),
                name: name.to_string(),
            })
    }
}

impl<O> fmt::Debug for Schema<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut virtuals: Vec<_> = self.virtuals.keys().collect();
        let mut methods: Vec<_> = self.methods.keys().collect();
        virtuals.sort();
        methods.sort();
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("virtuals", &virtuals)
            .field("methods", &methods)
            .finish()
    }
}

/// One-shot registration routine applied to a [`Schema`].
pub struct Registrar<O> {
    register: Box<dyn FnOnce(&mut Schema<O>) -> DocrefResult<()> + Send>,
}

impl<O> Registrar<O> {
    pub fn new<F>(register: F) -> Self
    where
        F: FnOnce(&mut Schema<O>) -> DocrefResult<()> + Send + 'static,
    {
        Self {
            register: Box::new(register),
        }
    }

    pub fn apply(self, schema: &mut Schema<O>) -> DocrefResult<()> {
        (self.register)(schema)
    }
}

/// Turn a binder into a registrar declaring, on the owning schema:
///
/// - virtual `{virtualKey}`: getter / type-checked setter
/// - method `get{modelName}`: the async loader
pub fn bind_reference<O, R>(binder: ReferenceBinder<O, R>) -> Registrar<O>
where
    O: Send + Sync + 'static,
    R: Document,
{
    let binder = Arc::new(binder);

    Registrar::new(move |schema: &mut Schema<O>| {
        // Check both names before declaring either.
        let virtual_key = schema.ensure_undefined(binder.config().virtual_key().to_string())?;
        let loader_name = schema.ensure_undefined(binder.config().loader_name().to_string())?;
        if virtual_key == loader_name {
            return Err(SchemaError::AlreadyDefined {
                schema: schema.name.clone(),
                name: loader_name,
            }
            .into());
        }

        let getter = Arc::clone(&binder);
        let setter = Arc::clone(&binder);
        schema.virtual_property(
            virtual_key,
            move |doc| getter.get(doc).map(|d| d as DynDocument),
            move |doc, value| setter.set_dynamic(doc, value),
        )?;

        let loader = binder;
        schema.method(loader_name, move |doc| {
            let loader = Arc::clone(&loader);
            async move { loader.load(doc).await.map(|d| d as DynDocument) }.boxed()
        })?;

        Ok(())
    })
}
