//! Per-instance cache slot for a related document.

use std::fmt;
use std::sync::Arc;

/// Non-persisted cache of a resolved related document.
///
/// Owning types embed one slot per relation and mark it `#[serde(skip)]`; the
/// identifier field next to it is what gets persisted. A slot starts empty and
/// is only filled by the binder, after the identifier field has been checked
/// or written.
///
/// Slots always compare equal, so deriving `PartialEq` on an owning type
/// compares persisted state only.
pub struct ReferenceSlot<R>(Option<Arc<R>>);

impl<R> ReferenceSlot<R> {
    /// An empty slot.
    pub const fn empty() -> Self {
        Self(None)
    }

    /// Whether a document is cached.
    pub fn is_loaded(&self) -> bool {
        self.0.is_some()
    }

    /// The cached document, if any.
    pub fn get(&self) -> Option<&Arc<R>> {
        self.0.as_ref()
    }

    pub(crate) fn store(&mut self, doc: Arc<R>) {
        self.0 = Some(doc);
    }
}

impl<R> Default for ReferenceSlot<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R> Clone for ReferenceSlot<R> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<R> PartialEq for ReferenceSlot<R> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<R> Eq for ReferenceSlot<R> {}

impl<R> fmt::Debug for ReferenceSlot<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_loaded() {
            f.write_str("ReferenceSlot(<loaded>)")
        } else {
            f.write_str("ReferenceSlot(<empty>)")
        }
    }
}
