//! The document store that every handler writes through.
//!
//! Handlers never talk to a database driver directly. They go through a
//! [`Store`], which wraps whichever [`DocumentStore`] the server was
//! configured with, and usually through the typed [`Coll`] handle on top.

use std::{ops::Deref, sync::Arc};

use mongodb::bson::{self, Bson, Document};
use thiserror::Error;

mod collection;
mod errors;
#[cfg(test)]
mod faulty;
mod memory;
mod mongo;

pub use collection::{ensure_indexes_exist, Coll, StoreCollection, WithId};
#[cfg(test)]
pub use faulty::{client_for, BrokenStore, StaleQueryStore};
pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
    #[error(transparent)]
    Encode(#[from] bson::ser::Error),
    #[error(transparent)]
    Decode(#[from] bson::de::Error),
    #[error("Duplicate key in collection `{collection}`")]
    DuplicateKey { collection: String },
}

/// A raw document together with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

/// A document database addressed by collection name and document identifier.
///
/// Identifiers are always strings. Documents passed in never carry their own
/// identifier; the store keeps it alongside.
#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in store-defined order.
    async fn all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// The document at `id`, if there is one.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Every document whose `field` equals `value` exactly.
    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Insert a document under a freshly generated identifier, returning it.
    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// Create or fully overwrite the document at `id`.
    async fn set(&self, collection: &str, id: &str, document: Document)
        -> Result<(), StoreError>;

    /// Overwrite only the given fields of the document at `id`, creating it
    /// if absent.
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError>;

    /// Remove the document at `id`. Removing a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Reject any future write that would give two documents in the
    /// collection the same value for `field`.
    ///
    /// This operation is idempotent.
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError>;
}

/// Shared handle on the configured store. This is what Rocket manages.
#[derive(Clone)]
pub struct Store(Arc<dyn DocumentStore>);

impl Store {
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self(Arc::new(store))
    }
}

impl Deref for Store {
    type Target = dyn DocumentStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
