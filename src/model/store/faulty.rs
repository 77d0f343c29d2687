//! Stores that misbehave in specific ways, for exercising handler error paths.

use mongodb::bson::{self, Bson, Document};
use rocket::local::asynchronous::Client;
use serde::de::Error as _;

use super::{DocumentStore, MemoryStore, Store, StoreError, StoredDocument};

/// A store on which every read and write fails.
///
/// Setting up unique constraints still succeeds, so a server can be built
/// around it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokenStore;

impl BrokenStore {
    /// The error every operation fails with.
    pub fn error() -> StoreError {
        bson::de::Error::custom("stored document is corrupt").into()
    }
}

#[rocket::async_trait]
impl DocumentStore for BrokenStore {
    async fn all(&self, _collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Err(Self::error())
    }

    async fn get(&self, _collection: &str, _id: &str) -> Result<Option<StoredDocument>, StoreError> {
        Err(Self::error())
    }

    async fn find_eq(
        &self,
        _collection: &str,
        _field: &str,
        _value: Bson,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        Err(Self::error())
    }

    async fn add(&self, _collection: &str, _document: Document) -> Result<String, StoreError> {
        Err(Self::error())
    }

    async fn set(
        &self,
        _collection: &str,
        _id: &str,
        _document: Document,
    ) -> Result<(), StoreError> {
        Err(Self::error())
    }

    async fn merge(
        &self,
        _collection: &str,
        _id: &str,
        _document: Document,
    ) -> Result<(), StoreError> {
        Err(Self::error())
    }

    async fn delete(&self, _collection: &str, _id: &str) -> Result<(), StoreError> {
        Err(Self::error())
    }

    async fn ensure_unique(&self, _collection: &str, _field: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A [`MemoryStore`] whose equality queries never match anything.
///
/// This is what a handler sees when a competing write lands between its
/// uniqueness query and its own write: the query comes back empty, and only
/// the store's unique constraint stands in the way.
#[derive(Debug, Clone, Default)]
pub struct StaleQueryStore(pub MemoryStore);

#[rocket::async_trait]
impl DocumentStore for StaleQueryStore {
    async fn all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.0.all(collection).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.0.get(collection, id).await
    }

    async fn find_eq(
        &self,
        _collection: &str,
        _field: &str,
        _value: Bson,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(Vec::new())
    }

    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        self.0.add(collection, document).await
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        self.0.set(collection, id, document).await
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        self.0.merge(collection, id, document).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.0.delete(collection, id).await
    }

    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        self.0.ensure_unique(collection, field).await
    }
}

/// A local client for a server built around the given store.
pub async fn client_for(store: impl DocumentStore + 'static) -> Client {
    log4rs_test_utils::test_logging::init_logging_once_for(["questions_backend"], None, None);
    let rocket = crate::rocket_for_store(Store::new(store))
        .await
        .expect("failed to build test server");
    Client::tracked(rocket)
        .await
        .expect("failed to launch test client")
}
