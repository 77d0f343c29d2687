use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use log::{debug, error};
use mongodb::bson::{self, Bson};
use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
    State,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::model::db::{question::QuestionCore, text::TextEntry, user::User};

use super::{Store, StoreError, StoredDocument};

/// A type that can be directly inserted/read to/from the store.
pub trait StoreCollection: Serialize + DeserializeOwned {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A document paired with its store identifier.
///
/// Serialises flat, i.e. as `{"id": ..., ...fields}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithId<T> {
    pub id: String,
    #[serde(flatten)]
    pub inner: T,
}

impl<T> WithId<T> {
    pub fn new(id: impl Into<String>, inner: T) -> Self {
        Self {
            id: id.into(),
            inner,
        }
    }
}

impl<T> Deref for WithId<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> DerefMut for WithId<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<T: DeserializeOwned> TryFrom<StoredDocument> for WithId<T> {
    type Error = StoreError;

    fn try_from(doc: StoredDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: doc.id,
            inner: bson::from_document(doc.fields)?,
        })
    }
}

/// A store collection of the given type.
pub struct Coll<T> {
    store: Store,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Coll<T>
where
    T: StoreCollection,
{
    /// Get a handle on this collection in the given store.
    pub fn from_store(store: &Store) -> Self {
        Self {
            store: store.clone(),
            _marker: PhantomData,
        }
    }

    pub async fn all(&self) -> Result<Vec<WithId<T>>, StoreError> {
        self.store
            .all(T::NAME)
            .await?
            .into_iter()
            .map(WithId::try_from)
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<WithId<T>>, StoreError> {
        self.store
            .get(T::NAME, id)
            .await?
            .map(WithId::try_from)
            .transpose()
    }

    pub async fn find_eq(
        &self,
        field: &str,
        value: impl Into<Bson>,
    ) -> Result<Vec<WithId<T>>, StoreError> {
        self.store
            .find_eq(T::NAME, field, value.into())
            .await?
            .into_iter()
            .map(WithId::try_from)
            .collect()
    }

    pub async fn add(&self, item: &T) -> Result<String, StoreError> {
        let document = bson::to_document(item)?;
        self.store.add(T::NAME, document).await
    }

    pub async fn set(&self, id: &str, item: &T) -> Result<(), StoreError> {
        let document = bson::to_document(item)?;
        self.store.set(T::NAME, id, document).await
    }

    pub async fn merge(&self, id: &str, item: &T) -> Result<(), StoreError> {
        let document = bson::to_document(item)?;
        self.store.merge(T::NAME, id, document).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(T::NAME, id).await
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: StoreCollection,
{
    type Error = ();

    /// Get the store from the managed state and wrap it in a collection.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.guard::<&State<Store>>().await {
            request::Outcome::Success(store) => request::Outcome::Success(Coll::from_store(store)),
            _ => {
                error!("No document store is being managed");
                request::Outcome::Failure((Status::InternalServerError, ()))
            }
        }
    }
}

const QUESTIONS: &str = "questions";
impl StoreCollection for QuestionCore {
    const NAME: &'static str = QUESTIONS;
}

const USERS: &str = "users";
impl StoreCollection for User {
    const NAME: &'static str = USERS;
}

const TEXTS: &str = "texts";
impl StoreCollection for TextEntry {
    const NAME: &'static str = TEXTS;
}

/// Ensure that all the required unique constraints exist on the given store.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(store: &Store) -> Result<(), StoreError> {
    debug!("Ensuring collection indexes exist");

    // Question titles.
    store.ensure_unique(QUESTIONS, "title").await?;

    Ok(())
}
