use log::debug;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{IndexOptions, ReplaceOptions, UpdateOptions},
    Collection, Database, IndexModel,
};
use rocket::futures::TryStreamExt;

use super::{errors::is_duplicate_key_error, DocumentStore, StoreError, StoredDocument};

/// A [`DocumentStore`] backed by a MongoDB database.
///
/// Every document's `_id` is a string: either a caller-chosen key or the hex
/// form of a freshly generated [`ObjectId`].
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Option<Document>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let documents: Vec<Document> = self
            .collection(collection)
            .find(filter, None)
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(split_id).collect())
    }
}

/// Separate the `_id` field from the rest of the document.
fn split_id(mut fields: Document) -> StoredDocument {
    let id = match fields.remove("_id") {
        Some(Bson::String(id)) => id,
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    StoredDocument { id, fields }
}

/// Translate driver errors, singling out unique index violations.
fn write_error(collection: &str, err: mongodb::error::Error) -> StoreError {
    if is_duplicate_key_error(&err) {
        StoreError::DuplicateKey {
            collection: collection.to_string(),
        }
    } else {
        StoreError::Db(err)
    }
}

#[rocket::async_trait]
impl DocumentStore for MongoStore {
    async fn all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.find(collection, None).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let document = self
            .collection(collection)
            .find_one(doc! { "_id": id }, None)
            .await?;
        Ok(document.map(split_id))
    }

    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.find(collection, Some(doc! { field: value })).await
    }

    async fn add(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        let id = ObjectId::new().to_hex();
        document.insert("_id", id.clone());
        self.collection(collection)
            .insert_one(document, None)
            .await
            .map_err(|err| write_error(collection, err))?;
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
    ) -> Result<(), StoreError> {
        document.insert("_id", id);
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection(collection)
            .replace_one(doc! { "_id": id }, document, options)
            .await
            .map_err(|err| write_error(collection, err))?;
        Ok(())
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        let update = doc! { "$set": document };
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection(collection)
            .update_one(doc! { "_id": id }, update, options)
            .await
            .map_err(|err| write_error(collection, err))?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id }, None)
            .await?;
        debug!("Deleted {} document(s) from {collection}", result.deleted_count);
        Ok(())
    }

    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let unique = IndexOptions::builder().unique(true).build();
        let index = IndexModel::builder()
            .keys(doc! { field: 1 })
            .options(unique)
            .build();
        self.collection(collection).create_index(index, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_id_handles_every_id_shape() {
        let oid = ObjectId::new();
        let doc = split_id(doc! { "_id": oid, "title": "a" });
        assert_eq!(doc.id, oid.to_hex());
        assert_eq!(doc.fields, doc! { "title": "a" });

        let doc = split_id(doc! { "_id": "me@example.com", "firstName": "Me" });
        assert_eq!(doc.id, "me@example.com");
        assert_eq!(doc.fields, doc! { "firstName": "Me" });
    }
}
