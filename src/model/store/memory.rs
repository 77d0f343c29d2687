use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use mongodb::bson::{oid::ObjectId, Bson, Document};

use super::{DocumentStore, StoreError, StoredDocument};

/// An in-process [`DocumentStore`].
///
/// Clones share the same underlying data. Documents are kept ordered by
/// identifier. Every write checks the unique constraints and applies the
/// change under one lock, so racing writers cannot both break a constraint.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<String, BTreeMap<String, Document>>,
    unique_fields: HashMap<String, HashSet<String>>,
}

impl MemoryState {
    /// Check that writing `document` at `id` keeps every unique field unique.
    fn check_unique(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
    ) -> Result<(), StoreError> {
        let (Some(fields), Some(docs)) = (
            self.unique_fields.get(collection),
            self.collections.get(collection),
        ) else {
            return Ok(());
        };
        for field in fields {
            let Some(value) = document.get(field) else {
                continue;
            };
            let clash = docs
                .iter()
                .any(|(other_id, other)| other_id != id && other.get(field) == Some(value));
            if clash {
                return Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                });
            }
        }
        Ok(())
    }

    fn collection_mut(&mut self, collection: &str) -> &mut BTreeMap<String, Document> {
        self.collections.entry(collection.to_string()).or_default()
    }
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // Nothing panics while holding the lock, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every document in the collection, for inspection in tests and tooling.
    pub fn snapshot(&self, collection: &str) -> Vec<StoredDocument> {
        self.lock()
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self.snapshot(collection))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self
            .lock()
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| StoredDocument {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self
            .snapshot(collection)
            .into_iter()
            .filter(|doc| doc.fields.get(field) == Some(&value))
            .collect())
    }

    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let id = ObjectId::new().to_hex();
        let mut state = self.lock();
        state.check_unique(collection, &id, &document)?;
        state.collection_mut(collection).insert(id.clone(), document);
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.check_unique(collection, id, &document)?;
        state.collection_mut(collection).insert(id.to_string(), document);
        Ok(())
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        let mut merged = state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .unwrap_or_default();
        for (key, value) in document {
            merged.insert(key, value);
        }
        state.check_unique(collection, id, &merged)?;
        state.collection_mut(collection).insert(id.to_string(), merged);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if let Some(docs) = self.lock().collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        self.lock()
            .unique_fields
            .entry(collection.to_string())
            .or_default()
            .insert(field.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    const COLL: &str = "things";

    #[rocket::async_test]
    async fn add_generates_distinct_ids() {
        let store = MemoryStore::default();
        let a = store.add(COLL, doc! { "n": 1 }).await.unwrap();
        let b = store.add(COLL, doc! { "n": 2 }).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.all(COLL).await.unwrap().len(), 2);
    }

    #[rocket::async_test]
    async fn find_eq_matches_exactly() {
        let store = MemoryStore::default();
        store.add(COLL, doc! { "title": "Two Sum" }).await.unwrap();
        store.add(COLL, doc! { "title": "two sum" }).await.unwrap();

        let found = store
            .find_eq(COLL, "title", Bson::from("Two Sum"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].fields, doc! { "title": "Two Sum" });
    }

    #[rocket::async_test]
    async fn set_overwrites_and_merge_keeps_other_fields() {
        let store = MemoryStore::default();
        store
            .set(COLL, "k", doc! { "a": 1, "b": 2 })
            .await
            .unwrap();
        store.set(COLL, "k", doc! { "a": 3 }).await.unwrap();
        assert_eq!(store.snapshot(COLL)[0].fields, doc! { "a": 3 });

        store
            .merge(COLL, "k", doc! { "b": 4 })
            .await
            .unwrap();
        assert_eq!(store.snapshot(COLL)[0].fields, doc! { "a": 3, "b": 4 });

        // Merging into a missing document creates it.
        store.merge(COLL, "new", doc! { "c": 5 }).await.unwrap();
        assert_eq!(store.snapshot(COLL).len(), 2);

        let fetched = store.get(COLL, "k").await.unwrap().unwrap();
        assert_eq!(fetched.fields, doc! { "a": 3, "b": 4 });
        assert_eq!(store.get(COLL, "missing").await.unwrap(), None);
    }

    #[rocket::async_test]
    async fn delete_missing_document_succeeds() {
        let store = MemoryStore::default();
        store.delete(COLL, "nothing-here").await.unwrap();
        store.add(COLL, doc! {}).await.unwrap();
        store.delete(COLL, "nothing-here").await.unwrap();
        assert_eq!(store.snapshot(COLL).len(), 1);
    }

    #[rocket::async_test]
    async fn unique_fields_are_enforced_on_every_write() {
        let store = MemoryStore::default();
        store.ensure_unique(COLL, "title").await.unwrap();
        store.ensure_unique(COLL, "title").await.unwrap();

        let first = store.add(COLL, doc! { "title": "A" }).await.unwrap();
        let second = store.add(COLL, doc! { "title": "B" }).await.unwrap();

        let err = store.add(COLL, doc! { "title": "A" }).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        let err = store
            .merge(COLL, &second, doc! { "title": "A" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        let err = store
            .set(COLL, "other", doc! { "title": "B" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        // Rewriting a document with its own value is fine.
        store
            .merge(COLL, &first, doc! { "title": "A", "x": 1 })
            .await
            .unwrap();
        assert_eq!(store.snapshot(COLL).len(), 2);
    }

    #[rocket::async_test]
    async fn concurrent_duplicate_adds_admit_only_one() {
        let store = MemoryStore::default();
        store.ensure_unique(COLL, "title").await.unwrap();

        let tasks = (0..8).map(|_| {
            let store = store.clone();
            rocket::tokio::spawn(async move { store.add(COLL, doc! { "title": "Same" }).await })
        });
        let mut successes = 0;
        for task in tasks.collect::<Vec<_>>() {
            if task.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.snapshot(COLL).len(), 1);
    }
}
