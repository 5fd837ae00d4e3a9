//! In-memory implementation of the RecordStore trait.
//!
//! Same semantics as SQLite but keeps everything in memory with no
//! persistence. Used by tests and by deployments configured with
//! `backend = "memory"`.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use peruser_core::{ApiKey, NewUser, User, UserIndex, UserUpdate};

use crate::error::{Result, StoreError};
use crate::traits::{next_free_index, RecordStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Records indexed by external index.
    users: HashMap<UserIndex, StoredUser>,

    /// Key index: api key -> user index.
    by_key: HashMap<ApiKey, UserIndex>,

    /// Insertion counter, for creation-order listings.
    next_seq: u64,

    /// Next candidate for store-assigned indexes.
    next_index: u64,
}

struct StoredUser {
    seq: u64,
    user: User,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                next_index: 1,
                ..Default::default()
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, new: NewUser) -> Result<User> {
        new.validate()?;
        let mut inner = self.write()?;

        let (index, assigned) = match &new.index {
            Some(index) => {
                if inner.users.contains_key(index) {
                    return Err(StoreError::Conflict(format!("index {} already exists", index)));
                }
                (index.clone(), None)
            }
            None => {
                let (n, index) =
                    next_free_index(inner.next_index, |i| Ok(inner.users.contains_key(i)))?;
                (index, Some(n))
            }
        };

        let key = new.key.clone().unwrap_or_else(ApiKey::generate);
        if inner.by_key.contains_key(&key) {
            return Err(StoreError::Conflict("api key already in use".into()));
        }

        // Only a committed create consumes an assigned index.
        if let Some(n) = assigned {
            inner.next_index = n + 1;
        }

        let user = new.into_user(index.clone(), key.clone());
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.by_key.insert(key, index.clone());
        inner.users.insert(
            index,
            StoredUser {
                seq,
                user: user.clone(),
            },
        );

        Ok(user)
    }

    async fn read_by_key(&self, key: &str) -> Result<User> {
        let inner = self.read()?;
        inner
            .by_key
            .get(&ApiKey::from(key))
            .and_then(|index| inner.users.get(index))
            .map(|stored| stored.user.clone())
            .ok_or_else(|| StoreError::NotFound("no user for api key".into()))
    }

    async fn read_by_index(&self, index: &UserIndex) -> Result<User> {
        let inner = self.read()?;
        inner
            .users
            .get(index)
            .map(|stored| stored.user.clone())
            .ok_or_else(|| StoreError::NotFound(index.to_string()))
    }

    async fn read_all(&self) -> Result<Vec<User>> {
        let inner = self.read()?;
        let mut stored: Vec<&StoredUser> = inner.users.values().collect();
        stored.sort_by_key(|s| s.seq);
        Ok(stored.into_iter().map(|s| s.user.clone()).collect())
    }

    async fn update_by_index(&self, index: &UserIndex, update: UserUpdate) -> Result<User> {
        update.validate()?;
        let mut inner = self.write()?;

        let old_key = inner
            .users
            .get(index)
            .map(|stored| stored.user.key.clone())
            .ok_or_else(|| StoreError::NotFound(index.to_string()))?;

        if let Some(new_key) = &update.key {
            if *new_key != old_key && inner.by_key.contains_key(new_key) {
                return Err(StoreError::Conflict("api key already in use".into()));
            }
        }

        let updated = {
            let stored = inner
                .users
                .get_mut(index)
                .ok_or_else(|| StoreError::NotFound(index.to_string()))?;
            update.apply_to(&mut stored.user);
            stored.user.clone()
        };

        if updated.key != old_key {
            inner.by_key.remove(&old_key);
            inner.by_key.insert(updated.key.clone(), index.clone());
        }

        Ok(updated)
    }

    async fn delete_by_index(&self, index: &UserIndex) -> Result<()> {
        let mut inner = self.write()?;
        let stored = inner
            .users
            .remove(index)
            .ok_or_else(|| StoreError::NotFound(index.to_string()))?;
        inner.by_key.remove(&stored.user.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peruser_core::KEY_LEN;

    fn key(c: char) -> String {
        c.to_string().repeat(KEY_LEN)
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let created = store
            .create(NewUser::new("alice").index("alice").key(key('a')))
            .await
            .unwrap();

        let by_index = store.read_by_index(&UserIndex::from("alice")).await.unwrap();
        let by_key = store.read_by_key(&key('a')).await.unwrap();

        assert_eq!(created, by_index);
        assert_eq!(created, by_key);
    }

    #[tokio::test]
    async fn test_assigns_index_and_key() {
        let store = MemoryStore::new();
        store.create(NewUser::new("taken").index("2")).await.unwrap();

        let first = store.create(NewUser::new("first")).await.unwrap();
        let second = store.create(NewUser::new("second")).await.unwrap();

        assert_eq!(first.index.as_str(), "1");
        assert_eq!(second.index.as_str(), "3");
        assert_eq!(first.key.as_str().len(), KEY_LEN);
        assert_ne!(first.key, second.key);
    }

    #[tokio::test]
    async fn test_conflicts() {
        let store = MemoryStore::new();
        store
            .create(NewUser::new("alice").index("alice").key(key('a')))
            .await
            .unwrap();

        let dup_index = store.create(NewUser::new("alice2").index("alice")).await;
        assert!(matches!(dup_index, Err(StoreError::Conflict(_))));

        let dup_key = store.create(NewUser::new("bob").key(key('a'))).await;
        assert!(matches!(dup_key, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_rejected_create_keeps_index_free() {
        let store = MemoryStore::new();
        store
            .create(NewUser::new("alice").index("alice").key(key('a')))
            .await
            .unwrap();

        let dup_key = store.create(NewUser::new("bob").key(key('a'))).await;
        assert!(matches!(dup_key, Err(StoreError::Conflict(_))));

        let bob = store.create(NewUser::new("bob")).await.unwrap();
        assert_eq!(bob.index.as_str(), "1");
    }

    #[tokio::test]
    async fn test_validation_rejected() {
        let store = MemoryStore::new();
        let res = store.create(NewUser::new("x")).await;
        assert!(matches!(res, Err(StoreError::Validation(_))));
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rekeys() {
        let store = MemoryStore::new();
        store
            .create(NewUser::new("alice").index("alice").key(key('a')))
            .await
            .unwrap();

        let update = UserUpdate {
            key: Some(ApiKey::new(key('b'))),
            ..Default::default()
        };
        let updated = store
            .update_by_index(&UserIndex::from("alice"), update)
            .await
            .unwrap();

        assert_eq!(updated.key.as_str(), key('b'));
        assert!(store.read_by_key(&key('a')).await.unwrap_err().is_not_found());
        assert_eq!(store.read_by_key(&key('b')).await.unwrap().index.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = MemoryStore::new();
        let res = store
            .update_by_index(&UserIndex::from("ghost"), UserUpdate::default())
            .await;
        assert!(res.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store
            .create(NewUser::new("alice").index("alice").key(key('a')))
            .await
            .unwrap();

        store.delete_by_index(&UserIndex::from("alice")).await.unwrap();

        assert!(store.read_by_key(&key('a')).await.unwrap_err().is_not_found());
        assert!(store
            .delete_by_index(&UserIndex::from("alice"))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_read_all_in_creation_order() {
        let store = MemoryStore::new();
        for name in ["zed", "amy", "kim"] {
            store.create(NewUser::new(name).index(name)).await.unwrap();
        }
        let names: Vec<String> = store
            .read_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["zed", "amy", "kim"]);
    }
}
