//! Test fixtures and helpers.
//!
//! A seeded store with a fixed cast:
//!
//! | Index | Key | Admin | Enabled |
//! |---|---|---|---|
//! | `alice` | `a` x 40 | no | yes |
//! | `bob` | `b` x 40 | no | yes |
//! | `root` | `r` x 40 | yes | yes |
//! | `mallory` | `m` x 40 | yes | no |

use std::sync::Arc;

use peruser_core::{ApiKey, NewUser, User, KEY_LEN};
use peruser_perms::{Gate, StoreDirectory};
use peruser_store::{MemoryStore, RecordStore};

/// A valid key made of one repeated character.
pub fn key_of(c: char) -> ApiKey {
    ApiKey::new(c.to_string().repeat(KEY_LEN))
}

/// A memory store holding the fixed cast.
pub struct TestFixture {
    pub store: Arc<MemoryStore>,
    pub alice: User,
    pub bob: User,
    pub root: User,
    /// Admin flag set, but disabled.
    pub mallory: User,
}

impl TestFixture {
    pub async fn seeded() -> Self {
        let store = Arc::new(MemoryStore::new());

        let alice = create(&store, NewUser::new("alice").index("alice").key(key_of('a'))).await;
        let bob = create(&store, NewUser::new("bob").index("bob").key(key_of('b'))).await;
        let root = create(
            &store,
            NewUser::new("root").index("root").key(key_of('r')).admin(true),
        )
        .await;
        let mallory = create(
            &store,
            NewUser::new("mallory")
                .index("mallory")
                .key(key_of('m'))
                .admin(true)
                .enabled(false),
        )
        .await;

        Self {
            store,
            alice,
            bob,
            root,
            mallory,
        }
    }

    /// The store as the trait object the server holds.
    pub fn dyn_store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    /// A gate over this fixture's store.
    pub fn gate(&self) -> Gate {
        Gate::new(Arc::new(StoreDirectory::new(self.store.clone())))
    }
}

async fn create(store: &MemoryStore, new: NewUser) -> User {
    match store.create(new).await {
        Ok(user) => user,
        Err(e) => panic!("fixture user rejected: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peruser_perms::Predicate;

    #[tokio::test]
    async fn test_fixture_cast() {
        let fixture = TestFixture::seeded().await;

        assert_eq!(fixture.store.read_all().await.unwrap().len(), 4);
        assert!(fixture.root.is_admin());
        assert!(!fixture.mallory.is_admin());
        assert!(fixture.mallory.admin);
        assert_eq!(fixture.alice.key, key_of('a'));
    }

    #[tokio::test]
    async fn test_fixture_gate() {
        let fixture = TestFixture::seeded().await;
        let gate = fixture.gate();

        let alice = Some(fixture.alice.key.as_str());
        assert!(gate
            .check(alice, &Predicate::SelfOrAdmin(fixture.alice.index.clone()))
            .await
            .is_allowed());
        assert!(!gate
            .check(alice, &Predicate::SelfOrAdmin(fixture.bob.index.clone()))
            .await
            .is_allowed());
        assert!(!gate
            .check(Some(fixture.mallory.key.as_str()), &Predicate::Enabled)
            .await
            .is_allowed());
    }
}
