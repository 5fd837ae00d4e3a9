//! Proptest generators for property-based testing.

use proptest::prelude::*;

use peruser_core::{ApiKey, NewUser, User, UserIndex};
use peruser_perms::Predicate;

/// Generate a valid UserIndex.
pub fn user_index() -> impl Strategy<Value = UserIndex> {
    "[A-Za-z0-9._-]{1,64}".prop_map(UserIndex::from)
}

/// Generate a valid ApiKey in the shape the store generates.
pub fn api_key() -> impl Strategy<Value = ApiKey> {
    "[0-9a-f]{40}".prop_map(ApiKey::from)
}

/// Generate a valid display name.
pub fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 ]{2,19}".prop_map(String::from)
}

/// Generate any of the three predicates.
pub fn predicate() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        Just(Predicate::Enabled),
        Just(Predicate::Admin),
        user_index().prop_map(Predicate::SelfOrAdmin),
    ]
}

/// Parameters for generating a user record.
#[derive(Debug, Clone)]
pub struct UserParams {
    pub index: UserIndex,
    pub key: ApiKey,
    pub name: String,
    pub admin: bool,
    pub enabled: bool,
}

impl Arbitrary for UserParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (user_index(), api_key(), name(), any::<bool>(), any::<bool>())
            .prop_map(|(index, key, name, admin, enabled)| UserParams {
                index,
                key,
                name,
                admin,
                enabled,
            })
            .boxed()
    }
}

impl UserParams {
    /// The create payload, with both identifiers supplied.
    pub fn to_new_user(&self) -> NewUser {
        NewUser::new(self.name.clone())
            .index(self.index.clone())
            .key(self.key.clone())
            .admin(self.admin)
            .enabled(self.enabled)
    }

    pub fn to_user(&self) -> User {
        self.to_new_user()
            .into_user(self.index.clone(), self.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use peruser_perms::{BypassDirectory, Directory, StoreDirectory};
    use peruser_store::{MemoryStore, RecordStore};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn test_generated_users_validate(params: UserParams) {
            prop_assert!(params.to_new_user().validate().is_ok());
        }

        #[test]
        fn test_admin_implies_enabled(params: UserParams) {
            let user = params.to_user();
            prop_assert!(!user.is_admin() || user.is_enabled());
        }

        #[test]
        fn test_disabled_holds_nothing(params: UserParams, predicate in predicate()) {
            let mut user = params.to_user();
            user.enabled = false;
            prop_assert!(!predicate.holds_for(&user));
        }

        #[test]
        fn test_enabled_owner_reads_own_record(params: UserParams) {
            let mut user = params.to_user();
            user.enabled = true;
            prop_assert!(Predicate::SelfOrAdmin(user.index.clone()).holds_for(&user));
        }

        #[test]
        fn test_enabled_admin_reads_any_record(params: UserParams, target in user_index()) {
            let mut user = params.to_user();
            user.enabled = true;
            user.admin = true;
            prop_assert!(Predicate::SelfOrAdmin(target).holds_for(&user));
        }

        #[test]
        fn test_non_admin_denied_other_record(params: UserParams, target in user_index()) {
            prop_assume!(target != params.index);
            let mut user = params.to_user();
            user.admin = false;
            prop_assert!(!Predicate::SelfOrAdmin(target).holds_for(&user));
        }

        #[test]
        fn test_unknown_key_denied(
            params: UserParams,
            stranger in api_key(),
            predicate in predicate(),
        ) {
            prop_assume!(stranger != params.key);
            let allowed = runtime().block_on(async {
                let store = Arc::new(MemoryStore::new());
                store.create(params.to_new_user()).await.unwrap();
                StoreDirectory::new(store)
                    .evaluate(stranger.as_str(), &predicate)
                    .await
            });
            prop_assert!(!allowed);
        }

        #[test]
        fn test_bypass_grants_everything(raw in ".{0,64}", predicate in predicate()) {
            let allowed = runtime().block_on(BypassDirectory.evaluate(&raw, &predicate));
            prop_assert!(allowed);
        }
    }
}
