//! Household membership → reachable device tokens.

use std::sync::Arc;

use choresync_core::entities::{User, users_path};
use choresync_core::error::{ChoreSyncError, Result};
use choresync_core::traits::DocumentStore;
use choresync_core::types::Query;

/// Resolves the push tokens of a household's members.
#[derive(Clone)]
pub struct MembershipResolver {
    store: Arc<dyn DocumentStore>,
}

impl MembershipResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Tokens of every user with `householdId == household_id`, in store order.
    ///
    /// Users without a token are skipped, as is `exclude` when given.
    /// Duplicate tokens pass through untouched. A failed store query is an
    /// error, never an empty list.
    pub async fn resolve_tokens(
        &self,
        household_id: &str,
        exclude: Option<&str>,
    ) -> Result<Vec<String>> {
        if household_id.is_empty() {
            return Err(ChoreSyncError::InvalidInput(
                "household id must not be empty".into(),
            ));
        }

        let members = self
            .store
            .query(&Query::new(users_path()).where_eq("householdId", household_id))
            .await?;

        let tokens: Vec<String> = members
            .iter()
            .map(User::from_document)
            .filter(|user| exclude != Some(user.id.as_str()))
            .filter_map(|user| user.fcm_token)
            .collect();

        tracing::debug!(
            "👥 Household {}: {} member(s), {} reachable",
            household_id,
            members.len(),
            tokens.len()
        );
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyStore;
    use choresync_core::types::Document;
    use choresync_store::MemoryStore;

    fn household() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        let users = users_path();
        store
            .insert(&users, Document::new("u1").with("householdId", "h1").with("fcmToken", "T1"))
            .unwrap();
        store
            .insert(&users, Document::new("u2").with("householdId", "h1").with("fcmToken", "T2"))
            .unwrap();
        store
            .insert(&users, Document::new("u3").with("householdId", "h1"))
            .unwrap();
        store
            .insert(&users, Document::new("u4").with("householdId", "h1").with("fcmToken", ""))
            .unwrap();
        store
            .insert(&users, Document::new("u5").with("householdId", "h2").with("fcmToken", "T5"))
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_all_reachable_members() {
        let resolver = MembershipResolver::new(household());
        let tokens = resolver.resolve_tokens("h1", None).await.unwrap();
        assert_eq!(tokens, vec!["T1", "T2"]);
    }

    #[tokio::test]
    async fn test_excludes_sender() {
        let resolver = MembershipResolver::new(household());
        let tokens = resolver.resolve_tokens("h1", Some("u1")).await.unwrap();
        assert_eq!(tokens, vec!["T2"]);
    }

    #[tokio::test]
    async fn test_excluding_unknown_user_changes_nothing() {
        let resolver = MembershipResolver::new(household());
        let tokens = resolver.resolve_tokens("h1", Some("stranger")).await.unwrap();
        assert_eq!(tokens, vec!["T1", "T2"]);
    }

    #[tokio::test]
    async fn test_duplicate_tokens_pass_through() {
        let store = MemoryStore::new();
        let users = users_path();
        for id in ["a", "b"] {
            store
                .insert(&users, Document::new(id).with("householdId", "h1").with("fcmToken", "SHARED"))
                .unwrap();
        }
        let resolver = MembershipResolver::new(Arc::new(store));
        let tokens = resolver.resolve_tokens("h1", None).await.unwrap();
        assert_eq!(tokens, vec!["SHARED", "SHARED"]);
    }

    #[tokio::test]
    async fn test_unknown_household_is_empty() {
        let resolver = MembershipResolver::new(household());
        assert!(resolver.resolve_tokens("h9", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = FlakyStore::default().fail_collection("users");
        let resolver = MembershipResolver::new(Arc::new(store));
        let err = resolver.resolve_tokens("h1", None).await.unwrap_err();
        assert!(err.is_store());
    }

    #[tokio::test]
    async fn test_empty_household_id_rejected() {
        let resolver = MembershipResolver::new(household());
        let err = resolver.resolve_tokens("", None).await.unwrap_err();
        assert!(matches!(err, ChoreSyncError::InvalidInput(_)));
    }
}
