// In-memory RegistrationStore, used by the service tests so they don't touch
// the filesystem. Same contract as the JSON store, minus persistence.

use crate::core::registration::{
    normalize_ign, record_key, CanonicalIgn, PlayerClass, RegistrationRecord, RegistrationStore,
    StoreError,
};
use async_trait::async_trait;
use dashmap::DashMap;

/// Maps normalized IGN -> record.
#[allow(dead_code)]
pub struct InMemoryRegistrationStore {
    data: DashMap<String, RegistrationRecord>,
}

#[allow(dead_code)]
impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

impl Default for InMemoryRegistrationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn get(&self, name: &str) -> Result<Option<RegistrationRecord>, StoreError> {
        Ok(self
            .data
            .get(&normalize_ign(name))
            .map(|entry| entry.value().clone()))
    }

    async fn set(
        &self,
        ign: &CanonicalIgn,
        user_id: &str,
        class: PlayerClass,
    ) -> Result<RegistrationRecord, StoreError> {
        let record = RegistrationRecord {
            ign: ign.as_str().to_string(),
            user_id: user_id.to_string(),
            class_name: class.label().to_string(),
            updated_at: chrono::Utc::now(),
        };
        self.data.insert(ign.key().to_string(), record.clone());
        Ok(record)
    }

    async fn restore(&self, record: RegistrationRecord) -> Result<(), StoreError> {
        self.data.insert(record_key(&record), record);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.data.remove(&normalize_ign(name)).is_some())
    }

    async fn list_all(&self) -> Result<Vec<RegistrationRecord>, StoreError> {
        Ok(self.data.iter().map(|entry| entry.value().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registration::AllowList;

    #[tokio::test]
    async fn availability_follows_ownership() {
        let store = InMemoryRegistrationStore::new();
        let allow_list = AllowList::new(["xMads"]);
        let ign = allow_list.canonical_of("xmads").unwrap();

        // Free before anyone claims it
        assert!(store.is_available("xmads", "user1").await.unwrap());
        assert!(store.is_available("xmads", "user2").await.unwrap());

        store.set(&ign, "user1", PlayerClass::Berserker).await.unwrap();

        assert!(store.is_available("XMADS", "user1").await.unwrap());
        assert!(!store.is_available("xmads", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn list_all_returns_every_record() {
        let store = InMemoryRegistrationStore::new();
        let allow_list = AllowList::default();

        for (name, user) in [("Fize", "1"), ("Feyt", "2"), ("dE", "3")] {
            let ign = allow_list.canonical_of(name).unwrap();
            store.set(&ign, user, PlayerClass::Skald).await.unwrap();
        }

        let mut names: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.ign)
            .collect();
        names.sort();
        assert_eq!(names, vec!["Feyt", "Fize", "dE"]);
    }
}
