use super::allow_list::{normalize_ign, CanonicalIgn};
use super::registration_models::{PlayerClass, RegistrationRecord};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage port for registrations.
///
/// Lookups take raw names and normalize them; writes take a [`CanonicalIgn`]
/// so nothing that skipped the allow-list can be stored.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<RegistrationRecord>, StoreError>;

    /// Upsert the record for `ign`, stamped with the current time.
    async fn set(
        &self,
        ign: &CanonicalIgn,
        user_id: &str,
        class: PlayerClass,
    ) -> Result<RegistrationRecord, StoreError>;

    /// Put back a record snapshot previously returned by this store.
    async fn restore(&self, record: RegistrationRecord) -> Result<(), StoreError>;

    /// Returns whether a record was deleted.
    async fn remove(&self, name: &str) -> Result<bool, StoreError>;

    /// Every record, in no particular order.
    async fn list_all(&self) -> Result<Vec<RegistrationRecord>, StoreError>;

    /// Free, or already held by `user_id`.
    async fn is_available(&self, name: &str, user_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .get(name)
            .await?
            .map_or(true, |existing| existing.user_id == user_id))
    }
}

/// Key a record snapshot is stored under.
pub fn record_key(record: &RegistrationRecord) -> String {
    normalize_ign(&record.ign)
}
