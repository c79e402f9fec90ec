// Registration business logic. No serenity/poise in here: the service only
// sees raw names, opaque owner ids and a class, and answers with records or
// a RegistrationError whose message is safe to show to the member.

use super::allow_list::{AllowList, CanonicalIgn};
use super::registration_models::{PlayerClass, RegistrationRecord};
use super::registration_store::{RegistrationStore, StoreError};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("That IGN is not on the approved list.")]
    NotAllowed(String),

    #[error("{0} is already registered.")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result of a successful [`RegistrationService::register`].
///
/// Carries whatever was stored under the name before, so the write can be
/// undone if the nickname change that follows it fails.
#[derive(Debug, Clone)]
pub struct Registration {
    pub ign: CanonicalIgn,
    pub record: RegistrationRecord,
    pub previous: Option<RegistrationRecord>,
}

pub struct RegistrationService<S: RegistrationStore> {
    store: S,
    allow_list: AllowList,
    // Serializes check-then-write so two members can't both claim a name.
    write_lock: Mutex<()>,
}

impl<S: RegistrationStore> RegistrationService<S> {
    pub fn new(store: S, allow_list: AllowList) -> Self {
        Self {
            store,
            allow_list,
            write_lock: Mutex::new(()),
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub async fn get(&self, name: &str) -> Result<Option<RegistrationRecord>, RegistrationError> {
        Ok(self.store.get(name).await?)
    }

    /// Gate a candidate name for `user_id` without writing anything.
    pub async fn check(&self, name: &str, user_id: &str) -> Result<CanonicalIgn, RegistrationError> {
        let ign = self
            .allow_list
            .canonical_of(name)
            .ok_or_else(|| RegistrationError::NotAllowed(name.trim().to_string()))?;

        if !self.store.is_available(ign.key(), user_id).await? {
            return Err(RegistrationError::Unavailable(ign.to_string()));
        }

        Ok(ign)
    }

    /// Claim `name` for `user_id`. Re-registering a name you already own
    /// replaces your record (new class, new timestamp).
    pub async fn register(
        &self,
        name: &str,
        user_id: &str,
        class: PlayerClass,
    ) -> Result<Registration, RegistrationError> {
        let _guard = self.write_lock.lock().await;

        let ign = self
            .allow_list
            .canonical_of(name)
            .ok_or_else(|| RegistrationError::NotAllowed(name.trim().to_string()))?;

        let previous = self.store.get(ign.key()).await?;
        if let Some(existing) = &previous {
            if existing.user_id != user_id {
                return Err(RegistrationError::Unavailable(ign.to_string()));
            }
        }

        let record = self.store.set(&ign, user_id, class).await?;
        tracing::info!(
            ign = %ign,
            user_id,
            class = %class,
            "Registration saved"
        );

        Ok(Registration {
            ign,
            record,
            previous,
        })
    }

    /// Undo a registration whose follow-up side effect failed.
    pub async fn revert(&self, registration: &Registration) -> Result<(), RegistrationError> {
        let _guard = self.write_lock.lock().await;

        match &registration.previous {
            Some(previous) => self.store.restore(previous.clone()).await?,
            None => {
                self.store.remove(registration.ign.key()).await?;
            }
        }

        tracing::info!(ign = %registration.ign, "Registration reverted");
        Ok(())
    }

    pub async fn remove(&self, name: &str) -> Result<bool, RegistrationError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.store.remove(name).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<RegistrationRecord>, RegistrationError> {
        Ok(self.store.list_all().await?)
    }
}
