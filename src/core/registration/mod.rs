pub mod allow_list;
pub mod registration_models;
pub mod registration_service;
pub mod registration_store;

pub use allow_list::{normalize_ign, AllowList, CanonicalIgn};
pub use registration_models::{PlayerClass, RegistrationRecord, RegistrationTable};
pub use registration_service::{RegistrationError, RegistrationService};
pub use registration_store::{record_key, RegistrationStore, StoreError};
