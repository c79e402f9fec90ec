// Implementations of the registration store.

pub mod in_memory;
pub mod json_store;

#[allow(unused_imports)]
pub use in_memory::InMemoryRegistrationStore;
pub use json_store::JsonRegistrationStore;
