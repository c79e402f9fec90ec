// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "registration/mod.rs"]
pub mod registration;

pub mod healthcheck;
