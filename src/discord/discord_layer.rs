// Discord layer - commands and event handlers.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "registration/class_buttons.rs"]
pub mod class_buttons;

// Re-export command types for convenience
pub use commands::register::{Context, Data, Error};
