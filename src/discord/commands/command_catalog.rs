// Discord commands module.
// Each feature gets its own command file.

pub mod register;

pub mod registrations;

pub mod presence;
