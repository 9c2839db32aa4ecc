//! Terminal client screens.
//!
//! Each screen keeps its own state, turns key presses into an action in a
//! pure `handle_key`, and leaves network calls to the application loop.

pub mod cart;
pub mod components;
pub mod home;
pub mod login;
pub mod password_wizard;
pub mod registration_wizard;
pub mod service_wizard;
