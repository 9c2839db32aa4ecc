//! Client portal for an IT-services company: a REST API over SQLite and a
//! terminal client that consumes it.

pub mod api;
pub mod auth;
pub mod cart;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod server;
pub mod ui;
pub mod validation;
