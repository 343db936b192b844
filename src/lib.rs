//! Project Advisor: a guided project recommendation wizard.

pub mod advisor;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
