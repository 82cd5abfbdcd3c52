//! REST API handlers

pub mod auth;
pub mod health;
pub mod metrics;
pub mod store;
pub mod user;
