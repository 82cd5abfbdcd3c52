//! CatchEat Core - Store Service Backend
//!
//! This crate provides the store registry REST API (CRUD plus nearby search)
//! and user authentication with local credentials and OAuth2 social login.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod migration;
pub mod oauth2;
pub mod openapi;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
