//! Domain models for CatchEat Core

pub mod store;
pub mod user;

pub use store::*;
pub use user::*;
