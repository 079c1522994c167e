//! HTTP handlers shared by every box office router.

pub mod health;

pub use health::{health_check, readiness};
