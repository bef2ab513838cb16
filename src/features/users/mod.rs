//! Users as seen by the file pipeline.
//!
//! Accounts are provisioned elsewhere; this feature only resolves the caller
//! by email, loads file owners and finds the admins to alert.

pub mod models;
pub mod repositories;

pub use models::{User, UserRole};
pub use repositories::{PgUserRepository, UserRepository};
