//! User accounts for storekeep.
//!
//! Provides the user entity, its ordering gate, and salted password hashing.

mod error;
mod password;
mod user;

pub use error::AuthError;
pub use password::{HashInfo, PasswordHasher, PasswordPolicy};
pub use user::{User, UserStatus};
