//! User types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use storekeep_core::ids::UserId;
use tracing::debug;

use crate::{AuthError, PasswordHasher};

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserStatus {
    /// May place orders.
    #[serde(rename = "A")]
    Active,
    /// Newly created or deactivated.
    #[default]
    #[serde(rename = "I")]
    Inactive,
    /// Blocked by an operator.
    #[serde(rename = "S")]
    Suspended,
}

impl UserStatus {
    /// Short persisted code.
    pub fn code(&self) -> &'static str {
        match self {
            UserStatus::Active => "A",
            UserStatus::Inactive => "I",
            UserStatus::Suspended => "S",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
            UserStatus::Suspended => "Suspended",
        }
    }
}

impl FromStr for UserStatus {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(UserStatus::Active),
            "I" => Ok(UserStatus::Inactive),
            "S" => Ok(UserStatus::Suspended),
            _ => Err(AuthError::UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A customer account.
///
/// A deserialized user must carry a well-formed Argon2 hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    /// User ID.
    id: UserId,
    /// Argon2 PHC string.
    password_hash: String,
    /// Display name.
    name: String,
    /// Postal address.
    address: String,
    /// Account status.
    status: UserStatus,
}

impl User {
    /// Create an inactive user whose password is the policy default.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        address: impl Into<String>,
        hasher: &PasswordHasher,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            id,
            password_hash: hasher.hash_default()?,
            name: name.into(),
            address: address.into(),
            status: UserStatus::Inactive,
        })
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn set_status(&mut self, status: UserStatus) {
        self.status = status;
    }

    pub fn activate(&mut self) {
        self.set_status(UserStatus::Active);
    }

    pub fn deactivate(&mut self) {
        self.set_status(UserStatus::Inactive);
    }

    pub fn suspend(&mut self) {
        self.set_status(UserStatus::Suspended);
    }

    /// Hash and store a new password.
    pub fn set_password(&mut self, password: &str, hasher: &PasswordHasher) -> Result<(), AuthError> {
        self.password_hash = hasher.hash(password)?;
        debug!(user_id = %self.id, "password changed");
        Ok(())
    }

    /// Store an externally produced hash after checking it parses and its
    /// cost is within the hasher's policy.
    pub fn set_password_hash(
        &mut self,
        hash: impl Into<String>,
        hasher: &PasswordHasher,
    ) -> Result<(), AuthError> {
        let hash = hash.into();
        hasher.check_hash(&hash)?;
        self.password_hash = hash;
        Ok(())
    }

    /// Check a password against the stored hash.
    pub fn validate_password(
        &self,
        password: &str,
        hasher: &PasswordHasher,
    ) -> Result<(), AuthError> {
        if hasher.verify(password, &self.password_hash)? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Check the user may place orders.
    pub fn can_order(&self) -> Result<(), AuthError> {
        if self.status != UserStatus::Active {
            return Err(AuthError::UserNotActive {
                user_id: self.id.to_string(),
                status: self.status.label(),
            });
        }
        Ok(())
    }
}

/// User fields as stored, before validation.
#[derive(Deserialize)]
struct UserRecord {
    id: UserId,
    password_hash: String,
    name: String,
    address: String,
    status: UserStatus,
}

impl TryFrom<UserRecord> for User {
    type Error = AuthError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        PasswordHasher::inspect(&record.password_hash)?;
        Ok(Self {
            id: record.id,
            password_hash: record.password_hash,
            name: record.name,
            address: record.address,
            status: record.status,
        })
    }
}
