//! Password hashing.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`)
//! with a random per-hash salt. Verification reads the cost parameters from
//! the stored hash, so hashes made under an older policy keep verifying, as
//! long as those parameters stay within the policy's ceilings.

use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier, Version};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Cost parameters and defaults for password hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
    /// Password given to newly created users.
    pub default_password: String,
    /// Minimum length for user-chosen passwords.
    pub min_length: usize,
    /// Largest memory cost accepted from a stored hash, in KiB.
    pub max_memory_kib: u32,
    /// Largest pass count accepted from a stored hash.
    pub max_iterations: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
            default_password: "changeme".to_string(),
            min_length: 8,
            max_memory_kib: 256 * 1024,
            max_iterations: 16,
        }
    }
}

/// Algorithm and cost parameters read from a stored hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashInfo {
    /// Algorithm identifier, e.g. `argon2id`.
    pub algorithm: String,
    /// Algorithm version.
    pub version: Option<u32>,
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

/// Salted, cost-parameterised password hasher.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    policy: PasswordPolicy,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
            policy: PasswordPolicy::default(),
        }
    }
}

impl PasswordHasher {
    /// Create a hasher for `policy`, rejecting out-of-range cost parameters.
    pub fn new(policy: PasswordPolicy) -> Result<Self, AuthError> {
        if policy.memory_kib > policy.max_memory_kib || policy.iterations > policy.max_iterations
        {
            return Err(AuthError::InvalidPolicy(format!(
                "cost m={} t={} exceeds the ceiling m={} t={}",
                policy.memory_kib, policy.iterations, policy.max_memory_kib, policy.max_iterations
            )));
        }
        let params = Params::new(
            policy.memory_kib,
            policy.iterations,
            policy.parallelism,
            None,
        )
        .map_err(|e| AuthError::InvalidPolicy(e.to_string()))?;
        Ok(Self { params, policy })
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Hash the policy's default password.
    pub fn hash_default(&self) -> Result<String, AuthError> {
        self.hash(&self.policy.default_password)
    }

    /// Verify a password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error if the hash is malformed
    /// or its cost exceeds the policy ceiling.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = parse(hash)?;
        self.check_limits(&parsed)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::MalformedHash(e.to_string())),
        }
    }

    /// Read the algorithm and cost parameters of a stored hash.
    pub fn inspect(hash: &str) -> Result<HashInfo, AuthError> {
        hash_info(&parse(hash)?)
    }

    /// Check a stored hash parses and its cost is within the policy ceiling.
    pub fn check_hash(&self, hash: &str) -> Result<HashInfo, AuthError> {
        self.check_limits(&parse(hash)?)
    }

    /// Validate password strength.
    pub fn validate_strength(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.policy.min_length {
            return Err(AuthError::WeakPassword(format!(
                "password must be at least {} characters",
                self.policy.min_length
            )));
        }

        let has_upper = password.chars().any(|c| c.is_uppercase());
        let has_lower = password.chars().any(|c| c.is_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if !has_upper || !has_lower || !has_digit {
            return Err(AuthError::WeakPassword(
                "password must contain uppercase, lowercase, and numbers".to_string(),
            ));
        }

        Ok(())
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn check_limits(&self, parsed: &PasswordHash<'_>) -> Result<HashInfo, AuthError> {
        let info = hash_info(parsed)?;
        if info.memory_kib > self.policy.max_memory_kib
            || info.iterations > self.policy.max_iterations
        {
            return Err(AuthError::CostLimitExceeded {
                memory_kib: info.memory_kib,
                iterations: info.iterations,
            });
        }
        Ok(info)
    }
}

fn hash_info(parsed: &PasswordHash<'_>) -> Result<HashInfo, AuthError> {
    let params = Params::try_from(parsed).map_err(|e| AuthError::MalformedHash(e.to_string()))?;

    Ok(HashInfo {
        algorithm: parsed.algorithm.as_str().to_string(),
        version: parsed.version,
        memory_kib: params.m_cost(),
        iterations: params.t_cost(),
        parallelism: params.p_cost(),
    })
}

/// Parse a PHC string and check it is a complete Argon2 hash.
fn parse(hash: &str) -> Result<PasswordHash<'_>, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::MalformedHash(e.to_string()))?;
    Algorithm::try_from(parsed.algorithm).map_err(|e| AuthError::MalformedHash(e.to_string()))?;
    if parsed.salt.is_none() || parsed.hash.is_none() {
        return Err(AuthError::MalformedHash(
            "missing salt or hash output".to_string(),
        ));
    }
    Ok(parsed)
}
