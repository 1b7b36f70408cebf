//! Credential hashing for the internal password store.
//!
//! ## NIST 800-53 Rev5: IA-5 (Authenticator Management)
//!
//! Account passwords are stored as Argon2id PHC strings, salted per
//! account. The hashing cost lives in a per-provider [`PasswordPolicy`];
//! the complementary attempt-counting side of credential protection is
//! [`LockoutConfig`](aac_core::config::LockoutConfig), read from the same
//! provider configuration map.

use std::collections::HashMap;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{IdentityError, IdentityResult};

/// Argon2id cost parameters of one internal password provider.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        // OWASP baseline for Argon2id; providers override through their
        // configuration map.
        Self {
            memory_cost: 19 * 1024, // 19 MiB
            time_cost: 2,
            parallelism: 1,
            hash_length: 32,
        }
    }
}

impl PasswordPolicy {
    /// Creates the baseline policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads hashing overrides from a provider configuration map.
    ///
    /// Recognized keys: `memory_cost_kib` and `time_cost`. Missing,
    /// malformed, or out-of-range values keep the baseline; hashing cost
    /// is tuning, not correctness.
    #[must_use]
    pub fn from_config(configuration: &HashMap<String, serde_json::Value>) -> Self {
        let mut policy = Self::default();
        if let Some(kib) = configuration
            .get("memory_cost_kib")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
        {
            policy.memory_cost = kib;
        }
        if let Some(iterations) = configuration
            .get("time_cost")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
        {
            policy.time_cost = iterations;
        }
        policy
    }

    /// Sets the memory cost in KiB.
    #[must_use]
    pub const fn memory_cost(mut self, kib: u32) -> Self {
        self.memory_cost = kib;
        self
    }

    /// Sets the time cost (iterations).
    #[must_use]
    pub const fn time_cost(mut self, iterations: u32) -> Self {
        self.time_cost = iterations;
        self
    }

    fn build_params(&self) -> Result<Params, argon2::Error> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.hash_length as usize),
        )
    }
}

/// Hashes and verifies account passwords under one [`PasswordPolicy`].
pub struct PasswordHasherService {
    policy: PasswordPolicy,
}

impl PasswordHasherService {
    /// Creates a hasher with the given policy.
    #[must_use]
    pub const fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    /// Creates a hasher with the baseline policy.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(PasswordPolicy::default())
    }

    /// Hashes a raw password into a PHC string for the account store.
    ///
    /// ## Errors
    ///
    /// Returns `IdentityError::Configuration` when the policy parameters
    /// are rejected by Argon2 or hashing fails.
    pub fn hash(&self, password: &str) -> IdentityResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let params = self
            .policy
            .build_params()
            .map_err(|e| IdentityError::Configuration(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| IdentityError::Configuration(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verifies a password against a stored PHC string.
    ///
    /// Comparison is constant time; a mismatch is `Ok(false)`, never an
    /// error, so callers can count it as a failed attempt.
    ///
    /// ## Errors
    ///
    /// Returns `IdentityError::Configuration` when the stored hash is not
    /// a parseable PHC string.
    pub fn verify(&self, password: &str, hash: &str) -> IdentityResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| IdentityError::Configuration(e.to_string()))?;

        // Verification parameters come from the stored PHC string, not
        // from the current policy, so old hashes keep verifying after a
        // policy change.
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

impl Default for PasswordHasherService {
    fn default() -> Self {
        Self::with_defaults()
    }
}
