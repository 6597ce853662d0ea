//! Password Hashing
//!
//! Argon2id hashing and verification for local accounts.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::debug;

use crate::shared::error::{PlatformError, Result};

/// Password policy configuration
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_digit: bool,
    pub require_letter: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_digit: true,
            require_letter: true,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: &str) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if password.len() < self.min_length {
            errors.push(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }
        if password.len() > self.max_length {
            errors.push(format!(
                "Password must be at most {} characters",
                self.max_length
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one digit".to_string());
        }
        if self.require_letter && !password.chars().any(|c| c.is_alphabetic()) {
            errors.push("Password must contain at least one letter".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// No composition rules, only a length floor. For development/testing.
    pub fn lenient() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_digit: false,
            require_letter: false,
        }
    }
}

/// Argon2id configuration
#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_len: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
            output_len: 32,
        }
    }
}

impl Argon2Config {
    /// Low memory config for testing (faster but less secure)
    pub fn testing() -> Self {
        Self {
            memory_cost: 4096, // 4 MiB
            time_cost: 1,
            parallelism: 1,
            output_len: 32,
        }
    }

    fn to_params(&self) -> Params {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.output_len),
        )
        .expect("Invalid Argon2 params")
    }
}

/// Password hashing service
pub struct PasswordService {
    argon2: Argon2<'static>,
    policy: PasswordPolicy,
}

impl PasswordService {
    pub fn new(config: Argon2Config, policy: PasswordPolicy) -> Self {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, config.to_params());
        Self { argon2, policy }
    }

    /// Hash a password using Argon2id. The password must satisfy the policy.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        if let Err(errors) = self.policy.validate(password) {
            return Err(PlatformError::Validation {
                message: errors.join("; "),
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PlatformError::Internal {
                message: format!("Failed to hash password: {}", e),
            })?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC-format hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| PlatformError::Internal {
            message: format!("Invalid password hash format: {}", e),
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("password verification failed");
                Ok(false)
            }
            Err(e) => Err(PlatformError::Internal {
                message: format!("Password verification error: {}", e),
            }),
        }
    }

    /// Validate against policy without hashing
    pub fn validate_password(&self, password: &str) -> Result<()> {
        self.policy
            .validate(password)
            .map_err(|errors| PlatformError::Validation {
                message: errors.join("; "),
            })
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(Argon2Config::default(), PasswordPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy_default() {
        let policy = PasswordPolicy::default();

        assert!(policy.validate("securepass123").is_ok());
        assert!(policy.validate("short1").is_err());
        assert!(policy.validate("nodigitshere").is_err());
        assert!(policy.validate("1234567890").is_err());
    }

    #[test]
    fn test_password_policy_lenient() {
        let policy = PasswordPolicy::lenient();

        assert!(policy.validate("simplepassword").is_ok());
        assert!(policy.validate("short").is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::new(Argon2Config::testing(), PasswordPolicy::lenient());

        let password = "testpassword123";
        let hash = service.hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify_password(password, &hash).unwrap());
        assert!(!service.verify_password("wrongpassword", &hash).unwrap());
    }

    #[test]
    fn test_hash_uniqueness() {
        let service = PasswordService::new(Argon2Config::testing(), PasswordPolicy::lenient());

        let password = "testpassword123";
        let hash1 = service.hash_password(password).unwrap();
        let hash2 = service.hash_password(password).unwrap();

        // random salts produce different hashes for the same password
        assert_ne!(hash1, hash2);
        assert!(service.verify_password(password, &hash1).unwrap());
        assert!(service.verify_password(password, &hash2).unwrap());
    }
}
