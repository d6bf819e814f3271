/// Password hashing using Argon2id
///
/// Passwords are stored only as salted Argon2id hashes in PHC string format.
/// Hashing the same password twice produces different strings (random salt),
/// but both verify against the original input.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("tr1cky-passphrase")?;
/// assert!(verify_password("tr1cky-passphrase", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password using Argon2id with a random 16-byte salt
///
/// Returns a PHC string (`$argon2id$v=19$...`) that embeds the algorithm
/// parameters and salt, so verification needs no extra state.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored PHC hash
///
/// Comparison is constant-time (handled by the argon2 crate).
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!(
            "Verification failed: {}",
            e
        ))),
    }
}

/// Validates the signup password policy
///
/// A raw password is acceptable when, after trimming, it is longer than
/// 6 characters and does not contain the substring "password" in any case.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::password::validate_password;
///
/// assert!(validate_password("s*EVwC4PW7J@lQ83").is_ok());
/// assert!(validate_password("123456").is_err());
/// assert!(validate_password("MyPassword1").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<(), String> {
    let trimmed = password.trim();

    if trimmed.chars().count() <= 6 {
        return Err("Password must be longer than 6 characters".to_string());
    }

    if trimmed.to_lowercase().contains("password") {
        return Err("Password must not contain the word \"password\"".to_string());
    }

    Ok(())
}
