use crate::error::Result;

/// Hash a password with bcrypt at the given cost
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Check a password against a stored hash. A malformed hash counts as a
/// mismatch.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}
