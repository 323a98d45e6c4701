//! Password hashing with bcrypt.

use crate::AuthError;

pub use bcrypt::DEFAULT_COST;

/// bcrypt's minimum accepted cost (private in the `bcrypt` crate).
pub const MIN_COST: u32 = 4;

pub fn hash(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// `Ok(false)` for a wrong password; `Err` only for a malformed hash.
pub fn verify(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash("hunter2", MIN_COST).unwrap();
        assert_ne!(hashed, "hunter2");
        assert!(verify("hunter2", &hashed).unwrap());
        assert!(!verify("hunter3", &hashed).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify("x", "not-a-bcrypt-hash").is_err());
    }
}
