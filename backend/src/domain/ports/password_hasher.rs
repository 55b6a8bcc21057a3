//! Port for password digests.
//!
//! Hashing is CPU-bound and synchronous; adapters must never log the
//! plaintext.

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// The stored digest could not be parsed.
        MalformedDigest => "stored password digest is malformed",
        /// The configured work factors are outside the algorithm's limits.
        InvalidCost { message: String } => "invalid password hash cost: {message}",
        /// Deriving a new digest failed.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted digest suitable for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a digest produced by [`PasswordHasher::hash`].
    fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordHashError>;
}
