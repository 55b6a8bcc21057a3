//! Argon2id password digests.
//!
//! Stored form: `argon2id$<m_cost>$<t_cost>$<p_cost>$<salt hex>$<digest hex>`.
//! The cost travels with each digest so raising it later does not invalidate
//! existing accounts. The plaintext is only ever borrowed and never logged.

use argon2::{Algorithm, Argon2, Params, ParamsBuilder, Version};
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

const SCHEME: &str = "argon2id";
const SALT_BYTES: usize = 16;
const DIGEST_BYTES: usize = 32;

/// Argon2 work factors applied to new digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl HashCost {
    /// Production cost: 19 MiB, two passes, one lane.
    pub const DEFAULT: Self = Self {
        memory_kib: Params::DEFAULT_M_COST,
        iterations: Params::DEFAULT_T_COST,
        parallelism: Params::DEFAULT_P_COST,
    };

    /// Cheapest cost Argon2 accepts. Only for tests and throwaway stores.
    pub const MINIMAL: Self = Self {
        memory_kib: Params::MIN_M_COST,
        iterations: Params::MIN_T_COST,
        parallelism: Params::MIN_P_COST,
    };

    fn params(self, output_len: usize) -> Result<Params, argon2::Error> {
        ParamsBuilder::new()
            .m_cost(self.memory_kib)
            .t_cost(self.iterations)
            .p_cost(self.parallelism)
            .output_len(output_len)
            .build()
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// [`PasswordHasher`] adapter backed by the `argon2` crate.
#[derive(Debug, Clone, Copy)]
pub struct Argon2PasswordHasher {
    cost: HashCost,
}

impl Argon2PasswordHasher {
    /// Validate `cost` against Argon2's limits.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError::InvalidCost`] when a factor is out of range.
    pub fn new(cost: HashCost) -> Result<Self, PasswordHashError> {
        cost.params(DIGEST_BYTES)
            .map_err(|err| PasswordHashError::invalid_cost(err.to_string()))?;
        Ok(Self { cost })
    }

    #[must_use]
    pub const fn cost(&self) -> HashCost {
        self.cost
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            cost: HashCost::DEFAULT,
        }
    }
}

fn derive(password: &str, salt: &[u8], params: Params) -> Result<Zeroizing<Vec<u8>>, argon2::Error> {
    let mut output = Zeroizing::new(vec![0_u8; params.output_len().unwrap_or(DIGEST_BYTES)]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params).hash_password_into(
        password.as_bytes(),
        salt,
        &mut output,
    )?;
    Ok(output)
}

/// Fields of a stored digest.
struct StoredDigest {
    cost: HashCost,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl StoredDigest {
    fn parse(raw: &str) -> Result<Self, PasswordHashError> {
        let malformed = |_| PasswordHashError::malformed_digest();
        let mut parts = raw.split('$');
        let (Some(SCHEME), Some(m), Some(t), Some(p), Some(salt), Some(digest), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(PasswordHashError::malformed_digest());
        };
        let cost = HashCost {
            memory_kib: m.parse().map_err(malformed)?,
            iterations: t.parse().map_err(malformed)?,
            parallelism: p.parse().map_err(malformed)?,
        };
        Ok(Self {
            cost,
            salt: hex::decode(salt).map_err(|_| PasswordHashError::malformed_digest())?,
            digest: hex::decode(digest).map_err(|_| PasswordHashError::malformed_digest())?,
        })
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let mut salt = [0_u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);
        let params = self
            .cost
            .params(DIGEST_BYTES)
            .map_err(|err| PasswordHashError::invalid_cost(err.to_string()))?;
        let digest = derive(password, &salt, params)
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
        let HashCost {
            memory_kib,
            iterations,
            parallelism,
        } = self.cost;
        Ok(format!(
            "{SCHEME}${memory_kib}${iterations}${parallelism}${}${}",
            hex::encode(salt),
            hex::encode(digest.as_slice())
        ))
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordHashError> {
        let stored = StoredDigest::parse(digest)?;
        let params = stored
            .cost
            .params(stored.digest.len())
            .map_err(|_| PasswordHashError::malformed_digest())?;
        let actual = derive(password, &stored.salt, params)
            .map_err(|_| PasswordHashError::malformed_digest())?;
        Ok(actual.as_slice().ct_eq(&stored.digest).into())
    }
}
