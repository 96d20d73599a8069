//! Salted credential hashing.
//!
//! Passwords are hashed with Argon2id into a self-describing PHC string
//! (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<digest>`). The string carries
//! algorithm, parameters and salt, so verification needs nothing else.
//! Digest comparison happens inside the `password-hash` verifier in
//! constant time.

use crate::error::{RedactionError, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

/// Argon2id cost parameters.
///
/// `iterations` is the work factor; memory and parallelism scale the cost
/// of each iteration. Defaults follow the `argon2` crate recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    /// Number of passes over memory.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    Params::DEFAULT_M_COST
}

fn default_iterations() -> u32 {
    Params::DEFAULT_T_COST
}

fn default_parallelism() -> u32 {
    Params::DEFAULT_P_COST
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Most expensive stored parameters [`CredentialHasher::verify`] will run
/// by default: 256 MiB, 16 passes, 16 lanes.
pub const VERIFY_CEILING: HashParams = HashParams {
    memory_kib: 256 * 1024,
    iterations: 16,
    parallelism: 16,
};

impl HashParams {
    /// Cheapest parameters the primitive accepts. Only for tests.
    pub fn insecure_minimum() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    /// Component-wise maximum.
    fn max(self, other: Self) -> Self {
        Self {
            memory_kib: self.memory_kib.max(other.memory_kib),
            iterations: self.iterations.max(other.iterations),
            parallelism: self.parallelism.max(other.parallelism),
        }
    }

    fn to_argon2(self) -> Result<Params> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| RedactionError::HashError(format!("invalid argon2 parameters: {e}")))
    }
}

/// An encoded credential hash, as persisted by the credential store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap a stored hash after checking that it parses.
    pub fn parse(encoded: &str) -> Result<Self> {
        PasswordHash::new(encoded).map_err(|_| RedactionError::MalformedHash)?;
        Ok(Self(encoded.to_string()))
    }

    /// The PHC string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The PHC string as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consume into the PHC string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Algorithm and parameters only; salt and digest stay out of logs.
        let header: String = self
            .0
            .split('$')
            .filter(|part| !part.is_empty())
            .take(3)
            .collect::<Vec<_>>()
            .join("$");
        f.debug_tuple("CredentialHash").field(&header).finish()
    }
}

impl std::fmt::Display for CredentialHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<[u8]> for CredentialHash {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Hashes and verifies credentials with fixed Argon2id parameters.
#[derive(Clone)]
pub struct CredentialHasher {
    params: HashParams,
    max_params: HashParams,
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .field("max_params", &self.max_params)
            .finish()
    }
}

impl CredentialHasher {
    /// Create a hasher with explicit parameters.
    pub fn new(params: HashParams) -> Result<Self> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);
        Ok(Self {
            params,
            max_params: VERIFY_CEILING.max(params),
            argon2,
        })
    }

    /// Refuse to verify hashes whose stored parameters exceed `max`.
    ///
    /// The ceiling never drops below this hasher's own parameters, so its
    /// own hashes always verify.
    pub fn with_max_params(mut self, max: HashParams) -> Self {
        self.max_params = max.max(self.params);
        self
    }

    /// The parameters new hashes are produced with.
    pub fn params(&self) -> HashParams {
        self.params
    }

    /// Hash a plaintext credential under a freshly generated salt.
    ///
    /// Two calls with the same input never return the same hash.
    pub fn hash(&self, plaintext: &str) -> Result<CredentialHash> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(plaintext.as_bytes(), &salt)?;
        Ok(CredentialHash(hash.to_string()))
    }

    /// Check a plaintext credential against a stored hash.
    ///
    /// Algorithm, parameters and salt are read from `digest`. A digest that
    /// is not valid UTF-8, is truncated, or names an unsupported algorithm
    /// never verifies. Neither does one whose stored cost exceeds the
    /// ceiling set with [`with_max_params`](Self::with_max_params).
    pub fn verify(&self, digest: &[u8], plaintext: &str) -> bool {
        let Ok(encoded) = std::str::from_utf8(digest) else {
            tracing::debug!("rejecting non-utf8 credential hash");
            return false;
        };
        let parsed = match PasswordHash::new(encoded) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "rejecting malformed credential hash");
                return false;
            }
        };
        match Params::try_from(&parsed) {
            Ok(stored) if self.within_ceiling(&stored) => {}
            Ok(stored) => {
                tracing::debug!(
                    m_cost = stored.m_cost(),
                    t_cost = stored.t_cost(),
                    p_cost = stored.p_cost(),
                    "rejecting credential hash above cost ceiling"
                );
                return false;
            }
            Err(e) => {
                tracing::debug!(error = %e, "rejecting credential hash with invalid parameters");
                return false;
            }
        }

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                tracing::debug!(error = %e, "credential hash could not be checked");
                false
            }
        }
    }

    fn within_ceiling(&self, stored: &Params) -> bool {
        stored.m_cost() <= self.max_params.memory_kib
            && stored.t_cost() <= self.max_params.iterations
            && stored.p_cost() <= self.max_params.parallelism
    }

    /// Whether `digest` should be replaced by a fresh hash under the current
    /// parameters. Malformed digests always need replacing.
    pub fn needs_rehash(&self, digest: &[u8]) -> bool {
        let Ok(encoded) = std::str::from_utf8(digest) else {
            return true;
        };
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return true;
        };
        if parsed.algorithm != argon2::ARGON2ID_IDENT
            || parsed.version != Some(Version::V0x13.into())
        {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(stored) => {
                stored.m_cost() != self.params.memory_kib
                    || stored.t_cost() != self.params.iterations
                    || stored.p_cost() != self.params.parallelism
            }
            Err(_) => true,
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        let params = HashParams::default();
        Self {
            params,
            max_params: VERIFY_CEILING.max(params),
            argon2: Argon2::default(),
        }
    }
}

/// Hash a password with the default parameters.
pub fn hash_password(password: &str) -> Result<CredentialHash> {
    CredentialHasher::default().hash(password)
}

/// Check a password against a stored hash with the default hasher.
pub fn is_valid(hashed_password: &[u8], password: &str) -> bool {
    CredentialHasher::default().verify(hashed_password, password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(HashParams::insecure_minimum()).unwrap()
    }

    #[test]
    fn test_hash_verifies() {
        let hasher = fast_hasher();
        let hash = hasher.hash("MyAmazingPassw0rd").unwrap();
        assert!(hasher.verify(hash.as_bytes(), "MyAmazingPassw0rd"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = fast_hasher();
        let a = hasher.hash("same input").unwrap();
        let b = hasher.hash("same input").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify(a.as_bytes(), "same input"));
        assert!(hasher.verify(b.as_bytes(), "same input"));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct horse").unwrap();
        assert!(!hasher.verify(hash.as_bytes(), "correct horse "));
        assert!(!hasher.verify(hash.as_bytes(), ""));
    }

    #[test]
    fn test_hash_format_is_self_describing() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw").unwrap();
        let params = HashParams::insecure_minimum();
        let expected_prefix = format!(
            "$argon2id$v=19$m={},t={},p={}$",
            params.memory_kib, params.iterations, params.parallelism
        );
        assert!(hash.as_str().starts_with(&expected_prefix), "{}", hash);
    }

    #[test]
    fn test_truncated_hash_fails_closed() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw").unwrap();
        let encoded = hash.as_str();

        for cut in [0, 1, 10, encoded.len() / 2, encoded.len() - 1] {
            assert!(!hasher.verify(&encoded.as_bytes()[..cut], "pw"), "cut at {cut}");
        }
    }

    #[test]
    fn test_corrupted_hash_fails_closed() {
        let hasher = fast_hasher();
        assert!(!hasher.verify(b"not a hash", "pw"));
        assert!(!hasher.verify(&[0xff, 0xfe, 0x00], "pw"));
        assert!(!hasher.verify(b"$argon2id$v=19$m=8,t=1,p=1$$", "pw"));
        assert!(!hasher.verify(b"$unknown$v=1$salt$digest", "pw"));
    }

    #[test]
    fn test_flipped_digest_byte_rejected() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw").unwrap().into_string();
        let mut bytes = hash.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        assert!(!hasher.verify(&bytes, "pw"));
    }

    #[test]
    fn test_verify_uses_stored_parameters() {
        let cheap = fast_hasher();
        let hash = cheap.hash("pw").unwrap();

        let other = CredentialHasher::new(HashParams {
            memory_kib: 64,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.verify(hash.as_bytes(), "pw"));
    }

    #[test]
    fn test_oversized_parameters_fail_closed() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw").unwrap().into_string();
        let crafted = hash.replace("m=8,t=1,p=1", "m=4194304,t=4294967295,p=1");
        assert_ne!(crafted, hash);

        assert!(!hasher.verify(crafted.as_bytes(), "pw"));
        assert!(!is_valid(crafted.as_bytes(), "pw"));
    }

    #[test]
    fn test_custom_ceiling() {
        let stronger = CredentialHasher::new(HashParams {
            memory_kib: 64,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = stronger.hash("pw").unwrap();

        let strict = fast_hasher().with_max_params(HashParams::insecure_minimum());
        assert!(!strict.verify(hash.as_bytes(), "pw"));
        assert!(strict.verify(strict.hash("pw").unwrap().as_bytes(), "pw"));

        let roomy = fast_hasher().with_max_params(stronger.params());
        assert!(roomy.verify(hash.as_bytes(), "pw"));
    }

    #[test]
    fn test_ceiling_covers_own_parameters() {
        let heavy = HashParams {
            memory_kib: VERIFY_CEILING.memory_kib * 2,
            ..HashParams::insecure_minimum()
        };
        let hasher = CredentialHasher::new(heavy)
            .unwrap()
            .with_max_params(HashParams::insecure_minimum());
        assert_eq!(hasher.max_params, heavy);
    }

    #[test]
    fn test_needs_rehash() {
        let cheap = fast_hasher();
        let hash = cheap.hash("pw").unwrap();
        assert!(!cheap.needs_rehash(hash.as_bytes()));

        let stronger = CredentialHasher::new(HashParams {
            memory_kib: 64,
            iterations: 3,
            parallelism: 1,
        })
        .unwrap();
        assert!(stronger.needs_rehash(hash.as_bytes()));
        assert!(stronger.needs_rehash(b"garbage"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = CredentialHasher::new(HashParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(RedactionError::HashError(_))));
    }

    #[test]
    fn test_parse() {
        let hash = fast_hasher().hash("pw").unwrap();
        let parsed = CredentialHash::parse(hash.as_str()).unwrap();
        assert_eq!(parsed, hash);
        assert!(matches!(
            CredentialHash::parse("$$$"),
            Err(RedactionError::MalformedHash)
        ));
    }

    #[test]
    fn test_debug_hides_digest() {
        let hash = fast_hasher().hash("pw").unwrap();
        let digest = hash.as_str().rsplit('$').next().unwrap().to_string();
        let debug = format!("{hash:?}");
        assert!(debug.contains("argon2id"));
        assert!(!debug.contains(&digest));
    }

    #[test]
    fn test_default_hasher_roundtrip() {
        let hash = hash_password("default cost").unwrap();
        assert!(is_valid(hash.as_bytes(), "default cost"));
        assert!(!is_valid(hash.as_bytes(), "wrong"));
    }

    #[test]
    fn test_params_serde_defaults() {
        let params: HashParams = serde_json::from_str(r#"{"iterations": 4}"#).unwrap();
        assert_eq!(params.iterations, 4);
        assert_eq!(params.memory_kib, HashParams::default().memory_kib);
    }
}
