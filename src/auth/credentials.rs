/// Fixed, read-only registry of portal users.
///
/// Passwords are salted and stretched when the registry is built; only the
/// hash is kept in memory. Matching stays exact and case-sensitive on both
/// the username and the password.

use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

use crate::config::UserEntry;

/// Number of SHA-256 iterations for password stretching.
pub const HASH_ITERATIONS: u32 = 100_000;

/// Salt byte length for password hashing.
const SALT_BYTES: usize = 16;

type Salt = [u8; SALT_BYTES];
type Digest32 = [u8; 32];

/// One registered user. The plaintext password is gone once this exists.
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    pub display_name: String,
    salt: Salt,
    password_hash: Digest32,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Process-wide user registry, built once at startup.
#[derive(Debug, Clone)]
pub struct CredentialRegistry {
    users: HashMap<String, Credential>,
    iterations: u32,
}

impl CredentialRegistry {
    /// Build the registry with the default stretching cost.
    pub fn new<'a>(entries: impl IntoIterator<Item = &'a UserEntry>) -> Self {
        Self::with_iterations(entries, HASH_ITERATIONS)
    }

    /// Build the registry with a custom stretching cost. Later entries
    /// replace earlier ones with the same username.
    pub fn with_iterations<'a>(
        entries: impl IntoIterator<Item = &'a UserEntry>,
        iterations: u32,
    ) -> Self {
        let iterations = iterations.max(1);
        let users = entries
            .into_iter()
            .map(|entry| {
                let salt = random_salt();
                let password_hash = stretch(&entry.password, &salt, iterations);
                let credential = Credential {
                    username: entry.username.clone(),
                    display_name: entry.name.clone(),
                    salt,
                    password_hash,
                };
                (entry.username.clone(), credential)
            })
            .collect();

        Self { users, iterations }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// True when `username` is registered (exact match)
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Return the matching credential when both fields match exactly.
    pub fn verify(&self, username: &str, password: &str) -> Option<&Credential> {
        match self.users.get(username) {
            Some(credential) => {
                let attempt = stretch(password, &credential.salt, self.iterations);
                digests_match(&credential.password_hash, &attempt).then_some(credential)
            }
            None => {
                // Same cost as a real check, unknown names are not faster to reject
                let _ = stretch(password, &[0u8; SALT_BYTES], self.iterations);
                None
            }
        }
    }
}

/// SHA-256 of the concatenated parts
fn sha256(parts: &[&[u8]]) -> Digest32 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

fn random_salt() -> Salt {
    let mut salt = [0u8; SALT_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Salted SHA-256, re-hashed `iterations` times in total
fn stretch(password: &str, salt: &Salt, iterations: u32) -> Digest32 {
    (1..iterations).fold(sha256(&[&salt[..], password.as_bytes()]), |digest, _| {
        sha256(&[&digest[..], &salt[..]])
    })
}

/// Compares every byte regardless of where the first mismatch is
fn digests_match(a: &Digest32, b: &Digest32) -> bool {
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
