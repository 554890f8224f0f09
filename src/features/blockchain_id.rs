use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of hash digits that follow the four letter prefix.
const DIGITS: usize = 6;

/// Identifier shared by users and bankers. Also names the sender and receiver of a transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockchainId(String);

impl BlockchainId {
    /// Derives an identifier from a name and an email address.
    ///
    /// The first two characters of each are uppercased, then the leading six decimal digits of
    /// a SHA-256 of `name + email` are appended. Equal inputs give equal identifiers in every
    /// process. Nothing detects two different pairs landing on the same identifier.
    pub fn generate(name: &str, email: &str) -> Self {
        let mut id = String::with_capacity(4 + DIGITS);
        id.extend(name.chars().take(2).flat_map(char::to_uppercase));
        id.extend(email.chars().take(2).flat_map(char::to_uppercase));
        id.push_str(&hash_digits(name, email));
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn hash_digits(name: &str, email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(email.as_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let mut digits = u64::from_be_bytes(head).to_string();
    digits.truncate(DIGITS);
    digits
}

impl From<String> for BlockchainId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for BlockchainId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for BlockchainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
