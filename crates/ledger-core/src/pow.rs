use crate::constants::{DEFAULT_DIFFICULTY, HASH_HEX_SIZE};
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How often the nonce search reports progress.
const PROGRESS_INTERVAL: u64 = 1 << 20;

/// Number of leading zero hex characters a mined digest must carry.
///
/// Bounded by the hex length of a SHA-256 digest, so a search with any
/// constructible difficulty terminates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const ZERO: Difficulty = Difficulty(0);
    pub const MAX: Difficulty = Difficulty(HASH_HEX_SIZE as u8);

    pub fn new(zeros: u64) -> Result<Self> {
        if zeros > HASH_HEX_SIZE as u64 {
            return Err(LedgerError::difficulty_too_large(zeros));
        }
        Ok(Difficulty(zeros as u8))
    }

    pub fn zeros(self) -> usize {
        usize::from(self.0)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty(DEFAULT_DIFFICULTY)
    }
}

impl TryFrom<u64> for Difficulty {
    type Error = LedgerError;

    fn try_from(zeros: u64) -> Result<Self> {
        Difficulty::new(zeros)
    }
}

impl From<Difficulty> for u64 {
    fn from(difficulty: Difficulty) -> Self {
        u64::from(difficulty.0)
    }
}

impl FromStr for Difficulty {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let zeros = s
            .trim()
            .parse::<u64>()
            .map_err(|_| LedgerError::UnparsableDifficulty(s.to_string()))?;
        Difficulty::new(zeros)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase hex SHA-256 of `preimage` followed by the decimal `nonce`.
pub fn digest_hex(preimage: &[u8], nonce: u64) -> String {
    digest_from(&Sha256::new_with_prefix(preimage), nonce)
}

fn digest_from(base: &Sha256, nonce: u64) -> String {
    let mut hasher = base.clone();
    hasher.update(nonce.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Count of leading `'0'` characters in a hex digest.
pub fn leading_zero_nibbles(digest: &str) -> usize {
    digest.bytes().take_while(|b| *b == b'0').count()
}

pub fn meets_difficulty(digest: &str, difficulty: Difficulty) -> bool {
    leading_zero_nibbles(digest) >= difficulty.zeros()
}

/// Scan nonces upward from 0 until the digest of `preimage ‖ nonce` has at
/// least `difficulty` leading hex zeros. Returns the first such nonce and its
/// digest.
pub fn search(preimage: &[u8], difficulty: Difficulty) -> (u64, String) {
    // The preimage is fixed for the whole search, so hash it once.
    let base = Sha256::new_with_prefix(preimage);
    let mut nonce = 0u64;
    loop {
        let digest = digest_from(&base, nonce);
        if meets_difficulty(&digest, difficulty) {
            return (nonce, digest);
        }
        nonce = nonce.wrapping_add(1);
        if nonce.is_multiple_of(PROGRESS_INTERVAL) {
            debug!(nonce, %difficulty, "nonce search still running");
        }
    }
}
