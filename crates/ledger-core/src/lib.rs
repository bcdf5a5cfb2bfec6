pub mod chain;
pub mod constants;
pub mod error;
pub mod pow;

pub use chain::{genesis_block, verify_blocks, Chain};
pub use error::{IntegrityError, LedgerError, Result};
pub use pow::Difficulty;

use constants::{GENESIS_PAYLOAD, GENESIS_PRECEDING_DIGEST};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use tracing::info;

/// Data carried by a block.
///
/// Only the canonical JSON form of a payload feeds the digest. `genesis`
/// supplies the fixed payload of the chain's root block.
pub trait Payload: Serialize {
    fn genesis() -> Self;
}

impl Payload for String {
    fn genesis() -> Self {
        GENESIS_PAYLOAD.to_string()
    }
}

impl Payload for serde_json::Value {
    fn genesis() -> Self {
        serde_json::Value::String(GENESIS_PAYLOAD.to_string())
    }
}

/// Compact JSON with object keys in lexicographic order.
///
/// Going through `serde_json::Value` sorts map keys, so a `HashMap` payload
/// hashes the same regardless of iteration order.
pub fn canonical_json<P: Serialize + ?Sized>(payload: &P) -> Result<String> {
    Ok(canonical(payload)?)
}

fn canonical<P: Serialize + ?Sized>(payload: &P) -> serde_json::Result<String> {
    let value = serde_json::to_value(payload)?;
    serde_json::to_string(&value)
}

/// A finalized ledger entry. Only a [`Chain`] produces these from a
/// [`PendingBlock`]; once owned by the chain they are read-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block<P> {
    index: u64,
    timestamp: String,
    payload: P,
    preceding_digest: String,
    digest: String,
    nonce: u64,
}

impl<P> Block<P> {
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn preceding_digest(&self) -> &str {
        &self.preceding_digest
    }

    /// The stored digest, as last computed.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn meets_difficulty(&self, difficulty: Difficulty) -> bool {
        pow::meets_difficulty(&self.digest, difficulty)
    }
}

impl<P: Serialize> Block<P> {
    /// Everything hashed except the nonce: index, preceding digest,
    /// timestamp and canonical payload, concatenated in that order.
    fn preimage(&self) -> serde_json::Result<Vec<u8>> {
        let payload = canonical(&self.payload)?;
        Ok(format!(
            "{}{}{}{}",
            self.index, self.preceding_digest, self.timestamp, payload
        )
        .into_bytes())
    }

    fn recompute(&self) -> serde_json::Result<String> {
        Ok(pow::digest_hex(&self.preimage()?, self.nonce))
    }

    /// SHA-256 over the current field values. Does not touch the stored digest.
    pub fn compute_digest(&self) -> Result<String> {
        Ok(self.recompute()?)
    }

    pub(crate) fn unmined(
        index: u64,
        timestamp: String,
        payload: P,
        preceding_digest: String,
    ) -> Result<Self> {
        let mut block = Block {
            index,
            timestamp,
            payload,
            preceding_digest,
            digest: String::new(),
            nonce: 0,
        };
        block.digest = block.recompute()?;
        Ok(block)
    }
}

/// A block that has not been appended yet. Its nonce and digest still move
/// while it is mined; [`Chain::append`] takes ownership and finalizes it.
#[derive(Clone, Debug)]
pub struct PendingBlock<P> {
    block: Block<P>,
}

impl<P: Serialize> PendingBlock<P> {
    /// A detached candidate linked to the sentinel digest. `append` relinks
    /// it to the chain tip.
    pub fn new(index: u64, timestamp: impl Into<String>, payload: P) -> Result<Self> {
        Self::with_preceding_digest(index, timestamp, payload, GENESIS_PRECEDING_DIGEST)
    }

    pub fn with_preceding_digest(
        index: u64,
        timestamp: impl Into<String>,
        payload: P,
        preceding_digest: impl Into<String>,
    ) -> Result<Self> {
        let block = Block::unmined(index, timestamp.into(), payload, preceding_digest.into())?;
        Ok(Self { block })
    }

    /// Search nonces from 0 until the digest carries `difficulty` leading hex
    /// zeros. Blocks the calling thread for the whole search.
    pub fn mine(&mut self, difficulty: Difficulty) -> Result<()> {
        let preimage = self.block.preimage()?;
        let (nonce, digest) = pow::search(&preimage, difficulty);
        self.block.nonce = nonce;
        self.block.digest = digest;
        info!(
            index = self.block.index,
            nonce,
            digest = %self.block.digest,
            "mined block"
        );
        Ok(())
    }

    /// Point the candidate at a new predecessor. The stored digest is stale
    /// until the next `mine`.
    pub(crate) fn link(&mut self, preceding_digest: &str) {
        self.block.preceding_digest = preceding_digest.to_string();
    }

    pub(crate) fn finalize(self) -> Block<P> {
        self.block
    }
}

impl<P> Deref for PendingBlock<P> {
    type Target = Block<P>;

    fn deref(&self) -> &Block<P> {
        &self.block
    }
}
