use crate::constants::{GENESIS_PRECEDING_DIGEST, GENESIS_TIMESTAMP};
use crate::error::{IntegrityError, LedgerError, Result};
use crate::{Block, Difficulty, Payload, PendingBlock};
use serde::Serialize;
use tracing::{debug, warn};

/// Append-only sequence of blocks rooted at a fixed genesis block.
///
/// The chain owns every block it holds and only hands out shared references,
/// so an appended block can no longer change.
#[derive(Clone, Debug)]
pub struct Chain<P> {
    blocks: Vec<Block<P>>,
    difficulty: Difficulty,
}

impl<P: Payload> Chain<P> {
    pub fn new(difficulty: Difficulty) -> Result<Self> {
        let genesis = genesis_block()?;
        debug!(digest = genesis.digest(), %difficulty, "chain created");
        Ok(Self {
            blocks: vec![genesis],
            difficulty,
        })
    }
}

impl<P: Serialize> Chain<P> {
    /// Link `candidate` to the current tip, mine it at the chain's difficulty
    /// and make it the new tip.
    ///
    /// The candidate's index must be the tip's index plus one; otherwise the
    /// chain is left untouched. Any preceding digest, nonce or digest the
    /// candidate carried is overwritten.
    pub fn append(&mut self, mut candidate: PendingBlock<P>) -> Result<&Block<P>> {
        let tip = self.last_block();
        let expected = tip.index() + 1;
        if candidate.index() != expected {
            return Err(LedgerError::IndexMismatch {
                expected,
                got: candidate.index(),
            });
        }

        candidate.link(tip.digest());
        candidate.mine(self.difficulty)?;
        debug!(
            index = candidate.index(),
            preceding = candidate.preceding_digest(),
            "appending block"
        );
        self.blocks.push(candidate.finalize());
        Ok(self.last_block())
    }

    /// True when every block after genesis still hashes to its stored digest
    /// and links to its predecessor's digest.
    pub fn verify_integrity(&self) -> bool {
        self.verify().is_ok()
    }

    /// Like [`Chain::verify_integrity`], but reports the first failing block.
    pub fn verify(&self) -> std::result::Result<(), IntegrityError> {
        verify_blocks(&self.blocks)
    }
}

impl<P> Chain<P> {
    pub fn last_block(&self) -> &Block<P> {
        // never empty: genesis is pushed on construction and nothing is removed
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the genesis block is present from construction on.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn blocks(&self) -> &[Block<P>] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block<P>> {
        self.blocks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block<P>> {
        self.blocks.iter()
    }
}

impl<'a, P> IntoIterator for &'a Chain<P> {
    type Item = &'a Block<P>;
    type IntoIter = std::slice::Iter<'a, Block<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// The unmined root block: index 0, fixed timestamp and payload, linked to
/// the sentinel digest.
pub fn genesis_block<P: Payload>() -> Result<Block<P>> {
    Block::unmined(
        0,
        GENESIS_TIMESTAMP.to_string(),
        P::genesis(),
        GENESIS_PRECEDING_DIGEST.to_string(),
    )
}

/// Walk `blocks` from position 1, checking that each block's stored digest
/// matches a fresh computation and that it links to the block before it.
///
/// Position 0 is only checked through the link from position 1.
pub fn verify_blocks<P: Serialize>(blocks: &[Block<P>]) -> std::result::Result<(), IntegrityError> {
    let result = blocks
        .windows(2)
        .enumerate()
        .try_for_each(|(offset, pair)| check_pair(offset as u64 + 1, &pair[0], &pair[1]));
    if let Err(err) = &result {
        warn!(index = err.index(), error = %err, "chain integrity check failed");
    }
    result
}

fn check_pair<P: Serialize>(
    index: u64,
    preceding: &Block<P>,
    current: &Block<P>,
) -> std::result::Result<(), IntegrityError> {
    let computed = current
        .recompute()
        .map_err(|source| IntegrityError::Unserializable { index, source })?;
    if computed != current.digest() {
        return Err(IntegrityError::DigestMismatch {
            index,
            stored: current.digest().to_string(),
            computed,
        });
    }
    if current.preceding_digest() != preceding.digest() {
        return Err(IntegrityError::LinkMismatch {
            index,
            expected: preceding.digest().to_string(),
            found: current.preceding_digest().to_string(),
        });
    }
    Ok(())
}
