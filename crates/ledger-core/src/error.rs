use thiserror::Error;

use crate::constants::HASH_HEX_SIZE;

/// Caller-input errors raised while building or extending a chain.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid difficulty {requested}: must be at most {max} leading hex zeros")]
    InvalidDifficulty { requested: u64, max: usize },

    #[error("invalid difficulty {0:?}: expected a non-negative integer")]
    UnparsableDifficulty(String),

    #[error("block index mismatch: expected {expected}, got {got}")]
    IndexMismatch { expected: u64, got: u64 },

    #[error("payload is not deterministically serializable: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    pub(crate) fn difficulty_too_large(requested: u64) -> Self {
        LedgerError::InvalidDifficulty {
            requested,
            max: HASH_HEX_SIZE,
        }
    }
}

/// The first failure found while walking a chain.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("block {index}: stored digest {stored} does not match recomputed {computed}")]
    DigestMismatch {
        index: u64,
        stored: String,
        computed: String,
    },

    #[error("block {index}: preceding digest {found} does not link to {expected}")]
    LinkMismatch {
        index: u64,
        expected: String,
        found: String,
    },

    #[error("block {index}: payload no longer serializes: {source}")]
    Unserializable {
        index: u64,
        #[source]
        source: serde_json::Error,
    },
}

impl IntegrityError {
    /// Position in the sequence of the offending block.
    pub fn index(&self) -> u64 {
        match self {
            IntegrityError::DigestMismatch { index, .. }
            | IntegrityError::LinkMismatch { index, .. }
            | IntegrityError::Unserializable { index, .. } => *index,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
