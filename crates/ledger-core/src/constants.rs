pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

pub const GENESIS_TIMESTAMP: &str = "01/01/2021";
pub const GENESIS_PAYLOAD: &str = "Initial block in blockchain";
/// Preceding digest of the genesis block and of detached blocks.
pub const GENESIS_PRECEDING_DIGEST: &str = "0";

pub const DEFAULT_DIFFICULTY: u8 = 6;
