pub mod block;
pub mod ledger;
pub mod model;

pub use block::{Block, EncodedBlock};
pub use ledger::{HistoryEntry, Ledger, Simulation};
pub use model::Blockchain;

/// `previous_hash` of the genesis block.
pub const GENESIS_MARKER: &str = "0xfeedcafe";

/// Account credited by the genesis mint.
pub const GENESIS_ACCOUNT: &str = "A";

/// Total token supply, minted once at genesis.
pub const GENESIS_SUPPLY: u64 = 10_000;

/// Default wait before each mining round, in seconds.
pub const DEFAULT_MINING_INTERVAL_SECS: u64 = 5;
