//! Error types for the ledger node.

use thiserror::Error;

/// Why a transfer (or a batch of them) cannot be applied to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("unknown sender {0}")]
    UnknownSender(String),
    #[error("insufficient funds: {account} has {balance}, needs {amount}")]
    InsufficientFunds {
        account: String,
        balance: u64,
        amount: u64,
    },
    #[error("balance overflow for {0}")]
    BalanceOverflow(String),
    #[error("transaction #{index}: {source}")]
    AtIndex {
        index: usize,
        source: Box<LedgerError>,
    },
}

impl LedgerError {
    pub(crate) fn at(self, index: usize) -> Self {
        LedgerError::AtIndex {
            index,
            source: Box::new(self),
        }
    }
}

/// Diagnostic for a block refused by `is_new_block_valid`, one variant per
/// check in the order they run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockRejection {
    #[error("hash mismatch: claimed {claimed}, computed {computed}")]
    HashMismatch { claimed: String, computed: String },
    #[error("wrong miner: expected {expected}, got {actual}")]
    WrongMiner { expected: String, actual: String },
    #[error("first block must be number 1 on the genesis marker (got #{number} on {previous_hash})")]
    BadGenesis { number: u64, previous_hash: String },
    #[error("previous hash {actual} does not match chain tail {expected}")]
    PreviousHashMismatch { expected: String, actual: String },
    #[error("block number {actual} does not follow chain tail (expected {expected})")]
    NumberMismatch { expected: u64, actual: u64 },
    #[error("invalid transactions: {0}")]
    InvalidTransactions(#[from] LedgerError),
}

/// Failures of the local mining procedure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("genesis requested but chain already has {0} blocks")]
    GenesisExists(usize),
    #[error("chain is empty; mine genesis first")]
    EmptyChain,
    #[error("not this node's turn: round {round} belongs to {expected}")]
    NotLeader { expected: String, round: u64 },
    #[error("ledger rejected block: {0}")]
    Ledger(#[from] LedgerError),
}

/// Outbound delivery failure for a single peer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {peer} failed: {source}")]
    Request {
        peer: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("peer {peer} answered {status}")]
    Status { peer: String, status: u16 },
    #[error("peer {0} unreachable")]
    Unreachable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
    #[error("NODES must list at least one node")]
    EmptyRoster,
}

/// Convenience alias used across the crate
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
