use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::GENESIS_MARKER;
use crate::transaction::Transaction;

/// A numbered batch of transactions chained to its predecessor.
///
/// `hash` is computed once in [`Block::new`] and never touched again; there
/// are no mutating methods. Peers receive blocks as [`EncodedBlock`] and go
/// back through `Block::new`, so a decoded block always carries the hash of
/// its own content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    number: u64,
    transactions: Vec<Transaction>,
    previous_hash: String,
    miner: String,
    hash: String,
}

impl Block {
    pub fn new(
        number: u64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        miner: impl Into<String>,
    ) -> Self {
        let previous_hash = previous_hash.into();
        let miner = miner.into();
        let hash = hash_content(number, &transactions, &previous_hash, &miner);
        Self {
            number,
            transactions,
            previous_hash,
            miner,
            hash,
        }
    }

    /// Block number 1, empty, chained to the fixed genesis marker.
    pub fn genesis(miner: impl Into<String>) -> Self {
        Self::new(1, Vec::new(), GENESIS_MARKER, miner)
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn miner(&self) -> &str {
        &self.miner
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.number == 1 && self.previous_hash == GENESIS_MARKER
    }

    /// Recompute the SHA-256 of this block's content. Always equal to
    /// `hash()` for a block built through `new`.
    pub fn compute_hash(&self) -> String {
        hash_content(
            self.number,
            &self.transactions,
            &self.previous_hash,
            &self.miner,
        )
    }

    pub fn encode(&self) -> EncodedBlock {
        EncodedBlock {
            number: self.number,
            transactions: self.transactions.clone(),
            previous_hash: self.previous_hash.clone(),
            miner: self.miner.clone(),
            hash: self.hash.clone(),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.hash.get(..8).unwrap_or(&self.hash);
        write!(
            f,
            "B(#{}, {}, {} txs, miner={})",
            short,
            self.number,
            self.transactions.len(),
            self.miner
        )
    }
}

/// Preimage is the JSON array `[number, [tx, ..], previous_hash, miner]`,
/// transactions in block order as `{sender, recipient, amount}` objects.
/// JSON string escaping keeps account ids from bleeding into each other.
fn hash_content(number: u64, transactions: &[Transaction], previous_hash: &str, miner: &str) -> String {
    let preimage = serde_json::json!([number, transactions, previous_hash, miner]).to_string();
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    hex::encode(hasher.finalize())
}

/// Wire form of a block as exchanged between peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedBlock {
    pub number: u64,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub miner: String,
    pub hash: String,
}

impl EncodedBlock {
    /// Rebuild the block from its content. The hash claimed on the wire is
    /// returned separately for validation against the recomputed one.
    pub fn decode(self) -> (Block, String) {
        let block = Block::new(self.number, self.transactions, self.previous_hash, self.miner);
        (block, self.hash)
    }
}
