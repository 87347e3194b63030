use super::{Block, GENESIS_MARKER};

/// Append-only, in-memory chain of blocks. Starts empty; the first block
/// pushed is expected to be genesis.
#[derive(Debug, Default, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
}

impl Blockchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the last block in the chain, if any.
    pub fn last_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    pub fn push(&mut self, block: Block) {
        self.chain.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Validate the entire chain: genesis, numbering, linkage and hashes.
    pub fn is_valid_chain(&self) -> bool {
        let Some(genesis) = self.chain.first() else {
            return true;
        };
        if genesis.number() != 1
            || genesis.previous_hash() != GENESIS_MARKER
            || genesis.hash() != genesis.compute_hash()
        {
            return false;
        }

        self.chain.windows(2).all(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            current.previous_hash() == prev.hash()
                && current.number() == prev.number() + 1
                && current.hash() == current.compute_hash()
        })
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}
