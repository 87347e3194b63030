use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::blockchain::{
    Block, Blockchain, EncodedBlock, GENESIS_ACCOUNT, GENESIS_MARKER, GENESIS_SUPPLY, Ledger,
};
use crate::error::{BlockRejection, EngineError, LedgerError, Result};
use crate::network::PeerTransport;
use crate::transaction::Transaction;

/// Identity of this node, the round-robin roster and the mining cadence.
///
/// Only buildable through [`EngineConfig::new`], so the roster is never
/// empty.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    self_id: String,
    nodes: Vec<String>,
    mining_interval: Duration,
}

impl EngineConfig {
    /// The roster always contains `self_id`; it is appended if missing.
    pub fn new(self_id: impl Into<String>, mut nodes: Vec<String>, mining_interval: Duration) -> Self {
        let self_id = self_id.into();
        if !nodes.contains(&self_id) {
            nodes.push(self_id.clone());
        }
        Self {
            self_id,
            nodes,
            mining_interval,
        }
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn mining_interval(&self) -> Duration {
        self.mining_interval
    }
}

/// Everything a commit touches. Guarded by a single lock.
#[derive(Debug, Default)]
struct CoreState {
    chain: Blockchain,
    ledger: Ledger,
    round: u64,
}

/// Chain, ledger, pool and mining loop of one node.
///
/// Lock order is always `core` then `pool`. No lock is held across an
/// `.await`: mining commits under the locks, drops them, then broadcasts a
/// clone of the committed block.
pub struct Engine {
    config: EngineConfig,
    core: Mutex<CoreState>,
    pool: Mutex<Vec<Transaction>>,
    transport: Arc<dyn PeerTransport>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    mining_scheduled: AtomicBool,
}

impl Engine {
    pub fn new(config: EngineConfig, transport: Arc<dyn PeerTransport>) -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            config,
            core: Mutex::new(CoreState::default()),
            pool: Mutex::new(Vec::new()),
            transport,
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
            mining_scheduled: AtomicBool::new(false),
        }
    }

    pub fn self_id(&self) -> &str {
        &self.config.self_id
    }

    pub fn nodes(&self) -> &[String] {
        &self.config.nodes
    }

    fn leader_for(&self, round: u64) -> &str {
        let idx = (round % self.config.nodes.len() as u64) as usize;
        &self.config.nodes[idx]
    }

    /// Node expected to mine the next block: `nodes[round % nodes.len()]`.
    pub fn expected_miner(&self) -> String {
        let round = self.core.lock().round;
        self.leader_for(round).to_string()
    }

    pub fn is_leader(&self) -> bool {
        self.expected_miner() == self.config.self_id
    }

    /* -------------------- Submission & queries -------------------- */

    /// Queue a transfer for a future block. Validation happens at mining or
    /// block-acceptance time, never here.
    pub fn submit(&self, sender: &str, recipient: &str, amount: u64) -> Transaction {
        let tx = Transaction::new(sender, recipient, amount);
        let mut pool = self.pool.lock();
        pool.push(tx.clone());
        debug!("pool += {} (size {})", tx, pool.len());
        tx
    }

    pub fn pool(&self) -> Vec<Transaction> {
        self.pool.lock().clone()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.lock().len()
    }

    pub fn history(&self, account: &str) -> Vec<(u64, i128)> {
        self.core.lock().ledger.history(account)
    }

    pub fn balance(&self, account: &str) -> Option<u64> {
        self.core.lock().ledger.balance(account)
    }

    pub fn balances(&self) -> HashMap<String, u64> {
        self.core.lock().ledger.balances()
    }

    pub fn total_supply(&self) -> u128 {
        self.core.lock().ledger.total_supply()
    }

    pub fn chain(&self) -> Vec<Block> {
        self.core.lock().chain.blocks().to_vec()
    }

    pub fn height(&self) -> usize {
        self.core.lock().chain.len()
    }

    pub fn round(&self) -> u64 {
        self.core.lock().round
    }

    pub fn is_valid_chain(&self) -> bool {
        self.core.lock().chain.is_valid_chain()
    }

    /* -------------------- Validation -------------------- */

    /// Whether `block` may be appended next. The reason for a refusal is
    /// logged; use [`Engine::check_new_block`] to get it as a value.
    ///
    /// On an empty chain only the genesis shape is checked here. Transfers
    /// carried by a first block can only be replayed once the supply is
    /// minted, which happens in [`Engine::receive_block`]; a genesis that
    /// passes this check may still be refused there with
    /// [`BlockRejection::InvalidTransactions`].
    pub fn is_new_block_valid(&self, block: &Block, claimed_hash: &str) -> bool {
        match self.check_new_block(block, claimed_hash) {
            Ok(()) => true,
            Err(reason) => {
                warn!("rejecting {}: {}", block, reason);
                false
            }
        }
    }

    pub fn check_new_block(&self, block: &Block, claimed_hash: &str) -> Result<(), BlockRejection> {
        let core = self.core.lock();
        self.check_against(&core, block, claimed_hash)
    }

    /// Checks run in order and stop at the first failure: hash and miner,
    /// genesis shape (empty chain only), linkage to the tail, then an
    /// all-or-nothing replay of the transactions.
    fn check_against(&self, core: &CoreState, block: &Block, claimed_hash: &str) -> Result<(), BlockRejection> {
        if block.hash() != claimed_hash {
            return Err(BlockRejection::HashMismatch {
                claimed: claimed_hash.to_string(),
                computed: block.hash().to_string(),
            });
        }
        let expected = self.leader_for(core.round);
        if block.miner() != expected {
            return Err(BlockRejection::WrongMiner {
                expected: expected.to_string(),
                actual: block.miner().to_string(),
            });
        }

        let Some(tail) = core.chain.last_block() else {
            if block.previous_hash() != GENESIS_MARKER || block.number() != 1 {
                return Err(BlockRejection::BadGenesis {
                    number: block.number(),
                    previous_hash: block.previous_hash().to_string(),
                });
            }
            return Ok(());
        };

        if block.previous_hash() != tail.hash() {
            return Err(BlockRejection::PreviousHashMismatch {
                expected: tail.hash().to_string(),
                actual: block.previous_hash().to_string(),
            });
        }
        if block.number() != tail.number() + 1 {
            return Err(BlockRejection::NumberMismatch {
                expected: tail.number() + 1,
                actual: block.number(),
            });
        }

        core.ledger.check_block(block.transactions())?;
        Ok(())
    }

    /* -------------------- Commit -------------------- */

    /// The one path by which a block enters the chain, whoever mined it:
    /// ledger update (plus the supply mint for genesis), append, advance the
    /// round and drop the included transactions from the pool.
    fn commit(&self, core: &mut CoreState, block: Block) -> Result<Block, LedgerError> {
        if core.chain.is_empty() {
            let mut ledger = Ledger::new();
            ledger.mint(GENESIS_ACCOUNT, GENESIS_SUPPLY, block.number())?;
            ledger.apply(&block)?;
            core.ledger = ledger;
        } else {
            core.ledger.apply(&block)?;
        }

        {
            let mut pool = self.pool.lock();
            for tx in block.transactions() {
                if let Some(pos) = pool.iter().position(|p| p == tx) {
                    pool.remove(pos);
                }
            }
        }

        core.chain.push(block.clone());
        core.round += 1;
        info!(
            "committed {} (round -> {}, next miner {})",
            block,
            core.round,
            self.leader_for(core.round)
        );
        Ok(block)
    }

    /// Inbound peer block: validate and commit under one lock acquisition.
    pub fn receive_block(self: &Arc<Self>, encoded: EncodedBlock) -> Result<Block, BlockRejection> {
        let (block, claimed_hash) = encoded.decode();
        let committed = {
            let mut core = self.core.lock();
            if let Err(reason) = self.check_against(&core, &block, &claimed_hash) {
                warn!("rejecting {}: {}", block, reason);
                return Err(reason);
            }
            match self.commit(&mut core, block.clone()) {
                Ok(committed) => committed,
                Err(e) => {
                    warn!("rejecting {}: {}", block, e);
                    return Err(e.into());
                }
            }
        };
        self.schedule_next();
        Ok(committed)
    }

    /* -------------------- Mining -------------------- */

    /// Build a block from the pool and commit it, without waiting.
    ///
    /// Only the leader of the current round may mine. Genesis requires an
    /// empty chain. Otherwise the pool is sorted, filtered through
    /// [`Ledger::validate`], and whatever does not fit yet stays queued for a
    /// later round.
    pub fn mine_block(&self, genesis: bool) -> Result<Block> {
        let mut core = self.core.lock();
        let expected = self.leader_for(core.round);
        if expected != self.config.self_id {
            return Err(EngineError::NotLeader {
                expected: expected.to_string(),
                round: core.round,
            });
        }
        let block = if genesis {
            if !core.chain.is_empty() {
                return Err(EngineError::GenesisExists(core.chain.len()));
            }
            Block::genesis(self.config.self_id.as_str())
        } else {
            let tail = core.chain.last_block().ok_or(EngineError::EmptyChain)?;
            let candidates = {
                let mut pool = self.pool.lock();
                pool.sort();
                pool.clone()
            };
            let accepted = core.ledger.validate(&candidates);
            debug!(
                "mining #{}: {} of {} pooled txs applicable",
                tail.number() + 1,
                accepted.len(),
                candidates.len()
            );
            Block::new(
                tail.number() + 1,
                accepted,
                tail.hash(),
                self.config.self_id.as_str(),
            )
        };
        Ok(self.commit(&mut core, block)?)
    }

    /// Fire-and-forget: wait one mining interval, mine, broadcast. The wait
    /// is abandoned if [`Engine::shutdown`] is called first.
    pub fn trigger_mining(self: &Arc<Self>, genesis: bool) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if *shutdown_rx.borrow() {
            debug!("not mining: engine is shut down");
            return;
        }
        let engine = Arc::clone(self);
        let interval = self.config.mining_interval;
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("mining cancelled");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            engine.mining_scheduled.store(false, Ordering::SeqCst);
            engine.run_mining_round(genesis).await;
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    async fn run_mining_round(self: &Arc<Self>, genesis: bool) {
        match self.mine_block(genesis) {
            Ok(block) => {
                self.broadcast(&block).await;
                self.schedule_next();
            }
            Err(e) => warn!("mining round skipped: {}", e),
        }
    }

    /// Queue a mining round if this node leads the next round and none is
    /// already queued.
    fn schedule_next(self: &Arc<Self>) {
        if *self.shutdown_tx.borrow() || !self.is_leader() {
            return;
        }
        if self.mining_scheduled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.trigger_mining(false);
    }

    /// Send `block` to every other node. Failures are logged per peer and
    /// never affect the already committed block.
    pub async fn broadcast(&self, block: &Block) {
        let encoded = block.encode();
        for peer in self.config.nodes.iter().filter(|n| **n != self.config.self_id) {
            match self.transport.send_block(peer, &encoded).await {
                Ok(()) => debug!("informed {} about block #{}", peer, block.number()),
                Err(e) => warn!("broadcast of block #{} to {} failed: {}", block.number(), peer, e),
            }
        }
    }

    /* -------------------- Lifecycle -------------------- */

    /// Start mining: genesis if the chain is empty and this node leads
    /// round 0, otherwise ordinary rounds whenever it is the leader.
    pub fn start(self: &Arc<Self>) {
        let chain_empty = self.core.lock().chain.is_empty();
        info!(
            "node {} starting (roster {:?}, interval {:?})",
            self.config.self_id, self.config.nodes, self.config.mining_interval
        );
        if chain_empty {
            if self.is_leader() && !self.mining_scheduled.swap(true, Ordering::SeqCst) {
                self.trigger_mining(true);
            }
        } else {
            self.schedule_next();
        }
    }

    /// Cancel pending mining and stop scheduling new rounds.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        for handle in self.tasks.lock().drain(..) {
            handle.abort();
        }
        info!("node {} stopped", self.config.self_id);
    }
}
