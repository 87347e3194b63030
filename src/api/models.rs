use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::blockchain::Block;
use crate::consensus::Engine;

/// Shared application state: the node's consensus engine.
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub pool_size: usize,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub chain: Vec<Block>,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Serialize)]
pub struct InformResponse {
    pub accepted: bool,
    pub number: u64,
    pub hash: String,
}

/* ---------- Ledger API Models ---------- */

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub account: String,
}

#[derive(Serialize)]
pub struct BalancesResponse {
    pub balances: HashMap<String, u64>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub node_id: String,
    pub height: usize,
    pub round: u64,
    pub expected_miner: String,
    pub pool_size: usize,
    pub peers: Vec<String>,
}
