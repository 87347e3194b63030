//! A single node of a toy round-robin ledger.
//!
//! - [`transaction`] - transfer requests
//! - [`blockchain`] - blocks, the chain and the balance ledger
//! - [`consensus`] - pool, leader schedule, block acceptance and mining
//! - [`network`] - outbound block delivery to peers
//! - [`api`] - HTTP endpoints (submission, peer broadcasts, queries)
//! - [`config`] / [`error`]

#![forbid(unsafe_code)]

pub mod api;
pub mod blockchain;
pub mod config;
pub mod consensus;
pub mod error;
pub mod network;
pub mod transaction;
