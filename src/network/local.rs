use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::blockchain::EncodedBlock;
use crate::consensus::Engine;
use crate::error::TransportError;

use super::PeerTransport;

/// In-process transport that hands blocks straight to registered engines.
/// Lets several nodes run inside one process (simulations, tests).
#[derive(Default)]
pub struct LocalTransport {
    peers: RwLock<HashMap<String, Weak<Engine>>>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, engine: &Arc<Engine>) {
        self.peers
            .write()
            .insert(engine.self_id().to_string(), Arc::downgrade(engine));
    }

    pub fn unregister(&self, peer: &str) {
        self.peers.write().remove(peer);
    }
}

#[async_trait]
impl PeerTransport for LocalTransport {
    async fn send_block(&self, peer: &str, block: &EncodedBlock) -> Result<(), TransportError> {
        let engine = self
            .peers
            .read()
            .get(peer)
            .and_then(Weak::upgrade)
            .ok_or_else(|| TransportError::Unreachable(peer.to_string()))?;
        // refusal is reported like the HTTP adapter's 400
        if let Err(reason) = engine.receive_block(block.clone()) {
            debug!("peer {} refused block #{}: {}", peer, block.number, reason);
            return Err(TransportError::Status {
                peer: peer.to_string(),
                status: 400,
            });
        }
        Ok(())
    }
}
