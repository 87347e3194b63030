//! Several nodes in one process, wired through the in-process transport.

use std::sync::Arc;
use std::time::Duration;

use rr_ledger::blockchain::{Block, GENESIS_SUPPLY};
use rr_ledger::consensus::{Engine, EngineConfig};
use rr_ledger::error::TransportError;
use rr_ledger::network::{LocalTransport, PeerTransport};

const ROSTER: [&str; 3] = ["5000", "5001", "5002"];

fn network(interval: Duration) -> (Arc<LocalTransport>, Vec<Arc<Engine>>) {
    let transport = Arc::new(LocalTransport::new());
    let nodes: Vec<String> = ROSTER.iter().map(|s| s.to_string()).collect();
    let engines: Vec<Arc<Engine>> = ROSTER
        .iter()
        .map(|id| {
            let config = EngineConfig::new(*id, nodes.clone(), interval);
            Arc::new(Engine::new(config, transport.clone()))
        })
        .collect();
    for e in &engines {
        transport.register(e);
    }
    (transport, engines)
}

async fn wait_until<F: Fn() -> bool>(cond: F) -> bool {
    for _ in 0..300 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn nodes_take_turns_and_agree() {
    let (_transport, engines) = network(Duration::from_millis(10));
    // clients send the same transfer to every node
    for e in &engines {
        e.submit("A", "B", 30);
        e.submit("B", "C", 10);
    }
    for e in &engines {
        e.start();
    }

    let reached = wait_until(|| engines.iter().all(|e| e.height() >= 6)).await;
    for e in &engines {
        e.shutdown();
    }
    assert!(reached, "chain did not grow on every node");

    let longest = engines
        .iter()
        .map(|e| e.chain())
        .max_by_key(|c| c.len())
        .unwrap();
    for e in &engines {
        let chain = e.chain();
        assert!(e.is_valid_chain());
        assert_eq!(chain[..], longest[..chain.len()]);
        assert_eq!(e.round(), chain.len() as u64);
        assert_eq!(e.total_supply(), GENESIS_SUPPLY as u128);
        assert!(e.pool().is_empty());
        assert_eq!(e.balance("A"), Some(9970));
        assert_eq!(e.balance("B"), Some(20));
        assert_eq!(e.balance("C"), Some(10));
    }

    for (i, block) in longest.iter().enumerate() {
        assert_eq!(block.miner(), ROSTER[i % ROSTER.len()]);
    }
    // the transfers land exactly once, in block 2
    assert_eq!(longest[1].transactions().len(), 2);
    assert!(longest[2..].iter().all(|b| b.transactions().is_empty()));
}

#[tokio::test]
async fn unreachable_peer_does_not_undo_the_block() {
    let (transport, engines) = network(Duration::from_millis(10));
    transport.unregister("5001");

    engines[0].start();
    assert!(wait_until(|| engines[0].height() == 1).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(engines[0].height(), 1);
    assert_eq!(engines[0].round(), 1);
    assert_eq!(engines[0].expected_miner(), "5001");
    assert_eq!(engines[1].height(), 0);
    // 5002 still heard about genesis
    assert_eq!(engines[2].height(), 1);
    for e in &engines {
        e.shutdown();
    }
}

#[tokio::test]
async fn refused_block_surfaces_as_transport_error() {
    let (transport, engines) = network(Duration::from_secs(60));
    let forged = Block::genesis("5002");

    let res = transport.send_block("5001", &forged.encode()).await;
    assert!(matches!(res, Err(TransportError::Status { status: 400, .. })));
    assert_eq!(engines[1].height(), 0);

    let res = transport.send_block("5999", &forged.encode()).await;
    assert!(matches!(res, Err(TransportError::Unreachable(_))));
}
