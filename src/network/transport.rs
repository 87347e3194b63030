use async_trait::async_trait;
use log::debug;
use std::time::Duration;

use crate::blockchain::EncodedBlock;
use crate::error::TransportError;

/// Outbound delivery of mined blocks to a peer. One attempt, no retry.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn send_block(&self, peer: &str, block: &EncodedBlock) -> Result<(), TransportError>;
}

/// Posts blocks as JSON to `http://{peer_host}:{peer}/inform/block`, where
/// the peer identifier is the port it listens on.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    peer_host: String,
}

impl HttpTransport {
    pub fn new(peer_host: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| TransportError::Request {
                peer: "<client>".to_string(),
                source,
            })?;
        Ok(Self {
            client,
            peer_host: peer_host.into(),
        })
    }

    pub fn endpoint(&self, peer: &str) -> String {
        format!("http://{}:{}/inform/block", self.peer_host, peer)
    }
}

#[async_trait]
impl PeerTransport for HttpTransport {
    async fn send_block(&self, peer: &str, block: &EncodedBlock) -> Result<(), TransportError> {
        let url = self.endpoint(peer);
        debug!("POST {} block #{}", url, block.number);
        let resp = self
            .client
            .post(&url)
            .json(block)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                peer: peer.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                peer: peer.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpTransport, PeerTransport};
    use crate::blockchain::Block;
    use crate::error::TransportError;
    use std::time::Duration;

    #[test]
    fn endpoint_targets_inform_block() {
        let t = HttpTransport::new("localhost", Duration::from_millis(100)).unwrap();
        assert_eq!(t.endpoint("5001"), "http://localhost:5001/inform/block");
    }

    #[tokio::test]
    async fn unreachable_peer_is_an_error_not_a_panic() {
        let t = HttpTransport::new("127.0.0.1", Duration::from_millis(200)).unwrap();
        // port 9 (discard) is not expected to run an HTTP server
        let res = t.send_block("9", &Block::genesis("5000").encode()).await;
        assert!(matches!(
            res,
            Err(TransportError::Request { .. }) | Err(TransportError::Status { .. })
        ));
    }
}
