pub mod local;
pub mod transport;

pub use local::LocalTransport;
pub use transport::{HttpTransport, PeerTransport};
