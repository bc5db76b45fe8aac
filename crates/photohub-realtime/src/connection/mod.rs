//! Realtime connection management: state, endpoint, backoff, socket seam,
//! and the transport actor.

pub mod backoff;
pub mod endpoint;
pub mod socket;
pub mod state;
pub mod transport;

pub use backoff::ReconnectPolicy;
pub use endpoint::SocketEndpoint;
pub use socket::{Connector, Frame, Socket, WsConnector};
pub use state::ConnectionState;
pub use transport::{RealtimeTransport, TransportSettings};
