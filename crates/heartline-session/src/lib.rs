pub mod gateway;
pub mod loopback;
pub mod managed;
pub mod transport;

pub use crate::gateway::GatewayClient;
pub use crate::loopback::LoopbackTransport;
pub use crate::managed::{AGENT_INIT_TIMEOUT_REASON, ManagedSession};
pub use crate::transport::{ConnectionDetails, MediaTransport, TransportEvent};
