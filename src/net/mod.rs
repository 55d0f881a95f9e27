pub mod client;
pub mod protocol;

pub use client::{ConnectionError, ConnectionStatus, TableConnection};
pub use protocol::{ActionKind, InboundFrame, OutboundFrame, TableAddress};
