//! Relay clients for the execution controller.
//!
//! [`TcpRelay`] speaks newline-delimited JSON frames to a relay server; [`MemoryRelay`]
//! keeps everything in process.

mod frame;
pub use frame::{InboundFrame, OutboundFrame};

mod tcp;
pub use tcp::TcpRelay;

mod memory;
pub use memory::{MemoryRelay, PublishedRequest};
