//! # Shared Types Crate
//!
//! Wire messages and identity types shared by every Chain-Front subsystem.
//!
//! ## Protocols
//!
//! - **Relay** (`front.p2p.P2pService`): bidirectional stream of
//!   [`RelayMessage`] envelopes between peers, the gateway and the node.
//! - **Node RPC** (`front.node`): contract pre-execution and block event
//!   subscription against the backend node.
//! - **CA RPC** (`front.ca.CaService`): node enrollment, certificate issue and
//!   the revocation list.
//!
//! Messages are plain `prost` structs; the gRPC stubs under [`rpc`] are
//! generated by `build.rs`.

pub mod ca;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod node;

pub use entities::*;
pub use envelope::{DeliveryMode, MessageHeader, MessageType, RelayMessage};
pub use errors::PayloadError;

/// Generated gRPC clients and servers.
pub mod rpc {
    pub mod p2p {
        include!(concat!(env!("OUT_DIR"), "/front.p2p.P2pService.rs"));
    }

    pub mod node {
        include!(concat!(env!("OUT_DIR"), "/front.node.NodeService.rs"));
        include!(concat!(env!("OUT_DIR"), "/front.node.EventService.rs"));
    }

    pub mod ca {
        include!(concat!(env!("OUT_DIR"), "/front.ca.CaService.rs"));
    }
}
