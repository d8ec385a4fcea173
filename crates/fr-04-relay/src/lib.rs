//! # FR-04 Relay
//!
//! Decides whether an authenticated peer may send a message into a
//! partition and forwards allowed messages to the backend node.
//!
//! **Subsystem ID:** 4  
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Inbound Path
//!
//! ```text
//! stream --> [fr-02 interceptor] --> P2pRelayService
//!                                      |- AuthorizationRouter.authorize(bcname, peer)
//!                                      |    primary network: allow
//!                                      |    partition: GroupClient.get() contains peer
//!                                      '- MessageRelay.relay(msg)
//!                                           fire-and-forget: spawn send, return None
//!                                           request/response: await one reply
//! ```
//!
//! ## Status Mapping
//!
//! | Error | gRPC status |
//! |-------|-------------|
//! | Missing peer identity | `UNAUTHENTICATED` |
//! | `Denied`, `GroupUnavailable` | `PERMISSION_DENIED` |
//! | Any relay error | `UNAVAILABLE` |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{GrpcNodeChannel, GrpcNodeConnector, NodeConnectorConfig};
pub use domain::{RelayError, RouterError};
pub use ports::{ChannelState, MockNodeChannel, MockNodeConnector, NodeChannel, NodeConnector};
pub use service::{AuthorizationRouter, MessageRelay, P2pRelayService};
