//! # Application Services

mod p2p;
mod relay;
mod router;

pub use p2p::P2pRelayService;
pub use relay::MessageRelay;
pub use router::AuthorizationRouter;
