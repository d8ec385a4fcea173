//! # FR-03 Group Client
//!
//! Answers "is address A currently a member of partition P" from a local
//! cache that is seeded from the chain and kept fresh by a live event
//! subscription.
//!
//! **Subsystem ID:** 3  
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --init()--> Subscribing --stream open--> Listening
//!                                ^                           |
//!                                |      stream ends/errors   |
//!                                +------- next get() --------+
//! ```
//!
//! - `init()` reads the group with a `getGroup` pre-execution. An
//!   unauthorized status starts the cache empty; the subscription is still
//!   made so the cache fills in once access is granted.
//! - The listener replaces the snapshot wholesale on every matching
//!   `EditParaGroups` event (last match in a block wins).
//! - On end of stream the listener clears the live flag and exits. The next
//!   `get()` resubscribes; there is no background retry timer.
//!
//! ## Concurrency
//!
//! | State | Guard |
//! |-------|-------|
//! | Snapshot | `RwLock<Arc<MembershipGroup>>`, swapped whole |
//! | Live flag | `AtomicBool` |
//! | Subscription setup | async mutex, re-checked after acquiring |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{GrpcNodeClient, NodeClientConfig};
pub use domain::{
    extract_group_update, DegradePolicy, GroupError, MembershipGroup, STATUS_FORBIDDEN,
    STATUS_SUCCESS, STATUS_UNAUTHORIZED,
};
pub use ports::{
    encode_group_block, ChainReader, EventSource, EventStream, MockChainReader, ScriptedEventSource,
};
pub use service::{DefaultGroupClientFactory, GroupClient, GroupClientConfig, GroupClientFactory};
