//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.

mod grpc_ca;
mod key_signer;
mod memory_store;
#[cfg(feature = "rocksdb")]
mod rocksdb_store;

pub use grpc_ca::GrpcCaClient;
pub use key_signer::{detect_key_family, load_signer, KeyFileSigner};
pub use memory_store::InMemoryRevocationStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbRevocationStore, RocksDbStoreConfig};
