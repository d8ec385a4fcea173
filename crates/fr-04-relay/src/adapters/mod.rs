//! # Adapters Layer

mod grpc_node;

pub use grpc_node::{GrpcNodeChannel, GrpcNodeConnector, NodeConnectorConfig};
