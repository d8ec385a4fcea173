//! # Adapters Layer

mod grpc;

pub use grpc::{GrpcNodeClient, NodeClientConfig};
