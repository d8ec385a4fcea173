//! # Backend Node RPC Messages
//!
//! Contract pre-execution (used to read parachain membership) and the block
//! event subscription that carries membership-change events.

use std::collections::HashMap;

/// Common RPC header.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpcHeader {
    #[prost(string, tag = "1")]
    pub log_id: String,
    #[prost(string, tag = "2")]
    pub from_node: String,
    /// Non-zero on node-side failure.
    #[prost(int32, tag = "3")]
    pub error: i32,
}

/// One contract call inside a pre-execution request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeRequest {
    #[prost(string, tag = "1")]
    pub module_name: String,
    #[prost(string, tag = "2")]
    pub contract_name: String,
    #[prost(string, tag = "3")]
    pub method_name: String,
    #[prost(map = "string, bytes", tag = "4")]
    pub args: HashMap<String, Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeRpcRequest {
    #[prost(message, optional, tag = "1")]
    pub header: Option<RpcHeader>,
    #[prost(string, tag = "2")]
    pub bcname: String,
    #[prost(message, repeated, tag = "3")]
    pub requests: Vec<InvokeRequest>,
    #[prost(string, tag = "4")]
    pub initiator: String,
    #[prost(string, repeated, tag = "5")]
    pub auth_require: Vec<String>,
}

/// Result of one contract call. `status` follows HTTP conventions.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractResponse {
    #[prost(int32, tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(bytes = "vec", tag = "3")]
    pub body: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeResponse {
    #[prost(message, repeated, tag = "1")]
    pub responses: Vec<ContractResponse>,
    #[prost(int64, tag = "2")]
    pub gas_used: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeRpcResponse {
    #[prost(message, optional, tag = "1")]
    pub header: Option<RpcHeader>,
    #[prost(string, tag = "2")]
    pub bcname: String,
    #[prost(message, optional, tag = "3")]
    pub response: Option<InvokeResponse>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SubscribeType {
    Block = 0,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeRequest {
    #[prost(enumeration = "SubscribeType", tag = "1")]
    pub sub_type: i32,
    /// Encoded [`BlockFilter`].
    #[prost(bytes = "vec", tag = "2")]
    pub filter: Vec<u8>,
}

/// Server-side filter for block events.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockFilter {
    #[prost(string, tag = "1")]
    pub bcname: String,
    #[prost(string, tag = "2")]
    pub contract: String,
    #[prost(string, tag = "3")]
    pub event_name: String,
    #[prost(bool, tag = "4")]
    pub exclude_tx: bool,
}

/// One streamed event; `payload` is an encoded [`FilteredBlock`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Event {
    #[prost(bytes = "vec", tag = "1")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractEvent {
    #[prost(string, tag = "1")]
    pub contract: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(bytes = "vec", tag = "3")]
    pub body: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilteredTransaction {
    #[prost(string, tag = "1")]
    pub txid: String,
    #[prost(message, repeated, tag = "2")]
    pub events: Vec<ContractEvent>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilteredBlock {
    #[prost(string, tag = "1")]
    pub bcname: String,
    #[prost(string, tag = "2")]
    pub blockid: String,
    #[prost(int64, tag = "3")]
    pub block_height: i64,
    #[prost(message, repeated, tag = "4")]
    pub txs: Vec<FilteredTransaction>,
}
