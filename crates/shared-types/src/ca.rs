//! # CA RPC Messages
//!
//! Every request carries a [`CaSign`] proving possession of the node key.

/// Signature envelope attached to CA requests.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CaSign {
    #[prost(string, tag = "1")]
    pub address: String,
    #[prost(string, tag = "2")]
    pub public_key: String,
    /// Hex-encoded signature over `data || nonce`.
    #[prost(string, tag = "3")]
    pub sign: String,
    /// Unix seconds, decimal.
    #[prost(string, tag = "4")]
    pub nonce: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnrollNodeRequest {
    #[prost(message, optional, tag = "1")]
    pub sign: Option<CaSign>,
    #[prost(string, tag = "2")]
    pub net: String,
    #[prost(string, tag = "3")]
    pub admin_address: String,
    #[prost(string, tag = "4")]
    pub address: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnrollNodeResponse {
    #[prost(string, tag = "1")]
    pub log_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CurrentCertRequest {
    #[prost(message, optional, tag = "1")]
    pub sign: Option<CaSign>,
    #[prost(string, tag = "2")]
    pub net: String,
    #[prost(string, tag = "3")]
    pub address: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CurrentCertResponse {
    #[prost(string, tag = "1")]
    pub cert: String,
    #[prost(string, tag = "2")]
    pub private_key: String,
    #[prost(string, tag = "3")]
    pub ca_cert: String,
    /// Derived sub-key, empty when the CA does not issue one.
    #[prost(string, tag = "4")]
    pub node_hd_pri_key: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RevokeListRequest {
    #[prost(message, optional, tag = "1")]
    pub sign: Option<CaSign>,
    #[prost(string, tag = "2")]
    pub net: String,
    /// Latest serial already known locally, empty for a full sync.
    #[prost(string, tag = "3")]
    pub serial_num: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RevokeNode {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub serial_num: String,
    #[prost(int64, tag = "3")]
    pub create_time: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RevokeListResponse {
    #[prost(message, repeated, tag = "1")]
    pub list: Vec<RevokeNode>,
}
