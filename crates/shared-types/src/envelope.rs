//! # Relay Envelope
//!
//! The message carried by the peer-to-peer relay stream. The gateway never
//! looks inside `data`; routing and authorization decisions are made from the
//! header alone.
//!
//! ## Delivery Modes
//!
//! Broadcast-style traffic (transactions, blocks, block announcements and
//! consensus votes/proposals) is delivered fire-and-forget. Every other type is
//! a query and the sender waits for exactly one reply.

/// Envelope header.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageHeader {
    /// Protocol version string set by the sending node.
    #[prost(string, tag = "1")]
    pub version: String,
    /// Correlation id used only for logging.
    #[prost(string, tag = "2")]
    pub log_id: String,
    /// Sender node address as declared by the node (informational).
    #[prost(string, tag = "3")]
    pub from: String,
    /// Chain the message belongs to: the primary network or a parachain.
    #[prost(string, tag = "4")]
    pub bcname: String,
    /// Raw [`MessageType`] value.
    #[prost(enumeration = "MessageType", tag = "5")]
    pub msg_type: i32,
    /// Checksum over `data`, verified by the node, not by the gateway.
    #[prost(uint32, tag = "6")]
    pub data_check_sum: u32,
}

/// The relay envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RelayMessage {
    #[prost(message, optional, tag = "1")]
    pub header: Option<MessageHeader>,
    /// Opaque payload.
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

/// Relay message types understood by the backend node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    SendBlock = 0,
    PostTx = 1,
    BatchPostTx = 2,
    GetBlock = 3,
    GetBlockRes = 4,
    GetBlockchainStatus = 5,
    GetBlockchainStatusRes = 6,
    ConfirmBlockchainStatus = 7,
    ConfirmBlockchainStatusRes = 8,
    NewBlockId = 9,
    GetBlockHeaders = 10,
    GetBlockHeadersRes = 11,
    GetBlockTxs = 12,
    GetBlockTxsRes = 13,
    GetAuthentication = 14,
    GetAuthenticationRes = 15,
    ChainedBftNewViewMsg = 16,
    ChainedBftNewProposalMsg = 17,
    ChainedBftVoteMsg = 18,
}

/// How the relay delivers a message to the backend node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Send and return immediately; no reply is awaited.
    FireAndForget,
    /// Send and wait for exactly one correlated reply.
    RequestResponse,
}

impl MessageType {
    /// Delivery mode for this message type.
    pub fn delivery_mode(self) -> DeliveryMode {
        match self {
            MessageType::SendBlock
            | MessageType::PostTx
            | MessageType::BatchPostTx
            | MessageType::NewBlockId
            | MessageType::ChainedBftNewViewMsg
            | MessageType::ChainedBftNewProposalMsg
            | MessageType::ChainedBftVoteMsg => DeliveryMode::FireAndForget,
            _ => DeliveryMode::RequestResponse,
        }
    }
}

impl RelayMessage {
    /// Build a message with a header.
    pub fn new(bcname: impl Into<String>, msg_type: MessageType, data: Vec<u8>) -> Self {
        Self {
            header: Some(MessageHeader {
                bcname: bcname.into(),
                msg_type: msg_type as i32,
                ..Default::default()
            }),
            data,
        }
    }

    /// Target chain, empty when the header is missing.
    pub fn bcname(&self) -> &str {
        self.header.as_ref().map(|h| h.bcname.as_str()).unwrap_or("")
    }

    /// Log id, empty when the header is missing.
    pub fn log_id(&self) -> &str {
        self.header.as_ref().map(|h| h.log_id.as_str()).unwrap_or("")
    }

    /// Decoded message type, `None` for a missing header or an unknown value.
    pub fn message_type(&self) -> Option<MessageType> {
        self.header
            .as_ref()
            .and_then(|h| MessageType::try_from(h.msg_type).ok())
    }

    /// Delivery mode; unknown types are treated as queries.
    pub fn delivery_mode(&self) -> DeliveryMode {
        self.message_type()
            .map(MessageType::delivery_mode)
            .unwrap_or(DeliveryMode::RequestResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_types_are_fire_and_forget() {
        for t in [
            MessageType::SendBlock,
            MessageType::PostTx,
            MessageType::BatchPostTx,
            MessageType::NewBlockId,
            MessageType::ChainedBftVoteMsg,
            MessageType::ChainedBftNewProposalMsg,
            MessageType::ChainedBftNewViewMsg,
        ] {
            assert_eq!(t.delivery_mode(), DeliveryMode::FireAndForget, "{:?}", t);
        }
    }

    #[test]
    fn test_queries_expect_response() {
        assert_eq!(
            MessageType::GetBlock.delivery_mode(),
            DeliveryMode::RequestResponse
        );
        assert_eq!(
            MessageType::GetBlockchainStatus.delivery_mode(),
            DeliveryMode::RequestResponse
        );
    }

    #[test]
    fn test_unknown_type_is_query() {
        let mut msg = RelayMessage::new("xuper", MessageType::PostTx, vec![]);
        msg.header.as_mut().unwrap().msg_type = 999;
        assert_eq!(msg.message_type(), None);
        assert_eq!(msg.delivery_mode(), DeliveryMode::RequestResponse);
    }

    #[test]
    fn test_missing_header() {
        let msg = RelayMessage {
            header: None,
            data: vec![1, 2, 3],
        };
        assert_eq!(msg.bcname(), "");
        assert_eq!(msg.delivery_mode(), DeliveryMode::RequestResponse);
    }
}
