//! Generates gRPC client/server stubs for the hand-written prost messages.
//!
//! Services are described in Rust rather than `.proto` files so the build does
//! not depend on a `protoc` installation.

use tonic_build::manual::{Builder, Method, Service};

const PROST_CODEC: &str = "tonic::codec::ProstCodec";

fn method(name: &str, route: &str, input: &str, output: &str) -> tonic_build::manual::MethodBuilder {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(input)
        .output_type(output)
        .codec_path(PROST_CODEC)
}

fn main() {
    let p2p = Service::builder()
        .name("P2pService")
        .package("front.p2p")
        .method(
            method(
                "send_message",
                "SendMessage",
                "crate::envelope::RelayMessage",
                "crate::envelope::RelayMessage",
            )
            .client_streaming()
            .server_streaming()
            .build(),
        )
        .build();

    let node = Service::builder()
        .name("NodeService")
        .package("front.node")
        .method(
            method(
                "pre_exec",
                "PreExec",
                "crate::node::InvokeRpcRequest",
                "crate::node::InvokeRpcResponse",
            )
            .build(),
        )
        .build();

    let events = Service::builder()
        .name("EventService")
        .package("front.node")
        .method(
            method(
                "subscribe",
                "Subscribe",
                "crate::node::SubscribeRequest",
                "crate::node::Event",
            )
            .server_streaming()
            .build(),
        )
        .build();

    let ca = Service::builder()
        .name("CaService")
        .package("front.ca")
        .method(
            method(
                "enroll_node",
                "EnrollNode",
                "crate::ca::EnrollNodeRequest",
                "crate::ca::EnrollNodeResponse",
            )
            .build(),
        )
        .method(
            method(
                "get_current_cert",
                "GetCurrentCert",
                "crate::ca::CurrentCertRequest",
                "crate::ca::CurrentCertResponse",
            )
            .build(),
        )
        .method(
            method(
                "get_revoke_list",
                "GetRevokeList",
                "crate::ca::RevokeListRequest",
                "crate::ca::RevokeListResponse",
            )
            .build(),
        )
        .build();

    Builder::new().compile(&[p2p, node, events, ca]);
}
