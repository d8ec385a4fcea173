//! gRPC CA client. Opens a fresh channel per call.

use crate::domain::CaError;
use crate::ports::CaClient;
use async_trait::async_trait;
use shared_types::ca::{
    CurrentCertRequest, CurrentCertResponse, EnrollNodeRequest, EnrollNodeResponse, RevokeListRequest,
    RevokeListResponse,
};
use shared_types::rpc::ca::ca_service_client::CaServiceClient;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

/// CA connect and call timeout.
pub const CA_TIMEOUT: Duration = Duration::from_secs(3);

/// [`CaClient`] over gRPC.
#[derive(Debug, Clone)]
pub struct GrpcCaClient {
    host: String,
    timeout: Duration,
}

impl GrpcCaClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            timeout: CA_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn connect(&self) -> Result<CaServiceClient<Channel>, CaError> {
        let connect_err = |reason: String| CaError::Connect {
            host: self.host.clone(),
            reason,
        };
        let channel = Endpoint::from_shared(format!("http://{}", self.host))
            .map_err(|e| connect_err(e.to_string()))?
            .connect_timeout(self.timeout)
            .timeout(self.timeout)
            .connect()
            .await
            .map_err(|e| connect_err(e.to_string()))?;
        Ok(CaServiceClient::new(channel))
    }
}

fn rpc_err(method: &'static str) -> impl Fn(tonic::Status) -> CaError {
    move |status| CaError::Rpc {
        method,
        reason: format!("{:?}: {}", status.code(), status.message()),
    }
}

#[async_trait]
impl CaClient for GrpcCaClient {
    async fn enroll_node(&self, request: EnrollNodeRequest) -> Result<EnrollNodeResponse, CaError> {
        let mut client = self.connect().await?;
        let response = client.enroll_node(request).await.map_err(rpc_err("EnrollNode"))?;
        Ok(response.into_inner())
    }

    async fn current_cert(&self, request: CurrentCertRequest) -> Result<CurrentCertResponse, CaError> {
        let mut client = self.connect().await?;
        let response = client
            .get_current_cert(request)
            .await
            .map_err(rpc_err("GetCurrentCert"))?;
        Ok(response.into_inner())
    }

    async fn revoke_list(&self, request: RevokeListRequest) -> Result<RevokeListResponse, CaError> {
        let mut client = self.connect().await?;
        let response = client
            .get_revoke_list(request)
            .await
            .map_err(rpc_err("GetRevokeList"))?;
        Ok(response.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_ca_is_connect_error() {
        // Port 1 on loopback refuses connections.
        let client = GrpcCaClient::new("127.0.0.1:1").with_timeout(Duration::from_millis(500));
        let err = client
            .revoke_list(RevokeListRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CaError::Connect { .. }));
    }
}
