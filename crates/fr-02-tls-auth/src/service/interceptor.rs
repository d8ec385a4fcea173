//! tonic interceptor running [`TlsAuthenticator::authenticate`] once per
//! inbound stream, before any handler.

use super::TlsAuthenticator;
use std::sync::Arc;
use tonic::service::Interceptor;
use tonic::{Request, Status};

/// Rejects unauthenticated streams and attaches the
/// [`PeerIdentity`](shared_types::PeerIdentity) to the request extensions.
#[derive(Clone)]
pub struct AuthInterceptor {
    authenticator: Arc<TlsAuthenticator>,
}

impl AuthInterceptor {
    pub fn new(authenticator: Arc<TlsAuthenticator>) -> Self {
        Self { authenticator }
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let certs = request.peer_certs();
        let leaf: Option<&[u8]> = certs
            .as_ref()
            .and_then(|certs| certs.first())
            .map(|cert| cert.as_ref());

        if let Some(identity) = self.authenticator.authenticate(leaf)? {
            request.extensions_mut().insert(identity);
        }
        Ok(request)
    }
}
