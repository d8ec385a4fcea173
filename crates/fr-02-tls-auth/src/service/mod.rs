//! # Application Services

mod authenticator;
mod interceptor;

pub use authenticator::{TlsAuthConfig, TlsAuthenticator, TlsCredentials};
pub use interceptor::AuthInterceptor;
