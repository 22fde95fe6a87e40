//! Registrar port - enrollment certificate lookup

use crate::domain::result::Result;

/// Client for the registrar service that issues enrollment certificates
///
/// Implementations perform `GET http://<peer_address>/registrar/<username>/ecert`
/// and return the raw response body. Transport failures and non-success
/// statuses are `Error::RegistrarCall`; failures while reading the body are
/// `Error::BodyRead`. Decoding the body is left to the caller.
pub trait RegistrarClient: Send + Sync {
    fn fetch_ecert(&self, peer_address: &str, username: &str) -> Result<Vec<u8>>;
}
