//! Identity service - resolves who invoked an operation
//!
//! The pipeline is linear with no retries:
//! caller certificate -> username -> registrar ecert -> affiliation.
//! The first failing step ends the resolution with its error.

use std::sync::Arc;

use crate::domain::identity::{certificate_der, common_name, pem_to_der, query_unescape};
use crate::domain::result::{Error, Result};
use crate::domain::{Affiliation, CallerData, EcertResponse, InvocationContext, PEER_ADDRESS_KEY};
use crate::ports::{LedgerStore, RegistrarClient};

/// Identity resolution pipeline
pub struct IdentityService {
    store: Arc<dyn LedgerStore>,
    registrar: Arc<dyn RegistrarClient>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn LedgerStore>, registrar: Arc<dyn RegistrarClient>) -> Self {
        Self { store, registrar }
    }

    /// Common name of the caller's own certificate
    pub fn resolve_username(&self, ctx: &InvocationContext) -> Result<String> {
        let bytes = ctx
            .caller_certificate()
            .ok_or(Error::CertificateUnavailable)?;
        let der = certificate_der(bytes)?;
        common_name(&der)
    }

    /// Encoded enrollment certificate of `username`, as the registrar returns it
    pub fn fetch_ecert(&self, username: &str) -> Result<String> {
        let peer_address = self.peer_address()?;
        let body = self.registrar.fetch_ecert(&peer_address, username)?;

        let response: EcertResponse =
            serde_json::from_slice(&body).map_err(|e| Error::CertificateDecode {
                user: username.to_string(),
                reason: e.to_string(),
            })?;
        Ok(response.ok)
    }

    /// Affiliation code embedded in an encoded ecert's common name
    pub fn check_affiliation(&self, encoded_cert: &str) -> Result<Affiliation> {
        let pem = query_unescape(encoded_cert)?;
        let der = pem_to_der(pem.as_bytes())?;
        let cn = common_name(&der)?;
        Affiliation::from_common_name(&cn)
    }

    /// Resolve username, ecert and affiliation of the caller
    pub fn get_caller_data(&self, ctx: &InvocationContext) -> Result<CallerData> {
        let username = self.resolve_username(ctx)?;
        tracing::debug!(user = %username, "resolved caller");

        let ecert = self.fetch_ecert(&username)?;
        let affiliation = self.check_affiliation(&ecert)?;
        tracing::debug!(user = %username, affiliation = affiliation.code(), "resolved affiliation");

        Ok(CallerData {
            username,
            ecert,
            affiliation: affiliation.code(),
        })
    }

    fn peer_address(&self) -> Result<String> {
        let bytes = self
            .store
            .get(PEER_ADDRESS_KEY)
            .map_err(|e| {
                tracing::warn!("reading {} failed: {}", PEER_ADDRESS_KEY, e);
                Error::PeerAddressUnavailable
            })?
            .ok_or(Error::PeerAddressUnavailable)?;

        String::from_utf8(bytes).map_err(|_| Error::PeerAddressUnavailable)
    }
}
