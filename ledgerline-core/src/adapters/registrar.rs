//! Registrar HTTP client
//!
//! Talks to the registrar REST API to fetch a user's enrollment
//! certificate: `GET http://<peer_address>/registrar/<username>/ecert`.

use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client;
use url::Url;

use crate::domain::result::{Error, Result as DomainResult};
use crate::ports::RegistrarClient;

/// Blocking HTTP registrar client
#[derive(Debug, Clone)]
pub struct HttpRegistrarClient {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpRegistrarClient {
    /// Create a client. `None` means no client-side timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    /// Build the ecert URL, percent-encoding the username as one path segment
    pub fn ecert_url(peer_address: &str, username: &str) -> DomainResult<Url> {
        let mut url = Url::parse(&format!("http://{}/", peer_address.trim())).map_err(|e| {
            Error::RegistrarCall(format!("invalid peer address {:?}: {}", peer_address, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                Error::RegistrarCall(format!("invalid peer address {:?}", peer_address))
            })?
            .pop_if_empty()
            .extend(["registrar", username, "ecert"]);

        Ok(url)
    }

    /// Map request errors to readable messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            let secs = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
            Error::RegistrarCall(format!("connection timed out after {} seconds", secs))
        } else if error.is_connect() {
            Error::RegistrarCall(format!("unable to connect to registrar: {}", error))
        } else {
            Error::RegistrarCall(error.to_string())
        }
    }
}

impl RegistrarClient for HttpRegistrarClient {
    fn fetch_ecert(&self, peer_address: &str, username: &str) -> DomainResult<Vec<u8>> {
        let url = Self::ecert_url(peer_address, username)?;
        tracing::debug!(%url, "requesting ecert from registrar");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RegistrarCall(format!(
                "registrar returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .map_err(|e| Error::BodyRead(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registrar_mock::{MockRegistrarServer, MockResponse};

    #[test]
    fn test_ecert_url() {
        let url = HttpRegistrarClient::ecert_url("127.0.0.1:7050", "alice").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:7050/registrar/alice/ecert");
    }

    #[test]
    fn test_ecert_url_keeps_peer_path_and_encodes_username() {
        let url = HttpRegistrarClient::ecert_url("peer:7050/api", "bob smith/x").unwrap();
        assert_eq!(
            url.as_str(),
            "http://peer:7050/api/registrar/bob%20smith%2Fx/ecert"
        );
    }

    #[test]
    fn test_ecert_url_rejects_bad_peer() {
        let err = HttpRegistrarClient::ecert_url("", "alice").unwrap_err();
        assert!(matches!(err, Error::RegistrarCall(_)));
    }

    #[test]
    fn test_fetch_ecert_returns_body() {
        let server = MockRegistrarServer::start()
            .unwrap()
            .with_route("/registrar/alice/ecert", MockResponse::ok(r#"{"OK":"abc"}"#));
        let client = HttpRegistrarClient::new(Some(Duration::from_secs(5))).unwrap();

        let body = client.fetch_ecert(&server.address(), "alice").unwrap();
        assert_eq!(body, br#"{"OK":"abc"}"#.to_vec());
        assert_eq!(server.hits(), 1);
    }

    #[test]
    fn test_fetch_ecert_non_success_status() {
        let server = MockRegistrarServer::start().unwrap();
        let client = HttpRegistrarClient::new(Some(Duration::from_secs(5))).unwrap();

        let err = client.fetch_ecert(&server.address(), "nobody").unwrap_err();
        match err {
            Error::RegistrarCall(msg) => assert!(msg.contains("404")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_ecert_truncated_body() {
        let server = MockRegistrarServer::start()
            .unwrap()
            .with_route("/registrar/alice/ecert", MockResponse::Truncated);
        let client = HttpRegistrarClient::new(Some(Duration::from_secs(5))).unwrap();

        let err = client.fetch_ecert(&server.address(), "alice").unwrap_err();
        assert!(matches!(err, Error::BodyRead(_)), "got {:?}", err);
    }

    #[test]
    fn test_fetch_ecert_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = HttpRegistrarClient::new(Some(Duration::from_secs(5))).unwrap();

        let err = client
            .fetch_ecert(&format!("127.0.0.1:{}", port), "alice")
            .unwrap_err();
        assert!(matches!(err, Error::RegistrarCall(_)));
    }
}
