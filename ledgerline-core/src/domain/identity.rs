//! Caller identity domain model
//!
//! Certificate parsing and common-name decoding. Everything here is pure;
//! the registrar call lives behind the `RegistrarClient` port.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use x509_parser::parse_x509_certificate;
use x509_parser::pem::parse_x509_pem;

use super::result::{Error, Result};

/// Ledger key holding the registrar host (`host:port`)
pub const PEER_ADDRESS_KEY: &str = "Peer_Address";

/// Separator of the structured common name (`user\org\affiliation`)
pub const COMMON_NAME_SEPARATOR: char = '\\';

const PEM_PREFIX: &[u8] = b"-----BEGIN";

/// Per-invocation context supplied by whoever drives the contract
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    caller_certificate: Option<Vec<u8>>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the caller's certificate (DER, or PEM which is unwrapped on use)
    pub fn with_caller_certificate(mut self, certificate: impl Into<Vec<u8>>) -> Self {
        self.caller_certificate = Some(certificate.into());
        self
    }

    pub fn caller_certificate(&self) -> Option<&[u8]> {
        self.caller_certificate.as_deref()
    }
}

/// Registrar response body: `{"OK": "<url-encoded PEM certificate>"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcertResponse {
    #[serde(rename = "OK")]
    pub ok: String,
}

/// Affiliation code embedded in a common name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation(pub i64);

impl Affiliation {
    /// Read segment 2 of a backslash separated common name
    pub fn from_common_name(common_name: &str) -> Result<Self> {
        let segment = common_name
            .split(COMMON_NAME_SEPARATOR)
            .nth(2)
            .ok_or_else(|| Error::MalformedCommonName {
                common_name: common_name.to_string(),
                reason: "expected at least 3 segments".to_string(),
            })?;

        segment
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::MalformedCommonName {
                common_name: common_name.to_string(),
                reason: format!("affiliation {:?} is not an integer", segment),
            })
    }

    pub fn code(self) -> i64 {
        self.0
    }
}

/// Identity of the invoking party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerData {
    pub username: String,
    pub ecert: String,
    pub affiliation: i64,
}

impl CallerData {
    /// JSON payload returned by `getCallerData`
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Encode(e.to_string()))
    }
}

/// Subject common name of a DER encoded certificate
pub fn common_name(der: &[u8]) -> Result<String> {
    let (_, cert) =
        parse_x509_certificate(der).map_err(|e| Error::CertificateParse(e.to_string()))?;

    let attr = cert
        .subject()
        .iter_common_name()
        .next()
        .ok_or_else(|| Error::CertificateParse("subject has no common name".to_string()))?;

    attr.as_str()
        .map(str::to_string)
        .map_err(|e| Error::CertificateParse(e.to_string()))
}

/// Unwrap the first PEM block into DER bytes
pub fn pem_to_der(pem: &[u8]) -> Result<Vec<u8>> {
    parse_x509_pem(pem)
        .map(|(_, block)| block.contents)
        .map_err(|e| Error::CertificateParse(e.to_string()))
}

/// DER bytes for a certificate given either as DER or as PEM
pub fn certificate_der(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    if bytes.trim_ascii_start().starts_with(PEM_PREFIX) {
        pem_to_der(bytes).map(Cow::Owned)
    } else {
        Ok(Cow::Borrowed(bytes))
    }
}

/// Decode a URL query-escaped string
///
/// `%XX` escapes are decoded and `+` becomes a space. A `%` that is not
/// followed by two hex digits, or a result that is not UTF-8, is an error.
pub fn query_unescape(encoded: &str) -> Result<String> {
    let bytes = encoded.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(Error::Decode(format!("invalid escape at offset {}", i)));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = encoded.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| Error::Decode(e.to_string()))
}
