//! HMAC request signing shared by signed-API drivers.
//!
//! The signed message is byte-exact: a UTF-8 BOM, the uppercase HTTP method,
//! the full URL as sent (query string included), the client id, an ISO-8601
//! timestamp with seconds precision, and the payload when one exists. The
//! digest is HMAC-SHA256, base64-encoded.

use base64::engine::general_purpose;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A timestamp and the signature computed over it.
///
/// The timestamp must be sent alongside the signature; the receiving side
/// recomputes the digest with the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    pub timestamp: String,
    pub signature: String,
}

/// Signs outbound requests and verifies inbound webhook deliveries.
#[derive(Clone)]
pub struct RequestSigner {
    client_id: String,
    secret: SecretString,
}

impl RequestSigner {
    pub fn new(client_id: impl Into<String>, secret: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            secret,
        }
    }

    /// Signs a request at the current time.
    ///
    /// `url` must be the exact URL the request is sent to, and `payload` the
    /// exact body string, or the receiving side will compute a different
    /// digest.
    pub fn sign(&self, method: &str, url: &str, payload: Option<&str>) -> RequestSignature {
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let signature = self.compute(
            method,
            url,
            &timestamp,
            payload.unwrap_or_default().as_bytes(),
        );
        RequestSignature {
            timestamp,
            signature,
        }
    }

    /// Verifies a signature against the raw delivered body.
    ///
    /// Comparison is constant-time and any mismatch, of timestamp, method,
    /// URL or body, yields `false`. Never panics on malformed input.
    pub fn verify(
        &self,
        method: &str,
        url: &str,
        timestamp: &str,
        body: &[u8],
        signature: &str,
    ) -> bool {
        let expected = self.compute(method, url, timestamp, body);
        constant_time_compare(expected.as_bytes(), signature.as_bytes())
    }

    fn compute(&self, method: &str, url: &str, timestamp: &str, payload: &[u8]) -> String {
        let message = self.message_bytes(method, url, timestamp, payload);
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(&message);
        general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    fn message_bytes(&self, method: &str, url: &str, timestamp: &str, payload: &[u8]) -> Vec<u8> {
        let method = method.to_uppercase();
        let mut message = Vec::with_capacity(
            UTF8_BOM.len()
                + method.len()
                + url.len()
                + self.client_id.len()
                + timestamp.len()
                + payload.len(),
        );
        message.extend_from_slice(UTF8_BOM);
        message.extend_from_slice(method.as_bytes());
        message.extend_from_slice(url.as_bytes());
        message.extend_from_slice(self.client_id.as_bytes());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(payload);
        message
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("client_id", &self.client_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Compares two byte slices without leaking where they differ.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
