//! Service-account authentication for Google APIs
//!
//! A service account key file holds an RSA private key. An access token is
//! obtained with the OAuth2 JWT-bearer grant: a short-lived assertion signed
//! with RS256 is exchanged at the key's token endpoint.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use ddns_core::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default OAuth2 token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 scope granting read/write access to Cloud DNS
pub const CLOUD_DNS_SCOPE: &str = "https://www.googleapis.com/auth/ndev.clouddns.readwrite";

/// Assertion lifetime in seconds
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

/// Service account key file contents
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<REDACTED>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid service account key: {}", e)))?;

        if key.client_email.trim().is_empty() {
            return Err(Error::config("Service account key has an empty client_email"));
        }
        if key.private_key.trim().is_empty() {
            return Err(Error::config("Service account key has an empty private_key"));
        }

        Ok(key)
    }

    /// Load a key file from disk
    ///
    /// Unreadable or malformed files are configuration errors.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Cannot read service account key {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Build an RS256-signed JWT assertion for the token endpoint
    ///
    /// `now` is the issue time as a Unix timestamp.
    pub fn signed_assertion(&self, scope: &str, now: i64) -> Result<String> {
        let header = serde_json::json!({
            "alg": "RS256",
            "typ": "JWT",
            "kid": self.private_key_id,
        });

        let claims = serde_json::json!({
            "iss": self.client_email,
            "scope": scope,
            "aud": self.token_uri,
            "iat": now,
            "exp": now + ASSERTION_LIFETIME_SECS,
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string().as_bytes());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        let message = format!("{}.{}", header_b64, claims_b64);

        let signature = sign_rs256(&message, &self.private_key)?;

        Ok(format!("{}.{}", message, URL_SAFE_NO_PAD.encode(signature)))
    }
}

/// Sign a message with RSASSA-PKCS1-v1_5 over SHA-256
fn sign_rs256(message: &str, private_key_pem: &str) -> Result<Vec<u8>> {
    use rsa::RsaPrivateKey;
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::signature::{SignatureEncoding, Signer};
    use sha2::Sha256;

    let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
        .map_err(|e| Error::auth(format!("Invalid private key: {}", e)))?;

    // DigestInfo-prefixed, as RS256 requires
    let signing_key = SigningKey::<Sha256>::new(private_key);
    let signature = signing_key.sign(message.as_bytes());

    Ok(signature.to_vec())
}

/// Response of the OAuth2 token endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub expires_in: u64,
    #[allow(dead_code)]
    #[serde(default)]
    pub token_type: String,
}
