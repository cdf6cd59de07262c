use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const MIN_CERTIFICATE_LEN: usize = 32;

/// Default credential lifetime: one hour from issuance.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum RtcTokenError {
    #[error("app certificate is too short (min {MIN_CERTIFICATE_LEN} bytes)")]
    CertificateTooShort,

    #[error("invalid token format")]
    InvalidFormat,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is expired")]
    Expired,

    #[error("failed to decode token payload")]
    PayloadDecode,

    #[error("failed to parse token payload")]
    PayloadParse,
}

/// Channel privilege carried by a credential.
///
/// Every issued token is publish-capable; the role split lives in the uid
/// prefix, not in the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RtcPrivilege {
    Publisher,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RtcClaims {
    pub app_id: String,
    pub channel: String,
    pub uid: String,
    pub privilege: RtcPrivilege,
    pub issued_at: u64,
    pub expires_at: u64,
}

impl RtcClaims {
    pub fn is_expired(&self, reference_secs: u64) -> bool {
        reference_secs >= self.expires_at
    }
}

/// Signs and verifies channel credentials from (appId, certificate).
///
/// Tokens are stateless and cannot be revoked before expiry.
#[derive(Clone)]
pub struct RtcTokenBuilder {
    app_id: String,
    certificate: Arc<[u8]>,
    ttl: Duration,
}

impl RtcTokenBuilder {
    pub fn new(app_id: String, certificate: &str, ttl: Duration) -> Result<Self, RtcTokenError> {
        if certificate.len() < MIN_CERTIFICATE_LEN {
            return Err(RtcTokenError::CertificateTooShort);
        }

        Ok(Self {
            app_id,
            certificate: Arc::from(certificate.as_bytes().to_vec()),
            ttl,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a publish-capable credential for (channel, uid).
    pub fn issue(
        &self,
        channel: &str,
        uid: &str,
        issued_at: u64,
    ) -> Result<String, RtcTokenError> {
        let claims = RtcClaims {
            app_id: self.app_id.clone(),
            channel: channel.to_string(),
            uid: uid.to_string(),
            privilege: RtcPrivilege::Publisher,
            issued_at,
            expires_at: issued_at.saturating_add(self.ttl.as_secs()),
        };

        let payload = serde_json::to_vec(&claims).map_err(|_| RtcTokenError::PayloadParse)?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let signature = self.sign(payload_b64.as_bytes())?;
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature);
        Ok(format!("{payload_b64}.{signature_b64}"))
    }

    /// Verify a credential and return its claims.
    pub fn verify(&self, token: &str, reference_secs: u64) -> Result<RtcClaims, RtcTokenError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(RtcTokenError::InvalidFormat)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| RtcTokenError::InvalidFormat)?;

        let mut mac = HmacSha256::new_from_slice(&self.certificate)
            .map_err(|_| RtcTokenError::InvalidSignature)?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| RtcTokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| RtcTokenError::PayloadDecode)?;

        let claims: RtcClaims =
            serde_json::from_slice(&payload).map_err(|_| RtcTokenError::PayloadParse)?;

        if claims.is_expired(reference_secs) {
            return Err(RtcTokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, bytes: &[u8]) -> Result<Vec<u8>, RtcTokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.certificate)
            .map_err(|_| RtcTokenError::InvalidSignature)?;
        mac.update(bytes);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_builder() -> RtcTokenBuilder {
        RtcTokenBuilder::new(
            "test-app".to_string(),
            "0123456789abcdef0123456789abcdef",
            Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
        )
        .expect("valid builder")
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let builder = test_builder();
        let token = builder.issue("s_room1", "p_71aa", 1_000).expect("issue");

        let claims = builder.verify(&token, 1_500).expect("verify");
        assert_eq!(claims.channel, "s_room1");
        assert_eq!(claims.uid, "p_71aa");
        assert_eq!(claims.issued_at, 1_000);
        assert_eq!(claims.expires_at, 1_000 + DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn both_roles_decode_to_publisher() {
        let builder = test_builder();
        for uid in ["p_42", "g_42"] {
            let token = builder.issue("s_room1", uid, 0).expect("issue");
            let claims = builder.verify(&token, 10).expect("verify");
            assert_eq!(claims.privilege, RtcPrivilege::Publisher);
        }
    }

    #[test]
    fn rejects_tampered_token() {
        let builder = test_builder();
        let token = builder.issue("s_room1", "g_1", 10).expect("issue");
        let (payload, signature) = token.split_once('.').expect("token split");
        let mut chars: Vec<char> = payload.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered_payload: String = chars.into_iter().collect();
        let tampered = format!("{tampered_payload}.{signature}");

        assert!(matches!(
            builder.verify(&tampered, 20),
            Err(RtcTokenError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let builder = test_builder();
        let token = builder.issue("s_room1", "g_1", 1_000).expect("issue");

        assert!(matches!(
            builder.verify(&token, 1_000 + DEFAULT_TOKEN_TTL_SECS),
            Err(RtcTokenError::Expired)
        ));
    }

    #[test]
    fn rejects_short_certificate() {
        assert!(matches!(
            RtcTokenBuilder::new("app".into(), "short", Duration::from_secs(60)),
            Err(RtcTokenError::CertificateTooShort)
        ));
    }

    #[test]
    fn rejects_garbage_token() {
        let builder = test_builder();
        assert!(matches!(
            builder.verify("not-a-token", 0),
            Err(RtcTokenError::InvalidFormat)
        ));
    }
}
