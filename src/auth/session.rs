use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use super::hmac_sha256;

/// Token verification failures. The two kinds exist so logs can distinguish
/// them; HTTP responses must not (both map to a generic 401).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad token signature")]
    BadSignature,
}

/// Plaintext content of a session token. `ts` is the issuance time in epoch
/// milliseconds; it is informational and not checked against any expiry
/// window here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub id: i64,
    pub username: Option<String>,
    pub ts: i64,
}

impl SessionPayload {
    pub fn new(id: i64, username: Option<String>) -> Self {
        Self {
            id,
            username,
            ts: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Issues and verifies compact self-authenticating session tokens of the form
/// `<hex-signature>.<base64url-payload>`. The server stores nothing; validity
/// is recomputed from the configured secret on every request.
#[derive(Clone)]
pub struct SessionTokenService {
    secret: String,
}

impl SessionTokenService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Serializes the payload once and uses those exact bytes both for the
    /// signature and for the encoded segment, so issuance and verification
    /// always agree on the signed input.
    pub fn issue(&self, payload: &SessionPayload) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(payload)?;
        let signature = hex::encode(hmac_sha256(self.secret.as_bytes(), &json));
        Ok(format!("{}.{}", signature, URL_SAFE_NO_PAD.encode(json)))
    }

    pub fn verify(&self, token: &str) -> Result<SessionPayload, TokenError> {
        let (signature, payload_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        if signature.is_empty() || payload_b64.is_empty() {
            return Err(TokenError::Malformed);
        }

        let json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let provided = hex::decode(signature).map_err(|_| TokenError::Malformed)?;
        let expected = hmac_sha256(self.secret.as_bytes(), &json);

        // Equal lengths before the constant-time comparison; a truncated
        // signature must fail cleanly, not panic.
        if provided.len() != expected.len() {
            return Err(TokenError::BadSignature);
        }
        if !bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            return Err(TokenError::BadSignature);
        }

        serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionTokenService {
        SessionTokenService::new("test_session_secret")
    }

    #[test]
    fn round_trip_preserves_payload() {
        let payload = SessionPayload {
            id: 123456789,
            username: Some("testuser".to_string()),
            ts: 1_700_000_000_000,
        };
        let token = service().issue(&payload).expect("issue");
        assert_eq!(service().verify(&token).expect("verify"), payload);
    }

    #[test]
    fn round_trip_with_null_username() {
        let payload = SessionPayload {
            id: 42,
            username: None,
            ts: 1_700_000_000_000,
        };
        let token = service().issue(&payload).expect("issue");
        assert_eq!(service().verify(&token).expect("verify"), payload);
    }

    #[test]
    fn payload_from_new_carries_current_timestamp() {
        let before = chrono::Utc::now().timestamp_millis();
        let payload = SessionPayload::new(7, None);
        let after = chrono::Utc::now().timestamp_millis();
        assert!(payload.ts >= before && payload.ts <= after);
    }

    #[test]
    fn flipping_any_character_fails_with_an_error() {
        let payload = SessionPayload {
            id: 99,
            username: Some("mallory".to_string()),
            ts: 1_700_000_000_000,
        };
        let token = service().issue(&payload).expect("issue");

        for i in 0..token.len() {
            let mut bytes = token.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let Ok(tampered) = String::from_utf8(bytes) else {
                continue;
            };
            if tampered == token {
                continue;
            }
            assert!(
                service().verify(&tampered).is_err(),
                "tampering at byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn rejects_token_without_separator() {
        assert_eq!(
            service().verify("deadbeef").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn rejects_empty_segments() {
        assert_eq!(service().verify(".payload").unwrap_err(), TokenError::Malformed);
        assert_eq!(service().verify("deadbeef.").unwrap_err(), TokenError::Malformed);
        assert_eq!(service().verify(".").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn rejects_invalid_base64_payload() {
        assert_eq!(
            service().verify("deadbeef.!!!not-base64!!!").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn rejects_short_signature_without_panicking() {
        let payload = SessionPayload {
            id: 1,
            username: None,
            ts: 0,
        };
        let token = service().issue(&payload).expect("issue");
        let (_, payload_b64) = token.split_once('.').expect("separator");
        assert_eq!(
            service()
                .verify(&format!("abcd.{}", payload_b64))
                .unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let payload = SessionPayload {
            id: 1,
            username: None,
            ts: 0,
        };
        let token = SessionTokenService::new("other_secret")
            .issue(&payload)
            .expect("issue");
        assert_eq!(
            service().verify(&token).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn verification_is_idempotent() {
        let payload = SessionPayload {
            id: 5,
            username: Some("twice".to_string()),
            ts: 1_700_000_000_000,
        };
        let token = service().issue(&payload).expect("issue");
        let first = service().verify(&token).expect("first verify");
        let second = service().verify(&token).expect("second verify");
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_issue_and_verify_do_not_interfere() {
        let svc = SessionTokenService::new("concurrent-secret");
        std::thread::scope(|scope| {
            for n in 0i64..8 {
                let svc = &svc;
                scope.spawn(move || {
                    for i in 0i64..50 {
                        let payload = SessionPayload {
                            id: n * 1000 + i + 1,
                            username: Some(format!("user{}", n)),
                            ts: 1_700_000_000_000 + i,
                        };
                        let token = svc.issue(&payload).expect("issue");
                        assert_eq!(svc.verify(&token).expect("verify"), payload);
                    }
                });
            }
        });
    }
}
