use std::collections::BTreeMap;

use serde::Deserialize;
use subtle::ConstantTimeEq;

use super::hmac_sha256;

/// Failure modes of WebApp launch-data validation. Signature problems are kept
/// apart from a missing or unreadable `user` field so the HTTP layer can tell
/// spoofed requests from broken client payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InitDataError {
    #[error("bad signature")]
    BadSignature,
    #[error("user field missing")]
    MissingUser,
    #[error("user field is not a valid user object")]
    InvalidUserPayload,
}

/// The Telegram user object carried in the `user` field of init data. Telegram
/// adds fields over time; unknown ones are ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
    pub photo_url: Option<String>,
}

impl TelegramUser {
    /// Extracts the signed `user` field from already-verified init-data
    /// fields. An id that is missing or not a positive integer is rejected; a
    /// session must always be bound to a real identity.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Result<Self, InitDataError> {
        let raw = fields.get("user").ok_or(InitDataError::MissingUser)?;
        let user: TelegramUser =
            serde_json::from_str(raw).map_err(|_| InitDataError::InvalidUserPayload)?;
        if user.id <= 0 {
            return Err(InitDataError::InvalidUserPayload);
        }
        Ok(user)
    }
}

/// Validates that a raw `initData` query string was produced by Telegram for
/// the bot whose token this verifier holds.
#[derive(Clone)]
pub struct InitDataVerifier {
    bot_token: String,
}

impl InitDataVerifier {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
        }
    }

    /// Checks the `hash` field against the keyed-hash chain mandated by the
    /// Bot API: `secret = HMAC-SHA256("WebAppData", bot_token)`, then
    /// `HMAC-SHA256(secret, check_string)` compared in constant time. On
    /// success the decoded fields are returned with `hash` removed.
    pub fn verify(&self, init_data: &str) -> Result<BTreeMap<String, String>, InitDataError> {
        let mut fields: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in url::form_urlencoded::parse(init_data.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            fields.insert(key.into_owned(), value.into_owned());
        }

        // The claimed signature must not participate in the check string.
        let provided = fields.remove("hash").unwrap_or_default();
        if provided.is_empty() {
            return Err(InitDataError::BadSignature);
        }
        let provided = hex::decode(&provided).map_err(|_| InitDataError::BadSignature)?;

        let check_string = check_string(&fields);
        let secret_key = hmac_sha256(b"WebAppData", self.bot_token.as_bytes());
        let calculated = hmac_sha256(&secret_key, check_string.as_bytes());

        // Length is checked up front; the comparator itself must only ever see
        // equal-length buffers.
        if provided.len() != calculated.len() {
            return Err(InitDataError::BadSignature);
        }
        if bool::from(calculated.as_slice().ct_eq(provided.as_slice())) {
            Ok(fields)
        } else {
            Err(InitDataError::BadSignature)
        }
    }
}

/// Canonical data-check string: every field except `hash`, sorted by key in
/// byte order, rendered as `key=value` lines joined with `\n`.
fn check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_TOKEN: &str = "TESTTOKEN";

    // Hash precomputed with the documented algorithm over the check string
    // "auth_date=1700000000\nquery_id=AAHdF6IQAAAAAN0XohDhrOrc\nuser={...}".
    const VALID_INIT_DATA: &str = "query_id=AAHdF6IQAAAAAN0XohDhrOrc&user=%7B%22id%22%3A123456789%2C%22first_name%22%3A%22Test%22%2C%22username%22%3A%22testuser%22%7D&auth_date=1700000000&hash=91c5986db3659ac037c53c015fe032f5741cba17f0077608800e04d273ad91d7";

    fn verifier() -> InitDataVerifier {
        InitDataVerifier::new(BOT_TOKEN)
    }

    #[test]
    fn accepts_known_vector_and_decodes_user() {
        let fields = verifier().verify(VALID_INIT_DATA).expect("valid init data");
        assert!(!fields.contains_key("hash"));
        assert_eq!(
            fields.get("auth_date").map(String::as_str),
            Some("1700000000")
        );

        let user = TelegramUser::from_fields(&fields).expect("user");
        assert_eq!(user.id, 123456789);
        assert_eq!(user.username.as_deref(), Some("testuser"));
        assert_eq!(user.first_name.as_deref(), Some("Test"));
    }

    #[test]
    fn check_string_is_sorted_and_newline_joined() {
        let mut fields = BTreeMap::new();
        fields.insert("b".to_string(), "2".to_string());
        fields.insert("a".to_string(), "1".to_string());
        assert_eq!(check_string(&fields), "a=1\nb=2");
    }

    #[test]
    fn verifies_against_sorted_check_string_regardless_of_field_order() {
        // Hash over "a=1\nb=2"; fields arrive in the opposite order.
        let data =
            "b=2&a=1&hash=3bd88e7e6694d56df2fc9be10ac40826e830406a2aae79c0502b2365c51c6968";
        let fields = verifier().verify(data).expect("valid signature");
        // Signature is fine, but there is no user to extract.
        assert_eq!(
            TelegramUser::from_fields(&fields).unwrap_err(),
            InitDataError::MissingUser
        );
    }

    #[test]
    fn ignores_pairs_with_empty_keys() {
        let data =
            "=noise&b=2&a=1&hash=3bd88e7e6694d56df2fc9be10ac40826e830406a2aae79c0502b2365c51c6968";
        assert!(verifier().verify(data).is_ok());
    }

    #[test]
    fn rejects_missing_hash() {
        assert_eq!(
            verifier().verify("a=1&b=2").unwrap_err(),
            InitDataError::BadSignature
        );
    }

    #[test]
    fn rejects_empty_hash() {
        assert_eq!(
            verifier().verify("a=1&b=2&hash=").unwrap_err(),
            InitDataError::BadSignature
        );
    }

    #[test]
    fn rejects_tampered_hash() {
        let tampered = VALID_INIT_DATA.replace("hash=9", "hash=a");
        assert_eq!(
            verifier().verify(&tampered).unwrap_err(),
            InitDataError::BadSignature
        );
    }

    #[test]
    fn rejects_hash_of_wrong_length_without_panicking() {
        assert_eq!(
            verifier().verify("a=1&hash=abcd").unwrap_err(),
            InitDataError::BadSignature
        );
    }

    #[test]
    fn rejects_non_hex_hash() {
        let junk = "a=1&hash=zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz";
        assert_eq!(
            verifier().verify(junk).unwrap_err(),
            InitDataError::BadSignature
        );
    }

    #[test]
    fn rejects_signature_made_for_another_bot() {
        let other = InitDataVerifier::new("OTHERTOKEN");
        assert_eq!(
            other.verify(VALID_INIT_DATA).unwrap_err(),
            InitDataError::BadSignature
        );
    }

    #[test]
    fn rejects_non_positive_user_id() {
        // Hash over "auth_date=1700000000\nuser={\"id\":0,\"first_name\":\"Ghost\"}".
        let data = "user=%7B%22id%22%3A0%2C%22first_name%22%3A%22Ghost%22%7D&auth_date=1700000000&hash=cb4a1b6b69ab1d9f23574f2217d60bf6c8c28f2a7be8e1c4360329b811e65ef0";
        let fields = verifier().verify(data).expect("valid signature");
        assert_eq!(
            TelegramUser::from_fields(&fields).unwrap_err(),
            InitDataError::InvalidUserPayload
        );
    }

    #[test]
    fn rejects_user_field_that_is_not_json() {
        // Hash over "auth_date=1700000000\nuser=not-json".
        let data = "user=not-json&auth_date=1700000000&hash=4edc3ece9159bb13c306d217f0ca87726fac253954d38c6ceecf538261c0aac0";
        let fields = verifier().verify(data).expect("valid signature");
        assert_eq!(
            TelegramUser::from_fields(&fields).unwrap_err(),
            InitDataError::InvalidUserPayload
        );
    }
}
