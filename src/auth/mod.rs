pub mod init_data;
pub mod session;

pub use init_data::{InitDataError, InitDataVerifier, TelegramUser};
pub use session::{SessionPayload, SessionTokenService, TokenError};

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Keyed SHA-256 digest of `msg`. HMAC accepts keys of any length, so
/// construction cannot fail.
pub(crate) fn hmac_sha256(key: &[u8], msg: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(msg);
    mac.finalize().into_bytes().into()
}
