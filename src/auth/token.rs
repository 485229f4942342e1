use base64ct::{Base64UrlUnpadded, Encoding};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::{Duration, OffsetDateTime};

/// Tokens are valid for a fixed window set at issuance; verification never
/// extends it.
pub const TOKEN_TTL: Duration = Duration::days(7);

const SALT_BYTES: usize = 32;
const TOKEN_BYTES: usize = 48;

pub fn generate_salt() -> String {
    let mut buf = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut buf);
    Base64UrlUnpadded::encode_string(&buf)
}

/// Opaque URL-safe session token, 384 bits of entropy.
pub fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    Base64UrlUnpadded::encode_string(&buf)
}

pub fn token_expiry() -> OffsetDateTime {
    OffsetDateTime::now_utc() + TOKEN_TTL
}

/// SHA-256 digest of the password concatenated with the salt, as stored
/// in `users.password_hash`.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    Base64UrlUnpadded::encode_string(&hasher.finalize())
}

/// Timing-safe digest comparison.
pub fn hashes_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
