use sha2::{Digest, Sha256};

/// Generate an opaque refresh credential: 32 random bytes, hex-encoded.
pub fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// One-way digest of a refresh credential. Only this value is ever persisted
/// or compared; the raw credential lives exclusively with the client.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
