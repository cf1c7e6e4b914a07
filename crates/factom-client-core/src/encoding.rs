//! Encoding primitives: hex, UTF-8, Base58, Base64 and the SHA-2 digests the
//! protocol is built on.
//!
//! Everything here is a pure function.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256, Sha512};

use crate::error::CoreError;

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice, as used by address checksums and RCD hashes.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// SHA-512 of `data`.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&Sha512::digest(data));
    out
}

/// Lowercase hex encoding.
pub fn to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a hex string, accepting either case.
pub fn from_hex(s: &str) -> Result<Vec<u8>, CoreError> {
    hex::decode(s).map_err(|e| CoreError::DecodingError(format!("hex: {e}")))
}

/// Decode a hex string that must hold exactly `N` bytes.
pub fn from_hex_array<const N: usize>(s: &str) -> Result<[u8; N], CoreError> {
    let bytes = from_hex(s)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        CoreError::DecodingError(format!("expected {N} bytes, got {}", bytes.len()))
    })
}

/// Bitcoin-alphabet Base58 encoding.
pub fn to_base58(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Bitcoin-alphabet Base58 decoding.
pub fn from_base58(s: &str) -> Result<Vec<u8>, CoreError> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| CoreError::DecodingError(format!("base58: {e}")))
}

/// Standard padded Base64 encoding.
pub fn to_base64(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Standard padded Base64 decoding.
pub fn from_base64(s: &str) -> Result<Vec<u8>, CoreError> {
    BASE64
        .decode(s)
        .map_err(|e| CoreError::DecodingError(format!("base64: {e}")))
}

/// Interpret bytes as UTF-8 text.
pub fn from_utf8(data: &[u8]) -> Result<String, CoreError> {
    String::from_utf8(data.to_vec()).map_err(|e| CoreError::DecodingError(format!("utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            to_hex(&sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256d_is_double_hash() {
        assert_eq!(sha256d(b"factom"), sha256(&sha256(b"factom")));
    }

    #[test]
    fn test_sha512_known_prefix() {
        assert!(to_hex(&sha512(b"abc")).starts_with("ddaf35a193617aba"));
    }

    #[test]
    fn test_base58_leading_zeros() {
        let data = [0u8, 0, 1, 2, 3];
        let encoded = to_base58(&data);
        assert!(encoded.starts_with("11"));
        assert_eq!(from_base58(&encoded).unwrap(), data);
    }

    #[test]
    fn test_base58_rejects_invalid_alphabet() {
        assert!(from_base58("0OIl").is_err());
    }

    #[test]
    fn test_base64_and_hex() {
        assert_eq!(to_base64(b"hello"), "aGVsbG8=");
        assert_eq!(from_base64("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(from_hex("DEADbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(from_hex_array::<4>("deadbe").is_err());
    }

    #[test]
    fn test_utf8() {
        assert_eq!(from_utf8(b"ok").unwrap(), "ok");
        assert!(from_utf8(&[0xff, 0xfe]).is_err());
    }
}
