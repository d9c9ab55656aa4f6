use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::convert::TryInto;
use std::fmt::{Display, Formatter};
use thiserror::Error;

const SHA256_BYTE_COUNT: usize = 32;

/// Sha-256 is a 256-bit array or 32 bytes.
/// It provides an API to display as hex-encoded string and parse it from a hex-encoded string.
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
pub struct Sha256([u8; SHA256_BYTE_COUNT]);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HashParseError {
    #[error("invalid SHA-256 length, expected {expected} bytes but got {actual} in: {input}")]
    InvalidLength {
        expected: usize,
        actual: usize,
        input: String,
    },
    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl Sha256 {
    pub const fn from_raw(raw_bytes: [u8; SHA256_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = sha2::Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let output = result
            .as_slice()
            .try_into()
            .expect("SHA-256 output is always 32 bytes");
        Sha256::from_raw(output)
    }

    /// Hashes the data twice, as transaction identifiers do.
    pub fn double_digest(data: &[u8]) -> Self {
        let first_hash = Self::digest(data);
        Self::digest(first_hash.as_slice())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }

    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        let bytes = hex::decode(s)?;
        let raw: [u8; SHA256_BYTE_COUNT] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| HashParseError::InvalidLength {
                    expected: SHA256_BYTE_COUNT,
                    actual: bytes.len(),
                    input: s.to_string(),
                })?;
        Ok(Sha256::from_raw(raw))
    }
}

impl Display for Sha256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
