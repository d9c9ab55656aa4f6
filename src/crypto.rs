use serde::{Deserialize, Serialize};
use std::convert::TryInto;
use std::fmt::{Display, Formatter};

/// A public key that owns outputs, stored as an opaque byte blob.
///
/// The core only ever compares keys and hands them to a [`SignatureVerifier`];
/// it never interprets the bytes itself.
#[derive(Debug, Clone, Hash, Serialize, Deserialize, Eq, PartialEq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// A signature over a message, stored as an opaque byte blob.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Checks whether a signature authorizes a message on behalf of an owner key.
///
/// Verification answers yes or no and never fails: blobs that do not parse as
/// key or signature material for the backend simply do not verify.
pub trait SignatureVerifier {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &Signature) -> bool;
}

/// The Ed25519 verification backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        let key_bytes: [u8; 32] = match owner.as_bytes().try_into() {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let key = match ed25519_dalek::VerifyingKey::from_bytes(&key_bytes) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let signature = match ed25519_dalek::Signature::from_slice(signature.as_bytes()) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        key.verify_strict(message, &signature).is_ok()
    }
}
