//! Message Signing Module
//!
//! Ethereum personal-sign (EIP-191) over packed digests:
//! - `ethereum`: envelope construction, signing, signer recovery
//! - `signer`: private keys and the ECDSA signer seam
//!
//! Signatures are 65 bytes, `r (32) || s (32) || v (1)`.

pub mod ethereum;
pub mod signer;

pub use ethereum::{
    eth_message_envelope, personal_message_hash, recover_address, sign, sign_packed,
    sign_packed_with, sign_with_key, verify, ETH_MESSAGE_PREFIX,
};
pub use signer::{EcdsaSigner, LocalSigner, PrivateKey, RawSignature};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::packed::PackError;
use crate::utils::crypto::{decode_hex_lenient, to_hex_prefixed};

/// Length of an assembled signature
pub const SIGNATURE_LENGTH: usize = 65;

/// A 65-byte `r || s || v` signature
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageSignature([u8; SIGNATURE_LENGTH]);

impl MessageSignature {
    /// Assemble from components
    pub fn from_parts(r: &[u8; 32], s: &[u8; 32], v: u8) -> Self {
        let mut sig = [0u8; SIGNATURE_LENGTH];
        sig[..32].copy_from_slice(r);
        sig[32..64].copy_from_slice(s);
        sig[64] = v;
        Self(sig)
    }

    /// Parse from exactly 65 raw bytes
    pub fn from_slice(bytes: &[u8]) -> SignResult<Self> {
        let sig: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| {
            SignError::InvalidSignature(format!(
                "Expected {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(sig))
    }

    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.0[..32]);
        r
    }

    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.0[32..64]);
        s
    }

    /// Recovery indicator as produced by the signer
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// `0x` followed by 130 hex characters
    pub fn to_hex(&self) -> String {
        to_hex_prefixed(&self.0)
    }
}

impl fmt::Display for MessageSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for MessageSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageSignature({})", self.to_hex())
    }
}

impl FromStr for MessageSignature {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex_lenient(s.trim())
            .map_err(|e| SignError::InvalidSignature(format!("Invalid hex: {}", e)))?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for MessageSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MessageSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error types for message signing
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Signing failed: {0}")]
    SigningFailure(String),

    #[error("Envelope length overflow for a {0}-byte payload")]
    EnvelopeLengthOverflow(usize),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Address recovery failed: {0}")]
    RecoveryFailed(String),

    #[error(transparent)]
    Pack(#[from] PackError),
}

pub type SignResult<T> = Result<T, SignError>;
