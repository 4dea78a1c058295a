//! Private keys and ECDSA signers
//!
//! SECURITY: private key bytes live in `Zeroizing` buffers and are wiped on drop.
//! Neither `PrivateKey` nor `LocalSigner` prints key material in `Debug`.

use std::fmt;
use std::str::FromStr;

use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use zeroize::Zeroizing;

use super::{SignError, SignResult};
use crate::utils::crypto::{public_key_to_address, strip_hex_prefix, to_checksum_address};

/// Offset added to the secp256k1 recovery id in Ethereum's `v` convention
pub const ETHEREUM_V_OFFSET: u8 = 27;

/// A secp256k1 private key scalar
#[derive(Clone)]
pub struct PrivateKey(Zeroizing<[u8; 32]>);

impl PrivateKey {
    /// Create from exactly 32 big-endian bytes
    pub fn from_bytes(bytes: &[u8]) -> SignResult<Self> {
        if bytes.len() != 32 {
            return Err(SignError::InvalidPrivateKey(format!(
                "Expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        SecretKey::from_slice(bytes).map_err(|e| SignError::InvalidPrivateKey(e.to_string()))?;

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Parse a hex scalar (optional `0x`, at most 64 digits).
    ///
    /// Shorter inputs are read as numbers and left-padded with zeros.
    pub fn from_hex(s: &str) -> SignResult<Self> {
        let digits = strip_hex_prefix(s.trim());
        if digits.is_empty() {
            return Err(SignError::InvalidPrivateKey("Empty key".to_string()));
        }
        if digits.len() > 64 {
            return Err(SignError::InvalidPrivateKey(format!(
                "Expected at most 64 hex digits, got {}",
                digits.len()
            )));
        }

        let padded = Zeroizing::new(format!("{:0>64}", digits));
        let mut key = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(padded.as_bytes(), &mut key[..])
            .map_err(|e| SignError::InvalidPrivateKey(format!("Invalid hex: {}", e)))?;
        Self::from_bytes(&key[..])
    }

    /// Raw scalar bytes
    pub fn expose_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for PrivateKey {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

/// Components returned by an ECDSA signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// Recovery indicator bytes; only the first is used, none means `v = 0`
    pub recovery: Vec<u8>,
}

/// Deterministic ECDSA over secp256k1 on a 32-byte prehash
pub trait EcdsaSigner {
    fn sign_prehash(&self, digest: &[u8; 32]) -> SignResult<RawSignature>;
}

/// In-process signer backed by libsecp256k1 (RFC 6979 nonces, low-s)
pub struct LocalSigner {
    secp: Secp256k1<All>,
    secret_key: SecretKey,
}

impl LocalSigner {
    pub fn new(key: &PrivateKey) -> SignResult<Self> {
        let secret_key = SecretKey::from_slice(&key.expose_bytes()[..])
            .map_err(|e| SignError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self {
            secp: Secp256k1::new(),
            secret_key,
        })
    }

    /// 65-byte uncompressed public key (`0x04 || X || Y`)
    pub fn public_key(&self) -> [u8; 65] {
        PublicKey::from_secret_key(&self.secp, &self.secret_key).serialize_uncompressed()
    }

    /// Ethereum address of the key
    pub fn address(&self) -> [u8; 20] {
        public_key_to_address(&self.public_key())
    }

    /// EIP-55 checksummed address
    pub fn checksum_address(&self) -> String {
        to_checksum_address(&self.address())
    }
}

impl EcdsaSigner for LocalSigner {
    /// Emits `v` as `27 + recovery_id`
    fn sign_prehash(&self, digest: &[u8; 32]) -> SignResult<RawSignature> {
        let message = Message::from_digest(*digest);
        let signature = self.secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let recovery = u8::try_from(recovery_id.to_i32())
            .ok()
            .and_then(|id| id.checked_add(ETHEREUM_V_OFFSET))
            .ok_or_else(|| {
                SignError::SigningFailure(format!("Unexpected recovery id {:?}", recovery_id))
            })?;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);

        Ok(RawSignature {
            r,
            s,
            recovery: vec![recovery],
        })
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.checksum_address())
            .finish()
    }
}

impl Drop for LocalSigner {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}
