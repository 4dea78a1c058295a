//! Ethereum Personal Message Signing (EIP-191)
//!
//! Reference: https://eips.ethereum.org/EIPS/eip-191
//!
//! Format: "\x19Ethereum Signed Message:\n" + len(message) + message
//!
//! For packed-argument signing the message is the 32-byte Keccak digest of
//! the packed arguments, so the decimal length is always "32".

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};

use super::signer::{EcdsaSigner, LocalSigner, PrivateKey, ETHEREUM_V_OFFSET};
use super::{MessageSignature, SignError, SignResult};
use crate::digest::solidity_keccak256_with;
use crate::packed::{PackedEncoder, SolValue};
use crate::utils::crypto::{keccak256, public_key_to_address};

/// Ethereum message prefix for personal_sign
pub const ETH_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Build the personal-sign envelope: prefix, decimal payload length, payload
pub fn eth_message_envelope(payload: &[u8]) -> SignResult<Vec<u8>> {
    let length = payload.len().to_string();
    let capacity = ETH_MESSAGE_PREFIX
        .len()
        .checked_add(length.len())
        .and_then(|n| n.checked_add(payload.len()))
        .ok_or(SignError::EnvelopeLengthOverflow(payload.len()))?;

    let mut envelope = Vec::with_capacity(capacity);
    envelope.extend_from_slice(ETH_MESSAGE_PREFIX.as_bytes());
    envelope.extend_from_slice(length.as_bytes());
    envelope.extend_from_slice(payload);
    Ok(envelope)
}

/// Keccak256 of the personal-sign envelope, the hash that actually gets signed
pub fn personal_message_hash(payload: &[u8]) -> SignResult<[u8; 32]> {
    Ok(keccak256(&eth_message_envelope(payload)?))
}

/// Sign a payload (normally a packed digest) with any ECDSA signer.
///
/// `v` is copied from the signer's recovery indicator unchanged; a signer
/// that returns no recovery data yields `v = 0`.
pub fn sign<S: EcdsaSigner + ?Sized>(payload: &[u8], signer: &S) -> SignResult<MessageSignature> {
    let hash = personal_message_hash(payload)?;
    let raw = signer.sign_prehash(&hash)?;
    let v = raw.recovery.first().copied().unwrap_or(0);
    Ok(MessageSignature::from_parts(&raw.r, &raw.s, v))
}

/// Sign a payload with a local private key
pub fn sign_with_key(payload: &[u8], private_key: &PrivateKey) -> SignResult<MessageSignature> {
    let signer = LocalSigner::new(private_key)?;
    sign(payload, &signer)
}

/// Pack the arguments, hash them and sign the digest
pub fn sign_packed<T: AsRef<str>>(
    types: &[T],
    values: &[SolValue],
    private_key: &PrivateKey,
) -> SignResult<MessageSignature> {
    sign_packed_with(&PackedEncoder::default(), types, values, private_key)
}

/// [`sign_packed`] with a configured encoder
pub fn sign_packed_with<T: AsRef<str>>(
    encoder: &PackedEncoder,
    types: &[T],
    values: &[SolValue],
    private_key: &PrivateKey,
) -> SignResult<MessageSignature> {
    let digest = solidity_keccak256_with(encoder, types, values)?;
    sign_with_key(&digest, private_key)
}

/// Recover the signer's address from a personal-sign signature.
///
/// Accepts `v` as 27/28 or as a bare recovery id 0/1.
pub fn recover_address(payload: &[u8], signature: &MessageSignature) -> SignResult<[u8; 20]> {
    let hash = personal_message_hash(payload)?;

    let v = signature.v();
    let recovery_id = match v {
        0 | 1 => v,
        27 | 28 => v - ETHEREUM_V_OFFSET,
        other => {
            return Err(SignError::InvalidSignature(format!(
                "Invalid recovery byte: {}",
                other
            )))
        }
    };

    let secp = Secp256k1::verification_only();
    let msg = Message::from_digest(hash);

    let rec_id = RecoveryId::from_i32(recovery_id as i32)
        .map_err(|e| SignError::InvalidSignature(e.to_string()))?;

    let recoverable_sig = RecoverableSignature::from_compact(&signature.as_bytes()[..64], rec_id)
        .map_err(|e| SignError::InvalidSignature(e.to_string()))?;

    let public_key = secp
        .recover_ecdsa(&msg, &recoverable_sig)
        .map_err(|e| SignError::RecoveryFailed(e.to_string()))?;

    Ok(public_key_to_address(&public_key.serialize_uncompressed()))
}

/// Check that `signature` over `payload` was made by `address`
pub fn verify(payload: &[u8], signature: &MessageSignature, address: &[u8; 20]) -> SignResult<bool> {
    Ok(recover_address(payload, signature)? == *address)
}
