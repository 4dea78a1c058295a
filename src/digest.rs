//! Digest Computer
//!
//! Keccak-256 over the concatenated packed fragments, the equivalent of
//! Solidity's `keccak256(abi.encodePacked(...))`.

use crate::packed::{PackError, PackedEncoder, SolValue};
use crate::utils::crypto::to_hex_prefixed;

pub use crate::utils::crypto::keccak256;

/// Keccak-256 of a byte sequence
pub fn digest(data: &[u8]) -> [u8; 32] {
    keccak256(data)
}

/// Pack the arguments with default options and hash the result
pub fn solidity_keccak256<T: AsRef<str>>(
    types: &[T],
    values: &[SolValue],
) -> Result<[u8; 32], PackError> {
    solidity_keccak256_with(&PackedEncoder::default(), types, values)
}

/// Pack the arguments with a configured encoder and hash the result
pub fn solidity_keccak256_with<T: AsRef<str>>(
    encoder: &PackedEncoder,
    types: &[T],
    values: &[SolValue],
) -> Result<[u8; 32], PackError> {
    let packed = encoder.pack_all(types, values)?;
    Ok(digest(&packed))
}

/// `0x`-prefixed hex rendering of [`solidity_keccak256`]
pub fn solidity_keccak256_hex<T: AsRef<str>>(
    types: &[T],
    values: &[SolValue],
) -> Result<String, PackError> {
    solidity_keccak256(types, values).map(|hash| to_hex_prefixed(&hash))
}
