//! Byte and Hash Utilities
//!
//! Stateless helpers shared by the packer, the digest computer and the
//! message signer: Keccak-256, hex normalization, word padding and
//! Ethereum address rendering.

use tiny_keccak::{Hasher, Keccak};

/// Size of an EVM word, the padding unit for array elements
pub const WORD_SIZE: usize = 32;

/// Keccak256 hash (original Keccak padding, not NIST SHA3-256)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Strip an optional `0x`/`0X` prefix
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode a hex payload, tolerating a `0x` prefix and an odd number of
/// digits (an odd payload is read as if it had one leading zero nibble).
pub fn decode_hex_lenient(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits = strip_hex_prefix(s);
    if digits.len() % 2 == 1 {
        hex::decode(format!("0{}", digits))
    } else {
        hex::decode(digits)
    }
}

/// Render bytes as a `0x`-prefixed lowercase hex string
pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Left-pad `bytes` with zeros to `len`. Input longer than `len` is returned unchanged.
pub fn left_pad(bytes: &[u8], len: usize) -> Vec<u8> {
    if bytes.len() >= len {
        return bytes.to_vec();
    }
    let mut padded = vec![0u8; len];
    padded[len - bytes.len()..].copy_from_slice(bytes);
    padded
}

/// Right-pad `bytes` with zeros to `len`. Input longer than `len` is returned unchanged.
pub fn right_pad(bytes: &[u8], len: usize) -> Vec<u8> {
    if bytes.len() >= len {
        return bytes.to_vec();
    }
    let mut padded = bytes.to_vec();
    padded.resize(len, 0);
    padded
}

/// Convert raw address bytes to checksummed Ethereum address (EIP-55)
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::from("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() {
            result.push(ch);
        } else if nibble >= 8 {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
    }

    result
}

/// Derive the 20-byte Ethereum address from a 65-byte uncompressed public key
/// (`0x04 || X || Y`): the last 20 bytes of keccak256(X || Y).
pub fn public_key_to_address(uncompressed: &[u8; 65]) -> [u8; 20] {
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_is_not_sha3() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            hex::encode(keccak256(b"hello")),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_decode_hex_lenient() {
        assert_eq!(decode_hex_lenient("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex_lenient("0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex_lenient("0x102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex_lenient("0xABcd").unwrap(), vec![0xab, 0xcd]);
        assert!(decode_hex_lenient("0xzz").is_err());
        assert!(decode_hex_lenient("").unwrap().is_empty());
    }

    #[test]
    fn test_padding() {
        assert_eq!(left_pad(&[1, 2], 4), vec![0, 0, 1, 2]);
        assert_eq!(right_pad(&[1, 2], 4), vec![1, 2, 0, 0]);
        assert_eq!(left_pad(&[1, 2, 3], 2), vec![1, 2, 3]);
        assert_eq!(left_pad(&[], 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_checksum_address() {
        let bytes = hex::decode("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            to_checksum_address(&bytes),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }
}
