//! Packed Signer Library
//!
//! Solidity `abi.encodePacked` hashing and Ethereum personal-sign signatures.
//!
//! # Architecture
//!
//! This crate provides:
//! - **packed**: type descriptors, values, the tight-packing encoder and its decoder
//! - **digest**: Keccak-256 over packed arguments (`keccak256(abi.encodePacked(...))`)
//! - **message_signer**: EIP-191 envelope, secp256k1 signing, signer recovery
//! - **config**: runtime switches and environment overrides
//! - **utils**: hex helpers, address derivation, redacting logger
//!
//! # Security
//!
//! Private keys are held in `zeroize` buffers and cleared when dropped.
//! Library operations never log.
//!
//! # Example
//!
//! ```rust,ignore
//! use packed_signer::{sign_packed, PrivateKey};
//!
//! let key: PrivateKey = "0x3d10...1dc7".parse()?;
//! let signature = sign_packed(
//!     &["address", "uint256"],
//!     &["0x407d73d8a49eeb85d32cf465507dd71d507100c1".into(), 12345u64.into()],
//!     &key,
//! )?;
//! println!("{}", signature);
//! ```

pub mod config;
pub mod digest;
pub mod error;
pub mod message_signer;
pub mod packed;
pub mod utils;

pub use config::SignerConfig;
pub use digest::{digest, solidity_keccak256, solidity_keccak256_hex, solidity_keccak256_with};
pub use error::{ErrorCode, SignerError, SignerResult};
pub use message_signer::{
    recover_address, sign, sign_packed, sign_with_key, verify, EcdsaSigner, LocalSigner,
    MessageSignature, PrivateKey, SignError,
};
pub use packed::{
    pack_all, DynamicElementPolicy, PackError, PackOptions, PackedDecoder, PackedEncoder, SolType,
    SolValue, TypedArg,
};
pub use utils::crypto::{keccak256, to_checksum_address};
