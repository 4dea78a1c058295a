//! Utilities Module
//!
//! Hex and address helpers shared by the packer and the signer, plus logging.

pub mod crypto;
pub mod logging;

pub use crypto::*;
