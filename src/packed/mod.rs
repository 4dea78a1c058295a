//! Solidity tight packing (`abi.encodePacked`)
//!
//! This module turns ordered (type descriptor, value) pairs into the byte
//! layout Solidity produces for `abi.encodePacked`:
//! - Scalars use their natural width (address 20, bool 1, bytesN n, intM M/8)
//! - `string` and `bytes` are emitted raw
//! - Array elements are aligned to 32-byte words
//! - Negative integers are two's complement over the declared width

pub mod types;
pub mod value;
pub mod encoder;
pub mod decoder;


pub use types::*;
pub use value::*;
pub use encoder::*;
pub use decoder::*;
