//! Type descriptors for Solidity tight packing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::crypto::WORD_SIZE;

/// Solidity types understood by the packer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolType {
    /// 20-byte account address
    Address,

    /// UTF-8 string, packed unpadded
    String,

    /// Boolean, packed as a single 0x00/0x01 byte
    Bool,

    /// Fixed-size bytes (bytes1 through bytes32)
    FixedBytes(usize),

    /// Dynamic bytes, packed unpadded
    Bytes,

    /// Integer of `bits` width (8..=256, multiple of 8)
    Int { bits: usize, signed: bool },

    /// Array T[N] or T[]
    Array(Box<SolType>, ArrayLength),
}

/// Declared length of an array type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayLength {
    /// T[N]: the value must have exactly N elements
    Fixed(usize),
    /// T[]: any number of elements
    Unbounded,
}

impl ArrayLength {
    /// Whether an actual element count satisfies this length
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            ArrayLength::Fixed(expected) => *expected == count,
            ArrayLength::Unbounded => true,
        }
    }
}

/// Where a value is being packed.
///
/// Array elements are aligned to 32-byte words; top-level arguments are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackingContext {
    TopLevel,
    ArrayElement,
}

/// How a packed fragment is aligned in its context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Emitted as-is
    None,
    /// Zero bytes prepended up to a 32-byte word
    Left,
    /// Zero bytes appended up to a 32-byte word
    Right,
}

impl PackingContext {
    /// Padding rule for a scalar type in this context.
    ///
    /// `string` and `bytes` are never padded, even as array elements.
    /// Arrays have no padding of their own; their elements carry it.
    pub fn padding_for(&self, sol_type: &SolType) -> Padding {
        match (self, sol_type) {
            (PackingContext::TopLevel, _) => Padding::None,
            (PackingContext::ArrayElement, SolType::Address | SolType::Bool | SolType::Int { .. }) => {
                Padding::Left
            }
            (PackingContext::ArrayElement, SolType::FixedBytes(_)) => Padding::Right,
            (PackingContext::ArrayElement, SolType::String | SolType::Bytes | SolType::Array(..)) => {
                Padding::None
            }
        }
    }
}

impl SolType {
    /// Unsigned integer shorthand
    pub fn uint(bits: usize) -> Self {
        SolType::Int { bits, signed: false }
    }

    /// Signed integer shorthand
    pub fn int(bits: usize) -> Self {
        SolType::Int { bits, signed: true }
    }

    /// Array shorthand
    pub fn array(element: SolType, length: ArrayLength) -> Self {
        SolType::Array(Box::new(element), length)
    }

    /// `string` and `bytes`, whose packed size depends on the value
    pub fn is_dynamic(&self) -> bool {
        matches!(self, SolType::String | SolType::Bytes)
    }

    /// Size of the packed fragment when it does not depend on the value.
    ///
    /// Returns `None` for `string`, `bytes` and unbounded arrays, and for
    /// fixed arrays whose elements have no fixed width.
    pub fn packed_width(&self, context: PackingContext) -> Option<usize> {
        let natural = match self {
            SolType::Address => 20,
            SolType::Bool => 1,
            SolType::FixedBytes(size) => *size,
            SolType::Int { bits, .. } => bits / 8,
            SolType::String | SolType::Bytes => return None,
            SolType::Array(element, ArrayLength::Fixed(count)) => {
                let element_width = element.packed_width(PackingContext::ArrayElement)?;
                return element_width.checked_mul(*count);
            }
            SolType::Array(_, ArrayLength::Unbounded) => return None,
        };

        match context.padding_for(self) {
            Padding::None => Some(natural),
            Padding::Left | Padding::Right => Some(WORD_SIZE),
        }
    }

    /// Canonical descriptor string (`uint` is rendered as `uint256`)
    pub fn canonical_type(&self) -> String {
        match self {
            SolType::Address => "address".to_string(),
            SolType::String => "string".to_string(),
            SolType::Bool => "bool".to_string(),
            SolType::FixedBytes(size) => format!("bytes{}", size),
            SolType::Bytes => "bytes".to_string(),
            SolType::Int { bits, signed: false } => format!("uint{}", bits),
            SolType::Int { bits, signed: true } => format!("int{}", bits),
            SolType::Array(inner, ArrayLength::Fixed(size)) => {
                format!("{}[{}]", inner.canonical_type(), size)
            }
            SolType::Array(inner, ArrayLength::Unbounded) => format!("{}[]", inner.canonical_type()),
        }
    }

    fn parse_integer(descriptor: &str, suffix: &str, signed: bool) -> Result<Self, PackError> {
        if suffix.is_empty() {
            return Ok(SolType::Int { bits: 256, signed });
        }
        let bits = parse_size(descriptor, suffix)?;
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(PackError::invalid_type(
                descriptor,
                format!("integer width must be a multiple of 8 in 8..=256, got {}", bits),
            ));
        }
        Ok(SolType::Int { bits, signed })
    }
}

/// Parse the numeric suffix of a sized type (`bytes32`, `uint8`, `T[4]`)
fn parse_size(descriptor: &str, digits: &str) -> Result<usize, PackError> {
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(PackError::invalid_type(descriptor, "size has a leading zero"));
    }
    digits
        .parse()
        .map_err(|_| PackError::invalid_type(descriptor, format!("invalid size '{}'", digits)))
}

fn is_size_suffix(s: &str) -> bool {
    s.is_empty() || s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for SolType {
    type Err = PackError;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let s = descriptor.trim();
        if s.is_empty() {
            return Err(PackError::invalid_type(descriptor, "empty descriptor"));
        }

        // The last bracket pair is the outermost dimension: uint8[2][3] is three uint8[2]
        if let Some(stripped) = s.strip_suffix(']') {
            let open = stripped
                .rfind('[')
                .ok_or_else(|| PackError::invalid_type(descriptor, "unbalanced brackets"))?;
            let inner = &stripped[..open];
            let size = &stripped[open + 1..];
            if inner.is_empty() {
                return Err(PackError::invalid_type(descriptor, "missing array element type"));
            }
            if !is_size_suffix(size) {
                return Err(PackError::invalid_type(
                    descriptor,
                    format!("invalid array length '{}'", size),
                ));
            }
            let length = if size.is_empty() {
                ArrayLength::Unbounded
            } else {
                ArrayLength::Fixed(parse_size(descriptor, size)?)
            };
            let element = inner.parse::<SolType>()?;
            return Ok(SolType::Array(Box::new(element), length));
        }
        if s.contains('[') || s.contains(']') {
            return Err(PackError::invalid_type(descriptor, "unbalanced brackets"));
        }

        match s {
            "address" => Ok(SolType::Address),
            "bool" => Ok(SolType::Bool),
            "string" => Ok(SolType::String),
            "bytes" => Ok(SolType::Bytes),

            s if s.starts_with("bytes") && is_size_suffix(&s[5..]) => {
                let size = parse_size(descriptor, &s[5..])?;
                if size == 0 || size > 32 {
                    return Err(PackError::invalid_type(
                        descriptor,
                        format!("bytes size must be 1-32, got {}", size),
                    ));
                }
                Ok(SolType::FixedBytes(size))
            }

            s if s.starts_with("uint") && is_size_suffix(&s[4..]) => {
                SolType::parse_integer(descriptor, &s[4..], false)
            }

            s if s.starts_with("int") && is_size_suffix(&s[3..]) => {
                SolType::parse_integer(descriptor, &s[3..], true)
            }

            _ => Err(PackError::UnsupportedType(s.to_string())),
        }
    }
}

impl fmt::Display for SolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_type())
    }
}

impl Serialize for SolType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.canonical_type())
    }
}

impl<'de> Deserialize<'de> for SolType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Packing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    #[error("Input arity mismatch: {types} types but {values} values")]
    InputArityMismatch { types: usize, values: usize },

    #[error("Invalid type descriptor '{descriptor}': {reason}")]
    InvalidTypeDescriptor { descriptor: String, reason: String },

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Invalid value for {sol_type}: {reason}")]
    InvalidValue { sol_type: String, reason: String },

    #[error("Decoding error: {0}")]
    Decoding(String),
}

impl PackError {
    pub(crate) fn invalid_type(descriptor: &str, reason: impl Into<String>) -> Self {
        PackError::InvalidTypeDescriptor {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_value(sol_type: &SolType, reason: impl Into<String>) -> Self {
        PackError::InvalidValue {
            sol_type: sol_type.canonical_type(),
            reason: reason.into(),
        }
    }
}
