//! Runtime values paired with type descriptors

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::types::PackError;
use crate::utils::crypto::decode_hex_lenient;

fn invalid_json(reason: String) -> PackError {
    PackError::InvalidValue {
        sol_type: "json value".to_string(),
        reason,
    }
}

fn invalid_integer(reason: String) -> PackError {
    PackError::InvalidValue {
        sol_type: "integer".to_string(),
        reason,
    }
}

/// A value to be packed.
///
/// The variant only has to be compatible with the paired [`SolType`](super::SolType):
/// a `Text` can hold a hex address, hex bytes, a decimal integer or a plain string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolValue {
    /// Hex string, decimal string or UTF-8 text
    Text(String),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// Boolean
    Bool(bool),

    /// Arbitrary-precision integer (up to 256 bits of magnitude)
    Int(IntValue),

    /// Array elements in order
    Array(Vec<SolValue>),
}

impl SolValue {
    /// Convert a JSON value.
    ///
    /// Strings become `Text`, integers `Int`, booleans `Bool` and arrays `Array`.
    /// Floats, `null` and objects are rejected; integers beyond 64 bits must be
    /// given as decimal strings.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PackError> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(SolValue::Text(s.clone())),
            Value::Bool(b) => Ok(SolValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(SolValue::Int(IntValue::from(u)))
                } else if let Some(i) = n.as_i64() {
                    Ok(SolValue::Int(IntValue::from(i)))
                } else {
                    Err(invalid_json(format!(
                        "non-integer number {} (pass large integers as decimal strings)",
                        n
                    )))
                }
            }
            Value::Array(items) => items
                .iter()
                .map(SolValue::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(SolValue::Array),
            Value::Null => Err(invalid_json("null is not a packable value".to_string())),
            Value::Object(_) => Err(invalid_json(
                "objects are not packable values".to_string(),
            )),
        }
    }

    /// Short description of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            SolValue::Text(_) => "string",
            SolValue::Bytes(_) => "bytes",
            SolValue::Bool(_) => "bool",
            SolValue::Int(_) => "integer",
            SolValue::Array(_) => "array",
        }
    }
}

impl From<bool> for SolValue {
    fn from(value: bool) -> Self {
        SolValue::Bool(value)
    }
}

impl From<&str> for SolValue {
    fn from(value: &str) -> Self {
        SolValue::Text(value.to_string())
    }
}

impl From<String> for SolValue {
    fn from(value: String) -> Self {
        SolValue::Text(value)
    }
}

impl From<Vec<u8>> for SolValue {
    fn from(value: Vec<u8>) -> Self {
        SolValue::Bytes(value)
    }
}

impl From<Vec<SolValue>> for SolValue {
    fn from(value: Vec<SolValue>) -> Self {
        SolValue::Array(value)
    }
}

impl From<IntValue> for SolValue {
    fn from(value: IntValue) -> Self {
        SolValue::Int(value)
    }
}

impl From<U256> for SolValue {
    fn from(value: U256) -> Self {
        SolValue::Int(IntValue::from(value))
    }
}

macro_rules! sol_value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SolValue {
                fn from(value: $t) -> Self {
                    SolValue::Int(IntValue::from(value))
                }
            }
        )*
    };
}

sol_value_from_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

/// 256-bit unsigned integer, little-endian u64 limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256(pub [u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0, 0, 0, 0]);
    pub const ONE: U256 = U256([1, 0, 0, 0]);
    pub const MAX: U256 = U256([u64::MAX, u64::MAX, u64::MAX, u64::MAX]);

    /// Create from bytes (big-endian, at most 32)
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, PackError> {
        if bytes.len() > 32 {
            return Err(invalid_integer(format!(
                "{} bytes do not fit in 256 bits",
                bytes.len()
            )));
        }
        let mut padded = [0u8; 32];
        padded[32 - bytes.len()..].copy_from_slice(bytes);

        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let offset = (3 - i) * 8;
            let mut word = [0u8; 8];
            word.copy_from_slice(&padded[offset..offset + 8]);
            *limb = u64::from_be_bytes(word);
        }
        Ok(U256(limbs))
    }

    /// Convert to bytes (big-endian, 32 bytes)
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for i in 0..4 {
            let offset = (3 - i) * 8;
            bytes[offset..offset + 8].copy_from_slice(&self.0[i].to_be_bytes());
        }
        bytes
    }

    /// Parse from hex (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, PackError> {
        let bytes = decode_hex_lenient(s)
            .map_err(|e| invalid_integer(format!("invalid hex integer '{}': {}", s, e)))?;
        let significant = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        Self::from_be_bytes(&bytes[significant..])
    }

    /// Parse from decimal string
    pub fn from_dec(s: &str) -> Result<Self, PackError> {
        if s.is_empty() {
            return Err(invalid_integer("empty decimal integer".to_string()));
        }
        let mut result = U256::ZERO;
        for c in s.chars() {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| invalid_integer(format!("invalid decimal digit '{}' in '{}'", c, s)))?;
            result = result
                .checked_mul_u64(10)
                .and_then(|r| r.checked_add(U256::from(digit as u64)))
                .ok_or_else(|| invalid_integer(format!("'{}' exceeds 256 bits", s)))?;
        }
        Ok(result)
    }

    /// Checked addition
    pub fn checked_add(&self, other: U256) -> Option<U256> {
        let mut result = [0u64; 4];
        let mut carry = 0u64;

        for i in 0..4 {
            let (sum1, c1) = self.0[i].overflowing_add(other.0[i]);
            let (sum2, c2) = sum1.overflowing_add(carry);
            result[i] = sum2;
            carry = (c1 as u64) + (c2 as u64);
        }

        if carry != 0 {
            None
        } else {
            Some(U256(result))
        }
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: U256) -> Option<U256> {
        let mut result = [0u64; 4];
        let mut borrow = 0u64;

        for i in 0..4 {
            let (diff1, b1) = self.0[i].overflowing_sub(other.0[i]);
            let (diff2, b2) = diff1.overflowing_sub(borrow);
            result[i] = diff2;
            borrow = (b1 as u64) + (b2 as u64);
        }

        if borrow != 0 {
            None
        } else {
            Some(U256(result))
        }
    }

    /// Checked multiplication by u64
    pub fn checked_mul_u64(&self, other: u64) -> Option<U256> {
        let mut result = [0u64; 4];
        let mut carry = 0u128;

        for i in 0..4 {
            let prod = (self.0[i] as u128) * (other as u128) + carry;
            result[i] = prod as u64;
            carry = prod >> 64;
        }

        if carry != 0 {
            None
        } else {
            Some(U256(result))
        }
    }

    /// Division by a non-zero u64, returning quotient and remainder
    fn div_rem_u64(&self, divisor: u64) -> (U256, u64) {
        let mut quotient = [0u64; 4];
        let mut remainder = 0u128;
        for i in (0..4).rev() {
            let current = (remainder << 64) | self.0[i] as u128;
            quotient[i] = (current / divisor as u128) as u64;
            remainder = current % divisor as u128;
        }
        (U256(quotient), remainder as u64)
    }

    /// Two's complement negation modulo 2^256
    pub fn wrapping_neg(&self) -> U256 {
        let mut inverted = [0u64; 4];
        for (i, limb) in inverted.iter_mut().enumerate() {
            *limb = !self.0[i];
        }
        U256(inverted).checked_add(U256::ONE).unwrap_or(U256::ZERO)
    }

    /// Number of significant bits
    pub fn bits(&self) -> usize {
        for i in (0..4).rev() {
            if self.0[i] != 0 {
                return i * 64 + (64 - self.0[i].leading_zeros() as usize);
            }
        }
        0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0, 0]
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256([value, 0, 0, 0])
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        U256([value as u64, (value >> 64) as u64, 0, 0])
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut digits = Vec::new();
        let mut current = *self;
        while !current.is_zero() {
            let (quotient, remainder) = current.div_rem_u64(10);
            digits.push(b'0' + remainder as u8);
            current = quotient;
        }
        digits.reverse();
        // digits are ASCII by construction
        write!(f, "{}", String::from_utf8_lossy(&digits))
    }
}

/// Signed integer as sign and 256-bit magnitude.
///
/// Zero is always non-negative, so equal numbers compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntValue {
    negative: bool,
    magnitude: U256,
}

impl IntValue {
    pub const ZERO: IntValue = IntValue {
        negative: false,
        magnitude: U256::ZERO,
    };

    /// Build from sign and magnitude
    pub fn new(negative: bool, magnitude: U256) -> Self {
        IntValue {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    /// Whether the value is representable in a `bits`-wide (u)int
    pub fn fits(&self, bits: usize, signed: bool) -> bool {
        match (signed, self.negative) {
            (false, true) => false,
            (false, false) => self.magnitude.bits() <= bits,
            (true, false) => self.magnitude.bits() < bits,
            // -2^(bits-1) is the smallest value, so |v| - 1 must fit in bits - 1
            (true, true) => self
                .magnitude
                .checked_sub(U256::ONE)
                .map(|m| m.bits() < bits)
                .unwrap_or(true),
        }
    }

    /// Big-endian encoding in exactly `bits / 8` bytes.
    ///
    /// Negative values are two's complement over the declared width (2^bits + v).
    /// The caller checks [`fits`](Self::fits) first.
    pub fn to_be_bytes_width(&self, bits: usize) -> Vec<u8> {
        let word = if self.negative {
            self.magnitude.wrapping_neg().to_be_bytes()
        } else {
            self.magnitude.to_be_bytes()
        };
        let width = bits / 8;
        word[32 - width..].to_vec()
    }

    /// Decode a `bits / 8`-byte big-endian fragment
    pub fn from_be_bytes_width(bytes: &[u8], signed: bool) -> Result<Self, PackError> {
        let negative = signed && bytes.first().map(|b| b & 0x80 != 0).unwrap_or(false);
        if !negative {
            return Ok(IntValue::new(false, U256::from_be_bytes(bytes)?));
        }
        if bytes.len() > 32 {
            return Err(invalid_integer(format!(
                "{} bytes do not fit in 256 bits",
                bytes.len()
            )));
        }
        // Sign-extend to 256 bits, then negate to get the magnitude
        let mut extended = [0xffu8; 32];
        extended[32 - bytes.len()..].copy_from_slice(bytes);
        let magnitude = U256::from_be_bytes(&extended)?.wrapping_neg();
        Ok(IntValue::new(true, magnitude))
    }
}

impl FromStr for IntValue {
    type Err = PackError;

    /// Decimal with optional sign, or non-negative `0x` hex
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            return Ok(IntValue::new(false, U256::from_hex(trimmed)?));
        }
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        Ok(IntValue::new(negative, U256::from_dec(digits)?))
    }
}

impl From<U256> for IntValue {
    fn from(value: U256) -> Self {
        IntValue::new(false, value)
    }
}

macro_rules! int_value_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for IntValue {
                fn from(value: $t) -> Self {
                    IntValue::new(false, U256::from(value as u128))
                }
            }
        )*
    };
}

macro_rules! int_value_from_signed {
    ($($t:ty),*) => {
        $(
            impl From<$t> for IntValue {
                fn from(value: $t) -> Self {
                    IntValue::new(value < 0, U256::from((value as i128).unsigned_abs()))
                }
            }
        )*
    };
}

int_value_from_unsigned!(u8, u16, u32, u64, u128, usize);
int_value_from_signed!(i8, i16, i32, i64, i128, isize);

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}
