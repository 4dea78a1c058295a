//! Crate-level error type for the CLI and JSON surfaces
//!
//! Library operations return `PackError` or `SignError`; both convert into
//! `SignerError`, which carries a stable snake_case code.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::message_signer::SignError;
use crate::packed::PackError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl SignerError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    /// Render as a JSON object; falls back to the display form
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Display for SignerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SignerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InputArityMismatch,
    InvalidTypeDescriptor,
    UnsupportedType,
    InvalidValue,
    InvalidPrivateKey,
    InvalidSignature,

    // Crypto errors
    SigningFailed,
    RecoveryFailed,
    EnvelopeLengthOverflow,

    // Parse errors
    DecodingError,
    JsonError,
    HexError,

    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "invalid_input",
            ErrorCode::InputArityMismatch => "input_arity_mismatch",
            ErrorCode::InvalidTypeDescriptor => "invalid_type_descriptor",
            ErrorCode::UnsupportedType => "unsupported_type",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidPrivateKey => "invalid_private_key",
            ErrorCode::InvalidSignature => "invalid_signature",
            ErrorCode::SigningFailed => "signing_failed",
            ErrorCode::RecoveryFailed => "recovery_failed",
            ErrorCode::EnvelopeLengthOverflow => "envelope_length_overflow",
            ErrorCode::DecodingError => "decoding_error",
            ErrorCode::JsonError => "json_error",
            ErrorCode::HexError => "hex_error",
            ErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type SignerResult<T> = Result<T, SignerError>;

impl From<PackError> for SignerError {
    fn from(e: PackError) -> Self {
        let code = match e {
            PackError::InputArityMismatch { .. } => ErrorCode::InputArityMismatch,
            PackError::InvalidTypeDescriptor { .. } => ErrorCode::InvalidTypeDescriptor,
            PackError::UnsupportedType(_) => ErrorCode::UnsupportedType,
            PackError::InvalidValue { .. } => ErrorCode::InvalidValue,
            PackError::Decoding(_) => ErrorCode::DecodingError,
        };
        SignerError::new(code, e.to_string())
    }
}

impl From<SignError> for SignerError {
    fn from(e: SignError) -> Self {
        let code = match e {
            SignError::Pack(inner) => return inner.into(),
            SignError::InvalidPrivateKey(_) => ErrorCode::InvalidPrivateKey,
            SignError::SigningFailure(_) => ErrorCode::SigningFailed,
            SignError::EnvelopeLengthOverflow(_) => ErrorCode::EnvelopeLengthOverflow,
            SignError::InvalidSignature(_) => ErrorCode::InvalidSignature,
            SignError::RecoveryFailed(_) => ErrorCode::RecoveryFailed,
        };
        SignerError::new(code, e.to_string())
    }
}

impl From<serde_json::Error> for SignerError {
    fn from(e: serde_json::Error) -> Self {
        SignerError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for SignerError {
    fn from(e: hex::FromHexError) -> Self {
        SignerError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for SignerError {
    fn from(e: std::io::Error) -> Self {
        SignerError::new(ErrorCode::Internal, e.to_string())
    }
}
