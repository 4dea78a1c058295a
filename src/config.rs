//! Runtime configuration
//!
//! Settings come from defaults, then `PACKED_SIGNER_*` environment variables,
//! then command-line flags. The library itself only consumes `PackOptions`;
//! the remaining switches drive the binary's logging.

use crate::error::{SignerError, SignerResult};
use crate::packed::{DynamicElementPolicy, PackOptions, PackedEncoder};

pub const ENV_DYNAMIC_ARRAY_ELEMENTS: &str = "PACKED_SIGNER_DYNAMIC_ARRAY_ELEMENTS";
pub const ENV_DEBUG: &str = "PACKED_SIGNER_DEBUG";
pub const ENV_REDACT_LOGS: &str = "PACKED_SIGNER_REDACT_LOGS";
pub const ENV_PRIVATE_KEY: &str = "PACKED_SIGNER_PRIVATE_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    /// How `string`/`bytes` elements inside arrays are packed
    pub dynamic_array_elements: DynamicElementPolicy,
    /// Emit debug-level log lines
    pub debug_logging: bool,
    /// Shorten addresses and digests in log fields
    pub redact_logs: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            dynamic_array_elements: DynamicElementPolicy::Permissive,
            debug_logging: false,
            redact_logs: true,
        }
    }
}

impl SignerConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> SignerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> SignerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DYNAMIC_ARRAY_ELEMENTS) {
            config.dynamic_array_elements = raw.parse().map_err(|e: String| {
                SignerError::invalid_input(format!("{}: {}", ENV_DYNAMIC_ARRAY_ELEMENTS, e))
            })?;
        }
        if let Some(raw) = lookup(ENV_DEBUG) {
            config.debug_logging = parse_flag(ENV_DEBUG, &raw)?;
        }
        if let Some(raw) = lookup(ENV_REDACT_LOGS) {
            config.redact_logs = parse_flag(ENV_REDACT_LOGS, &raw)?;
        }

        Ok(config)
    }

    pub fn pack_options(&self) -> PackOptions {
        PackOptions {
            dynamic_array_elements: self.dynamic_array_elements,
        }
    }

    pub fn encoder(&self) -> PackedEncoder {
        PackedEncoder::new(self.pack_options())
    }

    /// Warnings for settings that are valid but worth flagging
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.dynamic_array_elements == DynamicElementPolicy::Permissive {
            warnings.push(
                "string/bytes array elements are packed unpadded; Solidity rejects these types".to_string(),
            );
        }

        if self.debug_logging && !self.redact_logs {
            warnings.push("Debug logging with redaction off prints full addresses and digests".to_string());
        }

        warnings
    }
}

fn parse_flag(name: &str, raw: &str) -> SignerResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(SignerError::invalid_input(format!(
            "{}: expected a boolean, got '{}'",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SignerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, SignerConfig::default());
        assert_eq!(config.pack_options(), PackOptions::default());
        assert!(config.redact_logs);
    }

    #[test]
    fn test_env_overrides() {
        let config = SignerConfig::from_lookup(lookup_from(&[
            (ENV_DYNAMIC_ARRAY_ELEMENTS, "reject"),
            (ENV_DEBUG, "1"),
            (ENV_REDACT_LOGS, "off"),
        ]))
        .unwrap();

        assert_eq!(config.dynamic_array_elements, DynamicElementPolicy::Reject);
        assert!(config.debug_logging);
        assert!(!config.redact_logs);
        assert_eq!(config.encoder().options().dynamic_array_elements, DynamicElementPolicy::Reject);
    }

    #[test]
    fn test_invalid_env_values_are_errors() {
        let err = SignerConfig::from_lookup(lookup_from(&[(ENV_DEBUG, "maybe")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains(ENV_DEBUG));

        let err = SignerConfig::from_lookup(lookup_from(&[(ENV_DYNAMIC_ARRAY_ELEMENTS, "strictish")]))
            .unwrap_err();
        assert!(err.message.contains(ENV_DYNAMIC_ARRAY_ELEMENTS));
    }

    #[test]
    fn test_validate_warnings() {
        assert_eq!(SignerConfig::default().validate().len(), 1);

        let strict = SignerConfig {
            dynamic_array_elements: DynamicElementPolicy::Reject,
            ..SignerConfig::default()
        };
        assert!(strict.validate().is_empty());

        let loud = SignerConfig {
            dynamic_array_elements: DynamicElementPolicy::Reject,
            debug_logging: true,
            redact_logs: false,
        };
        assert_eq!(loud.validate().len(), 1);
    }
}
