//! Structured logging with redaction of signing material
//!
//! Entries go to stderr so stdout stays reserved for command output.
//! Field values are redacted by key name:
//! - private keys and seeds are replaced entirely
//! - addresses and signers keep a short prefix and suffix
//! - digests and signatures keep a longer prefix and suffix
//!
//! Redaction of addresses and digests can be switched off for local debugging;
//! key material is always replaced.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static PARTIAL_REDACTION: AtomicBool = AtomicBool::new(true);

/// Enable debug logging
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Toggle partial redaction of addresses, digests and signatures
pub fn set_partial_redaction(enabled: bool) {
    PARTIAL_REDACTION.store(enabled, Ordering::SeqCst);
}

pub fn is_partial_redaction_enabled() -> bool {
    PARTIAL_REDACTION.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, redacted according to its key
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value = redact_for_key(key, &value.to_string(), is_partial_redaction_enabled());
        self.fields.push((key, value));
        self
    }

    /// Add a field that is always fully redacted
    pub fn secret_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, redact_value(&value.to_string())));
        self
    }

    /// Render as a single line without the timestamp
    pub fn render(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        if fields.is_empty() {
            format!("{} [{}] {}", self.level, self.module, self.message)
        } else {
            format!("{} [{}] {} | {}", self.level, self.module, self.message, fields)
        }
    }

    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        eprintln!("[{}] {}", timestamp, self.render());
    }
}

const SECRET_KEYS: &[&str] = &["private_key", "privatekey", "secret", "seed", "signing_key", "key_hex"];
const ADDRESS_KEYS: &[&str] = &["address", "signer", "recovered"];
const HASH_KEYS: &[&str] = &["digest", "hash", "signature"];

fn redact_for_key(key: &str, value: &str, partial: bool) -> String {
    let key = key.to_lowercase();

    if SECRET_KEYS.iter().any(|k| key.contains(k)) {
        return redact_value(value);
    }
    if !partial {
        return value.to_string();
    }
    if ADDRESS_KEYS.iter().any(|k| key.contains(k)) {
        return redact_address(value);
    }
    if HASH_KEYS.iter().any(|k| key.contains(k)) {
        return redact_hash(value);
    }
    value.to_string()
}

fn redact_value(value: &str) -> String {
    match value.len() {
        0 => "[EMPTY]".to_string(),
        1..=4 => "[REDACTED]".to_string(),
        len => format!("[REDACTED:{}chars]", len),
    }
}

/// Keep `0x` plus six digits and the last four
fn redact_address(address: &str) -> String {
    let trimmed = address.trim();
    let prefix_len = if trimmed.starts_with("0x") { 8 } else { 6 };
    if trimmed.len() <= prefix_len + 4 + 3 {
        return redact_value(trimmed);
    }
    keep_ends(trimmed, prefix_len, 4).unwrap_or_else(|| redact_value(trimmed))
}

/// Keep `0x` plus ten digits and the last six; short values pass through
fn redact_hash(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() <= 20 {
        return trimmed.to_string();
    }
    let prefix_len = if trimmed.starts_with("0x") { 12 } else { 10 };
    keep_ends(trimmed, prefix_len, 6).unwrap_or_else(|| redact_value(trimmed))
}

/// `prefix...suffix`, or `None` when a cut would split a multi-byte character
fn keep_ends(value: &str, prefix_len: usize, suffix_len: usize) -> Option<String> {
    let prefix = value.get(..prefix_len)?;
    let suffix = value.get(value.len().checked_sub(suffix_len)?..)?;
    Some(format!("{}...{}", prefix, suffix))
}

#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

#[macro_export]
macro_rules! log_info {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

#[macro_export]
macro_rules! log_warn {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}
