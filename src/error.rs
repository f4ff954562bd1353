//! Unified error type for keyboard control operations.
//!
//! Every failure surfaces to `main` unchanged; no component retries or
//! recovers internally. `From` impls let `?` propagate across module
//! boundaries.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by keyboard control operations.
#[derive(Debug)]
pub enum Error {
    /// Style token does not parse against the effect grammar.
    UnknownStyle(String),
    /// Brightness ordinal outside 1-4.
    InvalidBrightness(u8),
    /// Speed ordinal outside 1-10.
    InvalidSpeed(u8),
    /// Color name missing from the named-color table.
    UnknownColor(String),
    /// USB transfer failure. `op` names the transfer so the caller can decide
    /// whether to re-issue the whole logical operation; transfers are never
    /// retried automatically since firmware state after a partial write is
    /// unspecified.
    Transport { op: &'static str, source: rusb::Error },
    /// Device selection failed before any transport I/O was attempted.
    Selection(SelectionError),
}

/// Usage errors from picking the target device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No allow-listed device is connected.
    NoDevice,
    /// Several devices matched but no explicit index was given.
    Ambiguous(usize),
    /// The requested 1-based index is not in range.
    IndexOutOfRange { index: usize, count: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownStyle(token) => write!(f, "style '{token}' not found"),
            Error::InvalidBrightness(level) => {
                write!(f, "brightness {level} out of range (1-4)")
            },
            Error::InvalidSpeed(speed) => write!(f, "speed {speed} out of range (1-10)"),
            Error::UnknownColor(name) => write!(f, "color '{name}' not found"),
            Error::Transport { op, source } if *source == rusb::Error::Access => {
                write!(f, "USB {op} failed: {source} (root permissions required)")
            },
            Error::Transport { op, source } => write!(f, "USB {op} failed: {source}"),
            Error::Selection(err) => write!(f, "{err}"),
        }
    }
}

impl Display for SelectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NoDevice => write!(f, "no device found"),
            SelectionError::Ambiguous(count) => write!(
                f,
                "found {count} devices, use --device to select one and --list-devices to list \
                 them"
            ),
            SelectionError::IndexOutOfRange { index, count } => {
                write!(f, "device #{index} does not exist, there are {count} devices")
            },
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SelectionError> for Error {
    fn from(err: SelectionError) -> Self {
        Error::Selection(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_style() {
        let err = Error::UnknownStyle("ripplez".into());
        assert_eq!(err.to_string(), "style 'ripplez' not found");
    }

    #[test]
    fn display_selection_out_of_range() {
        let err = Error::from(SelectionError::IndexOutOfRange { index: 3, count: 1 });
        assert_eq!(err.to_string(), "device #3 does not exist, there are 1 devices");
    }

    #[test]
    fn access_error_hints_at_permissions() {
        let err = Error::Transport { op: "open", source: rusb::Error::Access };
        assert!(err.to_string().contains("root permissions required"));
    }

    #[test]
    fn transport_error_chains_source() {
        let err = Error::Transport { op: "bulk write", source: rusb::Error::NoDevice };
        assert!(err.source().is_some());
    }

    #[test]
    fn validation_errors_have_no_source() {
        assert!(Error::InvalidBrightness(5).source().is_none());
    }
}
