//! Error handling types for the parser core.
//!
//! Only two conditions are fatal: a pre-parse budget breach and a
//! strict-profile security violation. Every other outcome is data on the
//! snapshot (`security.warnings`, `embedding_blocked`, `quarantined`).

use thiserror::Error;

use crate::config::SecurityProfile;

/// Unit of a breached size budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    Lines,
}

impl std::fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeUnit::Bytes => write!(f, "bytes"),
            SizeUnit::Lines => write!(f, "lines"),
        }
    }
}

/// What a strict-profile fatal security error was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityErrorKind {
    /// A `<script>` tag was found in the raw content.
    Script,
    /// A link or raw-HTML attribute used a scheme outside the allowlist.
    DisallowedScheme,
}

impl std::fmt::Display for SecurityErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityErrorKind::Script => write!(f, "script"),
            SecurityErrorKind::DisallowedScheme => write!(f, "disallowed_scheme"),
        }
    }
}

/// Comprehensive error type for parse operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Pre-parse size budget breach (text bytes or line count).
    #[error("content exceeds {limit} {unit} for profile {profile} (found {found})")]
    Size {
        profile: SecurityProfile,
        limit: u64,
        found: u64,
        unit: SizeUnit,
    },

    /// Strict-profile security violation raised before snapshot emission.
    #[error("security violation ({kind}) under profile {profile}: {message}")]
    Security {
        profile: SecurityProfile,
        kind: SecurityErrorKind,
        message: String,
    },

    /// Profile name did not resolve to a known profile.
    #[error("unknown security profile: {name}")]
    UnknownProfile { name: String },

    /// IO error (file entry point only).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    /// Create a size error for a byte-budget breach.
    pub fn size_bytes(profile: SecurityProfile, limit: u64, found: u64) -> Self {
        ParseError::Size {
            profile,
            limit,
            found,
            unit: SizeUnit::Bytes,
        }
    }

    /// Create a size error for a line-budget breach.
    pub fn size_lines(profile: SecurityProfile, limit: u64, found: u64) -> Self {
        ParseError::Size {
            profile,
            limit,
            found,
            unit: SizeUnit::Lines,
        }
    }

    /// Create a strict-fatal security error.
    pub fn security(
        profile: SecurityProfile,
        kind: SecurityErrorKind,
        message: impl Into<String>,
    ) -> Self {
        ParseError::Security {
            profile,
            kind,
            message: message.into(),
        }
    }
}
