//! Security profile resolution and budget tables.

use serde::Serialize;

use crate::error::ParseError;

/// Named bundle of budgets and allowlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityProfile {
    Strict,
    Moderate,
    Permissive,
}

impl std::fmt::Display for SecurityProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SecurityProfile {
    /// Resolve a profile name. Unknown names are a structured error, not a
    /// fallback.
    pub fn resolve(name: &str) -> Result<Self, ParseError> {
        match name {
            "strict" => Ok(SecurityProfile::Strict),
            "moderate" => Ok(SecurityProfile::Moderate),
            "permissive" => Ok(SecurityProfile::Permissive),
            other => Err(ParseError::UnknownProfile {
                name: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityProfile::Strict => "strict",
            SecurityProfile::Moderate => "moderate",
            SecurityProfile::Permissive => "permissive",
        }
    }

    /// Concrete budgets for this profile.
    pub fn budgets(&self) -> Budgets {
        match self {
            SecurityProfile::Strict => Budgets {
                max_content_bytes: 100 * 1024,
                max_lines: 10_000,
                max_recursion_depth: 16,
                max_data_uri_size: 0,
                max_total_data_uri_size: 0,
                max_injection_scan_chars: 4096,
            },
            SecurityProfile::Moderate => Budgets {
                max_content_bytes: 1024 * 1024,
                max_lines: 50_000,
                max_recursion_depth: 32,
                max_data_uri_size: 64 * 1024,
                max_total_data_uri_size: 640 * 1024,
                max_injection_scan_chars: 2048,
            },
            SecurityProfile::Permissive => Budgets {
                max_content_bytes: 10 * 1024 * 1024,
                max_lines: 200_000,
                max_recursion_depth: 64,
                max_data_uri_size: 1024 * 1024,
                max_total_data_uri_size: 10 * 1024 * 1024,
                max_injection_scan_chars: 1024,
            },
        }
    }

    /// URL schemes this profile allows, lowercased, sorted.
    pub fn allowed_schemes(&self) -> &'static [&'static str] {
        match self {
            SecurityProfile::Strict => &["http", "https", "mailto"],
            SecurityProfile::Moderate => &["http", "https", "mailto", "tel"],
            SecurityProfile::Permissive => &["ftp", "ftps", "http", "https", "mailto", "tel"],
        }
    }

    /// Tokenizer plugins this profile allows.
    pub fn allowed_plugins(&self) -> &'static [&'static str] {
        match self {
            SecurityProfile::Strict => &["strikethrough", "table", "tasklist"],
            SecurityProfile::Moderate | SecurityProfile::Permissive => {
                &["footnote", "math", "strikethrough", "table", "tasklist"]
            }
        }
    }

    /// Whether raw HTML survives into the snapshot by default.
    pub fn allows_html_default(&self) -> bool {
        !matches!(self, SecurityProfile::Strict)
    }

    /// Whether a prompt-injection hit quarantines the document.
    pub fn quarantines_on_injection(&self) -> bool {
        matches!(self, SecurityProfile::Strict)
    }

    pub fn scheme_allowed(&self, scheme: &str) -> bool {
        self.allowed_schemes().contains(&scheme)
    }
}

/// Concrete numeric budgets for one profile. Immutable configuration; built
/// once per parse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budgets {
    pub max_content_bytes: u64,
    pub max_lines: u64,
    pub max_recursion_depth: u32,
    /// Single data-URI ceiling in bytes; 0 blocks all data URIs.
    pub max_data_uri_size: u64,
    /// Cumulative data-URI ceiling, typically 10x the single ceiling.
    pub max_total_data_uri_size: u64,
    /// Scan window for the injection and Unicode detectors.
    pub max_injection_scan_chars: usize,
}

/// Normalized text longer than this is not scanned for Unicode spoofing;
/// the detector fails closed instead. Profile-independent.
pub const UNICODE_FAIL_CLOSED_BYTES: usize = 100_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_profiles() {
        assert_eq!(
            SecurityProfile::resolve("strict").unwrap(),
            SecurityProfile::Strict
        );
        assert_eq!(
            SecurityProfile::resolve("moderate").unwrap(),
            SecurityProfile::Moderate
        );
        assert_eq!(
            SecurityProfile::resolve("permissive").unwrap(),
            SecurityProfile::Permissive
        );
    }

    #[test]
    fn test_resolve_unknown_profile_is_error() {
        let err = SecurityProfile::resolve("paranoid").unwrap_err();
        assert!(err.to_string().contains("paranoid"));
    }

    #[test]
    fn test_content_budgets_exact_constants() {
        assert_eq!(
            SecurityProfile::Strict.budgets().max_content_bytes,
            102_400
        );
        assert_eq!(
            SecurityProfile::Moderate.budgets().max_content_bytes,
            1_048_576
        );
        assert_eq!(
            SecurityProfile::Permissive.budgets().max_content_bytes,
            10_485_760
        );
    }

    #[test]
    fn test_data_uri_budget_exact_constants() {
        assert_eq!(SecurityProfile::Strict.budgets().max_data_uri_size, 0);
        assert_eq!(
            SecurityProfile::Moderate.budgets().max_data_uri_size,
            65_536
        );
        assert_eq!(
            SecurityProfile::Permissive.budgets().max_data_uri_size,
            1_048_576
        );
    }

    #[test]
    fn test_total_data_uri_budget_is_ten_times_single() {
        for profile in [SecurityProfile::Moderate, SecurityProfile::Permissive] {
            let b = profile.budgets();
            assert_eq!(b.max_total_data_uri_size, b.max_data_uri_size * 10);
        }
    }

    #[test]
    fn test_injection_scan_window_exact_constants() {
        assert_eq!(
            SecurityProfile::Strict.budgets().max_injection_scan_chars,
            4096
        );
        assert_eq!(
            SecurityProfile::Moderate.budgets().max_injection_scan_chars,
            2048
        );
        assert_eq!(
            SecurityProfile::Permissive.budgets().max_injection_scan_chars,
            1024
        );
    }

    #[test]
    fn test_scheme_allowlists_grow_monotonically() {
        let strict = SecurityProfile::Strict.allowed_schemes();
        let moderate = SecurityProfile::Moderate.allowed_schemes();
        let permissive = SecurityProfile::Permissive.allowed_schemes();
        for s in strict {
            assert!(moderate.contains(s));
        }
        for s in moderate {
            assert!(permissive.contains(s));
        }
        assert!(!strict.contains(&"tel"));
        assert!(moderate.contains(&"tel"));
        assert!(permissive.contains(&"ftp"));
    }

    #[test]
    fn test_strict_disallows_html_by_default() {
        assert!(!SecurityProfile::Strict.allows_html_default());
        assert!(SecurityProfile::Moderate.allows_html_default());
        assert!(SecurityProfile::Permissive.allows_html_default());
    }

    #[test]
    fn test_allowed_schemes_are_sorted() {
        for profile in [
            SecurityProfile::Strict,
            SecurityProfile::Moderate,
            SecurityProfile::Permissive,
        ] {
            let schemes = profile.allowed_schemes();
            let mut sorted = schemes.to_vec();
            sorted.sort_unstable();
            assert_eq!(schemes, sorted.as_slice());
        }
    }
}
