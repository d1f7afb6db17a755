//! URL normalization and scheme validation.
//!
//! The scheme is read off the raw string before any decoding, so
//! percent-encoded tricks (`java%73cript:`) stay malformed and fail the
//! allowlist instead of normalizing into something dangerous.

use crate::config::SecurityProfile;
use crate::snapshot::LinkKind;

/// Verdict for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlVerdict {
    /// Lowercased scheme, `None` for relative URLs.
    pub scheme: Option<String>,
    /// Scheme allowlist membership (relative URLs pass). Path traversal is
    /// screened separately.
    pub allowed: bool,
    /// Trimmed URL actually evaluated.
    pub url: String,
}

/// Normalize and validate a URL against the profile allowlist.
///
/// Rejections, in order: protocol-relative `//host`, control characters in
/// the scheme position, schemes outside the allowlist. Relative URLs
/// (no scheme) are allowed here.
pub fn normalize_url(raw: &str, profile: SecurityProfile) -> UrlVerdict {
    let url = raw.trim().to_string();

    if url.starts_with("//") {
        return UrlVerdict {
            scheme: None,
            allowed: false,
            url,
        };
    }

    let Some(candidate) = scheme_candidate(&url) else {
        return UrlVerdict {
            scheme: None,
            allowed: true,
            url,
        };
    };

    let scheme = candidate.to_lowercase();
    if scheme.chars().any(|c| c.is_control()) {
        return UrlVerdict {
            scheme: Some(scheme),
            allowed: false,
            url,
        };
    }
    let allowed = profile.scheme_allowed(&scheme);
    UrlVerdict {
        scheme: Some(scheme),
        allowed,
        url,
    }
}

/// Everything before the first `:` that precedes any `/`, `?`, or `#`.
/// Deliberately looser than the RFC grammar: a malformed prefix is still a
/// scheme candidate and will fail the allowlist.
fn scheme_candidate(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    if colon == 0 {
        return None;
    }
    let prefix = &url[..colon];
    if prefix.contains(['/', '?', '#']) {
        return None;
    }
    Some(prefix)
}

/// Classify a link for the structure record.
pub fn classify(verdict: &UrlVerdict, wraps_image: bool) -> LinkKind {
    if wraps_image {
        return LinkKind::Image;
    }
    if verdict.url.starts_with('#') {
        return LinkKind::Anchor;
    }
    match verdict.scheme.as_deref() {
        None => LinkKind::Internal,
        Some("tel") => LinkKind::Phone,
        Some("http") | Some("https") => {
            if has_network_authority(&verdict.url) {
                LinkKind::External
            } else {
                LinkKind::Internal
            }
        }
        Some(_) => LinkKind::Custom,
    }
}

fn has_network_authority(url: &str) -> bool {
    ::url::Url::parse(url)
        .map(|parsed| parsed.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://example.com", Some("http"), true)]
    #[case("https://example.com", Some("https"), true)]
    #[case("mailto:user@example.com", Some("mailto"), true)]
    #[case("tel:+1234567890", Some("tel"), true)]
    fn test_allowed_schemes_moderate(
        #[case] url: &str,
        #[case] scheme: Option<&str>,
        #[case] allowed: bool,
    ) {
        let verdict = normalize_url(url, SecurityProfile::Moderate);
        assert_eq!(verdict.scheme.as_deref(), scheme);
        assert_eq!(verdict.allowed, allowed);
    }

    #[rstest]
    #[case("javascript:alert(1)")]
    #[case("JAVASCRIPT:alert(1)")]
    #[case("jAvAsCrIpT:alert(1)")]
    fn test_case_variations_rejected(#[case] url: &str) {
        let verdict = normalize_url(url, SecurityProfile::Moderate);
        assert_eq!(verdict.scheme.as_deref(), Some("javascript"));
        assert!(!verdict.allowed);
    }

    #[test]
    fn test_percent_encoded_scheme_not_decoded() {
        // The malformed scheme fails the allowlist as-is.
        let verdict = normalize_url("java%73cript:alert(1)", SecurityProfile::Permissive);
        assert_eq!(verdict.scheme.as_deref(), Some("java%73cript"));
        assert!(!verdict.allowed);
    }

    #[test]
    fn test_protocol_relative_rejected() {
        let verdict = normalize_url("//evil.example/script", SecurityProfile::Permissive);
        assert_eq!(verdict.scheme, None);
        assert!(!verdict.allowed);
    }

    #[rstest]
    #[case("/absolute/path")]
    #[case("relative/path")]
    #[case("./dotted")]
    #[case("../parent")]
    fn test_relative_urls_allowed(#[case] url: &str) {
        let verdict = normalize_url(url, SecurityProfile::Strict);
        assert_eq!(verdict.scheme, None);
        assert!(verdict.allowed);
    }

    #[test]
    fn test_whitespace_trimmed() {
        let verdict = normalize_url("  https://example.com  ", SecurityProfile::Strict);
        assert_eq!(verdict.url, "https://example.com");
        assert!(verdict.allowed);
    }

    #[test]
    fn test_tel_rejected_in_strict() {
        assert!(!normalize_url("tel:+123", SecurityProfile::Strict).allowed);
        assert!(normalize_url("tel:+123", SecurityProfile::Moderate).allowed);
    }

    #[test]
    fn test_data_and_file_rejected_everywhere() {
        for profile in [
            SecurityProfile::Strict,
            SecurityProfile::Moderate,
            SecurityProfile::Permissive,
        ] {
            assert!(!normalize_url("data:text/html,x", profile).allowed);
            assert!(!normalize_url("file:///etc/passwd", profile).allowed);
        }
    }

    #[test]
    fn test_classification() {
        let anchor = normalize_url("#section", SecurityProfile::Moderate);
        assert_eq!(classify(&anchor, false), LinkKind::Anchor);

        let external = normalize_url("https://example.com/page", SecurityProfile::Moderate);
        assert_eq!(classify(&external, false), LinkKind::External);

        let internal = normalize_url("docs/readme.md", SecurityProfile::Moderate);
        assert_eq!(classify(&internal, false), LinkKind::Internal);

        let phone = normalize_url("tel:+1555", SecurityProfile::Moderate);
        assert_eq!(classify(&phone, false), LinkKind::Phone);

        let custom = normalize_url("mailto:a@b.c", SecurityProfile::Moderate);
        assert_eq!(classify(&custom, false), LinkKind::Custom);

        assert_eq!(classify(&external, true), LinkKind::Image);
    }
}
