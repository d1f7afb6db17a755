//! Unicode and line-ending normalization.

use unicode_normalization::{UnicodeNormalization, is_nfc};

/// Normalize raw Markdown before tokenization.
///
/// Steps, in order: Unicode NFC, `\r\n` -> `\n`, lone `\r` -> `\n`.
/// Nothing else. Idempotent: `normalize(normalize(x)) == normalize(x)`.
///
/// Token maps produced later index lines of this string; normalizing after
/// tokenization would shift every offset.
pub fn normalize(raw: &str) -> String {
    let composed = if is_nfc(raw) {
        raw.to_string()
    } else {
        raw.nfc().collect()
    };

    if !composed.contains('\r') {
        return composed;
    }
    composed.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_composes_nfc() {
        // "e" + combining acute -> single composed character
        let decomposed = "Cafe\u{0301}";
        let normalized = normalize(decomposed);
        assert_eq!(normalized, "Caf\u{00e9}");
    }

    #[test]
    fn test_normalize_crlf_to_lf() {
        assert_eq!(normalize("a\r\nb\r\nc"), "a\nb\nc");
    }

    #[test]
    fn test_normalize_lone_cr_to_lf() {
        assert_eq!(normalize("a\rb"), "a\nb");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let input = "# Caf\u{0301}e\r\ntext\rmore\n";
        let once = normalize(input);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_preserves_plain_ascii() {
        let input = "# Title\n\nplain paragraph\n";
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn test_normalize_keeps_bidi_controls() {
        // Normalization is not sanitization; the security stage flags these.
        let input = "a\u{202e}b";
        assert_eq!(normalize(input), input);
    }
}
