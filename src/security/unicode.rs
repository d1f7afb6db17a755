//! Unicode spoofing detection: BiDi controls, confusables, invisibles.

use crate::config::profile::UNICODE_FAIL_CLOSED_BYTES;

/// Signals from one scan. `risk_score` counts orthogonal signal classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnicodeScan {
    pub has_bidi: bool,
    pub has_confusables: bool,
    pub has_zero_width: bool,
    pub has_invisible: bool,
    pub scan_limit_exceeded: bool,
}

impl UnicodeScan {
    pub fn risk_score(&self) -> u32 {
        [
            self.has_bidi,
            self.has_confusables,
            self.has_zero_width,
            self.has_invisible,
        ]
        .iter()
        .filter(|signal| **signal)
        .count() as u32
    }
}

/// Common homoglyphs of ASCII letters: Cyrillic and Greek lookalikes that
/// carry spoofed brand names past a casual reader.
const CONFUSABLES: &[char] = &[
    '\u{0430}', // Cyrillic a
    '\u{0435}', // Cyrillic e
    '\u{043e}', // Cyrillic o
    '\u{0440}', // Cyrillic r lookalike (er)
    '\u{0441}', // Cyrillic c (es)
    '\u{0443}', // Cyrillic y (u)
    '\u{0445}', // Cyrillic x (ha)
    '\u{0456}', // Cyrillic i
    '\u{0455}', // Cyrillic s (dze)
    '\u{0410}', // Cyrillic A
    '\u{0415}', // Cyrillic E
    '\u{041e}', // Cyrillic O
    '\u{0420}', // Cyrillic P (er)
    '\u{0421}', // Cyrillic C (es)
    '\u{03bf}', // Greek omicron
    '\u{03b1}', // Greek alpha
    '\u{03bd}', // Greek nu
    '\u{0391}', // Greek Alpha
    '\u{039f}', // Greek Omicron
];

const ZERO_WIDTH: &[char] = &['\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}', '\u{feff}'];

const INVISIBLE: &[char] = &['\u{00ad}', '\u{034f}'];

fn is_bidi_control(c: char) -> bool {
    matches!(c, '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}')
}

/// Scan at most `window_chars` characters of normalized text.
///
/// Documents longer than the fail-closed threshold are not scanned at all:
/// a padding attack must not be able to push spoofed content past the
/// window, so the detector assumes the worst and says so via
/// `scan_limit_exceeded`.
pub fn scan_unicode(text: &str, window_chars: usize) -> UnicodeScan {
    if text.len() > UNICODE_FAIL_CLOSED_BYTES {
        log::warn!(
            "text of {} bytes exceeds unicode scan limit; failing closed",
            text.len()
        );
        return UnicodeScan {
            has_bidi: true,
            has_confusables: true,
            has_zero_width: false,
            has_invisible: false,
            scan_limit_exceeded: true,
        };
    }

    let mut scan = UnicodeScan::default();
    let mut saw_ascii_letter = false;
    let mut saw_confusable = false;

    for c in text.chars().take(window_chars) {
        if c.is_ascii_alphabetic() {
            saw_ascii_letter = true;
        } else if is_bidi_control(c) {
            scan.has_bidi = true;
        } else if CONFUSABLES.contains(&c) {
            saw_confusable = true;
        } else if ZERO_WIDTH.contains(&c) {
            scan.has_zero_width = true;
        } else if INVISIBLE.contains(&c) {
            scan.has_invisible = true;
        }
    }

    // A confusable only spoofs when Latin text is around to blend into.
    scan.has_confusables = saw_confusable && saw_ascii_letter;
    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: usize = 4096;

    #[test]
    fn test_clean_text() {
        let scan = scan_unicode("# Clean Document\n\nNo issues here.", WINDOW);
        assert_eq!(scan, UnicodeScan::default());
        assert_eq!(scan.risk_score(), 0);
    }

    #[test]
    fn test_bidi_override_detected() {
        let scan = scan_unicode("Hello \u{202e}evil\u{202c} world", WINDOW);
        assert!(scan.has_bidi);
        assert_eq!(scan.risk_score(), 1);
    }

    #[test]
    fn test_isolate_controls_detected() {
        let scan = scan_unicode("a\u{2066}b\u{2069}c", WINDOW);
        assert!(scan.has_bidi);
    }

    #[test]
    fn test_mixed_script_confusable() {
        // Cyrillic 'а' inside a Latin brand name
        let scan = scan_unicode("P\u{0430}ypal login", WINDOW);
        assert!(scan.has_confusables);
    }

    #[test]
    fn test_pure_cyrillic_text_not_flagged() {
        let scan = scan_unicode("\u{043f}\u{0440}\u{0438}\u{0432}\u{0435}\u{0442}", WINDOW);
        assert!(!scan.has_confusables);
    }

    #[test]
    fn test_zero_width_and_invisible() {
        let scan = scan_unicode("pass\u{200b}word and soft\u{00ad}hyphen", WINDOW);
        assert!(scan.has_zero_width);
        assert!(scan.has_invisible);
        assert_eq!(scan.risk_score(), 2);
    }

    #[test]
    fn test_fail_closed_over_limit() {
        let padding = "A".repeat(110_000);
        let scan = scan_unicode(&padding, WINDOW);
        assert!(scan.scan_limit_exceeded);
        assert!(scan.has_bidi);
        assert!(scan.has_confusables);
    }

    #[test]
    fn test_padding_attack_fails_closed() {
        let mut text = "A".repeat(100_001);
        text.push_str("\u{202e}evil\u{202c}");
        let scan = scan_unicode(&text, WINDOW);
        assert!(scan.scan_limit_exceeded);
        assert!(scan.has_bidi);
    }

    #[test]
    fn test_signals_outside_window_missed_but_under_limit() {
        // Under the fail-closed threshold, the window bounds the scan.
        let mut text = "A".repeat(5000);
        text.push('\u{202e}');
        let scan = scan_unicode(&text, 4096);
        assert!(!scan.has_bidi);
        assert!(!scan.scan_limit_exceeded);
    }

    #[test]
    fn test_empty_text_clean() {
        assert_eq!(scan_unicode("", WINDOW), UnicodeScan::default());
    }
}
