//! Byte-to-text boundary for the file entry point.
//!
//! Order of attempts: BOM sniff, strict UTF-8, chardetng guess (accepted
//! only when the decoded text passes a sanity check), lossy UTF-8 as the
//! last resort. The parser core itself only ever sees `&str`.

use std::path::Path;

use chardetng::EncodingDetector;

/// Decoded text with the detection verdict that produced it.
#[derive(Debug, Clone)]
pub struct DecodeResult {
    pub text: String,
    /// Lowercased encoding label (e.g. `"utf-8"`, `"windows-1252"`).
    pub encoding: String,
    pub confidence: f64,
}

/// Decode bytes into text, never failing.
pub fn detect_and_decode(bytes: &[u8]) -> DecodeResult {
    if let Some(result) = decode_bom(bytes) {
        return result;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodeResult {
            text: text.to_string(),
            encoding: "utf-8".to_string(),
            confidence: 0.99,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guessed = detector.guess(None, true);
    let (decoded, actual, _had_errors) = guessed.decode(bytes);
    if looks_reasonable(&decoded) {
        return DecodeResult {
            text: decoded.into_owned(),
            encoding: actual.name().to_lowercase(),
            confidence: 0.8,
        };
    }

    log::warn!(
        "no encoding candidate passed the sanity check; falling back to lossy utf-8"
    );
    DecodeResult {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: "utf-8".to_string(),
        confidence: 0.5,
    }
}

/// Read a file and decode it robustly.
pub fn read_file_robust(path: &Path) -> std::io::Result<DecodeResult> {
    let bytes = std::fs::read(path)?;
    Ok(detect_and_decode(&bytes))
}

fn decode_bom(bytes: &[u8]) -> Option<DecodeResult> {
    let (encoding, label) = if bytes.starts_with(&[0xef, 0xbb, 0xbf]) {
        (encoding_rs::UTF_8, "utf-8")
    } else if bytes.starts_with(&[0xff, 0xfe]) {
        (encoding_rs::UTF_16LE, "utf-16le")
    } else if bytes.starts_with(&[0xfe, 0xff]) {
        (encoding_rs::UTF_16BE, "utf-16be")
    } else {
        return None;
    };
    // `decode` removes the BOM it sniffed.
    let (text, _, _) = encoding.decode(bytes);
    Some(DecodeResult {
        text: text.into_owned(),
        encoding: label.to_string(),
        confidence: 1.0,
    })
}

/// Sanity check for a decoding candidate: more than 1% replacement
/// characters or more than 2% control characters (tab/newline/CR aside)
/// means the candidate mangled the bytes.
fn looks_reasonable(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    let total = text.chars().count();
    let mut replacements = 0usize;
    let mut controls = 0usize;
    for c in text.chars() {
        if c == '\u{fffd}' {
            replacements += 1;
        } else if c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
            controls += 1;
        }
    }
    replacements * 100 <= total && controls * 50 <= total
}
