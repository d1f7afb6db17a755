//! Path-traversal detection with bounded multi-round decoding.

use percent_encoding::percent_decode_str;

/// Decode rounds after the raw check. Three rounds catch `%252e`-style
/// double and triple encoding; the stabilization break keeps
/// self-referential inputs from looping.
const MAX_DECODE_ROUNDS: usize = 3;

/// Whether a URL smells like path traversal: `..` segments (after up to
/// three percent-decode rounds), Windows drive roots, UNC paths, or the
/// `file:` scheme. Plain `https://host/path` URLs never match.
pub fn has_traversal(url: &str) -> bool {
    let trimmed = url.trim();
    if trimmed.len() >= 5 && trimmed[..5].eq_ignore_ascii_case("file:") {
        return true;
    }

    let mut current = trimmed.to_string();
    for round in 0..=MAX_DECODE_ROUNDS {
        if suspicious_path(&current) {
            return true;
        }
        if round == MAX_DECODE_ROUNDS {
            break;
        }
        let decoded = percent_decode_str(&current)
            .decode_utf8_lossy()
            .into_owned();
        if decoded == current {
            break;
        }
        current = decoded;
    }
    false
}

fn suspicious_path(s: &str) -> bool {
    if s.starts_with("\\\\") {
        return true; // UNC
    }
    if is_windows_drive(s) {
        return true;
    }
    s.split(['/', '\\']).any(|segment| segment == "..")
}

fn is_windows_drive(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("../etc/passwd")]
    #[case("..\\windows\\system32")]
    #[case("foo/../../bar")]
    #[case("%2e%2e/%2e%2e/etc/passwd")]
    #[case("%252e%252e/%252e%252e/etc/passwd")]
    #[case("%25252e%25252e/etc/passwd")]
    #[case("file:///etc/passwd")]
    #[case("FILE:///etc/passwd")]
    #[case("C:\\Windows\\System32")]
    #[case("c:/users/secret")]
    #[case("\\\\host\\share")]
    fn test_traversal_detected(#[case] url: &str) {
        assert!(has_traversal(url), "should flag {url}");
    }

    #[rstest]
    #[case("https://example.com/path")]
    #[case("https://example.com/a/b/c?q=1")]
    #[case("http://example.com")]
    #[case("docs/readme.md")]
    #[case("./local/file.png")]
    #[case("https://example.com/v1..v2/diff")]
    #[case("profile./x")]
    fn test_no_false_positives(#[case] url: &str) {
        assert!(!has_traversal(url), "should not flag {url}");
    }

    #[test]
    fn test_quadruple_encoding_beyond_bound_not_detected() {
        // Four encoding rounds sit past the decode budget; the bounded
        // loop trades that corner for guaranteed termination.
        let quad = "%2525252e%2525252e/etc/passwd";
        assert!(!has_traversal(quad));
    }

    #[test]
    fn test_mixed_separators() {
        assert!(has_traversal("..%5c..%5cwindows"));
    }
}
