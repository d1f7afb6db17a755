//! Strict BOF-only YAML frontmatter extraction.
//!
//! The accepted shape is deliberately narrow: an optional BOM, at most one
//! blank line, a `---` fence with no trailing whitespace, YAML lines, and a
//! closing `---` fence (never `...`). Anything else leaves the block in the
//! body and records a structured tag instead of guessing.

use serde::Serialize;

/// Why frontmatter was not extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontmatterError {
    /// Opening fence at BOF was never closed.
    Unterminated,
    /// The fenced block did not parse as a YAML mapping.
    YamlParseError,
    /// A frontmatter-looking block appears after content begins.
    MidFileFence,
}

/// Result of the frontmatter stage. `body` is the text handed to the
/// tokenizer; on successful extraction the block (and any leading BOM or
/// blank line) is gone from it.
#[derive(Debug)]
pub struct FrontmatterOutcome {
    pub frontmatter: Option<serde_json::Value>,
    pub error: Option<FrontmatterError>,
    pub body: String,
    /// Underlying YAML parser message, surfaced as a warning by the caller.
    pub parse_message: Option<String>,
}

impl FrontmatterOutcome {
    fn passthrough(body: String, error: Option<FrontmatterError>) -> Self {
        Self {
            frontmatter: None,
            error,
            body,
            parse_message: None,
        }
    }
}

/// Extract frontmatter from normalized text.
///
/// A leading BOM is consumed unconditionally so it can neither hide the
/// fence nor trip the zero-width scanner later.
pub fn extract(normalized: &str) -> FrontmatterOutcome {
    let text = normalized.strip_prefix('\u{feff}').unwrap_or(normalized);

    let Some(fence_offset) = opening_fence(text) else {
        let error = mid_file_fence(text).then_some(FrontmatterError::MidFileFence);
        return FrontmatterOutcome::passthrough(text.to_string(), error);
    };

    // Scan for the closing fence; only a bare `---` line closes.
    let after_open = &text[fence_offset + 4..]; // past "---\n"
    let mut yaml_end = None;
    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line == "---\n" || line == "---" {
            yaml_end = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let Some((yaml_end, body_start)) = yaml_end else {
        return FrontmatterOutcome::passthrough(
            text.to_string(),
            Some(FrontmatterError::Unterminated),
        );
    };

    let yaml_src = &after_open[..yaml_end];
    let body = guard_setext(&after_open[body_start..]);

    match serde_yaml::from_str::<serde_yaml::Value>(yaml_src) {
        Ok(serde_yaml::Value::Mapping(mapping)) => FrontmatterOutcome {
            frontmatter: Some(yaml_to_json(serde_yaml::Value::Mapping(mapping))),
            error: None,
            body,
            parse_message: None,
        },
        Ok(_) => {
            log::debug!("frontmatter parsed but is not a mapping; leaving block in body");
            let mut outcome = FrontmatterOutcome::passthrough(
                text.to_string(),
                Some(FrontmatterError::YamlParseError),
            );
            outcome.parse_message = Some("frontmatter is not a YAML mapping".to_string());
            outcome
        }
        Err(err) => {
            let mut outcome = FrontmatterOutcome::passthrough(
                text.to_string(),
                Some(FrontmatterError::YamlParseError),
            );
            outcome.parse_message = Some(err.to_string());
            outcome
        }
    }
}

/// Locate the opening fence: offset of the `---` line, allowing at most one
/// leading blank line. The fence must be exactly `---` with no trailing
/// whitespace.
fn opening_fence(text: &str) -> Option<usize> {
    if text.starts_with("---\n") {
        return Some(0);
    }
    if let Some(rest) = text.strip_prefix('\n')
        && rest.starts_with("---\n")
    {
        return Some(1);
    }
    None
}

/// Whether a frontmatter-looking block (fences around at least one
/// `key:`-shaped line) appears after content begins. Informational only;
/// plain thematic breaks do not count.
fn mid_file_fence(text: &str) -> bool {
    let mut in_block = false;
    let mut saw_key = false;
    for (idx, line) in text.lines().enumerate() {
        if line == "---" {
            if idx == 0 {
                continue; // BOF fence is the extractor's business, not ours
            }
            if in_block && saw_key {
                return true;
            }
            in_block = true;
            saw_key = false;
        } else if in_block {
            saw_key = saw_key || looks_like_yaml_key(line);
        }
    }
    false
}

fn looks_like_yaml_key(line: &str) -> bool {
    let Some(colon) = line.find(':') else {
        return false;
    };
    let key = &line[..colon];
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Stripping frontmatter can leave `title\n---` at the top of the body,
/// which the tokenizer would read as a Setext H2. A blank line between the
/// two breaks the pair.
fn guard_setext(body: &str) -> String {
    let mut lines = body.lines();
    let first = lines.next().unwrap_or("");
    let second = lines.next().unwrap_or("");
    let underline = second.trim_end();
    let setext_underline =
        !underline.is_empty() && underline.chars().all(|c| c == '-') && !second.starts_with(' ');
    if !first.trim().is_empty() && setext_underline {
        let mut guarded = String::with_capacity(body.len() + 1);
        guarded.push_str(first);
        guarded.push_str("\n\n");
        guarded.push_str(&body[first.len() + 1..]);
        guarded
    } else {
        body.to_string()
    }
}

/// Convert a YAML value to JSON for the snapshot. Mappings become sorted
/// JSON objects (serde_json's default map is ordered), keeping I10.
fn yaml_to_json(value: serde_yaml::Value) -> serde_json::Value {
    match value {
        serde_yaml::Value::Null => serde_json::Value::Null,
        serde_yaml::Value::Bool(b) => serde_json::Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::from(u)
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .unwrap_or_else(|| serde_json::Value::String(f.to_string()))
            } else {
                serde_json::Value::Null
            }
        }
        serde_yaml::Value::String(s) => serde_json::Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            serde_json::Value::Array(seq.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = serde_json::Map::new();
            for (key, val) in mapping {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    other => serde_yaml::to_string(&other)
                        .map(|s| s.trim_end().to_string())
                        .unwrap_or_default(),
                };
                object.insert(key, yaml_to_json(val));
            }
            serde_json::Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}
