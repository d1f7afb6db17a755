//! Prompt-injection and template-syntax detection.

use regex::Regex;

/// Signature matcher compiled once per parse call.
///
/// Phrase signatures are case-insensitive with word boundaries; template
/// tokens are literal pair checks. The detector only reports — it never
/// rewrites content.
pub struct InjectionScanner {
    phrases: Regex,
}

const PHRASE_PATTERN: &str = concat!(
    r"(?i)\b(?:",
    "ignore (?:all )?previous instructions",
    "|ignore (?:all )?prior instructions",
    "|disregard (?:the )?above",
    "|disregard (?:all )?previous instructions",
    "|forget (?:all )?your instructions",
    "|reveal (?:the )?system prompt",
    "|print your instructions",
    "|override your instructions",
    "|you are now the system",
    "|begin system prompt",
    r")\b",
);

impl InjectionScanner {
    pub fn new() -> Self {
        Self {
            phrases: Regex::new(PHRASE_PATTERN).expect("injection pattern is valid"),
        }
    }

    /// Whether the first `window_chars` characters carry a signature.
    pub fn scan(&self, text: &str, window_chars: usize) -> bool {
        let window = truncate_chars(text, window_chars);
        self.phrases.is_match(window) || has_template_syntax(window)
    }
}

impl Default for InjectionScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Template-engine tokens (SSTI vectors): `{{…}}`, `{%…%}`, `<%=…%>`,
/// `${…}`, `#{…}`, `<?php`.
pub fn has_template_syntax(text: &str) -> bool {
    let pairs: [(&str, &str); 5] = [
        ("{{", "}}"),
        ("{%", "%}"),
        ("<%=", "%>"),
        ("${", "}"),
        ("#{", "}"),
    ];
    for (open, close) in pairs {
        if let Some(at) = text.find(open)
            && text[at + open.len()..].contains(close)
        {
            return true;
        }
    }
    text.to_lowercase().contains("<?php")
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
