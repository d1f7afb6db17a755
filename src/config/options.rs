//! Per-call parse options.

use serde::Deserialize;

/// Tokenizer dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Commonmark,
    /// CommonMark plus tables, strikethrough, and task lists.
    #[default]
    #[serde(rename = "gfm-like")]
    GfmLike,
}

/// Options recognized by [`crate::parse`]. Everything is optional; defaults
/// come from the security profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParseOptions {
    /// Overrides the profile's HTML default. `Some(false)` strips HTML
    /// blocks and inline HTML from the snapshot.
    #[serde(default)]
    pub allows_html: Option<bool>,
    /// Requested tokenizer plugins; intersected with the profile
    /// allowlist. `None` means "everything the profile allows".
    #[serde(default)]
    pub plugins: Option<Vec<String>>,
    #[serde(default)]
    pub preset: Option<Preset>,
    /// Overrides the per-call profile by name. Unknown names are an error.
    #[serde(default)]
    pub security_profile: Option<String>,
}

impl ParseOptions {
    pub fn preset(&self) -> Preset {
        self.preset.unwrap_or_default()
    }
}
