//! Snapshot records.
//!
//! Field order here is serialization order (serde emits declaration order),
//! and every map is a `BTreeMap`, so byte-identical input produces
//! byte-identical JSON under the same profile and options. Entities are
//! immutable once emitted; the policy stage builds new top-level records
//! instead of mutating structure items.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::SecurityProfile;
use crate::frontmatter::FrontmatterError;

/// Top-level parse result.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub metadata: Metadata,
    pub content: Content,
    pub structure: Structure,
    pub mappings: Mappings,
}

impl Snapshot {
    /// Deterministic JSON rendering (UTF-8, LF, stable key order).
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("snapshot serialization is infallible")
    }

    /// Index of the section containing `line`, by binary search over
    /// `start_line` (sections are sorted, I3).
    pub fn section_of(&self, line: usize) -> Option<usize> {
        let sections = &self.structure.sections;
        let idx = sections.partition_point(|s| s.start_line <= line);
        if idx == 0 {
            return None;
        }
        let candidate = idx - 1;
        (line < sections[candidate].end_line).then_some(candidate)
    }
}

/// Document-wide facts and policy decisions.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    /// Present when the document came through the byte-to-text boundary.
    pub encoding: Option<EncodingInfo>,
    pub source_path: Option<String>,
    pub frontmatter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter_error: Option<FrontmatterError>,
    pub has_frontmatter: bool,
    pub unknown_plugins: Vec<String>,
    pub security: Security,
    pub embedding_blocked: bool,
    pub embedding_block_reason: Option<String>,
    pub quarantined: bool,
    pub quarantine_reasons: Vec<String>,
    pub security_policies_applied: Vec<String>,
}

/// Detected encoding label and confidence from the file boundary.
#[derive(Debug, Clone, Serialize)]
pub struct EncodingInfo {
    pub detected: String,
    pub confidence: f64,
}

/// The normalized source. Concatenating `lines` reproduces `raw` exactly;
/// token maps and all offsets index this text.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub raw: String,
    pub lines: Vec<String>,
}

/// Security sub-record: profile, fixed-schema statistics, warnings, counts.
#[derive(Debug, Clone, Serialize)]
pub struct Security {
    pub profile_used: SecurityProfile,
    pub statistics: SecurityStatistics,
    pub warnings: Vec<Warning>,
    pub summary: BTreeMap<String, u64>,
}

/// Fixed-schema statistics. `has_*` booleans are logical ORs over the whole
/// document, never per-section.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SecurityStatistics {
    pub has_script: bool,
    pub has_event_handlers: bool,
    pub has_style_scriptless: bool,
    pub has_meta_refresh: bool,
    pub has_frame_like: bool,
    pub has_html_block: bool,
    pub has_html_inline: bool,
    pub has_data_uri_images: bool,
    pub suspected_prompt_injection: bool,
    pub footnote_injection: bool,
    pub prompt_injection_in_images: bool,
    pub confusables_present: bool,
    pub has_bidi: bool,
    pub unicode_risk_score: u32,
    pub ragged_tables_count: u32,
    pub table_align_mismatches: u32,
    pub dup_footnote_labels: u32,
    /// Scheme -> link count; relative links count under `"relative"`.
    pub link_schemes: BTreeMap<String, u64>,
    pub allowed_schemes: Vec<String>,
    pub link_disallowed_schemes_raw: bool,
    pub path_traversal_pattern: bool,
    pub scan_limit_exceeded: bool,
}

/// One security warning. Optional fields are omitted when absent.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Warning {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            line: None,
            size: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Extracted structure. Every list is ordered by first source line.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Structure {
    pub sections: Vec<Section>,
    pub paragraphs: Vec<Paragraph>,
    pub lists: Vec<List>,
    pub tables: Vec<Table>,
    pub code_blocks: Vec<CodeBlock>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub math: MathGroup,
    pub footnotes: Footnotes,
    pub blockquotes: Vec<Blockquote>,
    pub html_blocks: Vec<HtmlBlockRec>,
    pub html_inline: Vec<HtmlInlineRec>,
}

/// A heading and the line range it governs.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub level: u8,
    pub title: String,
    pub start_line: usize,
    pub end_line: usize,
    pub start_char: usize,
    pub end_char: usize,
    pub token_idx: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
    pub has_code: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Bullet,
    Ordered,
    Task,
}

#[derive(Debug, Clone, Serialize)]
pub struct List {
    #[serde(rename = "type")]
    pub kind: ListType,
    pub items: Vec<ListItem>,
    pub start_line: usize,
    pub end_line: usize,
    pub task_items_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListItem {
    pub text: String,
    /// `None` for plain items, `Some` for `[ ]`/`[x]`.
    pub checked: Option<bool>,
    pub children: Vec<List>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignSpec {
    Left,
    Center,
    Right,
    None,
}

/// Marker for values that were inferred rather than asserted by the token
/// stream.
#[derive(Debug, Clone, Serialize)]
pub struct MetaFlag {
    pub heuristic: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub align: Vec<AlignSpec>,
    pub align_meta: Option<MetaFlag>,
    pub is_ragged: bool,
    pub is_ragged_meta: Option<MetaFlag>,
    pub row_count: u32,
    pub column_count: u32,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    Fenced,
    Indented,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeBlock {
    #[serde(rename = "type")]
    pub kind: CodeKind,
    pub language: String,
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    External,
    Internal,
    Image,
    Anchor,
    Phone,
    Custom,
}

#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub url: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub scheme: Option<String>,
    pub allowed: bool,
    pub image_id: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Local,
    External,
    Data,
}

#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub image_id: String,
    pub image_kind: ImageKind,
    /// MIME subtype for data URIs, file extension otherwise, `"unknown"`
    /// when neither applies.
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MathKind {
    Display,
    Fenced,
}

#[derive(Debug, Clone, Serialize)]
pub struct MathBlockRec {
    pub id: String,
    pub kind: MathKind,
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MathInlineRec {
    pub id: String,
    pub content: String,
    pub line: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MathGroup {
    pub blocks: Vec<MathBlockRec>,
    pub inline: Vec<MathInlineRec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FootnoteDef {
    pub label: String,
    pub content: String,
    /// UTF-8 length; for multibyte content strictly greater than the
    /// character count.
    pub byte_length: u64,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FootnoteRef {
    pub label: String,
    pub line: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Footnotes {
    pub definitions: Vec<FootnoteDef>,
    pub references: Vec<FootnoteRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Blockquote {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HtmlBlockRec {
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HtmlInlineRec {
    pub content: String,
    pub line: usize,
    pub inline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    Prose,
    Code,
    FenceMarker,
    Blank,
    IndentedCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeRange {
    pub start_line: usize,
    pub end_line: usize,
    pub language: String,
}

/// Line classification for prose/code splitting in downstream chunkers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Mappings {
    pub line_to_type: BTreeMap<usize, LineType>,
    pub prose_lines: Vec<usize>,
    pub code_lines: Vec<usize>,
    pub code_blocks: Vec<CodeRange>,
}
