//! Plain token records.

/// Half-open line range `[start, end)` attached to block tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Token kinds. Block kinds carry a line map; inline kinds appear only as
/// children of an [`TokenKind::Inline`] token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Block tokens
    HeadingOpen,
    HeadingClose,
    ParagraphOpen,
    ParagraphClose,
    Inline,
    BulletListOpen,
    BulletListClose,
    OrderedListOpen,
    OrderedListClose,
    ListItemOpen,
    ListItemClose,
    BlockquoteOpen,
    BlockquoteClose,
    TableOpen,
    TableClose,
    TheadOpen,
    TheadClose,
    TbodyOpen,
    TbodyClose,
    TrOpen,
    TrClose,
    ThOpen,
    ThClose,
    TdOpen,
    TdClose,
    /// Fenced code block; `info` holds the full info string.
    Fence,
    /// 4-space/tab indented code block.
    IndentedCode,
    HtmlBlock,
    /// Display math promoted out of a paragraph (`$$...$$`).
    MathBlock,
    FootnoteDefOpen,
    FootnoteDefClose,
    Hr,
    // Inline children
    Text,
    CodeInline,
    MathInline,
    /// Display math that shares a paragraph with other inline content.
    MathDisplay,
    LinkOpen,
    LinkClose,
    Image,
    HtmlInline,
    Softbreak,
    Hardbreak,
    /// Task-list checkbox; `info` is `"checked"` or `"unchecked"`.
    TaskMarker,
    /// Footnote reference; `content` is the label.
    FootnoteRef,
}

/// A canonical token: a plain record with no behavior of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// HTML-ish tag name (`"h2"`, `"p"`, `"ul"`, ...), empty when none fits.
    pub tag: &'static str,
    /// `+1` opening, `0` self-contained, `-1` closing.
    pub nesting: i8,
    /// Block nesting depth at emission.
    pub level: u32,
    pub map: Option<LineSpan>,
    /// Fence info string, footnote label, alignment spec, or similar.
    pub info: String,
    pub content: String,
    /// Inline children (populated on `Inline` tokens only).
    pub children: Vec<Token>,
    /// Name/value attribute pairs (`href`, `src`, `title`, `start`).
    pub attrs: Vec<(String, String)>,
}

impl Token {
    pub fn new(kind: TokenKind, tag: &'static str, nesting: i8) -> Self {
        Self {
            kind,
            tag,
            nesting,
            level: 0,
            map: None,
            info: String::new(),
            content: String::new(),
            children: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn with_map(mut self, span: LineSpan) -> Self {
        self.map = Some(span);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// First attribute with the given name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Heading level parsed from the tag (`"h3"` -> 3).
    pub fn heading_level(&self) -> Option<u8> {
        self.tag
            .strip_prefix('h')
            .and_then(|digits| digits.parse().ok())
            .filter(|level| (1..=6).contains(level))
    }

    /// Line range, defaulting to an empty span at line 0 when unmapped.
    pub fn span(&self) -> LineSpan {
        self.map.unwrap_or(LineSpan { start: 0, end: 0 })
    }
}
