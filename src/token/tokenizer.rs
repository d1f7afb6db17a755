//! pulldown-cmark adapter: events in, canonical tokens out.
//!
//! The adapter is the only module that sees tokenizer types. It flattens
//! `(Event, Range)` pairs into the open/close records the extractors
//! consume, computing `[start_line, end_line)` maps from byte offsets
//! through the line index.

use std::collections::BTreeSet;
use std::ops::Range;

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};

use super::model::{LineSpan, Token, TokenKind};
use crate::config::{ParseOptions, Preset, SecurityProfile};
use crate::text::LineIndex;

const KNOWN_PLUGINS: &[&str] = &["footnote", "math", "strikethrough", "table", "tasklist"];

/// Tokenizer configuration derived from profile + per-call options.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    pub preset: Preset,
    /// Effective plugin set: requested ∩ profile allowlist.
    pub plugins: BTreeSet<String>,
    pub max_recursion_depth: u32,
}

impl TokenizerConfig {
    /// Resolve the effective plugin set. Returns the config and the list of
    /// requested plugin names nobody recognizes (recorded in metadata).
    ///
    /// With no explicit plugin list, `gfm-like` defaults to everything the
    /// profile allows; `commonmark` defaults to no extensions.
    pub fn resolve(profile: SecurityProfile, options: &ParseOptions) -> (Self, Vec<String>) {
        let allowed = profile.allowed_plugins();
        let preset = options.preset();
        let requested: Vec<String> = match &options.plugins {
            Some(list) => list.clone(),
            None => match preset {
                Preset::Commonmark => Vec::new(),
                Preset::GfmLike => allowed.iter().map(|s| (*s).to_string()).collect(),
            },
        };

        let mut unknown = Vec::new();
        let mut effective = BTreeSet::new();
        for name in requested {
            if !KNOWN_PLUGINS.contains(&name.as_str()) {
                log::debug!("unknown tokenizer plugin requested: {name}");
                unknown.push(name);
            } else if allowed.contains(&name.as_str()) {
                effective.insert(name);
            } else {
                log::debug!(
                    "plugin {name} not allowed under profile {profile}; dropping"
                );
            }
        }

        (
            Self {
                preset,
                plugins: effective,
                max_recursion_depth: profile.budgets().max_recursion_depth,
            },
            unknown,
        )
    }

    fn options(&self) -> Options {
        let mut opts = Options::empty();
        for plugin in &self.plugins {
            match plugin.as_str() {
                "table" => opts.insert(Options::ENABLE_TABLES),
                "strikethrough" => opts.insert(Options::ENABLE_STRIKETHROUGH),
                "tasklist" => opts.insert(Options::ENABLE_TASKLISTS),
                "footnote" => opts.insert(Options::ENABLE_FOOTNOTES),
                "math" => opts.insert(Options::ENABLE_MATH),
                _ => {}
            }
        }
        opts
    }
}

/// Output of tokenization.
#[derive(Debug)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    /// True when block nesting hit the recursion budget and deeper content
    /// was dropped.
    pub depth_exceeded: bool,
}

/// Tokenize normalized text into canonical records.
pub fn tokenize(text: &str, config: &TokenizerConfig) -> TokenStream {
    let index = LineIndex::new(text);
    let mut builder = StreamBuilder::new(&index, config.max_recursion_depth);
    for (event, range) in Parser::new_ext(text, config.options()).into_offset_iter() {
        builder.event(event, range);
    }
    let depth_exceeded = builder.depth_exceeded;
    let tokens = promote_display_math(builder.finish());
    TokenStream {
        tokens,
        depth_exceeded,
    }
}

/// Accumulates inline children for one leaf block.
struct InlineBuilder {
    children: Vec<Token>,
    content: String,
    start: usize,
    end: usize,
}

impl InlineBuilder {
    fn new(range: &Range<usize>) -> Self {
        Self {
            children: Vec::new(),
            content: String::new(),
            start: range.start,
            end: range.end,
        }
    }

    fn touch(&mut self, range: &Range<usize>) {
        self.start = self.start.min(range.start);
        self.end = self.end.max(range.end);
    }

    fn push(&mut self, child: Token, text: &str, range: &Range<usize>) {
        self.touch(range);
        self.content.push_str(text);
        self.children.push(child);
    }
}

/// Alt-text accumulation for an open image (images may nest in alt text;
/// inner alt flattens into the outer one).
struct ImageAccum {
    src: String,
    title: String,
    alt: String,
    start: usize,
    end: usize,
}

struct CodeAccum {
    fenced: bool,
    info: String,
    content: String,
    range: Range<usize>,
}

struct HtmlAccum {
    content: String,
    range: Range<usize>,
}

struct TableCtx {
    in_head: bool,
    tbody_open: bool,
}

struct StreamBuilder<'a> {
    index: &'a LineIndex,
    out: Vec<Token>,
    depth: u32,
    limit: u32,
    suppressed_at: Option<u32>,
    depth_exceeded: bool,
    inline: Option<InlineBuilder>,
    images: Vec<ImageAccum>,
    code: Option<CodeAccum>,
    html: Option<HtmlAccum>,
    tables: Vec<TableCtx>,
}

impl<'a> StreamBuilder<'a> {
    fn new(index: &'a LineIndex, limit: u32) -> Self {
        Self {
            index,
            out: Vec::new(),
            depth: 0,
            limit,
            suppressed_at: None,
            depth_exceeded: false,
            inline: None,
            images: Vec::new(),
            code: None,
            html: None,
            tables: Vec::new(),
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_inline();
        self.out
    }

    fn span(&self, range: &Range<usize>) -> LineSpan {
        let (start, end) = self.index.span_of(range);
        LineSpan::new(start, end)
    }

    fn suppressed(&self) -> bool {
        self.suppressed_at.is_some()
    }

    fn emit(&mut self, mut token: Token) {
        token.level = self.depth;
        self.out.push(token);
    }

    /// Open a block: depth bookkeeping plus the budget guard.
    fn open_block(&mut self, token: Token) {
        self.depth += 1;
        if self.suppressed() {
            return;
        }
        if self.depth > self.limit {
            log::warn!("block nesting exceeded budget ({}); dropping subtree", self.limit);
            self.suppressed_at = Some(self.depth);
            self.depth_exceeded = true;
            return;
        }
        let mut token = token;
        token.level = self.depth - 1;
        self.out.push(token);
    }

    fn close_block(&mut self, token: Token) {
        if let Some(at) = self.suppressed_at {
            if self.depth == at {
                self.suppressed_at = None;
            }
            self.depth = self.depth.saturating_sub(1);
            return;
        }
        self.depth = self.depth.saturating_sub(1);
        let mut token = token;
        token.level = self.depth;
        self.out.push(token);
    }

    fn flush_inline(&mut self) {
        if let Some(inline) = self.inline.take() {
            let span = self.span(&(inline.start..inline.end));
            let mut token = Token::new(TokenKind::Inline, "", 0)
                .with_map(span)
                .with_content(inline.content);
            token.children = inline.children;
            self.emit(token);
        }
    }

    fn inline_mut(&mut self, range: &Range<usize>) -> &mut InlineBuilder {
        if self.inline.is_none() {
            self.inline = Some(InlineBuilder::new(range));
        }
        self.inline.as_mut().expect("inline builder just created")
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start_tag(tag, range),
            Event::End(tag) => self.end_tag(tag, range),
            Event::Text(text) => self.text(&text, range),
            Event::Code(code) => self.inline_child(
                TokenKind::CodeInline,
                "code",
                &code,
                &code,
                range,
            ),
            Event::InlineMath(math) => {
                self.inline_child(TokenKind::MathInline, "math", &math, &math, range)
            }
            Event::DisplayMath(math) => {
                self.inline_child(TokenKind::MathDisplay, "math", &math, &math, range)
            }
            Event::Html(html) => self.block_html(&html, range),
            Event::InlineHtml(html) => {
                self.inline_child(TokenKind::HtmlInline, "", &html, &html, range)
            }
            Event::SoftBreak => {
                if !self.suppressed() && self.images.is_empty() {
                    let child = Token::new(TokenKind::Softbreak, "br", 0);
                    self.inline_mut(&range).push(child, " ", &range);
                } else if let Some(image) = self.images.last_mut() {
                    image.alt.push(' ');
                }
            }
            Event::HardBreak => {
                if !self.suppressed() && self.images.is_empty() {
                    let child = Token::new(TokenKind::Hardbreak, "br", 0);
                    self.inline_mut(&range).push(child, "\n", &range);
                } else if let Some(image) = self.images.last_mut() {
                    image.alt.push(' ');
                }
            }
            Event::Rule => {
                if !self.suppressed() {
                    self.flush_inline();
                    let span = self.span(&range);
                    self.emit(Token::new(TokenKind::Hr, "hr", 0).with_map(span));
                }
            }
            Event::TaskListMarker(checked) => {
                if !self.suppressed() {
                    let info = if checked { "checked" } else { "unchecked" };
                    let child = Token::new(TokenKind::TaskMarker, "", 0).with_info(info);
                    self.inline_mut(&range).push(child, "", &range);
                }
            }
            Event::FootnoteReference(label) => {
                if !self.suppressed() {
                    let child =
                        Token::new(TokenKind::FootnoteRef, "", 0).with_content(label.as_ref());
                    self.inline_mut(&range).push(child, "", &range);
                }
            }
        }
    }

    fn text(&mut self, text: &str, range: Range<usize>) {
        if self.suppressed() {
            return;
        }
        if let Some(code) = self.code.as_mut() {
            code.content.push_str(text);
            return;
        }
        if let Some(html) = self.html.as_mut() {
            html.content.push_str(text);
            return;
        }
        if let Some(image) = self.images.last_mut() {
            image.alt.push_str(text);
            image.end = image.end.max(range.end);
            return;
        }
        let child = Token::new(TokenKind::Text, "", 0).with_content(text);
        self.inline_mut(&range).push(child, text, &range);
    }

    fn inline_child(
        &mut self,
        kind: TokenKind,
        tag: &'static str,
        content: &str,
        projection: &str,
        range: Range<usize>,
    ) {
        if self.suppressed() {
            return;
        }
        if let Some(image) = self.images.last_mut() {
            image.alt.push_str(projection);
            return;
        }
        let child = Token::new(kind, tag, 0).with_content(content);
        self.inline_mut(&range).push(child, projection, &range);
    }

    fn block_html(&mut self, html: &str, range: Range<usize>) {
        if self.suppressed() {
            return;
        }
        if let Some(accum) = self.html.as_mut() {
            accum.content.push_str(html);
            accum.range.end = accum.range.end.max(range.end);
        } else {
            // Block HTML outside an HtmlBlock wrapper; emit directly.
            let span = self.span(&range);
            self.emit(
                Token::new(TokenKind::HtmlBlock, "", 0)
                    .with_map(span)
                    .with_content(html),
            );
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>, range: Range<usize>) {
        match tag {
            Tag::Paragraph => {
                self.open_block(
                    Token::new(TokenKind::ParagraphOpen, "p", 1).with_map(self.span(&range)),
                );
                if !self.suppressed() {
                    self.inline = Some(InlineBuilder::new(&(range.start..range.start)));
                }
            }
            Tag::Heading { level, .. } => {
                let tag_name = heading_tag(level);
                self.open_block(
                    Token::new(TokenKind::HeadingOpen, tag_name, 1).with_map(self.span(&range)),
                );
                if !self.suppressed() {
                    self.inline = Some(InlineBuilder::new(&(range.start..range.start)));
                }
            }
            Tag::BlockQuote(_) => {
                self.flush_inline();
                self.open_block(
                    Token::new(TokenKind::BlockquoteOpen, "blockquote", 1)
                        .with_map(self.span(&range)),
                );
            }
            Tag::CodeBlock(kind) => {
                self.flush_inline();
                self.depth += 1;
                if self.suppressed() || self.depth > self.limit {
                    if !self.suppressed() && self.depth > self.limit {
                        self.suppressed_at = Some(self.depth);
                        self.depth_exceeded = true;
                    }
                    return;
                }
                let (fenced, info) = match kind {
                    CodeBlockKind::Fenced(info) => (true, info.to_string()),
                    CodeBlockKind::Indented => (false, String::new()),
                };
                self.code = Some(CodeAccum {
                    fenced,
                    info,
                    content: String::new(),
                    range,
                });
            }
            Tag::HtmlBlock => {
                self.flush_inline();
                self.depth += 1;
                if self.suppressed() || self.depth > self.limit {
                    if !self.suppressed() && self.depth > self.limit {
                        self.suppressed_at = Some(self.depth);
                        self.depth_exceeded = true;
                    }
                    return;
                }
                self.html = Some(HtmlAccum {
                    content: String::new(),
                    range,
                });
            }
            Tag::List(start) => {
                self.flush_inline();
                let token = match start {
                    Some(n) => {
                        let mut token = Token::new(TokenKind::OrderedListOpen, "ol", 1);
                        if n != 1 {
                            token = token.with_attr("start", n.to_string());
                        }
                        token
                    }
                    None => Token::new(TokenKind::BulletListOpen, "ul", 1),
                };
                self.open_block(token.with_map(self.span(&range)));
            }
            Tag::Item => {
                self.flush_inline();
                self.open_block(
                    Token::new(TokenKind::ListItemOpen, "li", 1).with_map(self.span(&range)),
                );
            }
            Tag::FootnoteDefinition(label) => {
                self.flush_inline();
                self.open_block(
                    Token::new(TokenKind::FootnoteDefOpen, "", 1)
                        .with_map(self.span(&range))
                        .with_info(label.as_ref()),
                );
            }
            Tag::Table(alignments) => {
                self.flush_inline();
                let spec = alignments
                    .iter()
                    .map(|a| alignment_name(*a))
                    .collect::<Vec<_>>()
                    .join(",");
                self.open_block(
                    Token::new(TokenKind::TableOpen, "table", 1)
                        .with_map(self.span(&range))
                        .with_info(spec),
                );
                self.tables.push(TableCtx {
                    in_head: false,
                    tbody_open: false,
                });
            }
            Tag::TableHead => {
                self.open_block(
                    Token::new(TokenKind::TheadOpen, "thead", 1).with_map(self.span(&range)),
                );
                self.open_block(Token::new(TokenKind::TrOpen, "tr", 1).with_map(self.span(&range)));
                if let Some(ctx) = self.tables.last_mut() {
                    ctx.in_head = true;
                }
            }
            Tag::TableRow => {
                if let Some(ctx) = self.tables.last_mut()
                    && !ctx.tbody_open
                {
                    ctx.tbody_open = true;
                    self.open_block(
                        Token::new(TokenKind::TbodyOpen, "tbody", 1).with_map(self.span(&range)),
                    );
                }
                self.open_block(Token::new(TokenKind::TrOpen, "tr", 1).with_map(self.span(&range)));
            }
            Tag::TableCell => {
                let in_head = self.tables.last().map(|ctx| ctx.in_head).unwrap_or(false);
                let (kind, tag_name) = if in_head {
                    (TokenKind::ThOpen, "th")
                } else {
                    (TokenKind::TdOpen, "td")
                };
                self.open_block(Token::new(kind, tag_name, 1).with_map(self.span(&range)));
                if !self.suppressed() {
                    self.inline = Some(InlineBuilder::new(&(range.start..range.start)));
                }
            }
            Tag::Link {
                dest_url, title, ..
            } => {
                if self.suppressed() || !self.images.is_empty() {
                    return;
                }
                let mut child = Token::new(TokenKind::LinkOpen, "a", 1)
                    .with_attr("href", dest_url.as_ref());
                if !title.is_empty() {
                    child = child.with_attr("title", title.as_ref());
                }
                self.inline_mut(&range).push(child, "", &range);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                if self.suppressed() {
                    return;
                }
                self.images.push(ImageAccum {
                    src: dest_url.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                    start: range.start,
                    end: range.end,
                });
            }
            // Inline style containers contribute nothing structural; their
            // text flows through Text events.
            Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Superscript
            | Tag::Subscript => {}
            // Never enabled: frontmatter is handled before tokenization and
            // definition lists are not in any plugin set.
            Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd, range: Range<usize>) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_inline();
                self.close_block(Token::new(TokenKind::ParagraphClose, "p", -1));
            }
            TagEnd::Heading(level) => {
                self.flush_inline();
                self.close_block(Token::new(TokenKind::HeadingClose, heading_tag(level), -1));
            }
            TagEnd::BlockQuote(_) => {
                self.flush_inline();
                self.close_block(Token::new(TokenKind::BlockquoteClose, "blockquote", -1));
            }
            TagEnd::CodeBlock => {
                if let Some(at) = self.suppressed_at
                    && self.depth == at
                {
                    self.suppressed_at = None;
                    self.depth = self.depth.saturating_sub(1);
                    return;
                }
                let code = self.code.take();
                self.depth = self.depth.saturating_sub(1);
                if self.suppressed() {
                    return;
                }
                if let Some(code) = code {
                    let span = self.span(&code.range);
                    let token = if code.fenced {
                        Token::new(TokenKind::Fence, "code", 0)
                            .with_map(span)
                            .with_info(code.info)
                            .with_content(code.content)
                    } else {
                        Token::new(TokenKind::IndentedCode, "code", 0)
                            .with_map(span)
                            .with_content(code.content)
                    };
                    self.emit(token);
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(at) = self.suppressed_at
                    && self.depth == at
                {
                    self.suppressed_at = None;
                    self.depth = self.depth.saturating_sub(1);
                    return;
                }
                let html = self.html.take();
                self.depth = self.depth.saturating_sub(1);
                if self.suppressed() {
                    return;
                }
                if let Some(html) = html {
                    let span = self.span(&html.range);
                    self.emit(
                        Token::new(TokenKind::HtmlBlock, "", 0)
                            .with_map(span)
                            .with_content(html.content),
                    );
                }
            }
            TagEnd::List(ordered) => {
                let (kind, tag_name) = if ordered {
                    (TokenKind::OrderedListClose, "ol")
                } else {
                    (TokenKind::BulletListClose, "ul")
                };
                self.close_block(Token::new(kind, tag_name, -1));
            }
            TagEnd::Item => {
                self.flush_inline();
                self.close_block(Token::new(TokenKind::ListItemClose, "li", -1));
            }
            TagEnd::FootnoteDefinition => {
                self.flush_inline();
                self.close_block(Token::new(TokenKind::FootnoteDefClose, "", -1));
            }
            TagEnd::Table => {
                let tbody_open = self.tables.last().map(|t| t.tbody_open).unwrap_or(false);
                if tbody_open {
                    self.close_block(Token::new(TokenKind::TbodyClose, "tbody", -1));
                }
                self.tables.pop();
                self.close_block(Token::new(TokenKind::TableClose, "table", -1));
            }
            TagEnd::TableHead => {
                self.close_block(Token::new(TokenKind::TrClose, "tr", -1));
                self.close_block(Token::new(TokenKind::TheadClose, "thead", -1));
                if let Some(ctx) = self.tables.last_mut() {
                    ctx.in_head = false;
                }
            }
            TagEnd::TableRow => {
                self.close_block(Token::new(TokenKind::TrClose, "tr", -1));
            }
            TagEnd::TableCell => {
                self.flush_inline();
                let in_head = self.tables.last().map(|ctx| ctx.in_head).unwrap_or(false);
                let (kind, tag_name) = if in_head {
                    (TokenKind::ThClose, "th")
                } else {
                    (TokenKind::TdClose, "td")
                };
                self.close_block(Token::new(kind, tag_name, -1));
            }
            TagEnd::Link => {
                if self.suppressed() || !self.images.is_empty() {
                    return;
                }
                if let Some(inline) = self.inline.as_mut() {
                    inline.push(Token::new(TokenKind::LinkClose, "a", -1), "", &range);
                }
            }
            TagEnd::Image => {
                if self.suppressed() {
                    return;
                }
                if let Some(image) = self.images.pop() {
                    if let Some(outer) = self.images.last_mut() {
                        // Nested image: its alt text flattens into the outer alt.
                        outer.alt.push_str(&image.alt);
                        return;
                    }
                    let range = image.start..image.end;
                    let mut child = Token::new(TokenKind::Image, "img", 0)
                        .with_content(image.alt.clone())
                        .with_attr("src", image.src);
                    if !image.title.is_empty() {
                        child = child.with_attr("title", image.title);
                    }
                    let alt = image.alt;
                    self.inline_mut(&range).push(child, &alt, &range);
                }
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
            TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn alignment_name(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::None => "none",
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
    }
}

/// A paragraph whose only child is display math becomes a math block, the
/// shape the math extractor expects for `$$...$$`.
fn promote_display_math(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].kind == TokenKind::ParagraphOpen
            && i + 2 < tokens.len()
            && tokens[i + 1].kind == TokenKind::Inline
            && tokens[i + 2].kind == TokenKind::ParagraphClose
        {
            let inline = &tokens[i + 1];
            let math: Vec<&Token> = inline
                .children
                .iter()
                .filter(|c| c.kind == TokenKind::MathDisplay)
                .collect();
            let rest_ignorable = inline.children.iter().all(|c| {
                matches!(c.kind, TokenKind::MathDisplay | TokenKind::Softbreak)
                    || (c.kind == TokenKind::Text && c.content.trim().is_empty())
            });
            if math.len() == 1 && rest_ignorable {
                let mut token = Token::new(TokenKind::MathBlock, "math", 0)
                    .with_info("display")
                    .with_content(math[0].content.clone());
                token.map = tokens[i].map;
                token.level = tokens[i].level;
                out.push(token);
                i += 3;
                continue;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}
