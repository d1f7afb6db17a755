//! Structure extractors.
//!
//! Each extractor is a pure function over the canonical token slice: an
//! index-based scan that returns a new list, ordered by source position.
//! Nothing here mutates tokens or talks to the tokenizer.

pub mod blockquotes;
pub mod code;
pub mod footnotes;
pub mod html;
pub mod links;
pub mod lists;
pub mod mappings;
pub mod math;
pub mod paragraphs;
pub mod sections;
pub mod tables;

use crate::config::SecurityProfile;
use crate::snapshot::Structure;
use crate::text::LineIndex;
use crate::token::Token;

/// Ambient facts the extractors need beyond the tokens themselves.
pub struct ExtractContext<'a> {
    pub index: &'a LineIndex,
    pub line_count: usize,
    pub profile: SecurityProfile,
}

/// Extraction output: the structure plus facts that feed statistics.
pub struct Extraction {
    pub structure: Structure,
    pub dup_footnote_labels: u32,
}

/// Run every extractor over the canonical stream.
pub fn extract(tokens: &[Token], ctx: &ExtractContext<'_>) -> Extraction {
    let (links, images) = links::extract_links_and_images(tokens, ctx.profile);
    let footnotes = footnotes::extract_footnotes(tokens);

    let structure = Structure {
        sections: sections::extract_sections(tokens, ctx.index, ctx.line_count),
        paragraphs: paragraphs::extract_paragraphs(tokens),
        lists: lists::extract_lists(tokens),
        tables: tables::extract_tables(tokens),
        code_blocks: code::extract_code_blocks(tokens),
        links,
        images,
        math: math::extract_math(tokens),
        footnotes: footnotes.group,
        blockquotes: blockquotes::extract_blockquotes(tokens),
        html_blocks: html::extract_html_blocks(tokens),
        html_inline: html::extract_html_inline(tokens),
    };

    Extraction {
        structure,
        dup_footnote_labels: footnotes.duplicate_labels,
    }
}

/// Whitespace compaction shared by headings, list items, and table cells:
/// split on Unicode whitespace, join with single spaces.
pub(crate) fn compact_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
