//! Code block extractor.

use crate::snapshot::{CodeBlock, CodeKind};
use crate::token::{Token, TokenKind};

pub fn extract_code_blocks(tokens: &[Token]) -> Vec<CodeBlock> {
    tokens
        .iter()
        .filter_map(|token| match token.kind {
            TokenKind::Fence => {
                let span = token.span();
                Some(CodeBlock {
                    kind: CodeKind::Fenced,
                    language: language_of(&token.info),
                    content: token.content.clone(),
                    start_line: span.start,
                    end_line: span.end,
                })
            }
            TokenKind::IndentedCode => {
                let span = token.span();
                Some(CodeBlock {
                    kind: CodeKind::Indented,
                    language: String::new(),
                    content: token.content.clone(),
                    start_line: span.start,
                    end_line: span.end,
                })
            }
            _ => None,
        })
        .collect()
}

/// First whitespace-delimited token of the info string, lowercased.
pub(crate) fn language_of(info: &str) -> String {
    info.split_whitespace()
        .next()
        .map(|lang| lang.to_lowercase())
        .unwrap_or_default()
}
