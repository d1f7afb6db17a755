//! Raw HTML extractor (blocks and inline).

use crate::snapshot::{HtmlBlockRec, HtmlInlineRec};
use crate::token::{Token, TokenKind};

pub fn extract_html_blocks(tokens: &[Token]) -> Vec<HtmlBlockRec> {
    tokens
        .iter()
        .filter(|t| t.kind == TokenKind::HtmlBlock)
        .map(|t| {
            let span = t.span();
            HtmlBlockRec {
                content: t.content.clone(),
                start_line: span.start,
                end_line: span.end,
                inline: false,
            }
        })
        .collect()
}

pub fn extract_html_inline(tokens: &[Token]) -> Vec<HtmlInlineRec> {
    let mut records = Vec::new();
    for token in tokens {
        if token.kind != TokenKind::Inline {
            continue;
        }
        let line = token.span().start;
        for child in &token.children {
            if child.kind == TokenKind::HtmlInline {
                records.push(HtmlInlineRec {
                    content: child.content.clone(),
                    line,
                    inline: true,
                });
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParseOptions, SecurityProfile};
    use crate::token::{TokenizerConfig, tokenize};

    fn html_of(text: &str) -> (Vec<HtmlBlockRec>, Vec<HtmlInlineRec>) {
        let (config, _) =
            TokenizerConfig::resolve(SecurityProfile::Moderate, &ParseOptions::default());
        let stream = tokenize(text, &config);
        (
            extract_html_blocks(&stream.tokens),
            extract_html_inline(&stream.tokens),
        )
    }

    #[test]
    fn test_html_block() {
        let (blocks, inline) = html_of("<div class=\"x\">\ncontent\n</div>\n");
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].content.contains("<div"));
        assert!(!blocks[0].inline);
        assert!(inline.is_empty());
    }

    #[test]
    fn test_inline_html() {
        let (blocks, inline) = html_of("text with <b>bold</b> inline\n");
        assert!(blocks.is_empty());
        assert_eq!(inline.len(), 2);
        assert_eq!(inline[0].content, "<b>");
        assert!(inline[0].inline);
        assert_eq!(inline[0].line, 0);
    }
}
