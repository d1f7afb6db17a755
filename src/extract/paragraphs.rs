//! Paragraph extractor.

use crate::snapshot::Paragraph;
use crate::token::{Token, TokenKind};

/// Collect paragraphs outside list items. List item text is owned by the
/// list extractor (tight items have no paragraph tokens at all, so
/// including loose-item paragraphs here would make coverage depend on list
/// spacing).
pub fn extract_paragraphs(tokens: &[Token]) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut item_depth = 0u32;

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        match token.kind {
            TokenKind::ListItemOpen => item_depth += 1,
            TokenKind::ListItemClose => item_depth = item_depth.saturating_sub(1),
            TokenKind::ParagraphOpen if item_depth == 0 => {
                let span = token.span();
                if let Some(inline) = tokens.get(i + 1).filter(|t| t.kind == TokenKind::Inline) {
                    paragraphs.push(Paragraph {
                        text: inline.content.clone(),
                        start_line: span.start,
                        end_line: span.end,
                        has_code: inline
                            .children
                            .iter()
                            .any(|c| c.kind == TokenKind::CodeInline),
                    });
                }
            }
            _ => {}
        }
        i += 1;
    }
    paragraphs
}
