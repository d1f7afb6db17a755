//! Math extractor: display blocks, fenced math, inline math.

use crate::snapshot::{MathBlockRec, MathGroup, MathInlineRec, MathKind};
use crate::token::{Token, TokenKind};

/// Collect math with stable ids (`math_block_<n>` / `math_inline_<n>`) in
/// emission order. Fenced ` ```math ` blocks surface here *and* remain in
/// `code_blocks`.
pub fn extract_math(tokens: &[Token]) -> MathGroup {
    let mut group = MathGroup::default();

    for token in tokens {
        match token.kind {
            TokenKind::MathBlock => {
                let span = token.span();
                group.blocks.push(MathBlockRec {
                    id: format!("math_block_{}", group.blocks.len()),
                    kind: MathKind::Display,
                    content: token.content.trim().to_string(),
                    start_line: span.start,
                    end_line: span.end,
                });
            }
            TokenKind::Fence if token.info.trim() == "math" => {
                let span = token.span();
                group.blocks.push(MathBlockRec {
                    id: format!("math_block_{}", group.blocks.len()),
                    kind: MathKind::Fenced,
                    content: token.content.trim().to_string(),
                    start_line: span.start,
                    end_line: span.end,
                });
            }
            TokenKind::Inline => {
                let line = token.span().start;
                for child in &token.children {
                    match child.kind {
                        TokenKind::MathInline => group.inline.push(MathInlineRec {
                            id: format!("math_inline_{}", group.inline.len()),
                            content: child.content.clone(),
                            line,
                        }),
                        // Display math mixed into a paragraph still counts
                        // as a block.
                        TokenKind::MathDisplay => {
                            let span = token.span();
                            group.blocks.push(MathBlockRec {
                                id: format!("math_block_{}", group.blocks.len()),
                                kind: MathKind::Display,
                                content: child.content.trim().to_string(),
                                start_line: span.start,
                                end_line: span.end,
                            });
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParseOptions, SecurityProfile};
    use crate::token::{TokenizerConfig, tokenize};

    fn math_of(text: &str) -> MathGroup {
        let (config, _) =
            TokenizerConfig::resolve(SecurityProfile::Moderate, &ParseOptions::default());
        extract_math(&tokenize(text, &config).tokens)
    }

    #[test]
    fn test_display_math_block() {
        let math = math_of("$$\n\\int_0^1 x^2 dx\n$$\n");
        assert_eq!(math.blocks.len(), 1);
        assert_eq!(math.blocks[0].id, "math_block_0");
        assert_eq!(math.blocks[0].kind, MathKind::Display);
        assert!(math.blocks[0].content.contains("\\int_0^1"));
    }

    #[test]
    fn test_fenced_math_block() {
        let math = math_of("```math\na^2 + b^2 = c^2\n```\n");
        assert_eq!(math.blocks.len(), 1);
        assert_eq!(math.blocks[0].kind, MathKind::Fenced);
        assert_eq!(math.blocks[0].content, "a^2 + b^2 = c^2");
    }

    #[test]
    fn test_inline_math_with_line_attribution() {
        let math = math_of("text\n\nEnergy is $E = mc^2$ here\n");
        assert_eq!(math.inline.len(), 1);
        assert_eq!(math.inline[0].id, "math_inline_0");
        assert_eq!(math.inline[0].content, "E = mc^2");
        assert_eq!(math.inline[0].line, 2);
    }

    #[test]
    fn test_ids_count_separately() {
        let math = math_of("$$\na\n$$\n\n$x$ and $y$\n\n```math\nb\n```\n");
        assert_eq!(math.blocks[0].id, "math_block_0");
        assert_eq!(math.blocks[1].id, "math_block_1");
        assert_eq!(math.inline[0].id, "math_inline_0");
        assert_eq!(math.inline[1].id, "math_inline_1");
    }

    #[test]
    fn test_no_math_without_plugin() {
        let options = ParseOptions {
            plugins: Some(vec!["table".to_string()]),
            ..Default::default()
        };
        let (config, _) = TokenizerConfig::resolve(SecurityProfile::Moderate, &options);
        let math = extract_math(&tokenize("$E = mc^2$\n", &config).tokens);
        assert!(math.blocks.is_empty());
        assert!(math.inline.is_empty());
    }
}
