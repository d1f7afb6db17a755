//! Blockquote extractor.

use crate::snapshot::Blockquote;
use crate::token::{Token, TokenKind};

/// Collect outermost blockquotes; nested quote text folds into the outer
/// record.
pub fn extract_blockquotes(tokens: &[Token]) -> Vec<Blockquote> {
    let mut quotes = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].kind == TokenKind::BlockquoteOpen {
            let span = tokens[i].span();
            let mut parts: Vec<String> = Vec::new();
            let mut depth = 1;
            i += 1;
            while i < tokens.len() && depth > 0 {
                match tokens[i].kind {
                    TokenKind::BlockquoteOpen => depth += 1,
                    TokenKind::BlockquoteClose => depth -= 1,
                    TokenKind::Inline => parts.push(tokens[i].content.clone()),
                    _ => {}
                }
                i += 1;
            }
            quotes.push(Blockquote {
                text: parts.join("\n"),
                start_line: span.start,
                end_line: span.end,
            });
        } else {
            i += 1;
        }
    }
    quotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParseOptions, SecurityProfile};
    use crate::token::{TokenizerConfig, tokenize};

    fn quotes_of(text: &str) -> Vec<Blockquote> {
        let (config, _) =
            TokenizerConfig::resolve(SecurityProfile::Moderate, &ParseOptions::default());
        extract_blockquotes(&tokenize(text, &config).tokens)
    }

    #[test]
    fn test_simple_blockquote() {
        let quotes = quotes_of("> quoted wisdom\n");
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].text, "quoted wisdom");
        assert_eq!(quotes[0].start_line, 0);
    }

    #[test]
    fn test_multi_paragraph_quote() {
        let quotes = quotes_of("> first\n>\n> second\n");
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].text, "first\nsecond");
    }

    #[test]
    fn test_nested_quotes_fold_into_outer() {
        let quotes = quotes_of("> outer\n> > inner\n");
        assert_eq!(quotes.len(), 1);
        assert!(quotes[0].text.contains("outer"));
        assert!(quotes[0].text.contains("inner"));
    }

    #[test]
    fn test_sibling_quotes_stay_separate() {
        let quotes = quotes_of("> one\n\nbetween\n\n> two\n");
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].text, "one");
        assert_eq!(quotes[1].text, "two");
    }
}
