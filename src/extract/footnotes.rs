//! Footnote extractor.

use std::collections::BTreeSet;

use crate::snapshot::{FootnoteDef, FootnoteRef, Footnotes};
use crate::token::{Token, TokenKind};

pub struct FootnoteExtraction {
    pub group: Footnotes,
    /// Number of definitions discarded because their label was already
    /// taken (first definition wins).
    pub duplicate_labels: u32,
}

pub fn extract_footnotes(tokens: &[Token]) -> FootnoteExtraction {
    let mut group = Footnotes::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut duplicate_labels = 0u32;

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::FootnoteDefOpen => {
                let label = tokens[i].info.clone();
                let span = tokens[i].span();
                let mut parts: Vec<String> = Vec::new();
                let mut depth = 1;
                i += 1;
                while i < tokens.len() && depth > 0 {
                    match tokens[i].kind {
                        TokenKind::FootnoteDefOpen => depth += 1,
                        TokenKind::FootnoteDefClose => depth -= 1,
                        TokenKind::Inline => parts.push(tokens[i].content.clone()),
                        _ => {}
                    }
                    i += 1;
                }
                let content = parts.join("\n");
                if seen.insert(label.clone()) {
                    group.definitions.push(FootnoteDef {
                        byte_length: content.len() as u64,
                        label,
                        content,
                        start_line: span.start,
                        end_line: span.end,
                    });
                } else {
                    log::debug!("duplicate footnote label {label:?}; keeping first definition");
                    duplicate_labels += 1;
                }
            }
            TokenKind::Inline => {
                let line = tokens[i].span().start;
                for child in &tokens[i].children {
                    if child.kind == TokenKind::FootnoteRef {
                        group.references.push(FootnoteRef {
                            label: child.content.clone(),
                            line,
                        });
                    }
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    FootnoteExtraction {
        group,
        duplicate_labels,
    }
}
