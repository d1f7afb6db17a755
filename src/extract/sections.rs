//! Section builder: O(H) via a level stack.

use crate::snapshot::Section;
use crate::text::LineIndex;
use crate::token::{Token, TokenKind};

use super::compact_whitespace;

struct OpenSection {
    level: u8,
    /// Index into the output list, patched with the end when closed.
    slot: usize,
}

/// Scan heading tokens in order, maintaining a stack of open sections.
///
/// A heading of level L closes every open section with level >= L at the
/// heading's first line; EOF closes the rest at the last content line. The
/// result is a flat list in document order; ranges of same-level peers do
/// not overlap and deeper sections nest strictly (I2).
pub fn extract_sections(
    tokens: &[Token],
    index: &LineIndex,
    line_count: usize,
) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut stack: Vec<OpenSection> = Vec::new();

    let close = |stack: &mut Vec<OpenSection>,
                 sections: &mut Vec<Section>,
                 min_level: u8,
                 end_line: usize| {
        while let Some(open) = stack.last() {
            if open.level < min_level {
                break;
            }
            let open = stack.pop().expect("peeked entry exists");
            let section = &mut sections[open.slot];
            section.end_line = end_line;
            section.end_char = index.line_start(end_line);
        }
    };

    for (idx, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::HeadingOpen {
            continue;
        }
        let Some(level) = token.heading_level() else {
            continue;
        };
        let start_line = token.span().start;

        close(&mut stack, &mut sections, level, start_line);

        // Title comes only from the heading's own inline token; nothing
        // after the heading may bleed in.
        let title = tokens
            .get(idx + 1)
            .filter(|t| t.kind == TokenKind::Inline)
            .map(|t| compact_whitespace(&t.content))
            .unwrap_or_default();

        let slot = sections.len();
        sections.push(Section {
            level,
            title,
            start_line,
            end_line: start_line,
            start_char: index.line_start(start_line),
            end_char: index.line_start(start_line),
            token_idx: idx,
        });
        stack.push(OpenSection { level, slot });
    }

    close(&mut stack, &mut sections, 0, line_count);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParseOptions, SecurityProfile};
    use crate::token::{TokenizerConfig, tokenize};

    fn sections_of(text: &str) -> Vec<Section> {
        let (config, _) =
            TokenizerConfig::resolve(SecurityProfile::Moderate, &ParseOptions::default());
        let stream = tokenize(text, &config);
        let index = LineIndex::new(text);
        extract_sections(&stream.tokens, &index, index.line_count())
    }

    #[test]
    fn test_single_section_spans_document() {
        let text = "# Title\n\nbody\nmore\n";
        let sections = sections_of(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].level, 1);
        assert_eq!(sections[0].title, "Title");
        assert_eq!(sections[0].start_line, 0);
        assert_eq!(sections[0].end_line, 4);
    }

    #[test]
    fn test_higher_level_heading_closes_lower_sections() {
        let text = "# A\n\n## B\n\ntext\n\n# C\n\nend\n";
        let sections = sections_of(text);
        assert_eq!(sections.len(), 3);
        let (a, b, c) = (&sections[0], &sections[1], &sections[2]);
        assert_eq!((a.level, a.end_line), (1, 6));
        assert_eq!((b.level, b.end_line), (2, 6));
        assert_eq!((c.level, c.start_line), (1, 6));
    }

    #[test]
    fn test_same_level_peers_do_not_overlap() {
        let text = "## A\n\n## B\n\n## C\n";
        let sections = sections_of(text);
        assert_eq!(sections.len(), 3);
        for pair in sections.windows(2) {
            assert!(pair[0].end_line <= pair[1].start_line);
        }
    }

    #[test]
    fn test_title_whitespace_compacted() {
        let sections = sections_of("#   Spaced \t  Out  Title\n");
        assert_eq!(sections[0].title, "Spaced Out Title");
    }

    #[test]
    fn test_title_from_inline_children_only() {
        // Emphasis and code in the heading contribute their text.
        let sections = sections_of("# A *styled* `code` title\n\nparagraph after\n");
        assert_eq!(sections[0].title, "A styled code title");
    }

    #[test]
    fn test_setext_levels() {
        let sections = sections_of("Top\n===\n\nNext\n----\n");
        assert_eq!(sections[0].level, 1);
        assert_eq!(sections[1].level, 2);
    }

    #[test]
    fn test_heading_in_fence_ignored() {
        let sections = sections_of("```\n# nope\n```\n\n# real\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "real");
    }

    #[test]
    fn test_fullwidth_hash_is_not_a_heading() {
        let sections = sections_of("\u{ff03} not a heading\n");
        assert!(sections.is_empty());
    }

    #[test]
    fn test_nbsp_after_hash_is_not_a_heading() {
        let sections = sections_of("#\u{00a0}not a heading\n");
        assert!(sections.is_empty());
    }

    #[test]
    fn test_char_offsets_cover_section_text() {
        let text = "# A\nbody\n# B\ntail\n";
        let sections = sections_of(text);
        assert_eq!(&text[sections[0].start_char..sections[0].end_char], "# A\nbody\n");
        assert_eq!(&text[sections[1].start_char..sections[1].end_char], "# B\ntail\n");
    }
}
