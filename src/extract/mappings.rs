//! Line-to-type classification for prose/code splitting.

use std::collections::BTreeMap;

use crate::snapshot::{CodeBlock, CodeKind, CodeRange, LineType, Mappings};

/// Classify every line of the body. Fenced blocks mark their first and
/// last fence lines as `fence_marker` (when the closing fence exists) and
/// the interior as `code`; indented blocks are `indented_code`; blank
/// lines are `blank`; everything else is `prose`.
pub fn build_mappings(lines: &[String], code_blocks: &[CodeBlock]) -> Mappings {
    let mut line_to_type: BTreeMap<usize, LineType> = BTreeMap::new();

    for (lineno, line) in lines.iter().enumerate() {
        let kind = if line.trim().is_empty() {
            LineType::Blank
        } else {
            LineType::Prose
        };
        line_to_type.insert(lineno, kind);
    }

    for block in code_blocks {
        let (start, end) = (block.start_line, block.end_line.min(lines.len()));
        if start >= end {
            continue;
        }
        match block.kind {
            CodeKind::Indented => {
                for lineno in start..end {
                    line_to_type.insert(lineno, LineType::IndentedCode);
                }
            }
            CodeKind::Fenced => {
                line_to_type.insert(start, LineType::FenceMarker);
                let closing = end - 1;
                let closed = closing > start
                    && lines
                        .get(closing)
                        .map(|l| {
                            let t = l.trim_start();
                            t.starts_with("```") || t.starts_with("~~~")
                        })
                        .unwrap_or(false);
                let body_end = if closed { closing } else { end };
                if closed {
                    line_to_type.insert(closing, LineType::FenceMarker);
                }
                for lineno in (start + 1)..body_end {
                    line_to_type.insert(lineno, LineType::Code);
                }
            }
        }
    }

    let prose_lines = lines_of_type(&line_to_type, LineType::Prose);
    let mut code_lines = lines_of_type(&line_to_type, LineType::Code);
    code_lines.extend(lines_of_type(&line_to_type, LineType::IndentedCode));
    code_lines.sort_unstable();

    let code_ranges = code_blocks
        .iter()
        .map(|block| CodeRange {
            start_line: block.start_line,
            end_line: block.end_line,
            language: block.language.clone(),
        })
        .collect();

    Mappings {
        line_to_type,
        prose_lines,
        code_lines,
        code_blocks: code_ranges,
    }
}

fn lines_of_type(map: &BTreeMap<usize, LineType>, wanted: LineType) -> Vec<usize> {
    map.iter()
        .filter(|(_, kind)| **kind == wanted)
        .map(|(line, _)| *line)
        .collect()
}
