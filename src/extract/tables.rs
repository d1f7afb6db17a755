//! Table extractor with mandatory ragged detection.

use crate::snapshot::{AlignSpec, MetaFlag, Table};
use crate::token::{Token, TokenKind};

use super::compact_whitespace;

pub fn extract_tables(tokens: &[Token]) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].kind == TokenKind::TableOpen {
            let (table, next) = parse_table(tokens, i);
            tables.push(table);
            i = next;
        } else {
            i += 1;
        }
    }
    tables
}

fn parse_table(tokens: &[Token], open_idx: usize) -> (Table, usize) {
    let open = &tokens[open_idx];
    let span = open.span();
    let declared_align = parse_align_spec(&open.info);

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Option<Vec<String>> = None;
    let mut in_head = false;
    let mut cell_text: Option<String> = None;

    let mut i = open_idx + 1;
    while i < tokens.len() && tokens[i].kind != TokenKind::TableClose {
        match tokens[i].kind {
            TokenKind::TheadOpen => in_head = true,
            TokenKind::TheadClose => in_head = false,
            TokenKind::TrOpen if !in_head => current_row = Some(Vec::new()),
            TokenKind::TrClose if !in_head => {
                if let Some(row) = current_row.take() {
                    rows.push(row);
                }
            }
            TokenKind::ThOpen | TokenKind::TdOpen => cell_text = Some(String::new()),
            TokenKind::Inline => {
                if cell_text.is_some() {
                    cell_text = Some(compact_whitespace(&tokens[i].content));
                }
            }
            TokenKind::ThClose | TokenKind::TdClose => {
                let text = cell_text.take().unwrap_or_default();
                if in_head {
                    headers.push(text);
                } else if let Some(row) = current_row.as_mut() {
                    row.push(text);
                }
            }
            _ => {}
        }
        i += 1;
    }

    let column_count = if headers.is_empty() {
        rows.first().map(|r| r.len()).unwrap_or(0)
    } else {
        headers.len()
    };

    let (align, align_meta) = match declared_align {
        Some(align) => (align, None),
        None => (
            infer_align(column_count, &rows),
            Some(MetaFlag { heuristic: true }),
        ),
    };

    let separator_declared = align.len();
    let mut is_ragged = rows.iter().any(|row| row.len() != column_count);
    if align_meta.is_none() && !headers.is_empty() && headers.len() != separator_declared {
        is_ragged = true;
    }
    // Raggedness is asserted when the token stream declared the column
    // layout; inferred when we had to reconstruct it.
    let is_ragged_meta = align_meta
        .as_ref()
        .map(|_| MetaFlag { heuristic: true });

    (
        Table {
            headers,
            row_count: rows.len() as u32,
            column_count: column_count as u32,
            rows,
            align,
            align_meta,
            is_ragged,
            is_ragged_meta,
            start_line: span.start,
            end_line: span.end,
        },
        i + 1,
    )
}

fn parse_align_spec(info: &str) -> Option<Vec<AlignSpec>> {
    if info.is_empty() {
        return None;
    }
    Some(
        info.split(',')
            .map(|name| match name {
                "left" => AlignSpec::Left,
                "center" => AlignSpec::Center,
                "right" => AlignSpec::Right,
                _ => AlignSpec::None,
            })
            .collect(),
    )
}

/// Content heuristic for streams that never declared alignment: columns
/// whose body cells are all numeric lean right, everything else left.
fn infer_align(column_count: usize, rows: &[Vec<String>]) -> Vec<AlignSpec> {
    (0..column_count)
        .map(|col| {
            let mut saw_value = false;
            let numeric = rows.iter().all(|row| match row.get(col) {
                Some(cell) if !cell.is_empty() => {
                    saw_value = true;
                    cell.parse::<f64>().is_ok()
                }
                _ => true,
            });
            if numeric && saw_value {
                AlignSpec::Right
            } else {
                AlignSpec::Left
            }
        })
        .collect()
}
