//! List and task-list extractor.

use crate::snapshot::{List, ListItem, ListType};
use crate::token::{Token, TokenKind};

use super::compact_whitespace;

/// Collect top-level lists; nested lists become `children` of their items.
pub fn extract_lists(tokens: &[Token]) -> Vec<List> {
    let mut lists = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::BulletListOpen | TokenKind::OrderedListOpen => {
                let (list, next) = parse_list(tokens, i);
                lists.push(list);
                i = next;
            }
            _ => i += 1,
        }
    }
    lists
}

fn parse_list(tokens: &[Token], open_idx: usize) -> (List, usize) {
    let open = &tokens[open_idx];
    let ordered = open.kind == TokenKind::OrderedListOpen;
    let close_kind = if ordered {
        TokenKind::OrderedListClose
    } else {
        TokenKind::BulletListClose
    };
    let span = open.span();

    let mut items = Vec::new();
    let mut i = open_idx + 1;
    while i < tokens.len() && tokens[i].kind != close_kind {
        if tokens[i].kind == TokenKind::ListItemOpen {
            let (item, next) = parse_item(tokens, i);
            items.push(item);
            i = next;
        } else {
            i += 1;
        }
    }
    let task_items_count = items.iter().filter(|item| item.checked.is_some()).count() as u32;
    let all_tasks = !items.is_empty() && task_items_count as usize == items.len();
    let kind = if all_tasks {
        ListType::Task
    } else if ordered {
        ListType::Ordered
    } else {
        ListType::Bullet
    };

    (
        List {
            kind,
            items,
            start_line: span.start,
            end_line: span.end,
            task_items_count,
        },
        i + 1,
    )
}

fn parse_item(tokens: &[Token], open_idx: usize) -> (ListItem, usize) {
    let span = tokens[open_idx].span();
    let mut text = None;
    let mut checked = None;
    let mut children = Vec::new();

    let mut i = open_idx + 1;
    while i < tokens.len() && tokens[i].kind != TokenKind::ListItemClose {
        match tokens[i].kind {
            TokenKind::Inline if text.is_none() => {
                let inline = &tokens[i];
                checked = checkbox_state(inline);
                let mut item_text = compact_whitespace(&inline.content);
                if checked.is_none() {
                    // Tokenizer had no task plugin: probe the leading text.
                    if let Some((state, stripped)) = textual_checkbox(&item_text) {
                        checked = Some(state);
                        item_text = stripped;
                    }
                }
                text = Some(item_text);
                i += 1;
            }
            TokenKind::BulletListOpen | TokenKind::OrderedListOpen => {
                let (child, next) = parse_list(tokens, i);
                children.push(child);
                i = next;
            }
            _ => i += 1,
        }
    }

    (
        ListItem {
            text: text.unwrap_or_default(),
            checked,
            children,
            line: span.start,
        },
        i + 1,
    )
}

/// Checkbox state from the task-list plugin's marker child.
fn checkbox_state(inline: &Token) -> Option<bool> {
    inline
        .children
        .iter()
        .find(|c| c.kind == TokenKind::TaskMarker)
        .map(|marker| marker.info == "checked")
}

/// Narrow textual probe for `[ ]` / `[x]` / `[X]` at the start of the
/// (already compacted) item text.
fn textual_checkbox(text: &str) -> Option<(bool, String)> {
    for (prefix, state) in [("[ ] ", false), ("[x] ", true), ("[X] ", true)] {
        if let Some(rest) = text.strip_prefix(prefix) {
            return Some((state, rest.to_string()));
        }
    }
    match text {
        "[ ]" => Some((false, String::new())),
        "[x]" | "[X]" => Some((true, String::new())),
        _ => None,
    }
}
