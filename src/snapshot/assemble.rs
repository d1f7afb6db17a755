//! Snapshot assembly: metadata, content, structure, mappings, in order.

use crate::frontmatter::FrontmatterError;
use crate::security::PolicyOutcome;

use super::model::{Content, EncodingInfo, Mappings, Metadata, Snapshot};

/// Everything the assembler folds into the final record.
pub struct AssembleParts {
    pub encoding: Option<EncodingInfo>,
    pub source_path: Option<String>,
    pub frontmatter: Option<serde_json::Value>,
    pub frontmatter_error: Option<FrontmatterError>,
    pub unknown_plugins: Vec<String>,
    pub content: Content,
    pub mappings: Mappings,
    pub policy: PolicyOutcome,
}

/// Build the snapshot. Debug builds verify the ordering invariants so a
/// misbehaving extractor fails loudly in tests instead of shipping an
/// unsorted container.
pub fn assemble(parts: AssembleParts) -> Snapshot {
    let AssembleParts {
        encoding,
        source_path,
        frontmatter,
        frontmatter_error,
        unknown_plugins,
        content,
        mappings,
        policy,
    } = parts;

    let snapshot = Snapshot {
        metadata: Metadata {
            encoding,
            source_path,
            has_frontmatter: frontmatter.is_some(),
            frontmatter,
            frontmatter_error,
            unknown_plugins,
            security: policy.security,
            embedding_blocked: policy.embedding_blocked,
            embedding_block_reason: policy.embedding_block_reason,
            quarantined: policy.quarantined,
            quarantine_reasons: policy.quarantine_reasons,
            security_policies_applied: policy.policies_applied,
        },
        content,
        structure: policy.structure,
        mappings,
    };

    debug_assert_invariants(&snapshot);
    snapshot
}

#[cfg(debug_assertions)]
fn debug_assert_invariants(snapshot: &Snapshot) {
    let line_count = snapshot.content.lines.len();
    let structure = &snapshot.structure;

    fn sorted<T, F: Fn(&T) -> usize>(items: &[T], key: F) -> bool {
        items.windows(2).all(|w| key(&w[0]) <= key(&w[1]))
    }

    debug_assert!(sorted(&structure.sections, |s| s.start_line));
    debug_assert!(sorted(&structure.paragraphs, |p| p.start_line));
    debug_assert!(sorted(&structure.lists, |l| l.start_line));
    debug_assert!(sorted(&structure.tables, |t| t.start_line));
    debug_assert!(sorted(&structure.code_blocks, |c| c.start_line));
    debug_assert!(sorted(&structure.links, |l| l.line));
    debug_assert!(sorted(&structure.images, |i| i.line));

    for section in &structure.sections {
        debug_assert!(section.start_line <= section.end_line);
        debug_assert!(section.end_line <= line_count);
        debug_assert!(section.start_char <= section.end_char);
        debug_assert!(section.end_char <= snapshot.content.raw.len());
    }
    for block in &structure.code_blocks {
        debug_assert!(block.start_line <= block.end_line);
        debug_assert!(block.end_line <= line_count);
    }

    if snapshot.metadata.embedding_blocked {
        debug_assert!(snapshot.metadata.embedding_block_reason.is_some());
        let blocked_tags = snapshot
            .metadata
            .security_policies_applied
            .iter()
            .filter(|p| p.starts_with("embedding_blocked_"))
            .count();
        debug_assert_eq!(blocked_tags, 1);
    }
    if snapshot.metadata.quarantined {
        debug_assert!(!snapshot.metadata.quarantine_reasons.is_empty());
    }
}

#[cfg(not(debug_assertions))]
fn debug_assert_invariants(_snapshot: &Snapshot) {}
