//! The parse pipeline: profile binding, normalization, frontmatter,
//! tokenization, extraction, policy, assembly.

use std::path::Path;

use crate::config::{ParseOptions, SecurityProfile};
use crate::encoding::read_file_robust;
use crate::error::{ParseError, ParseResult};
use crate::extract::{ExtractContext, extract, mappings::build_mappings};
use crate::frontmatter;
use crate::security::{PolicyInput, apply_policy};
use crate::snapshot::{
    Content, EncodingInfo, Snapshot, assemble, assemble::AssembleParts,
};
use crate::text::{LineIndex, lines::lines_with_terminators, normalize};
use crate::token::{TokenizerConfig, tokenize};

/// Parse one Markdown document into a snapshot.
///
/// Single-threaded, synchronous, no shared state: safe to call from many
/// threads with distinct inputs. Fatal outcomes are pre-parse size budget
/// breaches and, under the strict profile, script tags and disallowed
/// schemes; everything else is recorded on the returned snapshot.
pub fn parse(
    raw_text: &str,
    profile: SecurityProfile,
    options: &ParseOptions,
) -> ParseResult<Snapshot> {
    parse_inner(raw_text, profile, options, None, None)
}

/// Parse a file, detecting its encoding at the byte-to-text boundary.
/// The detection verdict lands in `metadata.encoding` and the path in
/// `metadata.source_path`.
pub fn parse_file(
    path: impl AsRef<Path>,
    profile: SecurityProfile,
    options: &ParseOptions,
) -> ParseResult<Snapshot> {
    let path = path.as_ref();
    let decoded = read_file_robust(path)?;
    parse_inner(
        &decoded.text,
        profile,
        options,
        Some(EncodingInfo {
            detected: decoded.encoding,
            confidence: decoded.confidence,
        }),
        Some(path.display().to_string()),
    )
}

/// Cheap pre-flight: the fatal checks only, without building a snapshot.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Report the conditions under which [`parse`] would fail outright for
/// this input: size budgets, and under strict, script tags.
pub fn validate_content(raw_text: &str, profile: SecurityProfile) -> ValidationReport {
    let budgets = profile.budgets();
    let mut issues = Vec::new();

    let byte_len = raw_text.len() as u64;
    if byte_len > budgets.max_content_bytes {
        issues.push(format!(
            "content is {byte_len} bytes, over the {} byte budget",
            budgets.max_content_bytes
        ));
    }
    let line_count = count_lines(raw_text) as u64;
    if line_count > budgets.max_lines {
        issues.push(format!(
            "content has {line_count} lines, over the {} line budget",
            budgets.max_lines
        ));
    }
    if profile == SecurityProfile::Strict {
        let lower = raw_text.to_lowercase();
        if lower.contains("<script") {
            issues.push("script tag present; strict profile refuses".to_string());
        }
    }

    ValidationReport {
        valid: issues.is_empty(),
        issues,
    }
}

fn parse_inner(
    raw_text: &str,
    profile: SecurityProfile,
    options: &ParseOptions,
    encoding: Option<EncodingInfo>,
    source_path: Option<String>,
) -> ParseResult<Snapshot> {
    let profile = match &options.security_profile {
        Some(name) => SecurityProfile::resolve(name)?,
        None => profile,
    };
    let budgets = profile.budgets();
    log::debug!("parsing under profile {profile}");

    // Normalize exactly once; every later offset indexes this text.
    let normalized = normalize(raw_text);

    let byte_len = normalized.len() as u64;
    if byte_len > budgets.max_content_bytes {
        return Err(ParseError::size_bytes(
            profile,
            budgets.max_content_bytes,
            byte_len,
        ));
    }
    let line_total = count_lines(&normalized) as u64;
    if line_total > budgets.max_lines {
        return Err(ParseError::size_lines(profile, budgets.max_lines, line_total));
    }

    let fm = frontmatter::extract(&normalized);
    let body = fm.body;

    let index = LineIndex::new(&body);
    let lines = lines_with_terminators(&body);

    let (tokenizer_config, unknown_plugins) = TokenizerConfig::resolve(profile, options);
    let stream = tokenize(&body, &tokenizer_config);

    let extraction = extract(
        &stream.tokens,
        &ExtractContext {
            index: &index,
            line_count: lines.len(),
            profile,
        },
    );
    let mappings = build_mappings(&lines, &extraction.structure.code_blocks);

    let allows_html = options
        .allows_html
        .unwrap_or_else(|| profile.allows_html_default());
    let policy = apply_policy(
        extraction.structure,
        &PolicyInput {
            profile,
            budgets,
            text: &body,
            index: &index,
            allows_html,
            depth_exceeded: stream.depth_exceeded,
            dup_footnote_labels: extraction.dup_footnote_labels,
            frontmatter_message: fm.parse_message.clone(),
        },
    )?;

    Ok(assemble(AssembleParts {
        encoding,
        source_path,
        frontmatter: fm.frontmatter,
        frontmatter_error: fm.error,
        unknown_plugins,
        content: Content { raw: body, lines },
        mappings,
        policy,
    }))
}

/// Lines as the stored line array counts them: a trailing newline
/// terminates the last line instead of opening an empty one.
fn count_lines(text: &str) -> usize {
    if text.is_empty() {
        return 1;
    }
    let newlines = text.bytes().filter(|b| *b == b'\n').count();
    if text.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}
