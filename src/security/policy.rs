//! The single-pass security policy stage.
//!
//! Runs after extraction, in a fixed order, with no short-circuiting:
//! every detector contributes to `statistics` even when an earlier one
//! already blocked embedding. Only the strict profile turns outcomes into
//! errors, and only for script tags and disallowed schemes.

use std::collections::BTreeMap;

use crate::config::{Budgets, SecurityProfile};
use crate::error::{ParseError, SecurityErrorKind};
use crate::snapshot::{ImageKind, Security, SecurityStatistics, Structure, Warning};
use crate::text::LineIndex;

use super::CheckOutcome;
use super::injection::InjectionScanner;
use super::scan::{HREF_LIKE, RawTag, scan_tags};
use super::traversal::has_traversal;
use super::unicode::scan_unicode;
use super::url::normalize_url;

/// Ambient facts the policy stage needs beyond the structure itself.
pub struct PolicyInput<'a> {
    pub profile: SecurityProfile,
    pub budgets: Budgets,
    /// Normalized body text (the same string the tokenizer saw).
    pub text: &'a str,
    pub index: &'a LineIndex,
    pub allows_html: bool,
    pub depth_exceeded: bool,
    pub dup_footnote_labels: u32,
    /// YAML parser message from a failed frontmatter parse.
    pub frontmatter_message: Option<String>,
}

/// Everything the policy stage decided.
#[derive(Debug)]
pub struct PolicyOutcome {
    pub structure: Structure,
    pub security: Security,
    pub embedding_blocked: bool,
    pub embedding_block_reason: Option<String>,
    pub quarantined: bool,
    pub quarantine_reasons: Vec<String>,
    pub policies_applied: Vec<String>,
}

struct PolicyState {
    profile: SecurityProfile,
    stats: SecurityStatistics,
    warnings: Vec<Warning>,
    blocked: bool,
    block_reason: Option<String>,
    policies: Vec<String>,
    quarantine_reasons: Vec<String>,
}

impl PolicyState {
    fn new(profile: SecurityProfile) -> Self {
        Self {
            profile,
            stats: SecurityStatistics::default(),
            warnings: Vec::new(),
            blocked: false,
            block_reason: None,
            policies: Vec::new(),
            quarantine_reasons: Vec::new(),
        }
    }

    /// Fold a check outcome: fatal raises, a flag blocks embedding with
    /// first-reason-wins (exactly one `embedding_blocked_*` policy tag).
    fn resolve(&mut self, outcome: CheckOutcome) -> Result<(), ParseError> {
        match outcome {
            CheckOutcome::Fatal(kind, message) => {
                Err(ParseError::security(self.profile, kind, message))
            }
            CheckOutcome::Flag(reason) => {
                if !self.blocked {
                    self.blocked = true;
                    self.block_reason = Some(reason.to_string());
                    self.policies.push(format!("embedding_blocked_{reason}"));
                    log::debug!("embedding blocked: {reason}");
                }
                Ok(())
            }
            CheckOutcome::Clean => Ok(()),
        }
    }

    fn quarantine(&mut self, reason: &str) {
        if !self.quarantine_reasons.iter().any(|r| r == reason) {
            log::warn!("document quarantined: {reason}");
            self.quarantine_reasons.push(reason.to_string());
        }
    }
}

/// Run the policy stage over the extracted structure.
pub fn apply_policy(
    mut structure: Structure,
    input: &PolicyInput<'_>,
) -> Result<PolicyOutcome, ParseError> {
    let strict = input.profile == SecurityProfile::Strict;
    let mut state = PolicyState::new(input.profile);

    if input.depth_exceeded {
        state.warnings.push(Warning::new(
            "recursion_depth_exceeded",
            format!(
                "block nesting deeper than {} levels was dropped",
                input.budgets.max_recursion_depth
            ),
        ));
    }
    if let Some(message) = &input.frontmatter_message {
        state
            .warnings
            .push(Warning::new("frontmatter", message.clone()));
    }

    // Raw-HTML scan feeds the scriptless, event-handler, and raw-scheme
    // checks. Fenced code is opaque data and is skipped.
    let fenced: Vec<(usize, usize)> = structure
        .code_blocks
        .iter()
        .filter(|b| b.kind == crate::snapshot::CodeKind::Fenced)
        .map(|b| (b.start_line, b.end_line))
        .collect();
    let tags = scan_tags(input.text, input.index, &fenced);

    // 2. Scriptless vectors.
    check_scriptless(&tags, strict, &mut state)?;

    // 3. Event handlers.
    if tags
        .iter()
        .any(|tag| tag.attrs.iter().any(|(name, _)| is_event_handler(name)))
    {
        state.stats.has_event_handlers = true;
    }

    // 4. Scheme policy over extracted links and raw href-like attributes.
    check_link_schemes(&structure, strict, &mut state)?;
    check_raw_schemes(&tags, strict, &mut state)?;
    state.stats.allowed_schemes = input
        .profile
        .allowed_schemes()
        .iter()
        .map(|s| (*s).to_string())
        .collect();

    // 5. Path traversal across every URL surface.
    check_traversal(&structure, &tags, &mut state);

    // 6. Data-URI budgets.
    check_data_uris(&structure, input.budgets, &mut state)?;

    // 7. Unicode spoofing.
    let unicode = scan_unicode(input.text, input.budgets.max_injection_scan_chars);
    state.stats.has_bidi = unicode.has_bidi;
    state.stats.confusables_present = unicode.has_confusables;
    state.stats.scan_limit_exceeded = unicode.scan_limit_exceeded;
    state.stats.unicode_risk_score = unicode.risk_score();

    // 8. Prompt injection over body, footnotes, and image alt text.
    let scanner = InjectionScanner::new();
    let window = input.budgets.max_injection_scan_chars;
    state.stats.suspected_prompt_injection = scanner.scan(input.text, window);
    state.stats.footnote_injection = structure
        .footnotes
        .definitions
        .iter()
        .any(|def| scanner.scan(&def.content, window));
    state.stats.prompt_injection_in_images = structure
        .images
        .iter()
        .any(|image| scanner.scan(&image.alt, window));
    if input.profile.quarantines_on_injection() {
        if state.stats.suspected_prompt_injection {
            state.quarantine("prompt_injection_content");
        }
        if state.stats.footnote_injection {
            state.quarantine("footnote_injection");
        }
        if state.stats.prompt_injection_in_images {
            state.quarantine("prompt_injection_in_images");
        }
    }

    // 9. Table shape statistics.
    state.stats.ragged_tables_count =
        structure.tables.iter().filter(|t| t.is_ragged).count() as u32;
    state.stats.table_align_mismatches = structure
        .tables
        .iter()
        .filter(|t| t.align.len() != t.column_count as usize)
        .count() as u32;

    state.stats.has_html_block = !structure.html_blocks.is_empty();
    state.stats.has_html_inline = !structure.html_inline.is_empty();
    state.stats.dup_footnote_labels = input.dup_footnote_labels;

    // 10. HTML stripping.
    if !input.allows_html {
        if !structure.html_blocks.is_empty() {
            structure.html_blocks = Vec::new();
            state.policies.push("stripped_html_blocks".to_string());
        }
        if !structure.html_inline.is_empty() {
            structure.html_inline = Vec::new();
            state.policies.push("stripped_html_inline".to_string());
        }
    }

    // 11. Strict profile drops data images entirely.
    if strict {
        let before = structure.images.len();
        structure.images.retain(|img| img.image_kind != ImageKind::Data);
        let dropped = before - structure.images.len();
        if dropped > 0 {
            state.policies.push(format!("dropped_{dropped}_unsafe_images"));
        }
    }

    let summary = build_summary(&structure, &state);

    Ok(PolicyOutcome {
        structure,
        security: Security {
            profile_used: input.profile,
            statistics: state.stats,
            warnings: state.warnings,
            summary,
        },
        embedding_blocked: state.blocked,
        embedding_block_reason: state.block_reason,
        quarantined: !state.quarantine_reasons.is_empty(),
        quarantine_reasons: state.quarantine_reasons,
        policies_applied: state.policies,
    })
}

fn check_scriptless(
    tags: &[RawTag],
    strict: bool,
    state: &mut PolicyState,
) -> Result<(), ParseError> {
    for tag in tags {
        let outcome = match tag.name.as_str() {
            "script" => {
                state.stats.has_script = true;
                state.warnings.push(
                    Warning::new("script_tag", "script tag in raw content").at_line(tag.line),
                );
                if strict {
                    CheckOutcome::Fatal(
                        SecurityErrorKind::Script,
                        format!("script tag at line {}", tag.line),
                    )
                } else {
                    CheckOutcome::Flag("script")
                }
            }
            "meta" if is_meta_refresh(tag) => {
                state.stats.has_meta_refresh = true;
                state.warnings.push(
                    Warning::new("meta_refresh", "meta refresh redirect").at_line(tag.line),
                );
                CheckOutcome::Flag("meta_refresh")
            }
            "iframe" | "object" | "embed" => {
                state.stats.has_frame_like = true;
                state.warnings.push(
                    Warning::new("frame_like", format!("{} tag in raw content", tag.name))
                        .at_line(tag.line),
                );
                CheckOutcome::Flag("frame_like")
            }
            _ => CheckOutcome::Clean,
        };
        state.resolve(outcome)?;

        if let Some(style) = tag.attr("style")
            && has_style_vector(style)
        {
            state.stats.has_style_scriptless = true;
            state.warnings.push(
                Warning::new("style_injection", "scriptless vector in style attribute")
                    .at_line(tag.line),
            );
            state.resolve(CheckOutcome::Flag("style_injection"))?;
        }
    }
    Ok(())
}

fn is_meta_refresh(tag: &RawTag) -> bool {
    tag.attr("http-equiv")
        .map(|value| value.eq_ignore_ascii_case("refresh"))
        .unwrap_or(false)
}

fn has_style_vector(style: &str) -> bool {
    let lower = style.to_lowercase();
    lower.contains("javascript:")
        || lower.contains("expression(")
        || lower.contains("url(javascript")
}

fn is_event_handler(attr_name: &str) -> bool {
    attr_name.len() > 2 && attr_name.starts_with("on")
}

fn check_link_schemes(
    structure: &Structure,
    strict: bool,
    state: &mut PolicyState,
) -> Result<(), ParseError> {
    for link in &structure.links {
        let key = link.scheme.clone().unwrap_or_else(|| "relative".to_string());
        *state.stats.link_schemes.entry(key).or_insert(0) += 1;

        let verdict = normalize_url(&link.url, state.profile);
        if !verdict.allowed {
            let outcome = if strict {
                CheckOutcome::Fatal(
                    SecurityErrorKind::DisallowedScheme,
                    format!("disallowed scheme in link: {}", link.url),
                )
            } else {
                CheckOutcome::Flag("disallowed_scheme")
            };
            state.resolve(outcome)?;
        }
    }
    Ok(())
}

fn check_raw_schemes(
    tags: &[RawTag],
    strict: bool,
    state: &mut PolicyState,
) -> Result<(), ParseError> {
    for tag in tags {
        for (name, value) in &tag.attrs {
            if !HREF_LIKE.contains(&name.as_str()) || value.is_empty() {
                continue;
            }
            let verdict = normalize_url(value, state.profile);
            let key = verdict.scheme.clone().unwrap_or_else(|| "relative".to_string());
            *state.stats.link_schemes.entry(key).or_insert(0) += 1;

            if !verdict.allowed {
                state.stats.link_disallowed_schemes_raw = true;
                state.warnings.push(
                    Warning::new(
                        "disallowed_scheme_raw",
                        format!("disallowed scheme in raw {} attribute", name),
                    )
                    .at_line(tag.line),
                );
                let outcome = if strict {
                    CheckOutcome::Fatal(
                        SecurityErrorKind::DisallowedScheme,
                        format!("disallowed scheme in raw HTML attribute {name}"),
                    )
                } else {
                    CheckOutcome::Flag("disallowed_scheme")
                };
                state.resolve(outcome)?;
            }
        }
    }
    Ok(())
}

fn check_traversal(structure: &Structure, tags: &[RawTag], state: &mut PolicyState) {
    let mut hit = |url: &str, line: Option<usize>| {
        if has_traversal(url) {
            state.stats.path_traversal_pattern = true;
            let mut warning =
                Warning::new("path_traversal", format!("path traversal pattern in {url}"));
            if let Some(line) = line {
                warning = warning.at_line(line);
            }
            state.warnings.push(warning);
        }
    };

    for link in &structure.links {
        hit(&link.url, Some(link.line));
    }
    for image in &structure.images {
        hit(&image.src, Some(image.line));
    }
    for tag in tags {
        for (name, value) in &tag.attrs {
            if HREF_LIKE.contains(&name.as_str()) && !value.is_empty() {
                hit(value, Some(tag.line));
            }
        }
    }
}

fn check_data_uris(
    structure: &Structure,
    budgets: Budgets,
    state: &mut PolicyState,
) -> Result<(), ParseError> {
    let mut total: u64 = 0;
    for image in &structure.images {
        if image.image_kind != ImageKind::Data {
            continue;
        }
        state.stats.has_data_uri_images = true;
        let size = image.size_bytes.unwrap_or(0);
        total += size;

        if budgets.max_data_uri_size == 0 {
            state.warnings.push(
                Warning::new("data_uri_image", "data URI image blocked by profile")
                    .at_line(image.line)
                    .with_size(size),
            );
            state.resolve(CheckOutcome::Flag("data_uri"))?;
        } else if size > budgets.max_data_uri_size {
            state.warnings.push(
                Warning::new(
                    "data_uri_oversized",
                    format!("data URI exceeds {} bytes", budgets.max_data_uri_size),
                )
                .at_line(image.line)
                .with_size(size),
            );
            state.resolve(CheckOutcome::Flag("data_uri_oversized"))?;
        }
    }

    if budgets.max_data_uri_size > 0 && total > budgets.max_total_data_uri_size {
        state.warnings.push(
            Warning::new(
                "data_uri_total_oversized",
                format!(
                    "cumulative data URI size exceeds {} bytes",
                    budgets.max_total_data_uri_size
                ),
            )
            .with_size(total),
        );
        state.resolve(CheckOutcome::Flag("data_uri_total_oversized"))?;
    }
    Ok(())
}

fn build_summary(structure: &Structure, state: &PolicyState) -> BTreeMap<String, u64> {
    let mut summary = BTreeMap::new();
    summary.insert("sections".to_string(), structure.sections.len() as u64);
    summary.insert("paragraphs".to_string(), structure.paragraphs.len() as u64);
    summary.insert("lists".to_string(), structure.lists.len() as u64);
    summary.insert("tables".to_string(), structure.tables.len() as u64);
    summary.insert(
        "code_blocks".to_string(),
        structure.code_blocks.len() as u64,
    );
    summary.insert("links".to_string(), structure.links.len() as u64);
    summary.insert("images".to_string(), structure.images.len() as u64);
    summary.insert(
        "footnotes".to_string(),
        structure.footnotes.definitions.len() as u64,
    );
    summary.insert(
        "math_blocks".to_string(),
        structure.math.blocks.len() as u64,
    );
    summary.insert(
        "ragged_tables_count".to_string(),
        u64::from(state.stats.ragged_tables_count),
    );
    summary.insert("warnings".to_string(), state.warnings.len() as u64);
    summary
}
