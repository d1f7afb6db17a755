//! Link and image extractor.

use crate::config::SecurityProfile;
use crate::security::traversal::has_traversal;
use crate::security::url::{classify, normalize_url};
use crate::snapshot::{Image, ImageKind, Link};
use crate::text::fnv1a_hash;
use crate::token::{Token, TokenKind};

use super::compact_whitespace;

/// Walk every inline run, producing link records (with validation verdicts)
/// and image records (with content-addressed ids). A link that wraps an
/// image carries the image's id so the two records join (I8/P11).
pub fn extract_links_and_images(
    tokens: &[Token],
    profile: SecurityProfile,
) -> (Vec<Link>, Vec<Image>) {
    let mut links = Vec::new();
    let mut images = Vec::new();

    for token in tokens {
        if token.kind != TokenKind::Inline {
            continue;
        }
        let line = token.span().start;
        let children = &token.children;

        let mut i = 0;
        while i < children.len() {
            match children[i].kind {
                TokenKind::Image => {
                    images.push(image_record(&children[i], line));
                    i += 1;
                }
                TokenKind::LinkOpen => {
                    let close = children[i + 1..]
                        .iter()
                        .position(|c| c.kind == TokenKind::LinkClose)
                        .map(|offset| i + 1 + offset)
                        .unwrap_or(children.len());
                    let inner = &children[i + 1..close.min(children.len())];

                    let wrapped_image = inner.iter().find(|c| c.kind == TokenKind::Image);
                    for image_child in inner.iter().filter(|c| c.kind == TokenKind::Image) {
                        images.push(image_record(image_child, line));
                    }

                    let text = compact_whitespace(
                        &inner
                            .iter()
                            .filter(|c| {
                                matches!(
                                    c.kind,
                                    TokenKind::Text | TokenKind::CodeInline | TokenKind::Image
                                )
                            })
                            .map(|c| c.content.as_str())
                            .collect::<Vec<_>>()
                            .join(" "),
                    );

                    let href = children[i].attr("href").unwrap_or_default();
                    links.push(link_record(
                        href,
                        text,
                        wrapped_image.map(|img| image_id_of(img)),
                        profile,
                        line,
                    ));
                    i = close + 1;
                }
                _ => i += 1,
            }
        }
    }

    (links, images)
}

fn link_record(
    href: &str,
    text: String,
    image_id: Option<String>,
    profile: SecurityProfile,
    line: usize,
) -> Link {
    let verdict = normalize_url(href, profile);
    let kind = classify(&verdict, image_id.is_some());
    let allowed = verdict.allowed && !has_traversal(&verdict.url);
    Link {
        url: verdict.url,
        text,
        kind,
        scheme: verdict.scheme,
        allowed,
        image_id,
        line,
    }
}

fn image_record(token: &Token, line: usize) -> Image {
    let src = token.attr("src").unwrap_or_default().trim().to_string();
    let alt = token.content.clone();
    let title = token.attr("title").map(|t| t.to_string());
    let (image_kind, format, size_bytes) = inspect_source(&src);
    Image {
        image_id: image_id(&src, &alt),
        src,
        alt,
        title,
        image_kind,
        format,
        size_bytes,
        line,
    }
}

fn image_id_of(token: &Token) -> String {
    image_id(token.attr("src").unwrap_or_default().trim(), &token.content)
}

/// Content-addressed id shared by link-side and structure-side records.
pub(crate) fn image_id(src: &str, alt: &str) -> String {
    format!("img_{:016x}", fnv1a_hash(&format!("{src}|{alt}")))
}

fn inspect_source(src: &str) -> (ImageKind, String, Option<u64>) {
    let lower = src.to_lowercase();
    if lower.starts_with("data:") {
        let format = data_uri_subtype(src).unwrap_or_else(|| "unknown".to_string());
        let size = data_uri_payload_len(src);
        return (ImageKind::Data, format, Some(size));
    }
    let kind = if lower.starts_with("http://") || lower.starts_with("https://") {
        ImageKind::External
    } else {
        ImageKind::Local
    };
    (kind, extension_of(src), None)
}

fn data_uri_subtype(src: &str) -> Option<String> {
    let meta = &src[5..src.find(',').unwrap_or(src.len())];
    let mime = meta.split(';').next().unwrap_or("");
    let subtype = mime.split('/').nth(1)?;
    (!subtype.is_empty()).then(|| subtype.to_lowercase())
}

/// Size of the payload after the comma, in bytes of the URI. For base64
/// payloads this over-approximates the decoded size, which is the safe
/// direction for a budget.
fn data_uri_payload_len(src: &str) -> u64 {
    src.find(',')
        .map(|comma| (src.len() - comma - 1) as u64)
        .unwrap_or(0)
}

fn extension_of(src: &str) -> String {
    let path = src
        .split(['?', '#'])
        .next()
        .unwrap_or(src)
        .rsplit('/')
        .next()
        .unwrap_or(src);
    match path.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_lowercase()
        }
        _ => "unknown".to_string(),
    }
}
