// Property tests over the pipeline's hard invariants.
use proptest::prelude::*;
use sekisho::security::traversal::has_traversal;
use sekisho::text::normalize;
use sekisho::{ParseOptions, SecurityProfile, parse};

proptest! {
    // Normalization is idempotent for arbitrary input.
    #[test]
    fn normalize_idempotent(input in ".{0,300}") {
        let once = normalize(&input);
        prop_assert_eq!(normalize(&once), once);
    }

    // Normalized text never contains carriage returns.
    #[test]
    fn normalize_kills_carriage_returns(input in ".{0,300}") {
        prop_assert!(!normalize(&input).contains('\r'));
    }

    // Plain HTTPS URLs without dot-dot segments never flag traversal.
    #[test]
    fn no_traversal_false_positives_on_https(
        host in "[a-z]{1,12}\\.(com|org|dev)",
        path in "[a-zA-Z0-9_/-]{0,40}",
    ) {
        let url = format!("https://{host}/{path}");
        prop_assert!(!has_traversal(&url), "flagged {}", url);
    }

    // k-times percent-encoded dot-dot is caught for k in 1..=3.
    #[test]
    fn multi_round_encoded_traversal_detected(rounds in 1usize..=3) {
        let mut url = "../secret".to_string();
        for _ in 0..rounds {
            url = url.replace('%', "%25").replace('.', "%2e").replace('/', "%2f");
        }
        prop_assert!(has_traversal(&url), "missed {} rounds: {}", rounds, url);
    }

    // Parsing is deterministic byte-for-byte.
    #[test]
    fn parse_deterministic(body in "[ -~\n]{0,400}") {
        let a = parse(&body, SecurityProfile::Permissive, &ParseOptions::default());
        let b = parse(&body, SecurityProfile::Permissive, &ParseOptions::default());
        match (a, b) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a.to_json(), b.to_json()),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "one parse failed, the other did not"),
        }
    }

    // Offsets stay coherent for arbitrary printable documents.
    #[test]
    fn offsets_coherent(body in "[ -~\n]{0,400}") {
        if let Ok(snapshot) = parse(&body, SecurityProfile::Permissive, &ParseOptions::default()) {
            let line_count = snapshot.content.lines.len();
            for section in &snapshot.structure.sections {
                prop_assert!(section.start_line <= section.end_line);
                prop_assert!(section.end_line <= line_count);
                prop_assert!(section.start_char <= section.end_char);
                prop_assert!(section.end_char <= snapshot.content.raw.len());
            }
            for block in &snapshot.structure.code_blocks {
                prop_assert!(block.start_line <= block.end_line);
                prop_assert!(block.end_line <= line_count);
            }
            for paragraph in &snapshot.structure.paragraphs {
                prop_assert!(paragraph.start_line <= paragraph.end_line);
                prop_assert!(paragraph.end_line <= line_count);
            }
        }
    }

    // The line array always reassembles the raw text.
    #[test]
    fn lines_reassemble_raw(body in "[ -~\n]{0,400}") {
        if let Ok(snapshot) = parse(&body, SecurityProfile::Permissive, &ParseOptions::default()) {
            prop_assert_eq!(snapshot.content.lines.concat(), snapshot.content.raw);
        }
    }
}

// P1 for a concrete document: the line range of each entity contains its
// source text.
#[test]
fn entity_ranges_contain_source_text() {
    let doc = "# First Section\n\nsome paragraph\n\n```rust\nlet x = 1;\n```\n\n## Second\n\ntail\n";
    let snapshot = parse(doc, SecurityProfile::Moderate, &ParseOptions::default()).unwrap();

    let section = &snapshot.structure.sections[0];
    let section_text: String =
        snapshot.content.lines[section.start_line..section.end_line].concat();
    assert!(section_text.contains("First Section"));
    assert!(section_text.contains("some paragraph"));
    assert!(!section_text.contains("Second"));

    let raw_slice = &snapshot.content.raw[section.start_char..section.end_char];
    assert_eq!(raw_slice, section_text);

    let code = &snapshot.structure.code_blocks[0];
    let code_text: String = snapshot.content.lines[code.start_line..code.end_line].concat();
    assert!(code_text.contains("let x = 1;"));
}
