// Determinism and serialization shape of the snapshot.
use sekisho::{ParseOptions, SecurityProfile, parse};

const DOC: &str = "\
# Report\n\
\n\
Intro paragraph with a [link](https://example.com/a).\n\
\n\
| n | name |\n\
|---|------|\n\
| 1 | one  |\n\
\n\
```python\nprint(1)\n```\n\
\n\
![logo](logo.png)\n";

#[test]
fn parse_twice_is_byte_identical() {
    let a = parse(DOC, SecurityProfile::Moderate, &ParseOptions::default()).unwrap();
    let b = parse(DOC, SecurityProfile::Moderate, &ParseOptions::default()).unwrap();
    assert_eq!(a.to_json(), b.to_json());
}

#[test]
fn json_round_trips() {
    let snapshot = parse(DOC, SecurityProfile::Moderate, &ParseOptions::default()).unwrap();
    let json = snapshot.to_json();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let rewritten = serde_json::to_string_pretty(&value).unwrap();
    let reparsed: serde_json::Value = serde_json::from_str(&rewritten).unwrap();
    assert_eq!(value, reparsed);
    assert!(!json.contains('\r'));
}

#[test]
fn top_level_sections_in_declared_order() {
    let snapshot = parse(DOC, SecurityProfile::Moderate, &ParseOptions::default()).unwrap();
    let json = snapshot.to_json();
    let metadata = json.find("\"metadata\"").unwrap();
    let content = json.find("\"content\"").unwrap();
    let structure = json.find("\"structure\"").unwrap();
    let mappings = json.find("\"mappings\"").unwrap();
    assert!(metadata < content && content < structure && structure < mappings);
}

#[test]
fn containers_sorted_by_start_line() {
    let doc = "\
# One\n\
\n\
[a](https://x.example) then [b](https://y.example)\n\
\n\
## Two\n\
\n\
```\ncode\n```\n\
\n\
| h |\n\
|---|\n\
| r |\n\
\n\
![i](a.png)\n\
\n\
![j](b.png)\n";
    let snapshot = parse(doc, SecurityProfile::Moderate, &ParseOptions::default()).unwrap();
    let s = &snapshot.structure;

    fn is_sorted(values: &[usize]) -> bool {
        values.windows(2).all(|w| w[0] <= w[1])
    }

    assert!(is_sorted(
        &s.sections.iter().map(|x| x.start_line).collect::<Vec<_>>()
    ));
    assert!(is_sorted(
        &s.tables.iter().map(|x| x.start_line).collect::<Vec<_>>()
    ));
    assert!(is_sorted(
        &s.code_blocks
            .iter()
            .map(|x| x.start_line)
            .collect::<Vec<_>>()
    ));
    assert!(is_sorted(&s.links.iter().map(|x| x.line).collect::<Vec<_>>()));
    assert!(is_sorted(&s.images.iter().map(|x| x.line).collect::<Vec<_>>()));
}

#[test]
fn statistics_shape_is_stable() {
    let snapshot = parse(
        "plain text\n",
        SecurityProfile::Strict,
        &ParseOptions::default(),
    )
    .unwrap();
    insta::assert_json_snapshot!(snapshot.metadata.security.statistics, @r###"
    {
      "has_script": false,
      "has_event_handlers": false,
      "has_style_scriptless": false,
      "has_meta_refresh": false,
      "has_frame_like": false,
      "has_html_block": false,
      "has_html_inline": false,
      "has_data_uri_images": false,
      "suspected_prompt_injection": false,
      "footnote_injection": false,
      "prompt_injection_in_images": false,
      "confusables_present": false,
      "has_bidi": false,
      "unicode_risk_score": 0,
      "ragged_tables_count": 0,
      "table_align_mismatches": 0,
      "dup_footnote_labels": 0,
      "link_schemes": {},
      "allowed_schemes": [
        "http",
        "https",
        "mailto"
      ],
      "link_disallowed_schemes_raw": false,
      "path_traversal_pattern": false,
      "scan_limit_exceeded": false
    }
    "###);
}

#[test]
fn mappings_classify_lines() {
    let doc = "# H\n\nprose\n\n```\ncode\n```\n";
    let snapshot = parse(doc, SecurityProfile::Moderate, &ParseOptions::default()).unwrap();
    let json = serde_json::to_value(&snapshot.mappings).unwrap();
    assert_eq!(json["line_to_type"]["0"], "prose");
    assert_eq!(json["line_to_type"]["1"], "blank");
    assert_eq!(json["line_to_type"]["4"], "fence_marker");
    assert_eq!(json["line_to_type"]["5"], "code");
    assert_eq!(json["line_to_type"]["6"], "fence_marker");
    assert_eq!(json["code_blocks"][0]["language"], "");
    assert!(snapshot.mappings.prose_lines.contains(&2));
    assert!(snapshot.mappings.code_lines.contains(&5));
}
