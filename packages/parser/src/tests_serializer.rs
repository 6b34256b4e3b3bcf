/// Round trips: parse, serialize, parse again, compare structure.
use crate::*;

fn assert_round_trip(source: &str) {
    let options = ParseOptions::default();
    let (tree, doc) = parse(source, &options).unwrap_or_else(|e| panic!("Failed to parse {source:?}: {e}"));
    let serialized = serialize(&tree, doc).unwrap();
    let (reparsed, redoc) =
        parse(&serialized, &options).unwrap_or_else(|e| panic!("Failed to reparse {serialized:?}: {e}"));

    assert_eq!(
        tree.snapshot(doc).unwrap(),
        reparsed.snapshot(redoc).unwrap(),
        "structure changed after serializing {source:?} as {serialized:?}"
    );
}

#[test]
fn test_roundtrip_paragraph_with_emphasis() {
    assert_round_trip("Hello *world* and **bold** text.\n");
    assert_round_trip("Nested ***both*** and *outer **inner** outer*.\n");
}

#[test]
fn test_roundtrip_adjacent_emphasis() {
    assert_round_trip("*a*_b_\n");
    assert_round_trip("_a_*b*\n");
    assert_round_trip("*a*_b_*c*\n");
    assert_round_trip("**a**_b_\n");
    assert_round_trip("*a*__b__ tail\n");
}

#[test]
fn test_serialize_alternates_adjacent_emphasis() {
    let (tree, doc) = parse("*a*_b_\n", &ParseOptions::default()).unwrap();
    assert_eq!(serialize(&tree, doc).unwrap(), "_a_*b*\n");
}

#[test]
fn test_roundtrip_tight_bullet_list() {
    assert_round_trip("- one\n- two\n- three\n");
}

#[test]
fn test_roundtrip_ordered_list_with_start() {
    assert_round_trip("3. alpha\n4. beta\n");
}

#[test]
fn test_roundtrip_fenced_code_with_info() {
    assert_round_trip("```rust\nfn main() {}\n```\n");
    assert_round_trip("````\n```\nnested fence\n```\n````\n");
}

#[test]
fn test_roundtrip_tilde_fence_info_starting_with_tilde() {
    let source = "~~~ ~`x\ncode\n~~~\n";
    let (tree, doc) = parse(source, &ParseOptions::default()).unwrap();
    let block = tree.first_child(doc).unwrap().unwrap();
    assert_eq!(tree.fence_info(block).unwrap(), "~`x");
    assert_round_trip(source);
    assert_round_trip("~~~\t~~~`!x\ncode\n~~~\n");
}

#[test]
fn test_roundtrip_headers() {
    assert_round_trip("# Title\n\nSub\n---\n\n###### Six\n");
}

#[test]
fn test_roundtrip_multiline_setext_headers() {
    assert_round_trip("a\nb\n---\n");
    assert_round_trip("first\nsecond\n===\n\nafter\n");
    assert_round_trip("hard\\\nbreak\n---\n");
}

#[test]
fn test_serialize_multiline_header_as_setext() {
    let (tree, doc) = parse("a\nb\n---\n", &ParseOptions::default()).unwrap();
    assert_eq!(serialize(&tree, doc).unwrap(), "a\nb\n---\n");
}

#[test]
fn test_roundtrip_block_quotes() {
    assert_round_trip("> quoted *text*\n> more\n>\n> > nested\n");
}

#[test]
fn test_roundtrip_links_and_images() {
    assert_round_trip("See [the site](https://example.com \"Example\") and <https://rust-lang.org>.\n");
    assert_round_trip("Mail <me@example.com> or ![alt *text*](/img.png).\n");
}

#[test]
fn test_roundtrip_code_spans_and_breaks() {
    assert_round_trip("Use `code` and ``a ` b``.\n");
    assert_round_trip("line one  \nline two\\\nline three\n");
}

#[test]
fn test_roundtrip_loose_and_nested_lists() {
    assert_round_trip("- a\n\n- b\n");
    assert_round_trip("- outer\n  - inner\n- next\n");
    assert_round_trip("- first\n\n  second paragraph\n- other\n");
}

#[test]
fn test_roundtrip_adjacent_lists() {
    assert_round_trip("- a\n- b\n\n* c\n\n- d\n");
}

#[test]
fn test_roundtrip_escaped_text() {
    assert_round_trip("1\\. not a list and \\*not emphasis\\*\n");
    assert_round_trip("\\# not a header\n");
}

#[test]
fn test_serialize_normalizes_markers() {
    let (tree, doc) = parse("* a\n* b\n", &ParseOptions::default()).unwrap();
    assert_eq!(serialize(&tree, doc).unwrap(), "- a\n- b\n");
}

#[test]
fn test_serialize_inline_subtree() {
    let (tree, doc) = parse("a **b** c", &ParseOptions::default()).unwrap();
    let para = tree.first_child(doc).unwrap().unwrap();
    let strong = tree.children(para).nth(1).unwrap();
    assert_eq!(serialize(&tree, strong).unwrap(), "**b**\n");
}
