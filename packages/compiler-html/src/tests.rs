use crate::{markdown_to_html, render_html, RenderOptions};
use mdtree_parser::{parse, ParseOptions};
use mdtree_tree::{NodeKind, Tree};

fn to_html(source: &str) -> String {
    markdown_to_html(source, &ParseOptions::default(), &RenderOptions::default())
        .expect("Failed to render")
}

fn to_html_with(source: &str, options: RenderOptions) -> String {
    markdown_to_html(source, &ParseOptions::default(), &options).expect("Failed to render")
}

#[test]
fn test_paragraph_and_emphasis() {
    assert_eq!(
        to_html("Hello *world* and **bold**."),
        "<p>Hello <em>world</em> and <strong>bold</strong>.</p>\n"
    );
}

#[test]
fn test_headers_and_rule() {
    assert_eq!(
        to_html("# One\n\n## Two\n\n***\n"),
        "<h1>One</h1>\n<h2>Two</h2>\n<hr />\n"
    );
}

#[test]
fn test_tight_list_omits_paragraphs() {
    assert_eq!(
        to_html("- a\n- b\n"),
        "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
    );
}

#[test]
fn test_loose_list_keeps_paragraphs() {
    assert_eq!(
        to_html("- a\n\n- b\n"),
        "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
    );
}

#[test]
fn test_ordered_list_start() {
    assert_eq!(
        to_html("3. x\n4. y\n"),
        "<ol start=\"3\">\n<li>x</li>\n<li>y</li>\n</ol>\n"
    );
    assert!(to_html("1. x\n").starts_with("<ol>\n"));
}

#[test]
fn test_nested_list_in_tight_item() {
    assert_eq!(
        to_html("- a\n  - b\n"),
        "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n"
    );
}

#[test]
fn test_code_block_language_class() {
    assert_eq!(
        to_html("```rust extra\nlet a = 1 < 2;\n```\n"),
        "<pre><code class=\"language-rust\">let a = 1 &lt; 2;\n</code></pre>\n"
    );
    assert_eq!(
        to_html("    plain\n"),
        "<pre><code>plain\n</code></pre>\n"
    );
}

#[test]
fn test_block_quote() {
    assert_eq!(
        to_html("> quoted\n"),
        "<blockquote>\n<p>quoted</p>\n</blockquote>\n"
    );
}

#[test]
fn test_links_images_and_code() {
    assert_eq!(
        to_html("[a](/u \"T\") ![i *x*](/p.png) `c`"),
        "<p><a href=\"/u\" title=\"T\">a</a> <img src=\"/p.png\" alt=\"i x\" /> <code>c</code></p>\n"
    );
}

#[test]
fn test_autolink_href_is_escaped() {
    assert_eq!(
        to_html("<https://x.org/a&b>"),
        "<p><a href=\"https://x.org/a&amp;b\">https://x.org/a&amp;b</a></p>\n"
    );
}

#[test]
fn test_breaks() {
    assert_eq!(to_html("a\nb"), "<p>a\nb</p>\n");
    assert_eq!(to_html("a  \nb"), "<p>a<br />\nb</p>\n");
    let options = RenderOptions {
        hardbreaks: true,
        ..RenderOptions::default()
    };
    assert_eq!(to_html_with("a\nb", options), "<p>a<br />\nb</p>\n");
}

#[test]
fn test_raw_html_and_safe_mode() {
    let source = "<div>\nhi\n</div>\n\ntext <b>bold</b> [x](javascript:void)\n";
    assert_eq!(
        to_html(source),
        "<div>\nhi\n</div>\n<p>text <b>bold</b> <a href=\"javascript:void\">x</a></p>\n"
    );

    let safe = RenderOptions {
        safe: true,
        ..RenderOptions::default()
    };
    assert_eq!(
        to_html_with(source, safe),
        "<!-- raw HTML omitted -->\n<p>text <!-- raw HTML omitted -->bold<!-- raw HTML omitted --> <a href=\"\">x</a></p>\n"
    );
}

#[test]
fn test_render_subtree() {
    let (tree, doc) = parse("para one\n\n*emph*", &ParseOptions::default()).expect("Failed to parse");
    let second = tree.last_child(doc).unwrap().unwrap();
    let html = render_html(&tree, second, &RenderOptions::default()).expect("Failed to render");
    assert_eq!(html, "<p><em>emph</em></p>\n");
}

#[test]
fn test_render_built_tree() {
    let mut tree = Tree::new();
    let doc = tree.new_node(NodeKind::Document);
    let header = tree.new_node(NodeKind::Header);
    let text = tree.new_node(NodeKind::Text);
    tree.set_header_level(header, 3).unwrap();
    tree.set_literal(text, "Built & rendered").unwrap();
    tree.append_child(header, text).unwrap();
    tree.append_child(doc, header).unwrap();

    let html = render_html(&tree, doc, &RenderOptions::default()).unwrap();
    assert_eq!(html, "<h3>Built &amp; rendered</h3>\n");
}

#[test]
fn test_render_options_from_json() {
    let options: RenderOptions = serde_json::from_str(r#"{ "safe": true }"#).unwrap();
    assert!(options.safe);
    assert!(!options.hardbreaks);
}
