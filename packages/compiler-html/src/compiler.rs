use crate::escape::{escape_href_into, escape_html_into, is_unsafe_url};
use mdtree_parser::{parse, ParseOptions, ParseResult};
use mdtree_tree::{ListType, NodeId, NodeKind, Tree, TreeResult, WalkEvent};
use serde::{Deserialize, Serialize};

const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

/// Options for HTML rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Render soft line breaks as `<br />`
    pub hardbreaks: bool,
    /// Suppress raw HTML and dangerous link schemes
    pub safe: bool,
}

struct Context<'t> {
    tree: &'t Tree,
    options: &'t RenderOptions,
    buffer: String,
}

impl<'t> Context<'t> {
    fn new(tree: &'t Tree, options: &'t RenderOptions) -> Self {
        Self {
            tree,
            options,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_escaped(&mut self, text: &str) {
        escape_html_into(text, &mut self.buffer);
    }

    /// Start a new line unless the output already ends with one.
    fn cr(&mut self) {
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
    }

    fn add_url(&mut self, url: &str) {
        if !(self.options.safe && is_unsafe_url(url)) {
            escape_href_into(url, &mut self.buffer);
        }
    }

    fn add_title(&mut self, id: NodeId) -> TreeResult<()> {
        let tree = self.tree;
        let title = tree.title(id)?;
        if !title.is_empty() {
            self.add(" title=\"");
            self.add_escaped(title);
            self.add("\"");
        }
        Ok(())
    }

    fn add_raw_html(&mut self, literal: &str) {
        if self.options.safe {
            self.add(RAW_HTML_OMITTED);
        } else {
            self.add(literal);
        }
    }

    /// Paragraphs directly inside items of a tight list render without `<p>`.
    fn in_tight_list(&self, paragraph: NodeId) -> TreeResult<bool> {
        let tree = self.tree;
        let Some(item) = tree.parent(paragraph)? else {
            return Ok(false);
        };
        let Some(list) = tree.parent(item)? else {
            return Ok(false);
        };
        if tree.kind(list)? != NodeKind::List {
            return Ok(false);
        }
        tree.list_tight(list)
    }

    fn enter(&mut self, id: NodeId) -> TreeResult<()> {
        let tree = self.tree;
        match tree.kind(id)? {
            NodeKind::Document => {}
            NodeKind::BlockQuote => {
                self.cr();
                self.add("<blockquote>\n");
            }
            NodeKind::List => {
                self.cr();
                match tree.list_type(id)? {
                    ListType::Bullet => self.add("<ul>\n"),
                    ListType::Ordered => match tree.list_start(id)? {
                        1 => self.add("<ol>\n"),
                        start => self.add(&format!("<ol start=\"{start}\">\n")),
                    },
                }
            }
            NodeKind::Item => {
                self.cr();
                self.add("<li>");
            }
            NodeKind::Header => {
                self.cr();
                let level = tree.header_level(id)?;
                self.add(&format!("<h{level}>"));
            }
            NodeKind::CodeBlock => {
                self.cr();
                self.add("<pre><code");
                if let Some(lang) = tree.fence_info(id)?.split_whitespace().next() {
                    self.add(" class=\"language-");
                    self.add_escaped(lang);
                    self.add("\"");
                }
                self.add(">");
                self.add_escaped(tree.literal(id)?);
                self.add("</code></pre>\n");
            }
            NodeKind::Html => {
                self.cr();
                self.add_raw_html(tree.literal(id)?);
                self.cr();
            }
            NodeKind::Paragraph => {
                if !self.in_tight_list(id)? {
                    self.cr();
                    self.add("<p>");
                }
            }
            NodeKind::Hrule => {
                self.cr();
                self.add("<hr />\n");
            }
            NodeKind::Text => self.add_escaped(tree.literal(id)?),
            NodeKind::Softbreak => {
                if self.options.hardbreaks {
                    self.add("<br />\n");
                } else {
                    self.add("\n");
                }
            }
            NodeKind::Linebreak => self.add("<br />\n"),
            NodeKind::Code => {
                self.add("<code>");
                self.add_escaped(tree.literal(id)?);
                self.add("</code>");
            }
            NodeKind::InlineHtml => self.add_raw_html(tree.literal(id)?),
            NodeKind::Emph => self.add("<em>"),
            NodeKind::Strong => self.add("<strong>"),
            NodeKind::Link => {
                self.add("<a href=\"");
                self.add_url(tree.url(id)?);
                self.add("\"");
                self.add_title(id)?;
                self.add(">");
            }
            NodeKind::Image => {
                self.add("<img src=\"");
                self.add_url(tree.url(id)?);
                self.add("\" alt=\"");
                self.add_plain_text(id)?;
                self.add("\"");
                self.add_title(id)?;
                self.add(" />");
            }
        }
        Ok(())
    }

    fn exit(&mut self, id: NodeId) -> TreeResult<()> {
        let tree = self.tree;
        match tree.kind(id)? {
            NodeKind::BlockQuote => {
                self.cr();
                self.add("</blockquote>\n");
            }
            NodeKind::List => {
                self.cr();
                match tree.list_type(id)? {
                    ListType::Bullet => self.add("</ul>\n"),
                    ListType::Ordered => self.add("</ol>\n"),
                }
            }
            NodeKind::Item => self.add("</li>\n"),
            NodeKind::Header => {
                let level = tree.header_level(id)?;
                self.add(&format!("</h{level}>\n"));
            }
            NodeKind::Paragraph => {
                if !self.in_tight_list(id)? {
                    self.add("</p>\n");
                }
            }
            NodeKind::Emph => self.add("</em>"),
            NodeKind::Strong => self.add("</strong>"),
            NodeKind::Link => self.add("</a>"),
            _ => {}
        }
        Ok(())
    }

    /// Text content of an image's description, for the `alt` attribute.
    fn add_plain_text(&mut self, image: NodeId) -> TreeResult<()> {
        let tree = self.tree;
        for event in tree.walk(image) {
            let WalkEvent::Enter(id) = event else {
                continue;
            };
            if id == image {
                continue;
            }
            match tree.kind(id)? {
                NodeKind::Text | NodeKind::Code | NodeKind::InlineHtml => {
                    self.add_escaped(tree.literal(id)?)
                }
                NodeKind::Softbreak | NodeKind::Linebreak => self.add(" "),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Render the subtree rooted at `node` as HTML.
pub fn render_html(tree: &Tree, node: NodeId, options: &RenderOptions) -> TreeResult<String> {
    tree.node(node)?;
    let mut ctx = Context::new(tree, options);
    let mut walker = tree.walk(node);
    while let Some(event) = walker.next() {
        match event {
            WalkEvent::Enter(id) => {
                ctx.enter(id)?;
                // The description was already written as alt text.
                if tree.kind(id)? == NodeKind::Image {
                    walker.skip_to_exit(id);
                }
            }
            WalkEvent::Exit(id) => ctx.exit(id)?,
        }
    }
    Ok(ctx.buffer)
}

/// Parse `text` and render the resulting document.
pub fn markdown_to_html(
    text: &str,
    parse_options: &ParseOptions,
    render_options: &RenderOptions,
) -> ParseResult<String> {
    let (tree, doc) = parse(text, parse_options)?;
    Ok(render_html(&tree, doc, render_options)?)
}
