//! Line-oriented block parser.
//!
//! Container blocks (block quotes and list items) are handled by collecting
//! their lines, stripping the container prefix, and parsing the result
//! recursively.

use crate::error::{ParseError, ParseResult};
use crate::inline;
use crate::options::ParseOptions;
use mdtree_tree::{ListType, NodeId, NodeKind, Payload, Tree};

#[derive(Debug, Clone)]
pub(crate) struct Line {
    text: String,
    /// Byte offset of `text` in the original source.
    offset: usize,
}

impl Line {
    fn indent(&self) -> usize {
        self.text.bytes().take_while(|&b| b == b' ').count()
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn rest(&self) -> &str {
        &self.text[self.indent()..]
    }

    /// Drop up to `n` leading spaces.
    fn strip(&self, n: usize) -> Line {
        let n = self.indent().min(n);
        self.tail(n)
    }

    fn tail(&self, from: usize) -> Line {
        let from = from.min(self.text.len());
        Line {
            text: self.text[from..].to_string(),
            offset: self.offset + from,
        }
    }
}

pub(crate) fn split_lines(source: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in source.split('\n') {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        lines.push(Line {
            text: expand_leading_tabs(text),
            offset,
        });
        offset += raw.len() + 1;
    }
    lines
}

fn expand_leading_tabs(text: &str) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 4);
    let mut column = 0;
    let mut leading = true;
    for c in text.chars() {
        if leading && c == '\t' {
            let width = 4 - column % 4;
            out.extend(std::iter::repeat(' ').take(width));
            column += width;
            continue;
        }
        if c != ' ' {
            leading = false;
        }
        out.push(c);
        column += 1;
    }
    out
}

#[derive(Debug, Clone)]
struct Fence {
    ch: char,
    len: usize,
    info: String,
}

fn fence_open(rest: &str) -> Option<Fence> {
    let ch = rest.chars().next().filter(|&c| c == '`' || c == '~')?;
    let len = rest.chars().take_while(|&c| c == ch).count();
    if len < 3 {
        return None;
    }
    let info = rest[len..].trim();
    if ch == '`' && info.contains('`') {
        return None;
    }
    Some(Fence {
        ch,
        len,
        info: info.to_string(),
    })
}

fn is_fence_close(line: &Line, fence: &Fence) -> bool {
    if line.indent() >= 4 {
        return false;
    }
    let rest = line.rest();
    let len = rest.chars().take_while(|&c| c == fence.ch).count();
    len >= fence.len && rest[len..].trim().is_empty()
}

fn atx_header(rest: &str) -> Option<(u8, &str)> {
    let level = rest.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let after = &rest[level..];
    if !after.is_empty() && !after.starts_with(' ') {
        return None;
    }
    let content = after.trim();
    let without_closing = content.trim_end_matches('#');
    let content = if without_closing.is_empty() {
        ""
    } else if without_closing.ends_with(' ') {
        without_closing.trim_end()
    } else {
        content
    };
    Some((level as u8, content))
}

fn setext_level(line: &Line) -> Option<u8> {
    if line.indent() >= 4 {
        return None;
    }
    let rest = line.rest().trim_end();
    if !rest.is_empty() && rest.bytes().all(|b| b == b'=') {
        Some(1)
    } else if !rest.is_empty() && rest.bytes().all(|b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

fn is_hrule(rest: &str) -> bool {
    let mut mark = None;
    let mut count = 0;
    for c in rest.chars() {
        match c {
            ' ' | '\t' => {}
            '*' | '-' | '_' => {
                if mark.is_some_and(|m| m != c) {
                    return false;
                }
                mark = Some(c);
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "details", "dialog", "div", "dl",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "script", "section", "style",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Comments, processing instructions, block-level tags, or any other tag
/// standing alone on its line.
fn is_html_start(rest: &str) -> bool {
    let Some(after) = rest.strip_prefix('<') else {
        return false;
    };
    if after.starts_with('!') || after.starts_with('?') {
        return true;
    }
    let after = after.strip_prefix('/').unwrap_or(after);
    if !after.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }
    let name_len = after
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(after.len());
    let (name, tail) = after.split_at(name_len);
    if !(tail.is_empty() || tail.starts_with([' ', '\t', '>']) || tail.starts_with("/>")) {
        return false;
    }
    if BLOCK_TAGS.contains(&name.to_ascii_lowercase().as_str()) {
        return true;
    }
    let line = rest.trim_end();
    line.ends_with('>') && !line[1..].contains('<')
}

#[derive(Debug, Clone, Copy)]
struct ListMarker {
    list_type: ListType,
    delim: char,
    start: u32,
    content_indent: usize,
    empty: bool,
}

fn list_marker(line: &Line) -> Option<ListMarker> {
    let indent = line.indent();
    if indent >= 4 {
        return None;
    }
    let rest = line.rest();
    let (list_type, delim, start, marker_len) = match rest.chars().next()? {
        c @ ('-' | '+' | '*') => (ListType::Bullet, c, 1, 1),
        c if c.is_ascii_digit() => {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits > 9 {
                return None;
            }
            let delim = rest[digits..].chars().next().filter(|&d| d == '.' || d == ')')?;
            let start = rest[..digits].parse().ok()?;
            (ListType::Ordered, delim, start, digits + 1)
        }
        _ => return None,
    };

    let after = &rest[marker_len..];
    if !after.is_empty() && !after.starts_with(' ') {
        return None;
    }
    let spaces = after.bytes().take_while(|&b| b == b' ').count();
    let empty = after.trim().is_empty();
    let marker_end = indent + marker_len;
    let content_indent = if empty || spaces > 4 {
        marker_end + 1
    } else {
        marker_end + spaces
    };
    Some(ListMarker {
        list_type,
        delim,
        start,
        content_indent,
        empty,
    })
}

/// Whether `line` opens a block that can interrupt a paragraph.
fn starts_block(line: &Line) -> bool {
    if line.indent() >= 4 {
        return false;
    }
    let rest = line.rest();
    fence_open(rest).is_some()
        || atx_header(rest).is_some()
        || rest.starts_with('>')
        || is_hrule(rest)
        || list_marker(line)
            .is_some_and(|m| !m.empty && (m.list_type == ListType::Bullet || m.start == 1))
}

/// Whether the last line of `lines` leaves a paragraph open, so that an
/// unprefixed line may continue it lazily.
fn ends_in_paragraph(lines: &[Line]) -> bool {
    let mut fence: Option<Fence> = None;
    let mut in_paragraph = false;
    for line in lines {
        if let Some(open) = &fence {
            if is_fence_close(line, open) {
                fence = None;
            }
            in_paragraph = false;
            continue;
        }
        if line.is_blank() {
            in_paragraph = false;
        } else if line.indent() >= 4 {
            // Indented code unless it continues a paragraph.
        } else if let Some(open) = fence_open(line.rest()) {
            fence = Some(open);
            in_paragraph = false;
        } else if atx_header(line.rest()).is_some() || is_hrule(line.rest()) {
            in_paragraph = false;
        } else if let Some(marker) = list_marker(line) {
            in_paragraph = !marker.empty;
        } else {
            in_paragraph = true;
        }
    }
    in_paragraph && fence.is_none()
}

pub(crate) struct BlockParser<'a> {
    tree: &'a mut Tree,
    options: &'a ParseOptions,
}

impl<'a> BlockParser<'a> {
    pub(crate) fn new(tree: &'a mut Tree, options: &'a ParseOptions) -> Self {
        Self { tree, options }
    }

    /// Parse `lines` as the children of `parent`. Returns whether blank lines
    /// separated any two of the blocks produced.
    pub(crate) fn parse_blocks(
        &mut self,
        parent: NodeId,
        lines: &[Line],
        depth: usize,
    ) -> ParseResult<bool> {
        let mut i = 0;
        let mut loose = false;
        let mut any = false;
        let mut blank_pending = false;
        while i < lines.len() {
            if lines[i].is_blank() {
                blank_pending = true;
                i += 1;
                continue;
            }
            if blank_pending && any {
                loose = true;
            }
            let (next, trailing_blank) = self.parse_block(parent, lines, i, depth)?;
            blank_pending = trailing_blank;
            any = true;
            i = next;
        }
        Ok(loose)
    }

    fn parse_block(
        &mut self,
        parent: NodeId,
        lines: &[Line],
        i: usize,
        depth: usize,
    ) -> ParseResult<(usize, bool)> {
        let line = &lines[i];
        let indent = line.indent();
        if indent >= 4 {
            return Ok((self.indented_code(parent, lines, i)?, false));
        }
        let rest = line.rest();
        if let Some(fence) = fence_open(rest) {
            return Ok((self.fenced_code(parent, lines, i, indent, fence)?, false));
        }
        if let Some((level, content)) = atx_header(rest) {
            self.header(parent, level, content)?;
            return Ok((i + 1, false));
        }
        if rest.starts_with('>') {
            return Ok((self.block_quote(parent, lines, i, depth)?, false));
        }
        if is_hrule(rest) {
            let hrule = self.tree.new_node(NodeKind::Hrule);
            self.tree.append_child(parent, hrule)?;
            return Ok((i + 1, false));
        }
        if let Some(marker) = list_marker(line) {
            return self.list(parent, lines, i, depth, marker);
        }
        if is_html_start(rest) {
            return Ok((self.html_block(parent, lines, i)?, false));
        }
        Ok((self.paragraph(parent, lines, i)?, false))
    }

    fn enter(&self, depth: usize, offset: usize) -> ParseResult<usize> {
        let depth = depth + 1;
        if depth > self.options.max_nesting {
            return Err(ParseError::nesting_too_deep(offset, self.options.max_nesting));
        }
        Ok(depth)
    }

    fn inlines(&mut self, parent: NodeId, text: &str) -> ParseResult<()> {
        let inlines = inline::parse_inlines(text);
        inline::emit(self.tree, parent, inlines, self.options.smart)?;
        Ok(())
    }

    fn header(&mut self, parent: NodeId, level: u8, content: &str) -> ParseResult<()> {
        let header = self
            .tree
            .new_node_with(NodeKind::Header, Payload::Header { level });
        self.tree.append_child(parent, header)?;
        self.inlines(header, content)
    }

    fn paragraph(&mut self, parent: NodeId, lines: &[Line], i: usize) -> ParseResult<usize> {
        let mut text = lines[i].rest().to_string();
        let mut j = i + 1;
        while j < lines.len() {
            let line = &lines[j];
            if line.is_blank() {
                break;
            }
            if let Some(level) = setext_level(line) {
                self.header(parent, level, text.trim_end())?;
                return Ok(j + 1);
            }
            if starts_block(line) {
                break;
            }
            text.push('\n');
            text.push_str(line.text.trim_start());
            j += 1;
        }

        let paragraph = self.tree.new_node(NodeKind::Paragraph);
        self.tree.append_child(parent, paragraph)?;
        self.inlines(paragraph, text.trim_end())?;
        Ok(j)
    }

    fn indented_code(&mut self, parent: NodeId, lines: &[Line], i: usize) -> ParseResult<usize> {
        let mut content = Vec::new();
        let mut end = i;
        let mut j = i;
        while j < lines.len() && (lines[j].is_blank() || lines[j].indent() >= 4) {
            content.push(lines[j].strip(4).text);
            if !lines[j].is_blank() {
                end = j + 1;
            }
            j += 1;
        }
        content.truncate(end - i);

        let mut literal = content.join("\n");
        literal.push('\n');
        self.code_block(parent, String::new(), literal)?;
        Ok(end)
    }

    fn fenced_code(
        &mut self,
        parent: NodeId,
        lines: &[Line],
        i: usize,
        indent: usize,
        fence: Fence,
    ) -> ParseResult<usize> {
        let mut literal = String::new();
        let mut j = i + 1;
        let mut closed = false;
        while j < lines.len() {
            if is_fence_close(&lines[j], &fence) {
                closed = true;
                break;
            }
            literal.push_str(&lines[j].strip(indent).text);
            literal.push('\n');
            j += 1;
        }
        self.code_block(parent, fence.info, literal)?;
        Ok(if closed { j + 1 } else { j })
    }

    fn code_block(&mut self, parent: NodeId, info: String, literal: String) -> ParseResult<()> {
        let code = self
            .tree
            .new_node_with(NodeKind::CodeBlock, Payload::CodeBlock { info, literal });
        self.tree.append_child(parent, code)?;
        Ok(())
    }

    fn html_block(&mut self, parent: NodeId, lines: &[Line], i: usize) -> ParseResult<usize> {
        let mut literal = String::new();
        let mut j = i;
        while j < lines.len() && !lines[j].is_blank() {
            literal.push_str(&lines[j].text);
            literal.push('\n');
            j += 1;
        }
        let html = self
            .tree
            .new_node_with(NodeKind::Html, Payload::Literal(literal));
        self.tree.append_child(parent, html)?;
        Ok(j)
    }

    fn block_quote(
        &mut self,
        parent: NodeId,
        lines: &[Line],
        i: usize,
        depth: usize,
    ) -> ParseResult<usize> {
        let depth = self.enter(depth, lines[i].offset)?;
        let mut inner: Vec<Line> = Vec::new();
        let mut j = i;
        while j < lines.len() {
            let line = &lines[j];
            if line.indent() < 4 && line.rest().starts_with('>') {
                let marker_end = line.indent() + 1;
                let skip = if line.text[marker_end..].starts_with(' ') { 1 } else { 0 };
                inner.push(line.tail(marker_end + skip));
            } else if !line.is_blank() && ends_in_paragraph(&inner) && !starts_block(line) {
                inner.push(line.strip(line.indent()));
            } else {
                break;
            }
            j += 1;
        }

        let quote = self.tree.new_node(NodeKind::BlockQuote);
        self.tree.append_child(parent, quote)?;
        self.parse_blocks(quote, &inner, depth)?;
        Ok(j)
    }

    fn list(
        &mut self,
        parent: NodeId,
        lines: &[Line],
        i: usize,
        depth: usize,
        first: ListMarker,
    ) -> ParseResult<(usize, bool)> {
        let depth = self.enter(depth, lines[i].offset)?;
        let list = self.tree.new_node_with(
            NodeKind::List,
            Payload::List {
                list_type: first.list_type,
                start: first.start,
                tight: true,
            },
        );
        self.tree.append_child(parent, list)?;

        let mut tight = true;
        let mut j = i;
        let mut marker = first;
        loop {
            let (item_lines, next, trailing_blank) = collect_item(lines, j, &marker);
            let item = self.tree.new_node(NodeKind::Item);
            self.tree.append_child(list, item)?;
            if self.parse_blocks(item, &item_lines, depth)? {
                tight = false;
            }
            j = next;

            let continues = lines.get(j).and_then(|line| {
                list_marker(line).filter(|m| {
                    m.list_type == first.list_type
                        && m.delim == first.delim
                        && !is_hrule(line.rest())
                })
            });
            match continues {
                Some(next_marker) => {
                    if trailing_blank {
                        tight = false;
                    }
                    marker = next_marker;
                }
                None => {
                    self.tree.set_list_tight(list, tight)?;
                    return Ok((j, trailing_blank));
                }
            }
        }
    }
}

/// Lines belonging to the list item that starts at `lines[i]`, with the
/// content indent removed. Trailing blank lines are dropped and reported.
fn collect_item(lines: &[Line], i: usize, marker: &ListMarker) -> (Vec<Line>, usize, bool) {
    let width = marker.content_indent;
    let mut out = vec![lines[i].tail(width)];
    let mut j = i + 1;
    while j < lines.len() {
        let line = &lines[j];
        if line.is_blank() {
            if marker.empty && out.len() == 1 {
                break;
            }
            out.push(Line {
                text: String::new(),
                offset: line.offset,
            });
        } else if line.indent() >= width {
            out.push(line.strip(width));
        } else if list_marker(line)
            .is_some_and(|m| m.list_type == marker.list_type && m.delim == marker.delim)
        {
            break;
        } else if ends_in_paragraph(&out) && !starts_block(line) {
            out.push(line.strip(line.indent()));
        } else {
            break;
        }
        j += 1;
    }

    let mut trailing = 0;
    while out.len() > 1 && out.last().is_some_and(Line::is_blank) {
        out.pop();
        trailing += 1;
    }
    (out, j, trailing > 0)
}
