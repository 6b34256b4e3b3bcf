use mdtree_tree::{ListType, NodeId, NodeKind, Tree, TreeResult};

use crate::inline::is_punctuation;

/// Serializer converts a tree back to CommonMark text.
///
/// Output is normalized rather than source-preserving: bullets become `-`,
/// code blocks are always fenced, emphasis prefers `*`. Parsing the output
/// yields a structurally identical tree.
pub struct Serializer<'t> {
    tree: &'t Tree,
}

impl<'t> Serializer<'t> {
    pub fn new(tree: &'t Tree) -> Self {
        Self { tree }
    }

    /// Serialize the subtree rooted at `node`.
    pub fn serialize(&self, node: NodeId) -> TreeResult<String> {
        let mut output = if self.tree.kind(node)?.is_block() {
            self.block(node, false)?
        } else {
            let mut out = String::new();
            let mut line_start = true;
            self.inline(node, &mut out, &mut line_start, false)?;
            out
        };
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        Ok(output)
    }

    fn blocks(&self, parent: NodeId, tight: bool) -> TreeResult<String> {
        let mut output = String::new();
        let mut prev: Option<NodeKind> = None;
        let mut list_run = 0usize;
        let mut prev_list_type = None;

        for child in self.tree.children(parent) {
            let kind = self.tree.kind(child)?;

            // Adjacent lists of the same type would merge on reparse, so
            // alternate the marker character between them.
            let list_type = match kind {
                NodeKind::List => Some(self.tree.list_type(child)?),
                _ => None,
            };
            if list_type.is_some() && list_type == prev_list_type {
                list_run += 1;
            } else {
                list_run = 0;
            }
            prev_list_type = list_type;

            let text = self.block(child, list_run % 2 == 1)?;
            if let Some(prev) = prev {
                let both_paragraphs = prev == NodeKind::Paragraph && kind == NodeKind::Paragraph;
                output.push_str(if tight && !both_paragraphs { "\n" } else { "\n\n" });
            }
            output.push_str(&text);
            prev = Some(kind);
        }
        Ok(output)
    }

    fn block(&self, id: NodeId, alternate: bool) -> TreeResult<String> {
        match self.tree.kind(id)? {
            NodeKind::Document | NodeKind::Item => self.blocks(id, false),
            NodeKind::BlockQuote => Ok(prefix_lines(&self.blocks(id, false)?)),
            NodeKind::List => self.list(id, alternate),
            NodeKind::CodeBlock => Ok(code_block(
                self.tree.fence_info(id)?,
                self.tree.literal(id)?,
            )),
            NodeKind::Html => Ok(self.tree.literal(id)?.trim_end_matches('\n').to_string()),
            NodeKind::Paragraph => self.inline_content(id),
            NodeKind::Header => {
                let level = self.tree.header_level(id)? as usize;
                let content = self.inline_content(id)?;
                // Only setext headers can carry line breaks.
                if level <= 2 && content.contains('\n') {
                    let underline = if level == 1 { "===" } else { "---" };
                    return Ok(format!("{content}\n{underline}"));
                }
                let mut content = content.replace('\n', " ");
                if content.ends_with('#') {
                    content.insert(content.len() - 1, '\\');
                }
                Ok(format!("{} {}", "#".repeat(level), content))
            }
            NodeKind::Hrule => Ok("***".to_string()),
            _ => {
                let mut out = String::new();
                let mut line_start = true;
                self.inline(id, &mut out, &mut line_start, false)?;
                Ok(out)
            }
        }
    }

    fn list(&self, id: NodeId, alternate: bool) -> TreeResult<String> {
        let list_type = self.tree.list_type(id)?;
        let tight = self.tree.list_tight(id)?;
        let start = match list_type {
            ListType::Ordered => u64::from(self.tree.list_start(id)?),
            ListType::Bullet => 1,
        };

        let mut output = String::new();
        for (n, item) in self.tree.children(id).enumerate() {
            let marker = match list_type {
                ListType::Bullet if alternate => "* ".to_string(),
                ListType::Bullet => "- ".to_string(),
                ListType::Ordered => {
                    let delim = if alternate { ')' } else { '.' };
                    format!("{}{delim} ", start + n as u64)
                }
            };
            if n > 0 {
                output.push_str(if tight { "\n" } else { "\n\n" });
            }
            let body = self.blocks(item, tight)?;
            output.push_str(&hang(&marker, &body));
        }
        Ok(output)
    }

    fn inline_content(&self, parent: NodeId) -> TreeResult<String> {
        let mut out = String::new();
        let mut line_start = true;
        self.inline_children(parent, &mut out, &mut line_start, false)?;
        Ok(out)
    }

    fn inline_children(
        &self,
        parent: NodeId,
        out: &mut String,
        line_start: &mut bool,
        in_emph: bool,
    ) -> TreeResult<()> {
        for child in self.tree.children(parent) {
            self.inline(child, out, line_start, in_emph)?;
        }
        Ok(())
    }

    fn inline(
        &self,
        id: NodeId,
        out: &mut String,
        line_start: &mut bool,
        in_emph: bool,
    ) -> TreeResult<()> {
        match self.tree.kind(id)? {
            NodeKind::Text => {
                let text = self.tree.literal(id)?;
                if !text.is_empty() {
                    escape_text(text, *line_start, out);
                    *line_start = false;
                }
            }
            NodeKind::Softbreak => {
                out.push('\n');
                *line_start = true;
            }
            NodeKind::Linebreak => {
                out.push_str("\\\n");
                *line_start = true;
            }
            NodeKind::Code => {
                out.push_str(&code_span(self.tree.literal(id)?));
                *line_start = false;
            }
            NodeKind::InlineHtml => {
                out.push_str(self.tree.literal(id)?);
                *line_start = false;
            }
            NodeKind::Emph => {
                let delim = if in_emph { '_' } else { self.delimiter(id, out)? };
                out.push(delim);
                *line_start = false;
                self.inline_children(id, out, line_start, true)?;
                out.push(delim);
            }
            NodeKind::Strong => {
                let delim = self.delimiter(id, out)?.to_string().repeat(2);
                out.push_str(&delim);
                *line_start = false;
                self.inline_children(id, out, line_start, false)?;
                out.push_str(&delim);
            }
            NodeKind::Link => {
                *line_start = false;
                if let Some(autolink) = self.autolink(id)? {
                    out.push_str(&autolink);
                } else {
                    out.push('[');
                    self.inline_children(id, out, line_start, in_emph)?;
                    out.push(']');
                    out.push_str(&destination(self.tree.url(id)?, self.tree.title(id)?));
                }
            }
            NodeKind::Image => {
                *line_start = false;
                out.push_str("![");
                self.inline_children(id, out, line_start, in_emph)?;
                out.push(']');
                out.push_str(&destination(self.tree.url(id)?, self.tree.title(id)?));
            }
            _ => {}
        }
        Ok(())
    }

    /// Pick `*` or `_` so the run cannot fuse with a neighbouring
    /// delimiter run. `_` is only usable where it is not intraword.
    fn delimiter(&self, id: NodeId, out: &str) -> TreeResult<char> {
        let before = out.chars().next_back();
        let next = self.tree.next(id)?;
        let next_kind = next.map(|n| self.tree.kind(n)).transpose()?;
        let after = match (next, next_kind) {
            (Some(n), Some(NodeKind::Text)) => self.tree.literal(n)?.chars().next(),
            (_, Some(NodeKind::Softbreak | NodeKind::Linebreak)) | (_, None) => None,
            _ => Some('*'),
        };

        let underscore_ok = before != Some('_')
            && !before.is_some_and(is_word_char)
            && !after.is_some_and(is_word_char);
        let star_ok = before != Some('*');
        let next_delimited = matches!(next_kind, Some(NodeKind::Emph | NodeKind::Strong));
        Ok(if underscore_ok && (!star_ok || next_delimited) { '_' } else { '*' })
    }

    /// `<url>` form for links whose only text is their own destination.
    fn autolink(&self, id: NodeId) -> TreeResult<Option<String>> {
        let url = self.tree.url(id)?;
        if url.is_empty() || !self.tree.title(id)?.is_empty() {
            return Ok(None);
        }
        let mut children = self.tree.children(id);
        let (Some(only), None) = (children.next(), children.next()) else {
            return Ok(None);
        };
        if self.tree.kind(only)? != NodeKind::Text {
            return Ok(None);
        }
        let text = self.tree.literal(only)?;
        if text == url && is_uri(url) {
            return Ok(Some(format!("<{url}>")));
        }
        if url.strip_prefix("mailto:") == Some(text) && is_email(text) {
            return Ok(Some(format!("<{text}>")));
        }
        Ok(None)
    }
}

pub fn serialize(tree: &Tree, node: NodeId) -> TreeResult<String> {
    Serializer::new(tree).serialize(node)
}

fn prefix_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Put `marker` before the first line and indent the rest to match.
fn hang(marker: &str, body: &str) -> String {
    if body.is_empty() {
        return marker.trim_end().to_string();
    }
    let pad = " ".repeat(marker.len());
    let mut out = String::new();
    for (i, line) in body.split('\n').enumerate() {
        if i == 0 {
            out.push_str(marker);
        } else {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&pad);
            }
        }
        out.push_str(line);
    }
    out
}

fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn code_block(info: &str, literal: &str) -> String {
    let ch = if info.contains('`') { '~' } else { '`' };
    let fence = ch.to_string().repeat((longest_run(literal, ch) + 1).max(3));
    let gap = if info.starts_with(ch) { " " } else { "" };
    let mut out = format!("{fence}{gap}{info}\n");
    out.push_str(literal);
    if !literal.is_empty() && !literal.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&fence);
    out
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !is_punctuation(c)
}

fn code_span(content: &str) -> String {
    let fence = "`".repeat(longest_run(content, '`') + 1);
    let pad = content.starts_with('`')
        || content.ends_with('`')
        || (content.starts_with(' ') && content.ends_with(' ') && content.trim() != "");
    let space = if pad { " " } else { "" };
    format!("{fence}{space}{content}{space}{fence}")
}

fn escape_text(text: &str, line_start: bool, out: &mut String) {
    let mut rest = text;
    if line_start {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && matches!(rest.as_bytes().get(digits), Some(b'.' | b')')) {
            out.push_str(&rest[..digits]);
            out.push('\\');
            rest = &rest[digits..];
        } else if rest.starts_with(['#', '>', '-', '+', '=', '~']) {
            out.push('\\');
        }
    }

    let last = rest.char_indices().last().map(|(i, _)| i);
    for (i, c) in rest.char_indices() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' => out.push('\\'),
            '!' if Some(i) == last => out.push('\\'),
            _ => {}
        }
        out.push(c);
    }
}

fn destination(url: &str, title: &str) -> String {
    let mut out = String::from("(");
    let needs_angle = (url.is_empty() && !title.is_empty())
        || url.contains(|c: char| c == ' ' || c.is_control() || c == '<' || c == '>')
        || !balanced_parens(url);
    if needs_angle {
        out.push('<');
        for c in url.chars() {
            if matches!(c, '<' | '>' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('>');
    } else {
        for c in url.chars() {
            if c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
    }
    if !title.is_empty() {
        out.push_str(" \"");
        for c in title.chars() {
            if matches!(c, '"' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
    out.push(')');
    out
}

fn balanced_parens(url: &str) -> bool {
    let mut depth = 0i32;
    for c in url.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn is_uri(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme.len() >= 2
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
        && !rest.contains(|c: char| c == ' ' || c == '<' || c == '>' || c == '\n')
}

fn is_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ".!#$%&'*+/=?^_{|}~-".contains(c))
        && !domain.is_empty()
        && domain
            .split('.')
            .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_line_start() {
        let mut out = String::new();
        escape_text("1. not a list", true, &mut out);
        assert_eq!(out, "1\\. not a list");

        let mut out = String::new();
        escape_text("# not a header", true, &mut out);
        assert_eq!(out, "\\# not a header");

        let mut out = String::new();
        escape_text("# mid line", false, &mut out);
        assert_eq!(out, "# mid line");
    }

    #[test]
    fn test_escape_inline_specials() {
        let mut out = String::new();
        escape_text("a*b_c[d]e`f<g\\h!", false, &mut out);
        assert_eq!(out, "a\\*b\\_c\\[d\\]e\\`f\\<g\\\\h\\!");
    }

    #[test]
    fn test_code_block_fence_outgrows_content() {
        assert_eq!(code_block("", "````\n"), "`````\n````\n`````");
        assert_eq!(code_block("a`b", "x\n"), "~~~a`b\nx\n~~~");
        assert_eq!(code_block("~~~`x", "x\n"), "~~~ ~~~`x\nx\n~~~");
    }

    #[test]
    fn test_code_span_padding() {
        assert_eq!(code_span("x"), "`x`");
        assert_eq!(code_span("`"), "`` ` ``");
        assert_eq!(code_span(" a "), "`  a  `");
    }

    #[test]
    fn test_destination_forms() {
        assert_eq!(destination("/a", ""), "(/a)");
        assert_eq!(destination("/a b", "t \"q\""), "(</a b> \"t \\\"q\\\"\")");
        assert_eq!(destination("", "t"), "(<> \"t\")");
    }

    #[test]
    fn test_hang_indents_continuation_lines() {
        assert_eq!(hang("- ", "a\n\nb"), "- a\n\n  b");
        assert_eq!(hang("10. ", ""), "10.");
    }
}
