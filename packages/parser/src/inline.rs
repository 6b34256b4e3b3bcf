//! Inline parsing: code spans, emphasis, links, images, autolinks, raw HTML
//! and line breaks inside a paragraph or header.
//!
//! Tokens are collected into a flat list of pieces. Delimiter runs and
//! bracket openers stay as placeholder pieces until a closer resolves them;
//! whatever is still unresolved at the end turns back into literal text.

use crate::lexer::{Cursor, Token};
use mdtree_tree::{NodeId, NodeKind, Payload, Tree, TreeResult};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Inline {
    Text(String),
    Code(String),
    Html(String),
    SoftBreak,
    LineBreak,
    Emph(Vec<Inline>),
    Strong(Vec<Inline>),
    Link {
        url: String,
        title: String,
        children: Vec<Inline>,
    },
    Image {
        url: String,
        title: String,
        children: Vec<Inline>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Delim {
    ch: char,
    count: usize,
    orig: usize,
    can_open: bool,
    can_close: bool,
}

#[derive(Debug)]
enum Piece {
    Inline(Inline),
    Delim(Delim),
    Bracket { image: bool, active: bool },
}

impl Piece {
    fn into_inline(self) -> Inline {
        match self {
            Piece::Inline(inline) => inline,
            Piece::Delim(d) => Inline::Text(d.ch.to_string().repeat(d.count)),
            Piece::Bracket { image: true, .. } => Inline::Text("![".to_string()),
            Piece::Bracket { image: false, .. } => Inline::Text("[".to_string()),
        }
    }
}

struct LinkTail {
    url: String,
    title: String,
    end: usize,
}

pub(crate) fn parse_inlines(source: &str) -> Vec<Inline> {
    InlineParser::new(source).run()
}

struct InlineParser<'s> {
    source: &'s str,
    cursor: Cursor<'s>,
    pieces: Vec<Piece>,
    brackets: Vec<usize>,
}

impl<'s> InlineParser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            cursor: Cursor::new(source),
            pieces: Vec::new(),
            brackets: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Inline> {
        while let Some((token, span)) = self.cursor.next_token() {
            match token {
                Token::Text(text) | Token::Spaces(text) | Token::Escaped(text) => {
                    self.push_text(text)
                }
                Token::Backslash => self.push_text("\\"),
                Token::Bang => self.push_text("!"),
                Token::Lt => self.push_text("<"),
                Token::HardBreak => self.push(Inline::LineBreak),
                Token::SoftBreak => self.push(Inline::SoftBreak),
                Token::Backticks(len) => self.code_span(len, span),
                Token::Stars(len) => self.delimiter_run('*', len, span),
                Token::Underscores(len) => self.delimiter_run('_', len, span),
                Token::LinkOpen | Token::ImageOpen => {
                    self.brackets.push(self.pieces.len());
                    self.pieces.push(Piece::Bracket {
                        image: token == Token::ImageOpen,
                        active: true,
                    });
                }
                Token::CloseBracket => self.close_bracket(span),
                Token::UriAutolink(url) => self.push(Inline::Link {
                    url: url.to_string(),
                    title: String::new(),
                    children: vec![Inline::Text(url.to_string())],
                }),
                Token::EmailAutolink(address) => self.push(Inline::Link {
                    url: format!("mailto:{address}"),
                    title: String::new(),
                    children: vec![Inline::Text(address.to_string())],
                }),
                Token::HtmlTag(raw) => self.push(Inline::Html(raw.to_string())),
            }
        }
        process_emphasis(&mut self.pieces, 0);
        finish(self.pieces)
    }

    fn push(&mut self, inline: Inline) {
        self.pieces.push(Piece::Inline(inline));
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Piece::Inline(Inline::Text(last))) = self.pieces.last_mut() {
            last.push_str(text);
        } else {
            self.push(Inline::Text(text.to_string()));
        }
    }

    fn code_span(&mut self, len: usize, span: Range<usize>) {
        match find_backtick_run(self.source, span.end, len) {
            Some(close) => {
                let raw = &self.source[span.end..close];
                self.push(Inline::Code(normalize_code(raw)));
                self.cursor.seek(close + len);
            }
            None => self.push_text(&"`".repeat(len)),
        }
    }

    fn delimiter_run(&mut self, ch: char, len: usize, span: Range<usize>) {
        let before = self.source[..span.start].chars().next_back();
        let after = self.source[span.end..].chars().next();
        let (left, right) = flanking(before, after);
        let (can_open, can_close) = if ch == '*' {
            (left, right)
        } else {
            (
                left && (!right || before.is_some_and(is_punctuation)),
                right && (!left || after.is_some_and(is_punctuation)),
            )
        };
        self.pieces.push(Piece::Delim(Delim {
            ch,
            count: len,
            orig: len,
            can_open,
            can_close,
        }));
    }

    fn close_bracket(&mut self, span: Range<usize>) {
        let Some(opener) = self.brackets.pop() else {
            self.push_text("]");
            return;
        };
        let Piece::Bracket { image, active } = self.pieces[opener] else {
            self.push_text("]");
            return;
        };

        let tail = if active {
            parse_link_tail(self.source, span.end)
        } else {
            None
        };
        let Some(tail) = tail else {
            self.pieces[opener] = Piece::Bracket { image, active }.into_inline().into();
            self.push_text("]");
            return;
        };

        process_emphasis(&mut self.pieces, opener + 1);
        let children = finish(self.pieces.drain(opener + 1..).collect());
        self.pieces.truncate(opener);
        self.push(if image {
            Inline::Image {
                url: tail.url,
                title: tail.title,
                children,
            }
        } else {
            Inline::Link {
                url: tail.url,
                title: tail.title,
                children,
            }
        });

        // Links may not contain other links.
        if !image {
            for &index in &self.brackets {
                if let Piece::Bracket {
                    image: false,
                    active,
                } = &mut self.pieces[index]
                {
                    *active = false;
                }
            }
        }
        self.cursor.seek(tail.end);
    }
}

impl From<Inline> for Piece {
    fn from(inline: Inline) -> Self {
        Piece::Inline(inline)
    }
}

fn finish(pieces: Vec<Piece>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match (piece.into_inline(), out.last_mut()) {
            (Inline::Text(text), Some(Inline::Text(last))) => last.push_str(&text),
            (inline, _) => out.push(inline),
        }
    }
    out
}

/// Resolve emphasis among the pieces at `bottom..`.
fn process_emphasis(pieces: &mut Vec<Piece>, bottom: usize) {
    let mut i = bottom;
    while i < pieces.len() {
        let closer = match pieces[i] {
            Piece::Delim(d) if d.can_close && d.count > 0 => d,
            _ => {
                i += 1;
                continue;
            }
        };

        let opener = (bottom..i).rev().find(|&j| match pieces[j] {
            Piece::Delim(o) => {
                o.ch == closer.ch && o.can_open && o.count > 0 && !odd_match(&o, &closer)
            }
            _ => false,
        });
        let Some(j) = opener else {
            i += 1;
            continue;
        };

        let Piece::Delim(open) = pieces[j] else {
            i += 1;
            continue;
        };
        let used = if open.count >= 2 && closer.count >= 2 { 2 } else { 1 };
        let open_left = open.count - used;
        let close_left = closer.count - used;

        let children = finish(pieces.drain(j + 1..i).collect());
        let wrapped = if used == 2 {
            Inline::Strong(children)
        } else {
            Inline::Emph(children)
        };
        pieces.insert(j + 1, Piece::Inline(wrapped));

        let mut closer_at = j + 2;
        if let Piece::Delim(d) = &mut pieces[closer_at] {
            d.count = close_left;
        }
        if open_left == 0 {
            pieces.remove(j);
            closer_at -= 1;
        } else if let Piece::Delim(d) = &mut pieces[j] {
            d.count = open_left;
        }
        if close_left == 0 {
            pieces.remove(closer_at);
        }
        i = closer_at;
    }
}

/// The "multiple of three" rule for runs that can both open and close.
fn odd_match(opener: &Delim, closer: &Delim) -> bool {
    (opener.can_close || closer.can_open)
        && (opener.orig + closer.orig) % 3 == 0
        && !(opener.orig % 3 == 0 && closer.orig % 3 == 0)
}

fn flanking(before: Option<char>, after: Option<char>) -> (bool, bool) {
    let space = |c: Option<char>| c.map_or(true, char::is_whitespace);
    let punct = |c: Option<char>| c.is_some_and(is_punctuation);
    let left = !space(after) && (!punct(after) || space(before) || punct(before));
    let right = !space(before) && (!punct(before) || space(after) || punct(after));
    (left, right)
}

pub(crate) fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace())
}

/// Start of the next backtick run of exactly `len` at or after `from`.
fn find_backtick_run(source: &str, from: usize, len: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        if i - start == len {
            return Some(start);
        }
    }
    None
}

fn normalize_code(raw: &str) -> String {
    let text = raw.replace('\n', " ");
    let stripped = text.len() >= 2
        && text.starts_with(' ')
        && text.ends_with(' ')
        && text.bytes().any(|b| b != b' ');
    if stripped {
        text[1..text.len() - 1].to_string()
    } else {
        text
    }
}

fn skip_spaces(source: &str, mut pos: usize) -> usize {
    let bytes = source.as_bytes();
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n') {
        pos += 1;
    }
    pos
}

/// Parse `(destination "title")` starting at `pos`.
fn parse_link_tail(source: &str, pos: usize) -> Option<LinkTail> {
    if source.as_bytes().get(pos) != Some(&b'(') {
        return None;
    }
    let start = skip_spaces(source, pos + 1);
    let (url, dest_end) = if source[start..].starts_with('<') {
        angle_destination(source, start + 1)?
    } else {
        plain_destination(source, start)
    };

    let mut pos = skip_spaces(source, dest_end);
    let mut title = String::new();
    if pos > dest_end {
        if let Some(open @ (b'"' | b'\'' | b'(')) = source.as_bytes().get(pos).copied() {
            let close = if open == b'(' { ')' } else { open as char };
            let (text, end) = delimited(source, pos + 1, close)?;
            title = text;
            pos = skip_spaces(source, end);
        }
    }

    if source.as_bytes().get(pos) == Some(&b')') {
        Some(LinkTail {
            url,
            title,
            end: pos + 1,
        })
    } else {
        None
    }
}

fn angle_destination(source: &str, start: usize) -> Option<(String, usize)> {
    let mut url = String::new();
    let mut chars = source[start..].char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '>' => return Some((url, start + offset + 1)),
            '\n' | '<' => return None,
            '\\' if chars.peek().is_some_and(|&(_, n)| n.is_ascii_punctuation()) => {
                if let Some((_, escaped)) = chars.next() {
                    url.push(escaped);
                }
            }
            c => url.push(c),
        }
    }
    None
}

fn plain_destination(source: &str, start: usize) -> (String, usize) {
    let mut url = String::new();
    let mut depth = 0usize;
    let mut chars = source[start..].char_indices().peekable();
    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c == ' ' || c.is_control() => return (url, start + offset),
            '(' => depth += 1,
            ')' if depth == 0 => return (url, start + offset),
            ')' => depth -= 1,
            '\\' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, n)) if n.is_ascii_punctuation() => {
                        url.push(n);
                        chars.next();
                    }
                    _ => url.push('\\'),
                }
                continue;
            }
            _ => {}
        }
        url.push(c);
        chars.next();
    }
    (url, source.len())
}

/// Text up to an unescaped `close`, with backslash escapes resolved.
fn delimited(source: &str, start: usize, close: char) -> Option<(String, usize)> {
    let mut text = String::new();
    let mut chars = source[start..].char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if c == close {
            return Some((text, start + offset + 1));
        }
        if c == '\\' && chars.peek().is_some_and(|&(_, n)| n.is_ascii_punctuation()) {
            if let Some((_, escaped)) = chars.next() {
                text.push(escaped);
            }
            continue;
        }
        text.push(c);
    }
    None
}

/// Typographic punctuation for `smart` parsing.
pub(crate) fn smarten(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let opening = i == 0 || {
            let prev = chars[i - 1];
            prev.is_whitespace() || matches!(prev, '(' | '[' | '{' | '-')
        };
        match c {
            '"' => out.push(if opening { '\u{201C}' } else { '\u{201D}' }),
            '\'' => out.push(if opening { '\u{2018}' } else { '\u{2019}' }),
            '.' if chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') => {
                out.push('\u{2026}');
                i += 3;
                continue;
            }
            '-' => {
                let mut run = chars[i..].iter().take_while(|&&d| d == '-').count();
                i += run;
                while run >= 3 {
                    out.push('\u{2014}');
                    run -= 3;
                }
                match run {
                    2 => out.push('\u{2013}'),
                    1 => out.push('-'),
                    _ => {}
                }
                continue;
            }
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Append `inlines` to `parent` as tree nodes.
pub(crate) fn emit(
    tree: &mut Tree,
    parent: NodeId,
    inlines: Vec<Inline>,
    smart: bool,
) -> TreeResult<()> {
    for inline in inlines {
        let node = match inline {
            Inline::Text(text) => {
                let text = if smart { smarten(&text) } else { text };
                tree.new_node_with(NodeKind::Text, Payload::Literal(text))
            }
            Inline::Code(code) => tree.new_node_with(NodeKind::Code, Payload::Literal(code)),
            Inline::Html(raw) => tree.new_node_with(NodeKind::InlineHtml, Payload::Literal(raw)),
            Inline::SoftBreak => tree.new_node(NodeKind::Softbreak),
            Inline::LineBreak => tree.new_node(NodeKind::Linebreak),
            Inline::Emph(children) => {
                let node = tree.new_node(NodeKind::Emph);
                emit(tree, node, children, smart)?;
                node
            }
            Inline::Strong(children) => {
                let node = tree.new_node(NodeKind::Strong);
                emit(tree, node, children, smart)?;
                node
            }
            Inline::Link {
                url,
                title,
                children,
            } => {
                let node = tree.new_node_with(NodeKind::Link, Payload::Link { url, title });
                emit(tree, node, children, smart)?;
                node
            }
            Inline::Image {
                url,
                title,
                children,
            } => {
                let node = tree.new_node_with(NodeKind::Image, Payload::Link { url, title });
                emit(tree, node, children, smart)?;
                node
            }
        };
        tree.append_child(parent, node)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_emphasis_and_strong() {
        assert_eq!(
            parse_inlines("a *b* **c**"),
            vec![
                text("a "),
                Inline::Emph(vec![text("b")]),
                text(" "),
                Inline::Strong(vec![text("c")]),
            ]
        );
    }

    #[test]
    fn test_triple_star_nests() {
        assert_eq!(
            parse_inlines("***x***"),
            vec![Inline::Emph(vec![Inline::Strong(vec![text("x")])])]
        );
    }

    #[test]
    fn test_intraword_underscore_is_literal() {
        assert_eq!(parse_inlines("snake_case_name"), vec![text("snake_case_name")]);
    }

    #[test]
    fn test_unmatched_delimiters_stay_text() {
        assert_eq!(parse_inlines("a * b"), vec![text("a * b")]);
        assert_eq!(parse_inlines("**a*"), vec![text("*"), Inline::Emph(vec![text("a")])]);
    }

    #[test]
    fn test_code_span() {
        assert_eq!(
            parse_inlines("`a *b*` c"),
            vec![Inline::Code("a *b*".to_string()), text(" c")]
        );
        assert_eq!(parse_inlines("`` ` ``"), vec![Inline::Code("`".to_string())]);
        assert_eq!(parse_inlines("`open"), vec![text("`open")]);
    }

    #[test]
    fn test_link_with_title() {
        assert_eq!(
            parse_inlines("[a *b*](/url \"T\")!"),
            vec![
                Inline::Link {
                    url: "/url".to_string(),
                    title: "T".to_string(),
                    children: vec![text("a "), Inline::Emph(vec![text("b")])],
                },
                text("!"),
            ]
        );
    }

    #[test]
    fn test_link_destination_with_parens_and_angle_form() {
        let parsed = parse_inlines("[x](a(b)c) [y](<d e>)");
        assert!(matches!(&parsed[0], Inline::Link { url, .. } if url == "a(b)c"));
        assert!(matches!(&parsed[2], Inline::Link { url, .. } if url == "d e"));
    }

    #[test]
    fn test_bracket_without_destination_is_text() {
        assert_eq!(parse_inlines("[a] b"), vec![text("[a] b")]);
    }

    #[test]
    fn test_image_and_autolinks() {
        let parsed = parse_inlines("![alt](i.png) <a@b.org>");
        assert!(matches!(&parsed[0], Inline::Image { url, .. } if url == "i.png"));
        assert!(matches!(&parsed[2], Inline::Link { url, .. } if url == "mailto:a@b.org"));
    }

    #[test]
    fn test_no_links_inside_links() {
        let parsed = parse_inlines("[a [b](c) d](e)");
        assert_eq!(parsed[0], text("[a "));
        assert!(matches!(&parsed[1], Inline::Link { url, .. } if url == "c"));
        assert_eq!(parsed[2], text(" d](e)"));
    }

    #[test]
    fn test_smart_punctuation() {
        assert_eq!(
            smarten("\"Hi\" -- it's... a---b"),
            "\u{201C}Hi\u{201D} \u{2013} it\u{2019}s\u{2026} a\u{2014}b"
        );
    }
}
