//! Inline lexer built on logos.
//!
//! Block structure is recognised line by line in `block.rs`; only the text of
//! paragraphs and headers goes through this lexer.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    #[regex(r"[^\\`*_\[\]!<\n ]+", |lex| lex.slice())]
    Text(&'src str),

    #[regex(r" +", |lex| lex.slice())]
    Spaces(&'src str),

    #[regex(r"  +\n")]
    #[token("\\\n")]
    HardBreak,

    #[regex(r" ?\n")]
    SoftBreak,

    /// Backslash followed by ASCII punctuation; carries the escaped char.
    #[regex(r"\\[!-/:-@\[-`{-~]", |lex| &lex.slice()[1..])]
    Escaped(&'src str),

    #[token("\\")]
    Backslash,

    #[regex(r"`+", |lex| lex.slice().len())]
    Backticks(usize),

    #[regex(r"\*+", |lex| lex.slice().len())]
    Stars(usize),

    #[regex(r"_+", |lex| lex.slice().len())]
    Underscores(usize),

    #[token("![")]
    ImageOpen,

    #[token("[")]
    LinkOpen,

    #[token("]")]
    CloseBracket,

    #[token("!")]
    Bang,

    #[regex(r"<[A-Za-z][A-Za-z0-9+.\-]+:[^<> \n]*>", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    UriAutolink(&'src str),

    #[regex(r"<[A-Za-z0-9.!#$%&'*+/=?^_{|}~\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*>", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    EmailAutolink(&'src str),

    #[regex(r#"<[A-Za-z][A-Za-z0-9\-]*([ \n]+[A-Za-z_:][A-Za-z0-9_.:\-]*([ \n]*=[ \n]*([^ \n"'=<>`]+|'[^']*'|"[^"]*"))?)*[ \n]*/?>"#, |lex| lex.slice())]
    #[regex(r"</[A-Za-z][A-Za-z0-9\-]*[ \n]*>", |lex| lex.slice())]
    #[regex(r"<!--([^-]|-[^-])*-->", |lex| lex.slice())]
    HtmlTag(&'src str),

    #[token("<")]
    Lt,
}

/// Token stream that can be repositioned.
///
/// Link destinations and code spans are scanned straight from the source,
/// after which lexing resumes at the first byte past the construct.
pub struct Cursor<'src> {
    source: &'src str,
    base: usize,
    lexer: logos::Lexer<'src, Token<'src>>,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            base: 0,
            lexer: Token::lexer(source),
        }
    }

    pub fn seek(&mut self, pos: usize) {
        let pos = pos.min(self.source.len());
        self.base = pos;
        self.lexer = Token::lexer(&self.source[pos..]);
    }

    /// Next token and its absolute byte range. Bytes the lexer rejects come
    /// back as `Text`.
    pub fn next_token(&mut self) -> Option<(Token<'src>, Range<usize>)> {
        let result = self.lexer.next()?;
        let span = self.lexer.span();
        let range = self.base + span.start..self.base + span.end;
        let token = result.unwrap_or(Token::Text(&self.source[range.clone()]));
        Some((token, range))
    }
}

#[cfg(test)]
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut cursor = Cursor::new(source);
    std::iter::from_fn(|| cursor.next_token().map(|(token, _)| token)).collect()
}
