use mdtree_tree::TreeError;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Nesting too deep at {pos}: more than {limit} levels")]
    NestingTooDeep { pos: usize, limit: usize },

    #[error("Invalid UTF-8 at byte {pos}")]
    InvalidUtf8 { pos: usize },

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

impl ParseError {
    pub fn nesting_too_deep(pos: usize, limit: usize) -> Self {
        Self::NestingTooDeep { pos, limit }
    }

    pub fn invalid_utf8(pos: usize) -> Self {
        Self::InvalidUtf8 { pos }
    }

    /// Byte offset the error points at, if it has one.
    pub fn pos(&self) -> Option<usize> {
        match self {
            ParseError::NestingTooDeep { pos, .. } | ParseError::InvalidUtf8 { pos } => Some(*pos),
            ParseError::Tree(_) => None,
        }
    }
}

#[cfg(feature = "pretty-errors")]
pub mod pretty {
    use super::ParseError;
    use ariadne::{Color, Label, Report, ReportKind, Source};

    /// Render `error` against `source` with a labelled excerpt.
    pub fn format_error(error: &ParseError, filename: &str, source: &str) -> String {
        let start = error
            .pos()
            .unwrap_or(0)
            .min(source.len().saturating_sub(1));
        let end = (start + 1).min(source.len()).max(start);

        let label = match error {
            ParseError::NestingTooDeep { limit, .. } => format!("nesting exceeds {limit} here"),
            ParseError::InvalidUtf8 { .. } => "invalid byte sequence".to_string(),
            ParseError::Tree(err) => err.to_string(),
        };

        let mut output = Vec::new();
        let report = Report::build(ReportKind::Error, filename, start)
            .with_message(error.to_string())
            .with_label(
                Label::new((filename, start..end))
                    .with_color(Color::Red)
                    .with_message(label),
            )
            .finish();

        if report
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            return error.to_string();
        }
        String::from_utf8(output).unwrap_or_else(|_| error.to_string())
    }
}
