use crate::node::{NodeId, NodeKind};
use std::fmt;
use thiserror::Error;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("node {0:?} is no longer live")]
    StaleNode(NodeId),

    #[error("invalid edit: {0}")]
    InvalidEdit(#[from] EditError),

    #[error(transparent)]
    InvalidKind(#[from] KindError),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: Field, message: String },
}

/// Structural edits rejected by the tree primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("a node cannot be inserted relative to itself")]
    SameNode,

    #[error("would create a cycle")]
    Cycle,

    #[error("{parent} cannot contain {child}")]
    CannotContain { parent: NodeKind, child: NodeKind },

    #[error("anchor node has no parent")]
    Detached,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} is not available on {kind} nodes")]
pub struct KindError {
    pub field: Field,
    pub kind: NodeKind,
}

/// Kind-specific fields reachable through the accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Literal,
    Url,
    Title,
    HeaderLevel,
    ListType,
    ListStart,
    ListTight,
    FenceInfo,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Literal => "string_content",
            Field::Url => "url",
            Field::Title => "title",
            Field::HeaderLevel => "header_level",
            Field::ListType => "list_type",
            Field::ListStart => "list_start",
            Field::ListTight => "list_tight",
            Field::FenceInfo => "fence_info",
        })
    }
}

impl TreeError {
    pub fn invalid_value(field: Field, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
