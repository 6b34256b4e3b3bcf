use crate::heap::WrapperId;
use mdtree_parser::ParseError;
use mdtree_tree::{EditError, Field, KindError, NodeId, TreeError};
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid edit: {0}")]
    InvalidEdit(EditError),

    #[error(transparent)]
    InvalidKind(KindError),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: Field, message: String },

    #[error("wrapper {0:?} has already been collected")]
    StaleWrapper(WrapperId),

    #[error("node {0:?} is no longer live")]
    StaleNode(NodeId),
}

impl From<TreeError> for RuntimeError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::StaleNode(id) => RuntimeError::StaleNode(id),
            TreeError::InvalidEdit(edit) => RuntimeError::InvalidEdit(edit),
            TreeError::InvalidKind(kind) => RuntimeError::InvalidKind(kind),
            TreeError::InvalidValue { field, message } => {
                RuntimeError::InvalidValue { field, message }
            }
        }
    }
}
