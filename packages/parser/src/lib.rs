//! Markdown parser for mdtree.
//!
//! `parse` builds a fresh [`Tree`]; `parse_into` adds a new document root to
//! an existing one. Blocks are recognised line by line, inline content goes
//! through a logos lexer. [`serialize`] turns any subtree back into
//! CommonMark.

mod block;
pub mod error;
mod inline;
pub mod lexer;
pub mod options;
pub mod serializer;

#[cfg(test)]
mod tests_serializer;

pub use error::{ParseError, ParseResult};
pub use options::ParseOptions;
pub use serializer::{serialize, Serializer};

use block::{split_lines, BlockParser};
use mdtree_tree::{NodeId, NodeKind, Tree};
use tracing::{debug, instrument};

/// Parse `text` into a new tree and return it with its document root.
pub fn parse(text: &str, options: &ParseOptions) -> ParseResult<(Tree, NodeId)> {
    let mut tree = Tree::new();
    let doc = parse_into(&mut tree, text, options)?;
    Ok((tree, doc))
}

/// Parse `text` as a new document inside `tree`.
///
/// On failure every node created for the document is released again.
#[instrument(skip_all, fields(bytes = text.len()))]
pub fn parse_into(tree: &mut Tree, text: &str, options: &ParseOptions) -> ParseResult<NodeId> {
    let doc = tree.new_node(NodeKind::Document);
    let lines = split_lines(text);
    let result = BlockParser::new(tree, options).parse_blocks(doc, &lines, 0);
    match result {
        Ok(_) => {
            debug!(
                lines = lines.len(),
                nodes = tree.subtree_size(doc)?,
                "parsed document"
            );
            Ok(doc)
        }
        Err(err) => {
            tree.free_subtree(doc)?;
            Err(err)
        }
    }
}

/// Like [`parse`], for input that has not been validated as UTF-8.
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> ParseResult<(Tree, NodeId)> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| ParseError::invalid_utf8(err.valid_up_to()))?;
    parse(text, options)
}
