use crate::arena::Key;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type NodeId = Key<Node>;

/// The fixed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // Blocks
    Document,
    BlockQuote,
    List,
    Item,
    CodeBlock,
    Html,
    Paragraph,
    Header,
    Hrule,

    // Inlines
    Text,
    Softbreak,
    Linebreak,
    Code,
    InlineHtml,
    Emph,
    Strong,
    Link,
    Image,
}

impl NodeKind {
    pub const ALL: [NodeKind; 18] = [
        NodeKind::Document,
        NodeKind::BlockQuote,
        NodeKind::List,
        NodeKind::Item,
        NodeKind::CodeBlock,
        NodeKind::Html,
        NodeKind::Paragraph,
        NodeKind::Header,
        NodeKind::Hrule,
        NodeKind::Text,
        NodeKind::Softbreak,
        NodeKind::Linebreak,
        NodeKind::Code,
        NodeKind::InlineHtml,
        NodeKind::Emph,
        NodeKind::Strong,
        NodeKind::Link,
        NodeKind::Image,
    ];

    pub fn is_block(self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::BlockQuote
                | NodeKind::List
                | NodeKind::Item
                | NodeKind::CodeBlock
                | NodeKind::Html
                | NodeKind::Paragraph
                | NodeKind::Header
                | NodeKind::Hrule
        )
    }

    pub fn is_inline(self) -> bool {
        !self.is_block()
    }

    /// Kinds that never have children.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            NodeKind::CodeBlock
                | NodeKind::Html
                | NodeKind::Hrule
                | NodeKind::Text
                | NodeKind::Softbreak
                | NodeKind::Linebreak
                | NodeKind::Code
                | NodeKind::InlineHtml
        )
    }

    /// Whether a node of this kind may hold a child of `child` kind.
    ///
    /// This only covers kinds; cycle checks need the tree.
    pub fn can_contain(self, child: NodeKind) -> bool {
        if child == NodeKind::Document {
            return false;
        }
        match self {
            NodeKind::Document | NodeKind::BlockQuote | NodeKind::Item => {
                child.is_block() && child != NodeKind::Item
            }
            NodeKind::List => child == NodeKind::Item,
            NodeKind::Paragraph
            | NodeKind::Header
            | NodeKind::Emph
            | NodeKind::Strong
            | NodeKind::Link
            | NodeKind::Image => child.is_inline(),
            _ => false,
        }
    }

    /// Name used by the native library (`type_string`).
    pub fn type_string(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::BlockQuote => "block_quote",
            NodeKind::List => "list",
            NodeKind::Item => "item",
            NodeKind::CodeBlock => "code_block",
            NodeKind::Html => "html",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Header => "header",
            NodeKind::Hrule => "hrule",
            NodeKind::Text => "text",
            NodeKind::Softbreak => "softbreak",
            NodeKind::Linebreak => "linebreak",
            NodeKind::Code => "code",
            NodeKind::InlineHtml => "inline_html",
            NodeKind::Emph => "emph",
            NodeKind::Strong => "strong",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
        }
    }

    /// Name exposed to managed callers (`type`).
    pub fn symbol(self) -> &'static str {
        match self {
            NodeKind::BlockQuote => "blockquote",
            NodeKind::Item => "list_item",
            other => other.type_string(),
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.symbol() == symbol || kind.type_string() == symbol)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    Bullet,
    Ordered,
}

impl ListType {
    pub fn symbol(self) -> &'static str {
        match self {
            ListType::Bullet => "bullet_list",
            ListType::Ordered => "ordered_list",
        }
    }
}

/// Who is responsible for freeing a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    /// No parent; freeing this node frees its whole subtree.
    Root,
    /// Has a parent; lifetime is delegated to the tree root.
    Attached,
}

/// Kind-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    None,
    Literal(String),
    CodeBlock { info: String, literal: String },
    Header { level: u8 },
    List { list_type: ListType, start: u32, tight: bool },
    Link { url: String, title: String },
}

impl Payload {
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Text | NodeKind::Code | NodeKind::Html | NodeKind::InlineHtml => {
                Payload::Literal(String::new())
            }
            NodeKind::CodeBlock => Payload::CodeBlock {
                info: String::new(),
                literal: String::new(),
            },
            NodeKind::Header => Payload::Header { level: 1 },
            NodeKind::List => Payload::List {
                list_type: ListType::Bullet,
                start: 1,
                tight: false,
            },
            NodeKind::Link | NodeKind::Image => Payload::Link {
                url: String::new(),
                title: String::new(),
            },
            _ => Payload::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) payload: Payload,
    pub(crate) ownership: Ownership,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, payload: Payload) -> Self {
        Self {
            kind,
            payload,
            ownership: Ownership::Root,
            parent: None,
            first_child: None,
            last_child: None,
            next: None,
            prev: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }
}
