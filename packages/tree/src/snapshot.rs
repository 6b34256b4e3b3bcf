use crate::node::{ListType, NodeId, NodeKind, Payload};
use crate::tree::Tree;
use crate::TreeResult;
use serde::Serialize;

/// Owned, serializable copy of a subtree. Used for debugging output and
/// structural comparisons in tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tight: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    fn empty(kind: NodeKind) -> Self {
        Self {
            kind,
            literal: None,
            info: None,
            level: None,
            list_type: None,
            start: None,
            tight: None,
            url: None,
            title: None,
            children: Vec::new(),
        }
    }
}

impl Tree {
    pub fn snapshot(&self, id: NodeId) -> TreeResult<NodeSnapshot> {
        let node = self.node(id)?;
        let mut snap = NodeSnapshot::empty(node.kind());
        match node.payload() {
            Payload::None => {}
            Payload::Literal(text) => snap.literal = Some(text.clone()),
            Payload::CodeBlock { info, literal } => {
                snap.info = Some(info.clone());
                snap.literal = Some(literal.clone());
            }
            Payload::Header { level } => snap.level = Some(*level),
            Payload::List {
                list_type,
                start,
                tight,
            } => {
                snap.list_type = Some(*list_type);
                if *list_type == ListType::Ordered {
                    snap.start = Some(*start);
                }
                snap.tight = Some(*tight);
            }
            Payload::Link { url, title } => {
                snap.url = Some(url.clone());
                snap.title = Some(title.clone());
            }
        }
        snap.children = self
            .children(id)
            .map(|child| self.snapshot(child))
            .collect::<TreeResult<_>>()?;
        Ok(snap)
    }
}
