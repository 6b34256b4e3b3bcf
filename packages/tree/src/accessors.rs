//! Per-kind field accessors.
//!
//! Every getter and setter checks the node kind first and fails with
//! `InvalidKind` on a mismatch. Setters validate the new value before
//! writing, so a rejected call leaves the node untouched.

use crate::error::{Field, KindError, TreeError, TreeResult};
use crate::node::{ListType, NodeId, NodeKind, Payload};
use crate::tree::Tree;

pub const MAX_HEADER_LEVEL: u8 = 6;

fn kind_error(field: Field, kind: NodeKind) -> TreeError {
    KindError { field, kind }.into()
}

impl Tree {
    /// Literal text of text, code, html, inline_html and code_block nodes.
    pub fn literal(&self, id: NodeId) -> TreeResult<&str> {
        let node = self.node(id)?;
        match &node.payload {
            Payload::Literal(text) => Ok(text),
            Payload::CodeBlock { literal, .. } => Ok(literal),
            _ => Err(kind_error(Field::Literal, node.kind)),
        }
    }

    pub fn set_literal(&mut self, id: NodeId, text: &str) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        match &mut node.payload {
            Payload::Literal(literal) | Payload::CodeBlock { literal, .. } => {
                *literal = text.to_string();
                Ok(())
            }
            _ => Err(kind_error(Field::Literal, node.kind)),
        }
    }

    pub fn url(&self, id: NodeId) -> TreeResult<&str> {
        let node = self.node(id)?;
        match &node.payload {
            Payload::Link { url, .. } => Ok(url),
            _ => Err(kind_error(Field::Url, node.kind)),
        }
    }

    pub fn set_url(&mut self, id: NodeId, value: &str) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        match &mut node.payload {
            Payload::Link { url, .. } => {
                *url = value.to_string();
                Ok(())
            }
            _ => Err(kind_error(Field::Url, node.kind)),
        }
    }

    pub fn title(&self, id: NodeId) -> TreeResult<&str> {
        let node = self.node(id)?;
        match &node.payload {
            Payload::Link { title, .. } => Ok(title),
            _ => Err(kind_error(Field::Title, node.kind)),
        }
    }

    pub fn set_title(&mut self, id: NodeId, value: &str) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        match &mut node.payload {
            Payload::Link { title, .. } => {
                *title = value.to_string();
                Ok(())
            }
            _ => Err(kind_error(Field::Title, node.kind)),
        }
    }

    pub fn header_level(&self, id: NodeId) -> TreeResult<u8> {
        let node = self.node(id)?;
        match node.payload {
            Payload::Header { level } => Ok(level),
            _ => Err(kind_error(Field::HeaderLevel, node.kind)),
        }
    }

    pub fn set_header_level(&mut self, id: NodeId, value: i64) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        let Payload::Header { level } = &mut node.payload else {
            return Err(kind_error(Field::HeaderLevel, node.kind));
        };
        if !(1..=i64::from(MAX_HEADER_LEVEL)).contains(&value) {
            return Err(TreeError::invalid_value(
                Field::HeaderLevel,
                format!("{value} is outside 1..={MAX_HEADER_LEVEL}"),
            ));
        }
        *level = value as u8;
        Ok(())
    }

    pub fn list_type(&self, id: NodeId) -> TreeResult<ListType> {
        let node = self.node(id)?;
        match node.payload {
            Payload::List { list_type, .. } => Ok(list_type),
            _ => Err(kind_error(Field::ListType, node.kind)),
        }
    }

    pub fn set_list_type(&mut self, id: NodeId, value: ListType) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        match &mut node.payload {
            Payload::List { list_type, .. } => {
                *list_type = value;
                Ok(())
            }
            _ => Err(kind_error(Field::ListType, node.kind)),
        }
    }

    /// Start number; only meaningful for ordered lists.
    pub fn list_start(&self, id: NodeId) -> TreeResult<u32> {
        let node = self.node(id)?;
        match node.payload {
            Payload::List {
                list_type: ListType::Ordered,
                start,
                ..
            } => Ok(start),
            Payload::List { .. } => Err(TreeError::invalid_value(
                Field::ListStart,
                "can't get list_start for a bullet list",
            )),
            _ => Err(kind_error(Field::ListStart, node.kind)),
        }
    }

    pub fn set_list_start(&mut self, id: NodeId, value: i64) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        let Payload::List { start, .. } = &mut node.payload else {
            return Err(kind_error(Field::ListStart, node.kind));
        };
        let value = u32::try_from(value).map_err(|_| {
            TreeError::invalid_value(Field::ListStart, format!("{value} is not a valid start"))
        })?;
        *start = value;
        Ok(())
    }

    pub fn list_tight(&self, id: NodeId) -> TreeResult<bool> {
        let node = self.node(id)?;
        match node.payload {
            Payload::List { tight, .. } => Ok(tight),
            _ => Err(kind_error(Field::ListTight, node.kind)),
        }
    }

    pub fn set_list_tight(&mut self, id: NodeId, value: bool) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        match &mut node.payload {
            Payload::List { tight, .. } => {
                *tight = value;
                Ok(())
            }
            _ => Err(kind_error(Field::ListTight, node.kind)),
        }
    }

    pub fn fence_info(&self, id: NodeId) -> TreeResult<&str> {
        let node = self.node(id)?;
        match &node.payload {
            Payload::CodeBlock { info, .. } => Ok(info),
            _ => Err(kind_error(Field::FenceInfo, node.kind)),
        }
    }

    pub fn set_fence_info(&mut self, id: NodeId, value: &str) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        match &mut node.payload {
            Payload::CodeBlock { info, .. } => {
                *info = value.to_string();
                Ok(())
            }
            _ => Err(kind_error(Field::FenceInfo, node.kind)),
        }
    }
}
