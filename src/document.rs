//! Per-document trees.
//!
//! A [Document] is what a parse produces: blocks of text with [RefNode]s embedded. Only the
//! resolution barrier turns it into a [ResolvedDocument], which is what renderers consume.
use serde::{Deserialize, Serialize};

use crate::nodes::RefNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),
    Node(RefNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    /// Heading level, 1 to 6.
    Heading(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub inlines: Vec<Inline>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Block {
            kind,
            inlines: Vec::new(),
        }
    }

    pub fn paragraph(inlines: Vec<Inline>) -> Self {
        Block {
            kind: BlockKind::Paragraph,
            inlines,
        }
    }

    /// Append text, merging with a preceding text inline.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Inline::Text(last)) = self.inlines.last_mut() {
            last.push_str(text);
        } else {
            self.inlines.push(Inline::Text(text.to_string()));
        }
    }

    pub fn push_node(&mut self, node: RefNode) {
        self.inlines.push(Inline::Node(node));
    }

    pub fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Slash separated document name without extension, e.g. `guide/install`.
    pub name: String,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Document {
            name: name.into(),
            blocks: Vec::new(),
        }
    }

    pub fn with_blocks(name: impl Into<String>, blocks: Vec<Block>) -> Self {
        Document {
            name: name.into(),
            blocks,
        }
    }

    /// Display text of the first heading, if the document has one.
    pub fn title(&self) -> Option<String> {
        let heading = self
            .blocks
            .iter()
            .find(|block| matches!(block.kind, BlockKind::Heading(_)))?;
        Some(
            heading
                .inlines
                .iter()
                .map(|inline| match inline {
                    Inline::Text(text) => text.as_str(),
                    Inline::Node(node) => node.display(),
                })
                .collect(),
        )
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RefNode> {
        self.blocks
            .iter()
            .flat_map(|block| block.inlines.iter())
            .filter_map(|inline| match inline {
                Inline::Node(node) => Some(node),
                Inline::Text(_) => None,
            })
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut RefNode> {
        self.blocks
            .iter_mut()
            .flat_map(|block| block.inlines.iter_mut())
            .filter_map(|inline| match inline {
                Inline::Node(node) => Some(node),
                Inline::Text(_) => None,
            })
    }
}

/// A document that has passed the resolution barrier. Its nodes are no longer mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument(Document);

impl ResolvedDocument {
    pub(crate) fn new(document: Document) -> Self {
        ResolvedDocument(document)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn document(&self) -> &Document {
        &self.0
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RefNode> {
        self.0.nodes()
    }
}
