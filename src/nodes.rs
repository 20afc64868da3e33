//! The four linkable constructs embedded in a document tree.
//!
//! Nodes are created by a [DocumentContext](crate::session::DocumentContext) while a document is
//! parsed, wired up once by the [resolution engine](crate::resolve), and then only read by the
//! [renderers](crate::render).
use serde::{Deserialize, Serialize};

use crate::registry::TargetKind;

/// A resolved link: where it points, and how to get there from the page that renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Document holding the anchor.
    pub document: String,
    /// Anchor id inside that document.
    pub anchor: String,
    /// Relative uri from the rendering document to `document`. Empty for same-page links.
    pub uri: String,
}

impl Link {
    pub fn new(document: impl Into<String>, anchor: impl Into<String>, uri: String) -> Self {
        Link {
            document: document.into(),
            anchor: anchor.into(),
            uri,
        }
    }

    pub fn is_local(&self) -> bool {
        self.uri.is_empty()
    }

    /// `#anchor` for same-page links, `uri#anchor` otherwise.
    pub fn href(&self) -> String {
        if self.is_local() {
            format!("#{}", self.anchor)
        } else {
            format!("{}#{}", self.uri, self.anchor)
        }
    }
}

/// A one-way reference to a target signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainRef {
    pub display: String,
    /// `None` for a malformed reference, which can never resolve.
    pub signature: Option<String>,
    /// Loose reference id, used as the anchor a backlink target links back to.
    pub id: Option<String>,
    pub destination: Option<Link>,
    /// Kind of the target this reference resolved to.
    pub target_kind: Option<TargetKind>,
    /// Display text of the resolved target.
    pub title: Option<String>,
}

impl PlainRef {
    /// A reference that has no signature and will render inert.
    pub fn inert(display: impl Into<String>) -> Self {
        PlainRef {
            display: display.into(),
            signature: None,
            id: None,
            destination: None,
            target_kind: None,
            title: None,
        }
    }
}

/// An anchor styled like the text around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTarget {
    pub display: String,
    pub signature: String,
    pub id: String,
}

/// One half of a pair of references that link to each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualRef {
    pub display: String,
    pub signature: String,
    pub id: String,
    /// The partner's anchor; `None` until the pair is resolved.
    pub destination: Option<Link>,
    pub backrefs: Vec<Link>,
}

impl MutualRef {
    pub fn is_pending(&self) -> bool {
        self.destination.is_none()
    }
}

/// An anchor that collects a link back to every reference pointing at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklinkTarget {
    pub display: String,
    pub signature: String,
    pub id: String,
    backrefs: Vec<Link>,
}

impl BacklinkTarget {
    pub fn new(display: String, signature: String, id: String) -> Self {
        BacklinkTarget {
            display,
            signature,
            id,
            backrefs: Vec::new(),
        }
    }

    /// Back-references in discovery order.
    pub fn backrefs(&self) -> &[Link] {
        &self.backrefs
    }

    pub fn add_backreference(&mut self, link: Link) {
        self.backrefs.push(link);
    }
}

/// A linkable node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefNode {
    PlainRef(PlainRef),
    ReferenceTarget(ReferenceTarget),
    MutualRef(MutualRef),
    BacklinkTarget(BacklinkTarget),
}

impl RefNode {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            RefNode::PlainRef(node) => node.id.as_deref().into_iter().collect(),
            RefNode::ReferenceTarget(node) => vec![node.id.as_str()],
            RefNode::MutualRef(node) => vec![node.id.as_str()],
            RefNode::BacklinkTarget(node) => vec![node.id.as_str()],
        }
    }

    pub fn display(&self) -> &str {
        match self {
            RefNode::PlainRef(node) => &node.display,
            RefNode::ReferenceTarget(node) => &node.display,
            RefNode::MutualRef(node) => &node.display,
            RefNode::BacklinkTarget(node) => &node.display,
        }
    }

    pub fn signature(&self) -> Option<&str> {
        match self {
            RefNode::PlainRef(node) => node.signature.as_deref(),
            RefNode::ReferenceTarget(node) => Some(&node.signature),
            RefNode::MutualRef(node) => Some(&node.signature),
            RefNode::BacklinkTarget(node) => Some(&node.signature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_href() {
        let local = Link::new("a", "target-x", String::new());
        assert!(local.is_local());
        assert_eq!(local.href(), "#target-x");

        let remote = Link::new("b", "target-x", "b.html".to_string());
        assert_eq!(remote.href(), "b.html#target-x");
    }

    #[test]
    fn test_ids_per_variant() {
        let inert = RefNode::PlainRef(PlainRef::inert("oops"));
        assert!(inert.ids().is_empty());
        assert_eq!(inert.display(), "oops");
        assert_eq!(inert.signature(), None);

        let mut backlink =
            BacklinkTarget::new("T".to_string(), "t1".to_string(), "backlink-t1".to_string());
        backlink.add_backreference(Link::new("d", "ref-t1-1", "d.html".to_string()));
        assert_eq!(backlink.backrefs().len(), 1);
        let node = RefNode::BacklinkTarget(backlink);
        assert_eq!(node.ids(), vec!["backlink-t1"]);
        assert_eq!(node.signature(), Some("t1"));
    }
}
