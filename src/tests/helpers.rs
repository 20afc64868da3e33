//! Shared test utilities for building and inspecting documents

use crate::{
    document::{Block, Document, Inline, ResolvedDocument},
    nodes::{BacklinkTarget, MutualRef, PlainRef, RefNode},
    session::{BuildSession, DocumentContext},
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Register the nodes returned by `build` as document `name` and wrap them in one paragraph,
/// separated by single spaces.
pub fn doc_with<F>(session: &BuildSession, name: &str, build: F) -> Document
where
    F: FnOnce(&mut DocumentContext<'_>) -> Vec<RefNode>,
{
    let mut ctx = session.document(name);
    let nodes = build(&mut ctx);
    let mut inlines = Vec::with_capacity(nodes.len() * 2);
    for (i, node) in nodes.into_iter().enumerate() {
        if i > 0 {
            inlines.push(Inline::Text(" ".to_string()));
        }
        inlines.push(Inline::Node(node));
    }
    Document::with_blocks(name, vec![Block::paragraph(inlines)])
}

fn node_of(doc: &ResolvedDocument, idx: usize) -> &RefNode {
    doc.nodes()
        .nth(idx)
        .unwrap_or_else(|| panic!("{} has no node #{idx}", doc.name()))
}

pub fn plain_of(doc: &ResolvedDocument, idx: usize) -> &PlainRef {
    match node_of(doc, idx) {
        RefNode::PlainRef(node) => node,
        other => panic!("expected a plain reference, got {other:?}"),
    }
}

pub fn mutual_of(doc: &ResolvedDocument, idx: usize) -> &MutualRef {
    match node_of(doc, idx) {
        RefNode::MutualRef(node) => node,
        other => panic!("expected a mutual reference, got {other:?}"),
    }
}

pub fn backlink_of(doc: &ResolvedDocument, idx: usize) -> &BacklinkTarget {
    match node_of(doc, idx) {
        RefNode::BacklinkTarget(node) => node,
        other => panic!("expected a backlink target, got {other:?}"),
    }
}
