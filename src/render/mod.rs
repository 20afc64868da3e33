//! Emission of resolved documents into the supported output formats.
//!
//! Each format implements [Renderer]: an enter/exit pair per node kind plus text and block
//! hooks. Renderers only read the attributes already set on a node by the resolution barrier;
//! they never consult the registry. Selection of the renderer is a `match` over
//! [OutputFormat], so every format has to handle every node kind.
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::{
    document::{BlockKind, Document, Inline, ResolvedDocument},
    error::IrefError,
    nodes::{BacklinkTarget, MutualRef, PlainRef, RefNode, ReferenceTarget},
};

pub mod html;
pub mod latex;
pub mod text;

pub use html::HtmlRenderer;
pub use latex::LatexRenderer;
pub use text::TextRenderer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Text,
    Latex,
}

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Text => "text",
            OutputFormat::Latex => "latex",
        }
    }

    /// File extension of rendered pages, with leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => ".html",
            OutputFormat::Text => ".txt",
            OutputFormat::Latex => ".tex",
        }
    }

    /// Render a single node as it appears inside `document`.
    pub fn render_node(&self, document: &str, node: &RefNode) -> Result<String, IrefError> {
        let mut out = String::new();
        match self {
            OutputFormat::Html => emit_node(&mut HtmlRenderer, node, &mut out)?,
            OutputFormat::Text => emit_node(&mut TextRenderer::default(), node, &mut out)?,
            OutputFormat::Latex => emit_node(&mut LatexRenderer::new(document), node, &mut out)?,
        }
        Ok(out)
    }

    /// Render the body of a resolved document.
    pub fn render_document(&self, document: &ResolvedDocument) -> Result<String, IrefError> {
        let document = document.document();
        let mut out = String::new();
        match self {
            OutputFormat::Html => emit_document(&mut HtmlRenderer, document, &mut out)?,
            OutputFormat::Text => emit_document(&mut TextRenderer::default(), document, &mut out)?,
            OutputFormat::Latex => emit_document(
                &mut LatexRenderer::new(&document.name),
                document,
                &mut out,
            )?,
        }
        Ok(out)
    }
}

impl FromStr for OutputFormat {
    type Err = IrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(OutputFormat::Html),
            "text" | "txt" => Ok(OutputFormat::Text),
            "latex" | "tex" => Ok(OutputFormat::Latex),
            other => Err(IrefError::Config(format!("unknown output format '{other}'"))),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-format emission callbacks.
///
/// The display text of a node is written between its `enter_*` and `exit_*` calls through
/// [Renderer::text].
pub trait Renderer {
    fn enter_plain_ref(&mut self, node: &PlainRef, out: &mut String) -> fmt::Result;
    fn exit_plain_ref(&mut self, node: &PlainRef, out: &mut String) -> fmt::Result;

    fn enter_reference_target(&mut self, node: &ReferenceTarget, out: &mut String)
        -> fmt::Result;
    fn exit_reference_target(&mut self, node: &ReferenceTarget, out: &mut String) -> fmt::Result;

    fn enter_mutual_ref(&mut self, node: &MutualRef, out: &mut String) -> fmt::Result;
    fn exit_mutual_ref(&mut self, node: &MutualRef, out: &mut String) -> fmt::Result;

    fn enter_backlink_target(&mut self, node: &BacklinkTarget, out: &mut String) -> fmt::Result;
    fn exit_backlink_target(&mut self, node: &BacklinkTarget, out: &mut String) -> fmt::Result;

    fn text(&mut self, text: &str, out: &mut String) -> fmt::Result;

    fn enter_block(&mut self, kind: BlockKind, out: &mut String) -> fmt::Result;
    fn exit_block(&mut self, kind: BlockKind, out: &mut String) -> fmt::Result;
}

pub fn emit_node<R: Renderer>(renderer: &mut R, node: &RefNode, out: &mut String) -> fmt::Result {
    match node {
        RefNode::PlainRef(node) => {
            renderer.enter_plain_ref(node, out)?;
            renderer.text(&node.display, out)?;
            renderer.exit_plain_ref(node, out)
        }
        RefNode::ReferenceTarget(node) => {
            renderer.enter_reference_target(node, out)?;
            renderer.text(&node.display, out)?;
            renderer.exit_reference_target(node, out)
        }
        RefNode::MutualRef(node) => {
            renderer.enter_mutual_ref(node, out)?;
            renderer.text(&node.display, out)?;
            renderer.exit_mutual_ref(node, out)
        }
        RefNode::BacklinkTarget(node) => {
            renderer.enter_backlink_target(node, out)?;
            renderer.text(&node.display, out)?;
            renderer.exit_backlink_target(node, out)
        }
    }
}

pub fn emit_document<R: Renderer>(
    renderer: &mut R,
    document: &Document,
    out: &mut String,
) -> fmt::Result {
    for block in &document.blocks {
        renderer.enter_block(block.kind, out)?;
        for inline in &block.inlines {
            match inline {
                Inline::Text(text) => renderer.text(text, out)?,
                Inline::Node(node) => emit_node(renderer, node, out)?,
            }
        }
        renderer.exit_block(block.kind, out)?;
    }
    Ok(())
}
