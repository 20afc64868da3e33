use std::fmt;

use super::Renderer;
use crate::{
    document::BlockKind,
    nodes::{BacklinkTarget, MutualRef, PlainRef, ReferenceTarget},
};

const HEADING_UNDERLINES: [char; 6] = ['=', '-', '~', '^', '"', '\''];

/// Plain text: every link decoration is dropped, only display text remains.
#[derive(Debug, Default, Clone)]
pub struct TextRenderer {
    heading_start: Option<usize>,
}

impl Renderer for TextRenderer {
    fn enter_plain_ref(&mut self, _node: &PlainRef, _out: &mut String) -> fmt::Result {
        Ok(())
    }

    fn exit_plain_ref(&mut self, _node: &PlainRef, _out: &mut String) -> fmt::Result {
        Ok(())
    }

    fn enter_reference_target(
        &mut self,
        _node: &ReferenceTarget,
        _out: &mut String,
    ) -> fmt::Result {
        Ok(())
    }

    fn exit_reference_target(
        &mut self,
        _node: &ReferenceTarget,
        _out: &mut String,
    ) -> fmt::Result {
        Ok(())
    }

    fn enter_mutual_ref(&mut self, _node: &MutualRef, _out: &mut String) -> fmt::Result {
        Ok(())
    }

    fn exit_mutual_ref(&mut self, _node: &MutualRef, _out: &mut String) -> fmt::Result {
        Ok(())
    }

    fn enter_backlink_target(&mut self, _node: &BacklinkTarget, _out: &mut String) -> fmt::Result {
        Ok(())
    }

    fn exit_backlink_target(&mut self, _node: &BacklinkTarget, _out: &mut String) -> fmt::Result {
        Ok(())
    }

    fn text(&mut self, text: &str, out: &mut String) -> fmt::Result {
        out.push_str(text);
        Ok(())
    }

    fn enter_block(&mut self, kind: BlockKind, out: &mut String) -> fmt::Result {
        if let BlockKind::Heading(_) = kind {
            self.heading_start = Some(out.len());
        }
        Ok(())
    }

    fn exit_block(&mut self, kind: BlockKind, out: &mut String) -> fmt::Result {
        if let BlockKind::Heading(level) = kind {
            let start = self.heading_start.take().unwrap_or(out.len());
            let width = out[start..].chars().count();
            let underline = HEADING_UNDERLINES[usize::from(level.clamp(1, 6)) - 1];
            out.push('\n');
            out.extend(std::iter::repeat(underline).take(width));
        }
        out.push_str("\n\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        document::{Block, BlockKind, Document, Inline},
        nodes::{BacklinkTarget, Link, MutualRef, PlainRef, RefNode, ReferenceTarget},
        render::{emit_document, OutputFormat, TextRenderer},
    };

    #[test]
    fn test_every_node_kind_renders_display_text_only() {
        let mut backlink =
            BacklinkTarget::new("Back".to_string(), "t".to_string(), "backlink-t".to_string());
        backlink.add_backreference(Link::new("d", "ref-t-1", "d.html".to_string()));
        backlink.add_backreference(Link::new("e", "ref-t-2", "e.html".to_string()));
        let nodes = vec![
            RefNode::PlainRef(PlainRef::inert("Plain <raw>")),
            RefNode::ReferenceTarget(ReferenceTarget {
                display: "Anchor".to_string(),
                signature: "a".to_string(),
                id: "target-a".to_string(),
            }),
            RefNode::MutualRef(MutualRef {
                display: "Pair".to_string(),
                signature: "m".to_string(),
                id: "mutual-m-1".to_string(),
                destination: Some(Link::new("b", "mutual-m-2", "b.html".to_string())),
                backrefs: Vec::new(),
            }),
            RefNode::BacklinkTarget(backlink),
        ];
        for node in nodes {
            assert_eq!(
                OutputFormat::Text.render_node("a", &node).unwrap(),
                node.display()
            );
        }
    }

    #[test]
    fn test_headings_are_underlined() {
        let mut heading = Block::new(BlockKind::Heading(1));
        heading.push_text("Title");
        let doc = Document::with_blocks(
            "a",
            vec![
                heading,
                Block::paragraph(vec![Inline::Text("Body.".to_string())]),
            ],
        );
        let mut out = String::new();
        emit_document(&mut TextRenderer::default(), &doc, &mut out).unwrap();
        assert_eq!(out, "Title\n=====\n\nBody.\n\n");
    }
}
