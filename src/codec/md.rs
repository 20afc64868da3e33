//! Markdown front-end.
//!
//! Role sites are written as a role marker directly followed by a code span:
//!
//! ```markdown
//! See :ref:`the install notes<install>`, or :iref:mref:`its twin<pair>`.
//! ```
//!
//! The code span keeps `<` and `>` away from the inline HTML rules of CommonMark. Everything that
//! is not a role site is kept as plain text inside paragraph and heading blocks.
use once_cell::sync::Lazy;
use pulldown_cmark::{
    Event as MdEvent, HeadingLevel, Options, Parser as MdParser, Tag as MdTag,
    TagEnd as MdTagEnd,
};
use regex::Regex;
use std::{ops::Range, str::FromStr};

use crate::{
    document::{Block, BlockKind, Document, Inline},
    session::{DocumentContext, Role},
};

pub use pulldown_cmark;

/// A role marker at the very end of a text run: `:ref:`, `:iref:backlink:` and so on.
static ROLE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":(?:iref:)?(ref|target|backlink|mref):$").expect("role marker regex is valid")
});

pub fn iref_md_options() -> Options {
    let mut md_options = Options::empty();
    md_options.insert(Options::ENABLE_FOOTNOTES);
    md_options.insert(Options::ENABLE_GFM);
    md_options.insert(Options::ENABLE_MATH);
    md_options.insert(Options::ENABLE_STRIKETHROUGH);
    md_options.insert(Options::ENABLE_TABLES);
    md_options.insert(Options::ENABLE_TASKLISTS);
    md_options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    md_options
}

/// Byte offset to 1-based (line, column) conversion for one source.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        LineIndex { starts }
    }

    fn location(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|start| *start <= offset).max(1);
        let start = self.starts[line - 1];
        let column = source
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line, column + 1)
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

struct DocumentBuilder<'c, 's> {
    ctx: &'c mut DocumentContext<'s>,
    blocks: Vec<Block>,
    current: Option<Block>,
}

impl<'c, 's> DocumentBuilder<'c, 's> {
    fn start(&mut self, kind: BlockKind) {
        self.flush();
        self.current = Some(Block::new(kind));
    }

    fn flush(&mut self) {
        if let Some(block) = self.current.take() {
            if !block.is_empty() {
                self.blocks.push(block);
            }
        }
    }

    fn block(&mut self) -> &mut Block {
        self.current
            .get_or_insert_with(|| Block::new(BlockKind::Paragraph))
    }

    fn text(&mut self, text: &str) {
        self.block().push_text(text);
    }

    /// A code span either completes a role site started by the preceding text, or is kept as
    /// text.
    fn code(&mut self, code: &str, range: Range<usize>, source: &str, lines: &LineIndex) {
        let block = self.block();
        let marker = match block.inlines.last() {
            Some(Inline::Text(last)) => ROLE_MARKER.captures(last).and_then(|caps| {
                let whole = caps.get(0)?;
                let role = Role::from_str(caps.get(1)?.as_str()).ok()?;
                Some((role, whole.start(), whole.len()))
            }),
            _ => None,
        };
        let Some((role, marker_start, marker_len)) = marker else {
            block.push_text(code);
            return;
        };

        if let Some(Inline::Text(last)) = block.inlines.last_mut() {
            last.truncate(marker_start);
            if last.is_empty() {
                block.inlines.pop();
            }
        }
        let location = lines.location(source, range.start.saturating_sub(marker_len));
        let node = self.ctx.role(role, code, Some(location));
        self.block().push_node(node);
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

/// Parse `source` into a document tree named after `ctx`, registering every role site with the
/// context's session as it is encountered.
pub fn parse_document(ctx: &mut DocumentContext<'_>, source: &str) -> Document {
    let name = ctx.name().to_string();
    let lines = LineIndex::new(source);
    let mut builder = DocumentBuilder {
        ctx,
        blocks: Vec::new(),
        current: None,
    };
    let mut in_metadata = false;

    for (event, range) in MdParser::new_ext(source, iref_md_options()).into_offset_iter() {
        match event {
            MdEvent::Start(MdTag::MetadataBlock(_)) => in_metadata = true,
            MdEvent::End(MdTagEnd::MetadataBlock(_)) => in_metadata = false,
            _ if in_metadata => {}
            MdEvent::Start(MdTag::Heading { level, .. }) => {
                builder.start(BlockKind::Heading(heading_level(level)))
            }
            MdEvent::Start(MdTag::Paragraph)
            | MdEvent::Start(MdTag::Item)
            | MdEvent::Start(MdTag::CodeBlock(_)) => builder.start(BlockKind::Paragraph),
            MdEvent::End(MdTagEnd::Heading(_))
            | MdEvent::End(MdTagEnd::Paragraph)
            | MdEvent::End(MdTagEnd::Item)
            | MdEvent::End(MdTagEnd::CodeBlock) => builder.flush(),
            MdEvent::Text(text) | MdEvent::InlineMath(text) | MdEvent::DisplayMath(text) => {
                builder.text(&text)
            }
            MdEvent::Code(code) => builder.code(&code, range, source, &lines),
            MdEvent::SoftBreak => builder.text(" "),
            MdEvent::HardBreak => builder.text("\n"),
            _ => {}
        }
    }

    let blocks = builder.finish();
    tracing::debug!("[parse_document] {}: {} blocks", name, blocks.len());
    Document::with_blocks(name, blocks)
}
