use std::fmt::{self, Write};

use super::Renderer;
use crate::{
    document::BlockKind,
    nodes::{BacklinkTarget, Link, MutualRef, PlainRef, ReferenceTarget},
};

/// Inline style that makes an anchor look like the surrounding text.
pub const INHERIT_STYLE: &str = "color: inherit; text-decoration: inherit";
const LINK_CLASS: &str = "reference internal";
const INERT_CLASS: &str = "reference unresolved";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn start_tag(out: &mut String, tag: &str, attrs: &[(&str, Option<&str>)]) -> fmt::Result {
    write!(out, "<{tag}")?;
    for (name, value) in attrs {
        if let Some(value) = value {
            write!(out, " {name}=\"{}\"", escape_html(value))?;
        }
    }
    out.push('>');
    Ok(())
}

fn link_tag(out: &mut String, id: Option<&str>, link: &Link, title: Option<&str>) -> fmt::Result {
    let href = link.href();
    start_tag(
        out,
        "a",
        &[
            ("class", Some(LINK_CLASS)),
            ("id", id),
            ("href", Some(href.as_str())),
            ("title", title),
        ],
    )
}

fn inert_tag(out: &mut String, id: Option<&str>) -> fmt::Result {
    start_tag(out, "span", &[("class", Some(INERT_CLASS)), ("id", id)])
}

fn styled_anchor(out: &mut String, tag: &str, id: &str) -> fmt::Result {
    start_tag(
        out,
        tag,
        &[("id", Some(id)), ("style", Some(INHERIT_STYLE))],
    )
}

/// HTML fragments: anchors with `href` for links, `id` attributes for targets.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn enter_plain_ref(&mut self, node: &PlainRef, out: &mut String) -> fmt::Result {
        match &node.destination {
            Some(link) => link_tag(out, node.id.as_deref(), link, node.title.as_deref()),
            None => inert_tag(out, node.id.as_deref()),
        }
    }

    fn exit_plain_ref(&mut self, node: &PlainRef, out: &mut String) -> fmt::Result {
        match node.destination {
            Some(_) => out.push_str("</a>"),
            None => out.push_str("</span>"),
        }
        Ok(())
    }

    fn enter_reference_target(
        &mut self,
        node: &ReferenceTarget,
        out: &mut String,
    ) -> fmt::Result {
        styled_anchor(out, "a", &node.id)
    }

    fn exit_reference_target(&mut self, _node: &ReferenceTarget, out: &mut String) -> fmt::Result {
        out.push_str("</a>");
        Ok(())
    }

    fn enter_mutual_ref(&mut self, node: &MutualRef, out: &mut String) -> fmt::Result {
        match &node.destination {
            Some(link) => link_tag(out, Some(node.id.as_str()), link, None),
            None => inert_tag(out, Some(node.id.as_str())),
        }
    }

    fn exit_mutual_ref(&mut self, node: &MutualRef, out: &mut String) -> fmt::Result {
        match node.destination {
            Some(_) => out.push_str("</a>"),
            None => out.push_str("</span>"),
        }
        Ok(())
    }

    fn enter_backlink_target(&mut self, node: &BacklinkTarget, out: &mut String) -> fmt::Result {
        match node.backrefs() {
            [single] => link_tag(out, Some(node.id.as_str()), single, None),
            _ => styled_anchor(out, "span", &node.id),
        }
    }

    fn exit_backlink_target(&mut self, node: &BacklinkTarget, out: &mut String) -> fmt::Result {
        match node.backrefs() {
            [_] => out.push_str("</a>"),
            [] => out.push_str("</span>"),
            backrefs => {
                out.push_str("</span>");
                for (i, link) in backrefs.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    start_tag(
                        out,
                        "a",
                        &[
                            ("class", Some(LINK_CLASS)),
                            ("href", Some(link.href().as_str())),
                        ],
                    )?;
                    write!(out, "<sub>{i}</sub></a>")?;
                }
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str, out: &mut String) -> fmt::Result {
        out.push_str(&escape_html(text));
        Ok(())
    }

    fn enter_block(&mut self, kind: BlockKind, out: &mut String) -> fmt::Result {
        match kind {
            BlockKind::Paragraph => out.push_str("<p>"),
            BlockKind::Heading(level) => write!(out, "<h{level}>")?,
        }
        Ok(())
    }

    fn exit_block(&mut self, kind: BlockKind, out: &mut String) -> fmt::Result {
        match kind {
            BlockKind::Paragraph => out.push_str("</p>\n"),
            BlockKind::Heading(level) => writeln!(out, "</h{level}>")?,
        }
        Ok(())
    }
}

/// Wrap a rendered body into a standalone page.
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        nodes::RefNode,
        registry::TargetKind,
        render::OutputFormat,
    };

    fn render(node: RefNode) -> String {
        OutputFormat::Html.render_node("c", &node).unwrap()
    }

    fn backlink_with(n: usize) -> RefNode {
        let mut node =
            BacklinkTarget::new("Target".to_string(), "t1".to_string(), "backlink-t1".to_string());
        for i in 0..n {
            let doc = format!("d{i}");
            let uri = format!("{doc}.html");
            node.add_backreference(Link::new(doc, format!("ref-t1-{}", i + 1), uri));
        }
        RefNode::BacklinkTarget(node)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_backlink_without_backrefs_is_plain_span() {
        let html = render(backlink_with(0));
        assert_eq!(
            html,
            r#"<span id="backlink-t1" style="color: inherit; text-decoration: inherit">Target</span>"#
        );
        assert!(!html.contains("href"));
    }

    #[test]
    fn test_backlink_with_one_backref_is_single_anchor() {
        assert_eq!(
            render(backlink_with(1)),
            r#"<a class="reference internal" id="backlink-t1" href="d0.html#ref-t1-1">Target</a>"#
        );
    }

    #[test]
    fn test_backlink_with_many_backrefs_lists_ordinals() {
        let html = render(backlink_with(3));
        assert_eq!(
            html,
            concat!(
                r#"<span id="backlink-t1" style="color: inherit; text-decoration: inherit">Target</span>"#,
                r#"<a class="reference internal" href="d0.html#ref-t1-1"><sub>0</sub></a>,"#,
                r#"<a class="reference internal" href="d1.html#ref-t1-2"><sub>1</sub></a>,"#,
                r#"<a class="reference internal" href="d2.html#ref-t1-3"><sub>2</sub></a>"#,
            )
        );
    }

    #[test]
    fn test_reference_target_inherits_style() {
        let node = RefNode::ReferenceTarget(ReferenceTarget {
            display: "Here".to_string(),
            signature: "t2".to_string(),
            id: "target-t2".to_string(),
        });
        assert_eq!(
            render(node),
            r#"<a id="target-t2" style="color: inherit; text-decoration: inherit">Here</a>"#
        );
    }

    #[test]
    fn test_plain_ref_resolved_and_inert() {
        let resolved = RefNode::PlainRef(PlainRef {
            display: "Go & see".to_string(),
            signature: Some("t2".to_string()),
            id: Some("ref-t2-1".to_string()),
            destination: Some(Link::new("b", "target-t2", "b.html".to_string())),
            target_kind: Some(TargetKind::Plain),
            title: Some("Here".to_string()),
        });
        assert_eq!(
            render(resolved),
            r#"<a class="reference internal" id="ref-t2-1" href="b.html#target-t2" title="Here">Go &amp; see</a>"#
        );

        assert_eq!(
            render(RefNode::PlainRef(PlainRef::inert("broken"))),
            r#"<span class="reference unresolved">broken</span>"#
        );
    }

    #[test]
    fn test_mutual_ref_resolved_and_pending() {
        let mut mutual = MutualRef {
            display: "Alpha".to_string(),
            signature: "shared".to_string(),
            id: "mutual-shared-1".to_string(),
            destination: None,
            backrefs: Vec::new(),
        };
        assert_eq!(
            render(RefNode::MutualRef(mutual.clone())),
            r#"<span class="reference unresolved" id="mutual-shared-1">Alpha</span>"#
        );

        mutual.destination = Some(Link::new("b", "mutual-shared-2", "b.html".to_string()));
        assert_eq!(
            render(RefNode::MutualRef(mutual)),
            r#"<a class="reference internal" id="mutual-shared-1" href="b.html#mutual-shared-2">Alpha</a>"#
        );
    }

    #[test]
    fn test_page_wraps_body() {
        let html = page("a <b>", "<p>x</p>\n");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>a &lt;b&gt;</title>"));
        assert!(html.contains("<body>\n<p>x</p>\n</body>"));
    }
}
