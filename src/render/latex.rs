use std::fmt::{self, Write};

use super::Renderer;
use crate::{
    document::BlockKind,
    nodes::{BacklinkTarget, Link, MutualRef, PlainRef, ReferenceTarget},
};

/// Escape text for use in a LaTeX body.
pub fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '$' => out.push_str(r"\$"),
            '&' => out.push_str(r"\&"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '%' => out.push_str(r"\%"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            c => out.push(c),
        }
    }
    out
}

/// Hyperref key for `anchor` inside `document`.
///
/// All documents of a LaTeX build end up in one file, so keys are qualified by document name.
/// Characters that `\detokenize` cannot carry, the `:` separator and the `!` escape character
/// itself are written as `!XX` (hex), so distinct pairs never share a key.
pub fn latex_id(document: &str, anchor: &str) -> String {
    format!(
        r"\detokenize{{{}:{}}}",
        escape_key(document),
        escape_key(anchor)
    )
}

fn escape_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '{' | '}' | '\\' | '%' | '#' | ':' | '!' => {
                out.push_str(&format!("!{:02X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// LaTeX (hyperref): anchors become `\hypertarget`, links become `\hyperlink`.
#[derive(Debug, Clone)]
pub struct LatexRenderer {
    document: String,
}

impl LatexRenderer {
    /// `document` is the document whose nodes are being rendered; it qualifies their own ids.
    pub fn new(document: &str) -> Self {
        LatexRenderer {
            document: document.to_string(),
        }
    }

    fn own_id(&self, anchor: &str) -> String {
        latex_id(&self.document, anchor)
    }

    fn open_target(&self, out: &mut String, anchor: &str) -> fmt::Result {
        write!(out, r"\hypertarget{{{}}}{{", self.own_id(anchor))
    }

    fn open_link(out: &mut String, link: &Link) -> fmt::Result {
        write!(
            out,
            r"\hyperlink{{{}}}{{",
            latex_id(&link.document, &link.anchor)
        )
    }
}

impl Renderer for LatexRenderer {
    fn enter_plain_ref(&mut self, node: &PlainRef, out: &mut String) -> fmt::Result {
        if let Some(link) = &node.destination {
            Self::open_link(out, link)?;
        }
        if let Some(id) = &node.id {
            self.open_target(out, id)?;
        }
        Ok(())
    }

    fn exit_plain_ref(&mut self, node: &PlainRef, out: &mut String) -> fmt::Result {
        if node.id.is_some() {
            out.push('}');
        }
        if node.destination.is_some() {
            out.push('}');
        }
        Ok(())
    }

    fn enter_reference_target(
        &mut self,
        node: &ReferenceTarget,
        out: &mut String,
    ) -> fmt::Result {
        self.open_target(out, &node.id)
    }

    fn exit_reference_target(&mut self, _node: &ReferenceTarget, out: &mut String) -> fmt::Result {
        out.push('}');
        Ok(())
    }

    fn enter_mutual_ref(&mut self, node: &MutualRef, out: &mut String) -> fmt::Result {
        if let Some(link) = &node.destination {
            Self::open_link(out, link)?;
        }
        self.open_target(out, &node.id)
    }

    fn exit_mutual_ref(&mut self, node: &MutualRef, out: &mut String) -> fmt::Result {
        out.push('}');
        if node.destination.is_some() {
            out.push('}');
        }
        Ok(())
    }

    fn enter_backlink_target(&mut self, node: &BacklinkTarget, out: &mut String) -> fmt::Result {
        if let [single] = node.backrefs() {
            Self::open_link(out, single)?;
        }
        self.open_target(out, &node.id)
    }

    fn exit_backlink_target(&mut self, node: &BacklinkTarget, out: &mut String) -> fmt::Result {
        out.push('}');
        match node.backrefs() {
            [] => {}
            [_] => out.push('}'),
            backrefs => {
                out.push_str(r"\textsubscript{");
                for (i, link) in backrefs.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    Self::open_link(out, link)?;
                    write!(out, "{i}}}")?;
                }
                out.push('}');
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str, out: &mut String) -> fmt::Result {
        out.push_str(&escape_latex(text));
        Ok(())
    }

    fn enter_block(&mut self, kind: BlockKind, out: &mut String) -> fmt::Result {
        match kind {
            BlockKind::Paragraph => {}
            BlockKind::Heading(1) => out.push_str(r"\section{"),
            BlockKind::Heading(2) => out.push_str(r"\subsection{"),
            BlockKind::Heading(3) => out.push_str(r"\subsubsection{"),
            BlockKind::Heading(_) => out.push_str(r"\paragraph{"),
        }
        Ok(())
    }

    fn exit_block(&mut self, kind: BlockKind, out: &mut String) -> fmt::Result {
        if let BlockKind::Heading(_) = kind {
            out.push('}');
        }
        out.push_str("\n\n");
        Ok(())
    }
}

/// Wrap the rendered bodies of every document into one LaTeX source file.
pub fn standalone(title: &str, bodies: &[(String, String)]) -> String {
    let mut out = String::new();
    out.push_str("\\documentclass{article}\n\\usepackage[utf8]{inputenc}\n\\usepackage{hyperref}\n");
    out.push_str(&format!("\\title{{{}}}\n", escape_latex(title)));
    out.push_str("\\begin{document}\n\\maketitle\n\n");
    for (name, body) in bodies {
        out.push_str(&format!("% {name}\n"));
        out.push_str(body);
    }
    out.push_str("\\end{document}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{nodes::RefNode, registry::TargetKind, render::OutputFormat};

    fn render(node: RefNode) -> String {
        OutputFormat::Latex.render_node("c", &node).unwrap()
    }

    fn backlink_with(n: usize) -> RefNode {
        let mut node =
            BacklinkTarget::new("Target".to_string(), "t1".to_string(), "backlink-t1".to_string());
        for i in 0..n {
            node.add_backreference(Link::new(
                format!("d{i}"),
                format!("ref-t1-{}", i + 1),
                format!("d{i}.html"),
            ));
        }
        RefNode::BacklinkTarget(node)
    }

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("50% of $x_1$ & more"), r"50\% of \$x\_1\$ \& more");
        assert_eq!(escape_latex(r"a\b~"), r"a\textbackslash{}b\textasciitilde{}");
    }

    #[test]
    fn test_latex_id_is_document_qualified() {
        assert_eq!(latex_id("sub/a", "target-x"), r"\detokenize{sub/a:target-x}");
        assert_eq!(latex_id("a{b}", "c%d"), r"\detokenize{a!7Bb!7D:c!25d}");
    }

    #[test]
    fn test_latex_id_keeps_keys_apart() {
        assert_ne!(latex_id("a", "a{b"), latex_id("a", "a_b"));
        assert_ne!(latex_id("a:b", "c"), latex_id("a", "b:c"));
        assert_ne!(latex_id("a", "x!25"), latex_id("a", "x%"));
        assert_eq!(
            latex_id("a", &crate::paths::anchor_fragment("50% off")),
            r"\detokenize{a:50!2525+off}"
        );
    }

    #[test]
    fn test_backlink_forms() {
        assert_eq!(
            render(backlink_with(0)),
            r"\hypertarget{\detokenize{c:backlink-t1}}{Target}"
        );
        assert_eq!(
            render(backlink_with(1)),
            r"\hyperlink{\detokenize{d0:ref-t1-1}}{\hypertarget{\detokenize{c:backlink-t1}}{Target}}"
        );
        assert_eq!(
            render(backlink_with(2)),
            concat!(
                r"\hypertarget{\detokenize{c:backlink-t1}}{Target}",
                r"\textsubscript{\hyperlink{\detokenize{d0:ref-t1-1}}{0},",
                r"\hyperlink{\detokenize{d1:ref-t1-2}}{1}}"
            )
        );
    }

    #[test]
    fn test_reference_target_is_hypertarget() {
        let node = RefNode::ReferenceTarget(ReferenceTarget {
            display: "100%".to_string(),
            signature: "t".to_string(),
            id: "target-t".to_string(),
        });
        assert_eq!(render(node), r"\hypertarget{\detokenize{c:target-t}}{100\%}");
    }

    #[test]
    fn test_plain_ref_forms() {
        let resolved = RefNode::PlainRef(PlainRef {
            display: "Go".to_string(),
            signature: Some("t".to_string()),
            id: Some("ref-t-1".to_string()),
            destination: Some(Link::new("b", "target-t", "b.html".to_string())),
            target_kind: Some(TargetKind::Plain),
            title: Some("T".to_string()),
        });
        assert_eq!(
            render(resolved),
            r"\hyperlink{\detokenize{b:target-t}}{\hypertarget{\detokenize{c:ref-t-1}}{Go}}"
        );
        assert_eq!(render(RefNode::PlainRef(PlainRef::inert("raw"))), "raw");
    }

    #[test]
    fn test_mutual_ref_forms() {
        let mut mutual = MutualRef {
            display: "Alpha".to_string(),
            signature: "s".to_string(),
            id: "mutual-s-1".to_string(),
            destination: None,
            backrefs: Vec::new(),
        };
        assert_eq!(
            render(RefNode::MutualRef(mutual.clone())),
            r"\hypertarget{\detokenize{c:mutual-s-1}}{Alpha}"
        );
        mutual.destination = Some(Link::new("b", "mutual-s-2", "b.html".to_string()));
        assert_eq!(
            render(RefNode::MutualRef(mutual)),
            r"\hyperlink{\detokenize{b:mutual-s-2}}{\hypertarget{\detokenize{c:mutual-s-1}}{Alpha}}"
        );
    }

    #[test]
    fn test_standalone_wraps_bodies() {
        let tex = standalone(
            "Refs",
            &[
                ("a".to_string(), "A body\n\n".to_string()),
                ("b".to_string(), "B body\n\n".to_string()),
            ],
        );
        assert!(tex.starts_with("\\documentclass{article}"));
        assert!(tex.contains("\\usepackage{hyperref}"));
        assert!(tex.contains("% a\nA body\n\n% b\nB body\n\n\\end{document}\n"));
    }
}
