//! The build session: explicit owner of all per-build reference state.
//!
//! A [BuildSession] is created at the start of a build and dropped (via [BuildSession::finish])
//! at its end. Parse workers share it (it is `Send + Sync`) and obtain a [DocumentContext] per
//! document, which turns role sites into [RefNode]s while registering them. After every document
//! is parsed, [BuildSession::resolve] runs the resolution barrier.
use std::{collections::BTreeSet, fmt, str::FromStr, sync::Arc};

use crate::{
    codec::{md, Diagnostic, Diagnostics},
    config::BuildConfig,
    document::{Document, ResolvedDocument},
    error::IrefError,
    nodes::{BacklinkTarget, MutualRef, PlainRef, RefNode, ReferenceTarget},
    paths::{RelativeUri, SuffixUriBuilder},
    registry::{Registry, TargetKind},
    resolve::ResolutionEngine,
    signature::split_signature,
};

/// The roles a document can use to create reference nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// `ref`: a plain reference to a target or backlink.
    Ref,
    /// `target`: an anchor styled like the surrounding text.
    Target,
    /// `backlink`: an anchor listing every reference to it.
    Backlink,
    /// `mref`: one half of a mutual reference.
    Mutual,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Ref => "ref",
            Role::Target => "target",
            Role::Backlink => "backlink",
            Role::Mutual => "mref",
        }
    }
}

impl FromStr for Role {
    type Err = IrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ref" => Ok(Role::Ref),
            "target" => Ok(Role::Target),
            "backlink" => Ok(Role::Backlink),
            "mref" => Ok(Role::Mutual),
            other => Err(IrefError::Codec(format!("unknown role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct BuildSession {
    registry: Registry,
    diagnostics: Diagnostics,
    uri: Arc<dyn RelativeUri>,
}

impl fmt::Debug for BuildSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSession")
            .field("registry", &self.registry)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl Default for BuildSession {
    fn default() -> Self {
        BuildSession::new(Arc::new(SuffixUriBuilder::default()))
    }
}

impl BuildSession {
    pub fn new(uri: Arc<dyn RelativeUri>) -> Self {
        tracing::debug!("Starting a new build session");
        BuildSession {
            registry: Registry::new(),
            diagnostics: Diagnostics::default(),
            uri,
        }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        BuildSession::new(Arc::new(SuffixUriBuilder::new(config.link_suffix.clone())))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.record(diagnostic);
    }

    pub fn relative_uri(&self, from: &str, to: &str) -> String {
        self.uri.relative_uri(from, to)
    }

    /// Registration hook for one document.
    pub fn document(&self, name: impl Into<String>) -> DocumentContext<'_> {
        DocumentContext {
            session: self,
            name: name.into(),
            declared: BTreeSet::new(),
        }
    }

    /// Parse a Markdown source into a document tree, registering every role site in it.
    pub fn parse_markdown(&self, name: impl Into<String>, source: &str) -> Document {
        let mut ctx = self.document(name);
        md::parse_document(&mut ctx, source)
    }

    /// The resolution barrier. Must be called once, after every document of the build has been
    /// parsed and before any of them is rendered.
    pub fn resolve(&self, documents: Vec<Document>) -> Vec<ResolvedDocument> {
        ResolutionEngine::new(self).run(documents)
    }

    /// End the session, returning every diagnostic collected during the build.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.registry.reset();
        self.diagnostics.take()
    }
}

/// Parse-time context for a single document.
pub struct DocumentContext<'s> {
    session: &'s BuildSession,
    name: String,
    declared: BTreeSet<String>,
}

impl<'s> DocumentContext<'s> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session(&self) -> &'s BuildSession {
        self.session
    }

    /// Create the node for a role site with raw content `Display<signature>`.
    ///
    /// Malformed content is reported and yields an inert plain reference showing the raw text.
    pub fn role(&mut self, role: Role, raw: &str, location: Option<(usize, usize)>) -> RefNode {
        let signed = match split_signature(raw) {
            Ok(signed) => signed,
            Err(e) => {
                tracing::debug!("[DocumentContext::role] {}: {}", self.name, e);
                self.session.report(Diagnostic::MalformedReference {
                    document: self.name.clone(),
                    raw: raw.to_string(),
                    location,
                });
                return RefNode::PlainRef(PlainRef::inert(raw));
            }
        };
        let registry = self.session.registry();
        match role {
            Role::Ref => {
                let id = registry.register_loose_reference(&signed.signature, &self.name);
                RefNode::PlainRef(PlainRef {
                    display: signed.display,
                    signature: Some(signed.signature),
                    id: Some(id),
                    destination: None,
                    target_kind: None,
                    title: None,
                })
            }
            Role::Target => {
                let id = self.declare(&signed.signature, TargetKind::Plain, &signed.display);
                RefNode::ReferenceTarget(ReferenceTarget {
                    display: signed.display,
                    signature: signed.signature,
                    id,
                })
            }
            Role::Backlink => {
                let id = self.declare(&signed.signature, TargetKind::Backlink, &signed.display);
                RefNode::BacklinkTarget(BacklinkTarget::new(
                    signed.display,
                    signed.signature,
                    id,
                ))
            }
            Role::Mutual => {
                let id = registry.register_mutual_occurrence(&signed.signature, &self.name);
                RefNode::MutualRef(MutualRef {
                    display: signed.display,
                    signature: signed.signature,
                    id,
                    destination: None,
                    backrefs: Vec::new(),
                })
            }
        }
    }

    pub fn reference(&mut self, raw: &str) -> RefNode {
        self.role(Role::Ref, raw, None)
    }

    pub fn target(&mut self, raw: &str) -> RefNode {
        self.role(Role::Target, raw, None)
    }

    pub fn backlink(&mut self, raw: &str) -> RefNode {
        self.role(Role::Backlink, raw, None)
    }

    pub fn mutual(&mut self, raw: &str) -> RefNode {
        self.role(Role::Mutual, raw, None)
    }

    fn declare(&mut self, signature: &str, kind: TargetKind, title: &str) -> String {
        if !self.declared.insert(signature.to_string()) {
            self.session.report(Diagnostic::DuplicateTarget {
                document: self.name.clone(),
                signature: signature.to_string(),
            });
        }
        self.session
            .registry()
            .register_target(signature, kind, &self.name, title)
    }
}
