//! The resolution barrier.
//!
//! Runs once per build, after every document has been parsed and before any is rendered. It
//! mutates the document trees in place using what the [Registry](crate::registry::Registry)
//! collected during parsing:
//!
//! 1. **Plain references**: every `ref` node is pointed at the winning target declaration.
//! 2. **Mutual pairing**: every `mref` node whose signature was used exactly twice is pointed at
//!    its partner.
//! 3. **Backlink aggregation**: every backlink target gets a link back to each plain reference
//!    that targets it.
//!
//! All passes are safe to run again on already resolved documents: nothing is added twice.
use std::collections::BTreeSet;

use crate::{
    codec::Diagnostic,
    document::{Document, ResolvedDocument},
    nodes::{BacklinkTarget, Link, MutualRef, PlainRef, RefNode},
    registry::TargetKind,
    session::BuildSession,
};

pub struct ResolutionEngine<'s> {
    session: &'s BuildSession,
}

impl<'s> ResolutionEngine<'s> {
    pub fn new(session: &'s BuildSession) -> Self {
        ResolutionEngine { session }
    }

    /// Run every pass over the full document set and seal the documents for rendering.
    #[tracing::instrument(skip_all)]
    pub fn run(&self, mut documents: Vec<Document>) -> Vec<ResolvedDocument> {
        tracing::info!("Resolving references across {} documents", documents.len());
        self.resolve_references(&mut documents);
        self.pair_mutual_references(&mut documents);
        self.aggregate_backlinks(&mut documents);
        documents.into_iter().map(ResolvedDocument::new).collect()
    }

    /// Point each plain reference at the winning declaration of its signature.
    #[tracing::instrument(skip_all)]
    pub fn resolve_references(&self, documents: &mut [Document]) {
        for document in documents.iter_mut() {
            let name = document.name.clone();
            for node in document.nodes_mut() {
                if let RefNode::PlainRef(reference) = node {
                    self.resolve_reference(&name, reference);
                }
            }
        }
    }

    fn resolve_reference(&self, document: &str, reference: &mut PlainRef) {
        let Some(signature) = reference.signature.as_deref() else {
            return;
        };
        match self.session.registry().lookup_target(signature) {
            Some(target) => {
                let uri = self.session.relative_uri(document, &target.document);
                reference.destination = Some(Link::new(target.document, target.anchor, uri));
                reference.target_kind = Some(target.kind);
                reference.title = Some(target.title);
            }
            None => self.session.report(Diagnostic::UnresolvedReference {
                document: document.to_string(),
                signature: signature.to_string(),
            }),
        }
    }

    /// Wire every mutual reference whose signature has exactly two occurrences to its partner.
    #[tracing::instrument(skip_all)]
    pub fn pair_mutual_references(&self, documents: &mut [Document]) {
        for document in documents.iter_mut() {
            let name = document.name.clone();
            for node in document.nodes_mut() {
                if let RefNode::MutualRef(mutual) = node {
                    self.pair_mutual_reference(&name, mutual);
                }
            }
        }
    }

    fn pair_mutual_reference(&self, document: &str, mutual: &mut MutualRef) {
        let occurrences = self
            .session
            .registry()
            .occurrences_for_mutual(&mutual.signature);
        if occurrences.len() != 2 {
            let documents = occurrences
                .iter()
                .map(|o| o.document.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            self.session.report(Diagnostic::MutualCardinality {
                signature: mutual.signature.clone(),
                count: occurrences.len(),
                documents,
            });
            return;
        }

        let Some(own) = occurrences
            .iter()
            .position(|o| o.id == mutual.id && o.document == document)
        else {
            self.session.report(Diagnostic::MutualMismatch {
                document: document.to_string(),
                signature: mutual.signature.clone(),
                id: mutual.id.clone(),
            });
            return;
        };
        let partner = &occurrences[1 - own];
        let uri = self.session.relative_uri(document, &partner.document);
        let link = Link::new(partner.document.clone(), partner.id.clone(), uri);
        tracing::debug!(
            "[pair_mutual_reference] {}#{} <-> {}",
            document,
            mutual.id,
            link.href()
        );
        if !mutual.backrefs.contains(&link) {
            mutual.backrefs.push(link.clone());
        }
        mutual.destination = Some(link);
    }

    /// Attach a link to every loose reference targeting each backlink target.
    #[tracing::instrument(skip_all)]
    pub fn aggregate_backlinks(&self, documents: &mut [Document]) {
        for document in documents.iter_mut() {
            let name = document.name.clone();
            for node in document.nodes_mut() {
                if let RefNode::BacklinkTarget(backlink) = node {
                    self.aggregate_backlink(&name, backlink);
                }
            }
        }
    }

    fn aggregate_backlink(&self, document: &str, backlink: &mut BacklinkTarget) {
        let registry = self.session.registry();
        let winning = registry
            .lookup_target(&backlink.signature)
            .filter(|t| t.kind == TargetKind::Backlink && t.document == document);
        if winning.is_none() {
            tracing::debug!(
                "[aggregate_backlink] '{}' in {} is shadowed by a later declaration",
                backlink.signature,
                document
            );
            self.session.report(Diagnostic::info(format!(
                "Backlink \"{}\" in {} is shadowed by a later declaration and lists no references",
                backlink.signature, document
            )));
            return;
        }
        for reference in registry.consume_loose_references(&backlink.signature) {
            let uri = self.session.relative_uri(document, &reference.origin);
            backlink.add_backreference(Link::new(reference.origin, reference.id, uri));
        }
    }
}
