//! Alphabetical index of every declared target and mutual reference of a build.
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Write};

use crate::{
    error::IrefError,
    nodes::Link,
    paths::RelativeUri,
    registry::{Registry, TargetKind},
    render::html::escape_html,
};

/// Document name of the index page.
pub const INDEX_DOCUMENT: &str = "iref-looseref";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Target,
    Backlink,
    Mutual,
}

impl From<TargetKind> for EntryKind {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Plain => EntryKind::Target,
            TargetKind::Backlink => EntryKind::Backlink,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub signature: String,
    pub kind: EntryKind,
    pub document: String,
    pub anchor: String,
}

/// Entries grouped by the lowercased first character of their signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LooseRefIndex {
    groups: BTreeMap<String, Vec<IndexEntry>>,
}

impl LooseRefIndex {
    pub fn from_registry(registry: &Registry) -> Self {
        let targets = registry.targets().into_iter().map(|target| IndexEntry {
            signature: target.signature,
            kind: target.kind.into(),
            document: target.document,
            anchor: target.anchor,
        });
        let mutuals = registry
            .mutual_occurrences()
            .into_iter()
            .map(|occurrence| IndexEntry {
                signature: occurrence.signature,
                kind: EntryKind::Mutual,
                document: occurrence.document,
                anchor: occurrence.id,
            });

        let mut index = LooseRefIndex::default();
        for entry in targets.chain(mutuals) {
            let key = entry
                .signature
                .chars()
                .next()
                .map(|c| c.to_lowercase().collect::<String>())
                .unwrap_or_default();
            index.groups.entry(key).or_default().push(entry);
        }
        for entries in index.groups.values_mut() {
            // Stable: mutual occurrences of one signature keep registration order.
            entries.sort_by(|a, b| a.signature.cmp(&b.signature).then(a.kind.cmp(&b.kind)));
        }
        index
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<IndexEntry>> {
        &self.groups
    }

    /// Body of the index page, with links relative to [INDEX_DOCUMENT].
    pub fn to_html(&self, uri: &dyn RelativeUri) -> Result<String, IrefError> {
        let mut out = String::new();
        writeln!(out, "<h1>Reference index</h1>")?;
        for (key, entries) in &self.groups {
            writeln!(out, "<h2>{}</h2>", escape_html(key))?;
            writeln!(out, "<ul>")?;
            for entry in entries {
                let link = Link::new(
                    entry.document.as_str(),
                    entry.anchor.as_str(),
                    uri.relative_uri(INDEX_DOCUMENT, &entry.document),
                );
                writeln!(
                    out,
                    "<li><a class=\"reference internal\" href=\"{}\">{}</a> ({}, {})</li>",
                    escape_html(&link.href()),
                    escape_html(&entry.signature),
                    match entry.kind {
                        EntryKind::Target => "target",
                        EntryKind::Backlink => "backlink",
                        EntryKind::Mutual => "mutual",
                    },
                    escape_html(&entry.document),
                )?;
            }
            writeln!(out, "</ul>")?;
        }
        Ok(out)
    }
}
