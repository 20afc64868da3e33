//! The per-build reference registry.
//!
//! Every parse worker registers the targets, mutual references and loose references it finds.
//! The resolution barrier then reads (and, for loose references, consumes) those entries. The
//! registry never touches storage and lives exactly as long as its
//! [BuildSession](crate::session::BuildSession).
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{Display, Formatter},
};

use crate::paths::anchor_fragment;

/// The two kinds of declarations a plain reference can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A pure anchor that looks like the surrounding text.
    Plain,
    /// An anchor that lists every reference pointing at it.
    Backlink,
}

impl TargetKind {
    /// Prefix of the anchor generated for a target of this kind.
    pub fn anchor_prefix(&self) -> &'static str {
        match self {
            TargetKind::Plain => "target",
            TargetKind::Backlink => "backlink",
        }
    }

    pub fn anchor(&self, signature: &str) -> String {
        format!("{}-{}", self.anchor_prefix(), anchor_fragment(signature))
    }
}

impl Display for TargetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.anchor_prefix())
    }
}

/// A target declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub signature: String,
    pub kind: TargetKind,
    pub document: String,
    pub anchor: String,
    pub title: String,
}

/// One use of a mutual reference signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualOccurrence {
    pub signature: String,
    pub document: String,
    pub id: String,
}

/// One use of a plain reference, recorded so a backlink target can link back to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LooseReference {
    pub signature: String,
    pub origin: String,
    pub id: String,
    pub consumed: bool,
}

/// Namespaces of the registry's id counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterScope {
    /// Counted per mutual reference signature.
    Mutual,
    /// Counted build-wide.
    Loose,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CounterKey {
    scope: CounterScope,
    signature: Option<String>,
}

#[derive(Debug, Default)]
struct RegistryState {
    targets: BTreeMap<String, Vec<Target>>,
    mutual: BTreeMap<String, Vec<MutualOccurrence>>,
    loose: BTreeMap<String, Vec<LooseReference>>,
    counters: HashMap<CounterKey, u64>,
}

impl RegistryState {
    fn new_unique_id(&mut self, scope: CounterScope, signature: &str) -> u64 {
        let key = CounterKey {
            scope,
            signature: match scope {
                CounterScope::Mutual => Some(signature.to_string()),
                CounterScope::Loose => None,
            },
        };
        let counter = self.counters.entry(key).or_default();
        *counter += 1;
        *counter
    }
}

/// Thread-safe store of every reference declaration seen during one build.
#[derive(Debug, Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Drop every entry and restart all counters.
    pub fn reset(&self) {
        *self.state.lock() = RegistryState::default();
    }

    /// Allocate the next value of a counter. Mutual counters are scoped by signature, the loose
    /// counter ignores it.
    ///
    /// The `register_*` methods draw from the same counters while holding the registry lock, so
    /// an id handed out here is never handed out again by a registration.
    pub fn new_unique_id(&self, scope: CounterScope, signature: &str) -> u64 {
        self.state.lock().new_unique_id(scope, signature)
    }

    /// Record a target declaration and return its anchor.
    ///
    /// Declarations are appended. [Registry::lookup_target] returns the last one, so a later
    /// declaration of the same signature wins.
    pub fn register_target(
        &self,
        signature: &str,
        kind: TargetKind,
        document: &str,
        title: &str,
    ) -> String {
        let anchor = kind.anchor(signature);
        let target = Target {
            signature: signature.to_string(),
            kind,
            document: document.to_string(),
            anchor: anchor.clone(),
            title: title.to_string(),
        };
        let mut state = self.state.lock();
        let declarations = state.targets.entry(signature.to_string()).or_default();
        if let Some(previous) = declarations.last() {
            tracing::debug!(
                "[Registry::register_target] '{}' in {} shadows the declaration in {}",
                signature,
                document,
                previous.document
            );
        }
        declarations.push(target);
        anchor
    }

    /// Record a mutual reference occurrence and return its generated id.
    pub fn register_mutual_occurrence(&self, signature: &str, document: &str) -> String {
        let mut state = self.state.lock();
        let n = state.new_unique_id(CounterScope::Mutual, signature);
        let id = format!("mutual-{}-{n}", anchor_fragment(signature));
        state
            .mutual
            .entry(signature.to_string())
            .or_default()
            .push(MutualOccurrence {
                signature: signature.to_string(),
                document: document.to_string(),
                id: id.clone(),
            });
        id
    }

    /// Record a plain reference use and return its generated, build-wide unique id.
    pub fn register_loose_reference(&self, target_signature: &str, origin: &str) -> String {
        let mut state = self.state.lock();
        let n = state.new_unique_id(CounterScope::Loose, target_signature);
        let id = format!("ref-{}-{n}", anchor_fragment(target_signature));
        state
            .loose
            .entry(target_signature.to_string())
            .or_default()
            .push(LooseReference {
                signature: target_signature.to_string(),
                origin: origin.to_string(),
                id: id.clone(),
                consumed: false,
            });
        id
    }

    /// The winning (last registered) declaration for `signature`.
    pub fn lookup_target(&self, signature: &str) -> Option<Target> {
        self.state
            .lock()
            .targets
            .get(signature)
            .and_then(|declarations| declarations.last().cloned())
    }

    /// Winning declarations of every target signature, ordered by signature.
    pub fn targets(&self) -> Vec<Target> {
        self.state
            .lock()
            .targets
            .values()
            .filter_map(|declarations| declarations.last().cloned())
            .collect()
    }

    pub fn occurrences_for_mutual(&self, signature: &str) -> Vec<MutualOccurrence> {
        self.state
            .lock()
            .mutual
            .get(signature)
            .cloned()
            .unwrap_or_default()
    }

    /// Every mutual occurrence, ordered by signature then registration.
    pub fn mutual_occurrences(&self) -> Vec<MutualOccurrence> {
        self.state
            .lock()
            .mutual
            .values()
            .flat_map(|occurrences| occurrences.iter().cloned())
            .collect()
    }

    pub fn loose_references_for(&self, target_signature: &str) -> Vec<LooseReference> {
        self.state
            .lock()
            .loose
            .get(target_signature)
            .cloned()
            .unwrap_or_default()
    }

    /// Mark every unconsumed loose reference to `target_signature` as consumed and return those
    /// entries in registration order. A second call returns nothing new.
    pub fn consume_loose_references(&self, target_signature: &str) -> Vec<LooseReference> {
        let mut state = self.state.lock();
        let Some(references) = state.loose.get_mut(target_signature) else {
            return Vec::new();
        };
        references
            .iter_mut()
            .filter(|r| !r.consumed)
            .map(|r| {
                r.consumed = true;
                r.clone()
            })
            .collect()
    }
}
