//! Diagnostic types for reference parsing and resolution.
//!
//! Referential problems never abort a build. They are collected as [Diagnostic]s while the build
//! continues with a degraded (inert) link at the problem site, and handed to the operator at the
//! end of the build.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A non-fatal issue discovered while parsing or resolving references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Role content without a `<` separating display text from the signature.
    ///
    /// The site falls back to an inert plain reference.
    MalformedReference {
        document: String,
        raw: String,
        /// Optional location in the source file (line, column)
        location: Option<(usize, usize)>,
    },

    /// A plain reference whose signature matches no declared target.
    UnresolvedReference { document: String, signature: String },

    /// A mutual reference signature used a number of times other than two.
    MutualCardinality {
        signature: String,
        count: usize,
        documents: Vec<String>,
    },

    /// A mutual reference whose id does not match either registered occurrence.
    MutualMismatch {
        document: String,
        signature: String,
        id: String,
    },

    /// A target signature declared twice within the same document. The later declaration wins.
    DuplicateTarget { document: String, signature: String },

    /// A warning message
    Warning(String),

    /// An informational message
    Info(String),
}

impl Diagnostic {
    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info(message.into())
    }

    /// Everything except [Diagnostic::Info] is something the operator should look at.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::Info(_))
    }

    /// The document the diagnostic is attached to, if it is attached to exactly one.
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::MalformedReference { document, .. }
            | Self::UnresolvedReference { document, .. }
            | Self::MutualMismatch { document, .. }
            | Self::DuplicateTarget { document, .. } => Some(document),
            Self::MutualCardinality { .. } | Self::Warning(_) | Self::Info(_) => None,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedReference {
                document,
                raw,
                location,
            } => {
                write!(f, "Malformed reference '{raw}' in {document}")?;
                if let Some((line, column)) = location {
                    write!(f, " at {line}:{column}")?;
                }
                Ok(())
            }
            Self::UnresolvedReference {
                document,
                signature,
            } => write!(f, "Reference \"{signature}\" in {document} not found"),
            Self::MutualCardinality {
                signature,
                count,
                documents,
            } => {
                if *count < 2 {
                    write!(
                        f,
                        "Mutual reference \"{signature}\" does not have a pair (used in {})",
                        documents.join(", ")
                    )
                } else {
                    write!(
                        f,
                        "Mutual reference \"{signature}\" has {count} uses, expected two (used in {})",
                        documents.join(", ")
                    )
                }
            }
            Self::MutualMismatch {
                document,
                signature,
                id,
            } => write!(
                f,
                "Mutual reference \"{signature}\" ({id}) in {document} matches neither registered occurrence"
            ),
            Self::DuplicateTarget {
                document,
                signature,
            } => write!(
                f,
                "Target \"{signature}\" declared more than once in {document}; the last declaration wins"
            ),
            Self::Warning(msg) => write!(f, "Warning: {msg}"),
            Self::Info(msg) => write!(f, "Info: {msg}"),
        }
    }
}

/// Build-wide collection of diagnostics, shared by parse workers and the resolution barrier.
///
/// Identical diagnostics are recorded once, so re-running a resolution pass does not repeat its
/// warnings.
#[derive(Debug, Default)]
pub struct Diagnostics(Mutex<Vec<Diagnostic>>);

impl Diagnostics {
    pub fn record(&self, diagnostic: Diagnostic) {
        let mut diagnostics = self.0.lock();
        if diagnostics.contains(&diagnostic) {
            return;
        }
        if diagnostic.is_warning() {
            tracing::warn!("{diagnostic}");
        } else {
            tracing::info!("{diagnostic}");
        }
        diagnostics.push(diagnostic);
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.0.lock().clone()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let warning = Diagnostic::warning("Test warning");
        let info = Diagnostic::info("Test info");

        assert!(matches!(warning, Diagnostic::Warning(_)));
        assert!(warning.is_warning());
        assert!(!info.is_warning());
    }

    #[test]
    fn test_malformed_reference_display_with_location() {
        let diagnostic = Diagnostic::MalformedReference {
            document: "a".to_string(),
            raw: "broken".to_string(),
            location: Some((3, 7)),
        };
        assert_eq!(diagnostic.to_string(), "Malformed reference 'broken' in a at 3:7");
        assert_eq!(diagnostic.document(), Some("a"));
    }

    #[test]
    fn test_cardinality_display() {
        let lonely = Diagnostic::MutualCardinality {
            signature: "solo".to_string(),
            count: 1,
            documents: vec!["a".to_string()],
        };
        assert!(lonely.to_string().contains("does not have a pair"));

        let crowded = Diagnostic::MutualCardinality {
            signature: "dup".to_string(),
            count: 3,
            documents: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };
        assert!(crowded.to_string().contains("has 3 uses"));
        assert_eq!(crowded.document(), None);
    }

    #[test]
    fn test_collector_deduplicates() {
        let diagnostics = Diagnostics::default();
        let unresolved = Diagnostic::UnresolvedReference {
            document: "a".to_string(),
            signature: "nope".to_string(),
        };
        diagnostics.record(unresolved.clone());
        diagnostics.record(unresolved.clone());
        diagnostics.record(Diagnostic::info("done"));

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.snapshot()[0], unresolved);
        assert_eq!(diagnostics.take().len(), 2);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_diagnostic_serializes_to_json() {
        let diagnostic = Diagnostic::DuplicateTarget {
            document: "a".to_string(),
            signature: "t".to_string(),
        };
        let json = serde_json::to_string(&diagnostic).unwrap();
        assert_eq!(
            json,
            r#"{"DuplicateTarget":{"document":"a","signature":"t"}}"#
        );
    }
}
