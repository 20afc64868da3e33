//! Document names, anchors, and relative links between rendered pages.
use std::{
    borrow::Cow,
    path::{Component, Path},
};
use url::{form_urlencoded, Url};

use crate::error::IrefError;

/// Root used to give document names an absolute location so that [Url::make_relative] can
/// compute page-to-page links. Never appears in output.
const BUILD_ROOT: &str = "file:///build/";

/// Turn a signature into a string that is safe to use as an HTML id / URL fragment.
///
/// The encoding is `application/x-www-form-urlencoded`: ASCII alphanumerics and `*-._` are kept,
/// spaces become `+` and every other byte is percent-encoded. Distinct signatures therefore never
/// share a fragment.
pub fn anchor_fragment(signature: &str) -> String {
    form_urlencoded::byte_serialize(signature.as_bytes()).collect()
}

/// Utility function to replace separators and convert to unicode (via to_string_lossy) on os path.
pub fn os_path_to_string<P: AsRef<Path>>(os_path_ref: P) -> String {
    let res = os_path_ref
        .as_ref()
        .components()
        .map(|c| match c {
            Component::RootDir => Cow::from("".to_string()),
            _ => c.as_os_str().to_string_lossy(),
        })
        .collect::<Vec<_>>()
        .join("/");
    tracing::debug!(
        "os_path_to_string: turned {:?} into {}",
        os_path_ref.as_ref().components(),
        res
    );
    res
}

/// Derive a document name (`sub/page`) from a source file path below `root`.
pub fn doc_name_from_path(root: &Path, path: &Path) -> Result<String, IrefError> {
    let relative = path.strip_prefix(root)?.with_extension("");
    let name = os_path_to_string(relative);
    if name.is_empty() {
        return Err(IrefError::NotFound(format!(
            "{path:?} does not name a document below {root:?}"
        )));
    }
    Ok(name)
}

/// Host capability: the link from one rendered document to another.
///
/// Implementations must return an empty string when `from == to`, which renderers treat as a
/// same-page link.
pub trait RelativeUri: Send + Sync {
    fn relative_uri(&self, from: &str, to: &str) -> String;
}

/// [RelativeUri] for builds that write one file per document, named `<document><suffix>`.
#[derive(Debug, Clone)]
pub struct SuffixUriBuilder {
    suffix: String,
}

impl SuffixUriBuilder {
    pub fn new(suffix: impl Into<String>) -> Self {
        SuffixUriBuilder {
            suffix: suffix.into(),
        }
    }

    fn page_url(&self, document: &str) -> Result<Url, IrefError> {
        Ok(Url::parse(BUILD_ROOT)?.join(&format!("{document}{}", self.suffix))?)
    }

    fn try_relative_uri(&self, from: &str, to: &str) -> Result<Option<String>, IrefError> {
        let base = self.page_url(from)?;
        let target = self.page_url(to)?;
        Ok(base.make_relative(&target))
    }
}

impl Default for SuffixUriBuilder {
    fn default() -> Self {
        SuffixUriBuilder::new(".html")
    }
}

impl RelativeUri for SuffixUriBuilder {
    fn relative_uri(&self, from: &str, to: &str) -> String {
        if from == to {
            return String::new();
        }
        match self.try_relative_uri(from, to) {
            Ok(Some(uri)) => uri,
            Ok(None) => format!("{to}{}", self.suffix),
            Err(e) => {
                tracing::warn!(
                    "[SuffixUriBuilder] could not relate '{}' to '{}': {}",
                    from,
                    to,
                    e
                );
                format!("{to}{}", self.suffix)
            }
        }
    }
}
