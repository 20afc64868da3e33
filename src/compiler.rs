//! Whole-build orchestration: discover, parse, resolve, render, write.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::task::JoinSet;
use walkdir::{DirEntry, WalkDir};

use crate::{
    codec::Diagnostic,
    config::BuildConfig,
    document::{Document, ResolvedDocument},
    error::IrefError,
    index::{LooseRefIndex, INDEX_DOCUMENT},
    paths::{doc_name_from_path, SuffixUriBuilder},
    render::{html, latex, OutputFormat},
    session::BuildSession,
};

/// Drives one build of every document below a source root.
///
/// ## Build Flow
///
/// 1. **Discover**: every `*.<source_extension>` file below the root (hidden entries skipped),
///    named by its path relative to the root without extension.
/// 2. **Parse**: each document is parsed against one shared [BuildSession], concurrently when
///    [BuildConfig::parallel] is set.
/// 3. **Resolve**: the resolution barrier runs once over every parsed document.
/// 4. **Render**: each resolved document is rendered concurrently.
/// 5. **Assemble**: one page per document for HTML and text builds, a single `.tex` file for
///    LaTeX builds, plus the reference index page for HTML builds.
///
/// Nothing is written until [BuildOutput::write] is called.
#[derive(Debug, Clone)]
pub struct DocumentCompiler {
    root: PathBuf,
    config: BuildConfig,
}

impl DocumentCompiler {
    /// Create a compiler for `root`, reading `iref.toml` from it if present.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, IrefError> {
        let root = root.as_ref().canonicalize()?;
        let config = BuildConfig::load(&root)?;
        Ok(DocumentCompiler { root, config })
    }

    pub fn with_config(root: impl AsRef<Path>, config: BuildConfig) -> Result<Self, IrefError> {
        let root = root.as_ref().canonicalize()?;
        Ok(DocumentCompiler { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Source files of the build as `(document name, path)`, ordered by document name.
    pub fn discover(&self) -> Result<Vec<(String, PathBuf)>, IrefError> {
        fn is_hidden(entry: &DirEntry) -> bool {
            entry
                .file_name()
                .to_str()
                .map(|s| s.starts_with("."))
                .unwrap_or(false)
        }
        let mut sources = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| !is_hidden(e) || e.path() == self.root.as_path())
        {
            let path = entry?.into_path();
            let matches_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == self.config.source_extension)
                .unwrap_or(false);
            if path.is_file() && matches_extension {
                sources.push((doc_name_from_path(&self.root, &path)?, path));
            }
        }
        sources.sort();
        tracing::debug!(
            "[DocumentCompiler] discovered {} documents below {:?}",
            sources.len(),
            self.root
        );
        Ok(sources)
    }

    /// Read every discovered source and build it.
    pub async fn build(&self) -> Result<BuildOutput, IrefError> {
        let mut sources = Vec::new();
        for (name, path) in self.discover()? {
            let content = tokio::fs::read_to_string(&path).await?;
            sources.push((name, content));
        }
        build_sources(&self.config, sources).await
    }
}

/// Build in-memory `(document name, markdown source)` pairs.
#[tracing::instrument(skip_all, fields(documents = sources.len()))]
pub async fn build_sources(
    config: &BuildConfig,
    sources: Vec<(String, String)>,
) -> Result<BuildOutput, IrefError> {
    let session = Arc::new(BuildSession::from_config(config));

    let documents = parse_all(&session, sources, config.parallel).await?;
    tracing::info!("[build] parsed {} documents", documents.len());

    let resolved = session.resolve(documents);
    let index = LooseRefIndex::from_registry(session.registry());

    let rendered = render_all(resolved, config.format).await?;
    tracing::info!("[build] rendered {} documents", rendered.len());

    let mut pages = BTreeMap::new();
    match config.format {
        OutputFormat::Html => {
            for (name, (title, body)) in &rendered {
                pages.insert(
                    format!("{name}{}", config.format.extension()),
                    html::page(title, body),
                );
            }
            if config.index && !index.is_empty() {
                if rendered.contains_key(INDEX_DOCUMENT) {
                    session.report(Diagnostic::warning(format!(
                        "Document \"{INDEX_DOCUMENT}\" shadows the reference index, which is not written"
                    )));
                } else {
                    let uri = SuffixUriBuilder::new(config.link_suffix.clone());
                    pages.insert(
                        format!("{INDEX_DOCUMENT}{}", config.format.extension()),
                        html::page("Reference index", &index.to_html(&uri)?),
                    );
                }
            }
        }
        OutputFormat::Text => {
            for (name, (_, body)) in rendered {
                pages.insert(format!("{name}{}", config.format.extension()), body);
            }
        }
        OutputFormat::Latex => {
            let bodies = rendered
                .into_iter()
                .map(|(name, (_, body))| (name, body))
                .collect::<Vec<_>>();
            pages.insert(
                format!("{}{}", config.latex_name, config.format.extension()),
                latex::standalone(&config.latex_name, &bodies),
            );
        }
    }

    let diagnostics = match Arc::try_unwrap(session) {
        Ok(session) => session.finish(),
        Err(shared) => shared.diagnostics().take(),
    };
    let warnings = diagnostics.iter().filter(|d| d.is_warning()).count();
    tracing::info!(
        "[build] produced {} pages with {} warnings",
        pages.len(),
        warnings
    );

    Ok(BuildOutput {
        format: config.format,
        pages,
        diagnostics,
        index,
    })
}

async fn parse_all(
    session: &Arc<BuildSession>,
    sources: Vec<(String, String)>,
    parallel: bool,
) -> Result<Vec<Document>, IrefError> {
    if !parallel {
        return Ok(sources
            .into_iter()
            .map(|(name, source)| session.parse_markdown(name, &source))
            .collect());
    }

    let mut tasks: JoinSet<(usize, Document)> = JoinSet::new();
    for (position, (name, source)) in sources.into_iter().enumerate() {
        let session = Arc::clone(session);
        tasks.spawn_blocking(move || (position, session.parse_markdown(name, &source)));
    }
    let mut parsed = Vec::with_capacity(tasks.len());
    while let Some(result) = tasks.join_next().await {
        parsed.push(result?);
    }
    parsed.sort_by_key(|(position, _)| *position);
    Ok(parsed.into_iter().map(|(_, document)| document).collect())
}

/// Render every document, returning `name -> (page title, body)`.
async fn render_all(
    documents: Vec<ResolvedDocument>,
    format: OutputFormat,
) -> Result<BTreeMap<String, (String, String)>, IrefError> {
    let mut tasks: JoinSet<Result<(String, String, String), IrefError>> = JoinSet::new();
    for document in documents {
        tasks.spawn_blocking(move || {
            let body = format.render_document(&document)?;
            let title = document
                .document()
                .title()
                .unwrap_or_else(|| document.name().to_string());
            Ok((document.name().to_string(), title, body))
        });
    }
    let mut rendered = BTreeMap::new();
    while let Some(result) = tasks.join_next().await {
        let (name, title, body) = result??;
        rendered.insert(name, (title, body));
    }
    Ok(rendered)
}

/// Everything a build produced, keyed by output path relative to the output directory.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub format: OutputFormat,
    pub pages: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
    pub index: LooseRefIndex,
}

impl BuildOutput {
    pub fn page(&self, path: &str) -> Option<&str> {
        self.pages.get(path).map(String::as_str)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// Diagnostics as pretty printed JSON, for tooling that post-processes a build.
    pub fn diagnostics_json(&self) -> Result<String, IrefError> {
        Ok(serde_json::to_string_pretty(&self.diagnostics)?)
    }

    /// Write every page below `out_dir`, creating directories as needed.
    pub async fn write(&self, out_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, IrefError> {
        let mut written = Vec::with_capacity(self.pages.len());
        for (relative, content) in &self.pages {
            let path = out_dir.as_ref().join(relative);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tracing::debug!("Writing {:?}", path);
            tokio::fs::write(&path, content).await?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use test_log::test;

    #[test]
    fn test_discover_skips_hidden_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::create_dir_all(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join("b.md"), "B").unwrap();
        fs::write(dir.path().join("sub/a.md"), "A").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join(".cache/c.md"), "C").unwrap();

        let compiler = DocumentCompiler::with_config(dir.path(), BuildConfig::default()).unwrap();
        let names = compiler
            .discover()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["b", "sub/a"]);
    }

    #[test]
    fn test_new_reads_config_from_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("iref.toml"), "format = \"text\"\n").unwrap();
        let compiler = DocumentCompiler::new(dir.path()).unwrap();
        assert_eq!(compiler.config().format, OutputFormat::Text);
    }

    #[test(tokio::test)]
    async fn test_text_build_has_one_page_per_document() {
        let config = BuildConfig {
            format: OutputFormat::Text,
            ..BuildConfig::default()
        };
        let output = build_sources(
            &config,
            vec![
                ("a".to_string(), "Go :ref:`there<t>`.\n".to_string()),
                ("b".to_string(), "# B\n\n:target:`There<t>`\n".to_string()),
            ],
        )
        .await
        .unwrap();

        assert_eq!(output.page("a.txt"), Some("Go there.\n\n"));
        assert_eq!(output.page("b.txt"), Some("B\n=\n\nThere\n\n"));
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.index.len(), 1);
    }

    #[test(tokio::test)]
    async fn test_latex_build_is_single_file() {
        let config = BuildConfig {
            format: OutputFormat::Latex,
            ..BuildConfig::default()
        }
        .sequential();
        let output = build_sources(
            &config,
            vec![
                ("a".to_string(), "Go :ref:`there<t>`.\n".to_string()),
                ("b".to_string(), ":target:`There<t>`\n".to_string()),
            ],
        )
        .await
        .unwrap();

        assert_eq!(output.pages.keys().collect::<Vec<_>>(), vec!["references.tex"]);
        let tex = output.page("references.tex").unwrap();
        assert!(tex.contains(
            r"Go \hyperlink{\detokenize{b:target-t}}{\hypertarget{\detokenize{a:ref-t-1}}{there}}."
        ));
        assert!(tex.contains(r"\hypertarget{\detokenize{b:target-t}}{There}"));
    }

    #[test(tokio::test)]
    async fn test_document_named_like_index_keeps_its_page() {
        let config = BuildConfig::default().sequential();
        let output = build_sources(
            &config,
            vec![
                (INDEX_DOCUMENT.to_string(), "# Mine\n\n:target:`Here<t>`\n".to_string()),
                ("b".to_string(), "Go :ref:`there<t>`.\n".to_string()),
            ],
        )
        .await
        .unwrap();

        let page = output.page("iref-looseref.html").unwrap();
        assert!(page.contains("<title>Mine</title>"));
        assert!(!page.contains("Reference index"));
        assert_eq!(
            output.diagnostics,
            vec![Diagnostic::warning(
                "Document \"iref-looseref\" shadows the reference index, which is not written"
            )]
        );
        assert_eq!(output.warnings().count(), 1);
    }
}
