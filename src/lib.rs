//! # noet-iref
//!
//! Cross-document inline references for multi-page document builds.
//!
//! Documents mark up text with four roles: plain references (`ref`), plain targets (`target`),
//! backlink targets (`backlink`) and mutual references (`mref`). Each role site is written as
//! `Display text<signature>`; the signature, not an exact anchor id, is what links sites
//! together, so a reference may point at a target declared in any document of the build.
//!
//! ## Architecture
//!
//! - **[`session`]**: [`BuildSession`](session::BuildSession), the per-build owner of all
//!   reference state, and the per-document registration hook
//! - **[`registry`]**: Declared targets, mutual occurrences and loose references of a build
//! - **[`nodes`]**: The [`RefNode`](nodes::RefNode) sum type embedded in document trees
//! - **[`resolve`]**: The resolution barrier that wires nodes together after every parse
//! - **[`render`]**: HTML, plain text and LaTeX emission of resolved documents
//! - **[`codec`]**: Markdown front-end and build diagnostics
//! - **[`compiler`]**: Directory discovery, concurrent parse/render and output writing
//! - **[`index`]**: Alphabetical index of every target and mutual reference
//!
//! ## Build phases
//!
//! 1. **Parse**: documents are parsed in any order, possibly concurrently. Every role site
//!    becomes a node and is registered with the session.
//! 2. **Resolve**: once every document is parsed, plain references are looked up, mutual
//!    references are paired and backlink targets collect the references pointing at them.
//! 3. **Render**: resolved documents are emitted; renderers only read node attributes.
//!
//! Referential problems (malformed sites, unresolved references, mutual references that are not
//! used exactly twice) never abort a build; they are collected as
//! [`Diagnostic`](codec::Diagnostic)s.
//!
//! ## Quick Start
//!
//! ```rust
//! use noet_iref::{render::OutputFormat, session::BuildSession};
//!
//! let session = BuildSession::default();
//! let a = session.parse_markdown("a", "See :mref:`Beta<pair>`.");
//! let b = session.parse_markdown("b", "Back to :mref:`Alpha<pair>`.");
//!
//! let resolved = session.resolve(vec![a, b]);
//! let html = OutputFormat::Html.render_document(&resolved[0])?;
//! assert!(html.contains(r#"href="b.html#mutual-pair-2""#));
//! assert!(session.finish().is_empty());
//! # Ok::<(), noet_iref::IrefError>(())
//! ```
//!
//! Whole directories are built with [`DocumentCompiler`](compiler::DocumentCompiler):
//!
//! ```rust,no_run
//! use noet_iref::compiler::DocumentCompiler;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let compiler = DocumentCompiler::new("./docs")?;
//!     let output = compiler.build().await?;
//!     for diagnostic in output.warnings() {
//!         eprintln!("{diagnostic}");
//!     }
//!     output.write("./_build").await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod compiler;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod nodes;
pub mod paths;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod session;
pub mod signature;

pub use error::*;
