//! Source parsing and the diagnostics it produces.
//!
//! ## Key Components
//!
//! - [`md`] - Markdown front-end: finds role sites and builds a [`Document`](crate::document::Document)
//! - [`Diagnostic`] - A non-fatal referential problem (malformed site, unresolved reference, ...)
//! - [`Diagnostics`] - Per-build, de-duplicating collector of diagnostics
//!
//! ## Role syntax
//!
//! | Source                       | Node                                             |
//! |------------------------------|--------------------------------------------------|
//! | ``:ref:`Text<sig>` ``        | [`PlainRef`](crate::nodes::PlainRef)             |
//! | ``:target:`Text<sig>` ``     | [`ReferenceTarget`](crate::nodes::ReferenceTarget) |
//! | ``:backlink:`Text<sig>` ``   | [`BacklinkTarget`](crate::nodes::BacklinkTarget) |
//! | ``:mref:`Text<sig>` ``       | [`MutualRef`](crate::nodes::MutualRef)           |
//!
//! Every role may also be written in the `iref` namespace, e.g. ``:iref:ref:`Text<sig>` ``.
pub mod diagnostic;
pub mod md;

pub use diagnostic::{Diagnostic, Diagnostics};
