//! Markdown rendering pipeline.
//!
//! Markdown is parsed with comrak into [`ContentNode`]s, then each node is
//! rendered by the function registered for its [`NodeKind`] in a
//! [`RendererTable`]. The pipeline is pure: the same source, overrides and
//! attributes always produce the same HTML or the same error.

mod document;
mod escape;
mod highlight;
mod parse;
mod table;
mod types;

pub use document::DocumentRenderer;
pub use highlight::{Highlighter, SyntectHighlighter};
pub use table::{LinkTarget, NodeRenderer, RenderContext, RendererOverrides, RendererTable};
pub use types::{
    Attributes, ContentNode, HeadingAnchor, NodeKind, RenderError, RenderedDocument,
    UnknownNodeKind,
};
