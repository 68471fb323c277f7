//! Node kind → renderer mapping, with the site's built-in renderers.
//!
//! A [`RendererTable`] is always handed to rendering explicitly. Callers
//! customise output with [`RendererOverrides`], which replace built-ins
//! key by key and leave every other kind untouched.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::domain::slug::slugify;

use super::{
    escape::{escape_attribute, escape_html},
    highlight::Highlighter,
    types::{Attributes, ContentNode, NodeKind, RenderError},
};

type RenderFn =
    dyn Fn(&ContentNode, &RenderContext<'_>) -> Result<String, RenderError> + Send + Sync;

/// A rendering function for one node kind.
#[derive(Clone)]
pub struct NodeRenderer(Arc<RenderFn>);

impl NodeRenderer {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&ContentNode, &RenderContext<'_>) -> Result<String, RenderError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(render))
    }

    pub fn render(&self, node: &ContentNode, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
        (self.0)(node, ctx)
    }
}

impl fmt::Debug for NodeRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeRenderer(..)")
    }
}

/// Caller-supplied renderers keyed by node kind.
#[derive(Debug, Clone, Default)]
pub struct RendererOverrides {
    renderers: HashMap<NodeKind, NodeRenderer>,
}

impl RendererOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, kind: NodeKind, render: F) -> Self
    where
        F: Fn(&ContentNode, &RenderContext<'_>) -> Result<String, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.insert(kind, NodeRenderer::new(render));
        self
    }

    pub fn insert(&mut self, kind: NodeKind, renderer: NodeRenderer) {
        self.renderers.insert(kind, renderer);
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.renderers.keys().copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RendererTable {
    renderers: HashMap<NodeKind, NodeRenderer>,
}

impl RendererTable {
    /// The built-in renderer for every node kind. Code blocks go through
    /// `highlighter`.
    pub fn builtin(highlighter: Arc<dyn Highlighter>) -> Self {
        let mut table = Self::default();

        table.set(NodeKind::Root, NodeRenderer::new(render_root));
        for kind in NodeKind::HEADINGS {
            table.set(kind, NodeRenderer::new(render_heading));
        }
        table.set(NodeKind::Paragraph, NodeRenderer::new(render_paragraph));
        table.set(NodeKind::Text, NodeRenderer::new(render_text));
        table.set(NodeKind::Emphasis, wrap_children(NodeKind::Emphasis, "em"));
        table.set(NodeKind::Strong, wrap_children(NodeKind::Strong, "strong"));
        table.set(
            NodeKind::Strikethrough,
            wrap_children(NodeKind::Strikethrough, "del"),
        );
        table.set(NodeKind::InlineCode, NodeRenderer::new(render_inline_code));
        table.set(NodeKind::Link, NodeRenderer::new(render_link));
        table.set(NodeKind::Image, NodeRenderer::new(render_image));
        table.set(
            NodeKind::CodeBlock,
            NodeRenderer::new(move |node, _ctx| render_code_block(node, highlighter.as_ref())),
        );
        table.set(NodeKind::Table, NodeRenderer::new(render_table));
        table.set(NodeKind::BulletList, NodeRenderer::new(render_list));
        table.set(NodeKind::OrderedList, NodeRenderer::new(render_list));
        table.set(NodeKind::ListItem, NodeRenderer::new(render_list_item));
        table.set(NodeKind::BlockQuote, NodeRenderer::new(render_block_quote));
        table.set(NodeKind::ThematicBreak, NodeRenderer::new(|_, _| Ok("<hr>\n".to_string())));
        table.set(NodeKind::LineBreak, NodeRenderer::new(|_, _| Ok("<br>\n".to_string())));
        table.set(NodeKind::Html, NodeRenderer::new(render_html));

        table
    }

    pub fn set(&mut self, kind: NodeKind, renderer: NodeRenderer) {
        self.renderers.insert(kind, renderer);
    }

    pub fn get(&self, kind: NodeKind) -> Option<&NodeRenderer> {
        self.renderers.get(&kind)
    }

    /// Union of this table and `overrides`; an override wins for its kind.
    pub fn merged(&self, overrides: &RendererOverrides) -> Self {
        let mut renderers = self.renderers.clone();
        for (kind, renderer) in &overrides.renderers {
            renderers.insert(*kind, renderer.clone());
        }
        Self { renderers }
    }

    pub fn render(&self, node: &ContentNode) -> Result<String, RenderError> {
        RenderContext { table: self }.render_node(node)
    }
}

/// Handle given to every renderer so it can render descendants with the
/// same table.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    table: &'a RendererTable,
}

impl RenderContext<'_> {
    pub fn render_node(&self, node: &ContentNode) -> Result<String, RenderError> {
        let kind = node.kind();
        let renderer = self
            .table
            .get(kind)
            .ok_or(RenderError::MissingRenderer { kind })?;
        renderer.render(node, self)
    }

    pub fn render_children(&self, node: &ContentNode) -> Result<String, RenderError> {
        let mut html = String::new();
        for child in node.children() {
            html.push_str(&self.render_node(child)?);
        }
        Ok(html)
    }
}

/// Where a link points, which decides the attributes it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// Site-relative path starting with `/`.
    Internal,
    /// In-page fragment starting with `#`.
    Anchor,
    External,
}

impl LinkTarget {
    pub fn classify(href: &str) -> Self {
        if href.starts_with('/') {
            LinkTarget::Internal
        } else if href.starts_with('#') {
            LinkTarget::Anchor
        } else {
            LinkTarget::External
        }
    }
}

fn mismatch(expected: NodeKind, node: &ContentNode) -> RenderError {
    RenderError::Mismatch {
        expected,
        found: node.kind(),
    }
}

fn render_root(node: &ContentNode, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    match node {
        ContentNode::Document { .. } => ctx.render_children(node),
        other => Err(mismatch(NodeKind::Root, other)),
    }
}

fn render_heading(node: &ContentNode, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    let ContentNode::Heading { level, .. } = node else {
        return Err(mismatch(NodeKind::Heading(1), node));
    };
    let level = (*level).clamp(1, 6);
    let slug = escape_attribute(&slugify(&node.plain_text()));
    let content = ctx.render_children(node)?;
    Ok(format!(
        "<h{level} id=\"{slug}\"><a href=\"#{slug}\" class=\"anchor\"></a>{content}</h{level}>\n"
    ))
}

fn render_paragraph(node: &ContentNode, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    match node {
        ContentNode::Paragraph { .. } => Ok(format!("<p>{}</p>\n", ctx.render_children(node)?)),
        other => Err(mismatch(NodeKind::Paragraph, other)),
    }
}

fn render_text(node: &ContentNode, _ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    match node {
        ContentNode::Text { value } => Ok(escape_html(value)),
        ContentNode::SoftBreak => Ok("\n".to_string()),
        other => Err(mismatch(NodeKind::Text, other)),
    }
}

fn wrap_children(kind: NodeKind, tag: &'static str) -> NodeRenderer {
    NodeRenderer::new(move |node, ctx| {
        if node.kind() != kind {
            return Err(mismatch(kind, node));
        }
        Ok(format!("<{tag}>{}</{tag}>", ctx.render_children(node)?))
    })
}

fn render_inline_code(node: &ContentNode, _ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    match node {
        ContentNode::InlineCode { code } => {
            Ok(format!("<code>{}</code>", ammonia::clean_text(code)))
        }
        other => Err(mismatch(NodeKind::InlineCode, other)),
    }
}

fn render_link(node: &ContentNode, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    let ContentNode::Link { href, title, .. } = node else {
        return Err(mismatch(NodeKind::Link, node));
    };

    let mut attributes = Attributes::new().with("href", href.as_str());
    if let Some(title) = title {
        attributes.set("title", title.as_str());
    }
    if LinkTarget::classify(href) == LinkTarget::External {
        attributes.set("target", "_blank");
        attributes.set("rel", "noopener noreferrer");
    }

    Ok(format!(
        "<a{}>{}</a>",
        attributes.to_html(),
        ctx.render_children(node)?
    ))
}

const IMAGE_CLASS: &str = "rounded-lg";

fn render_image(node: &ContentNode, _ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    let ContentNode::Image {
        src,
        alt,
        attributes: extra,
    } = node
    else {
        return Err(mismatch(NodeKind::Image, node));
    };

    let class = match extra.get("class") {
        Some(existing) if !existing.trim().is_empty() => format!("{IMAGE_CLASS} {existing}"),
        _ => IMAGE_CLASS.to_string(),
    };

    let mut attributes = Attributes::new()
        .with("src", src.as_str())
        .with("alt", alt.as_deref().unwrap_or_default())
        .with("class", class);
    for (name, value) in extra.iter().filter(|(name, _)| *name != "class") {
        attributes.set(name, value);
    }

    Ok(format!("<img{}>", attributes.to_html()))
}

fn render_code_block(node: &ContentNode, highlighter: &dyn Highlighter) -> Result<String, RenderError> {
    let ContentNode::CodeBlock { code, language } = node else {
        return Err(mismatch(NodeKind::CodeBlock, node));
    };

    let markup = highlighter.highlight(code, language.as_deref())?;
    let class = language
        .as_deref()
        .filter(|lang| !lang.is_empty())
        .map(|lang| format!(" class=\"language-{}\"", escape_attribute(&lang.to_ascii_lowercase())))
        .unwrap_or_default();

    Ok(format!("<pre><code{class}>{markup}</code></pre>\n"))
}

fn render_table(node: &ContentNode, _ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    let ContentNode::Table { headers, rows } = node else {
        return Err(mismatch(NodeKind::Table, node));
    };

    let mut html = String::from("<table><thead><tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>\n");
    Ok(html)
}

fn render_list(node: &ContentNode, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    let ContentNode::List { ordered, start, .. } = node else {
        return Err(mismatch(NodeKind::BulletList, node));
    };

    let items = ctx.render_children(node)?;
    Ok(match (ordered, start) {
        (false, _) => format!("<ul>\n{items}</ul>\n"),
        (true, 1) => format!("<ol>\n{items}</ol>\n"),
        (true, start) => format!("<ol start=\"{start}\">\n{items}</ol>\n"),
    })
}

fn render_list_item(node: &ContentNode, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    match node {
        ContentNode::ListItem { .. } => Ok(format!("<li>{}</li>\n", ctx.render_children(node)?)),
        other => Err(mismatch(NodeKind::ListItem, other)),
    }
}

fn render_block_quote(node: &ContentNode, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    match node {
        ContentNode::BlockQuote { .. } => Ok(format!(
            "<blockquote>\n{}</blockquote>\n",
            ctx.render_children(node)?
        )),
        other => Err(mismatch(NodeKind::BlockQuote, other)),
    }
}

fn render_html(node: &ContentNode, _ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    match node {
        ContentNode::Html { raw } => Ok(ammonia::clean(raw)),
        other => Err(mismatch(NodeKind::Html, other)),
    }
}
