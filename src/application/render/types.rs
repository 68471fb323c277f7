use std::{fmt, str::FromStr};

use thiserror::Error;

use super::escape::escape_attribute;

/// Parsed markdown, reduced to the node kinds the site knows how to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    Document {
        children: Vec<ContentNode>,
    },
    Heading {
        level: u8,
        children: Vec<ContentNode>,
    },
    Paragraph {
        children: Vec<ContentNode>,
    },
    Text {
        value: String,
    },
    Emphasis {
        children: Vec<ContentNode>,
    },
    Strong {
        children: Vec<ContentNode>,
    },
    Strikethrough {
        children: Vec<ContentNode>,
    },
    InlineCode {
        code: String,
    },
    Link {
        href: String,
        title: Option<String>,
        children: Vec<ContentNode>,
    },
    Image {
        src: String,
        alt: Option<String>,
        attributes: Attributes,
    },
    CodeBlock {
        code: String,
        language: Option<String>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    List {
        ordered: bool,
        start: usize,
        children: Vec<ContentNode>,
    },
    ListItem {
        children: Vec<ContentNode>,
    },
    BlockQuote {
        children: Vec<ContentNode>,
    },
    ThematicBreak,
    SoftBreak,
    LineBreak,
    Html {
        raw: String,
    },
}

impl ContentNode {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Document { .. } => NodeKind::Root,
            Self::Heading { level, .. } => NodeKind::Heading((*level).clamp(1, 6)),
            Self::Paragraph { .. } => NodeKind::Paragraph,
            Self::Text { .. } | Self::SoftBreak => NodeKind::Text,
            Self::Emphasis { .. } => NodeKind::Emphasis,
            Self::Strong { .. } => NodeKind::Strong,
            Self::Strikethrough { .. } => NodeKind::Strikethrough,
            Self::InlineCode { .. } => NodeKind::InlineCode,
            Self::Link { .. } => NodeKind::Link,
            Self::Image { .. } => NodeKind::Image,
            Self::CodeBlock { .. } => NodeKind::CodeBlock,
            Self::Table { .. } => NodeKind::Table,
            Self::List { ordered: true, .. } => NodeKind::OrderedList,
            Self::List { ordered: false, .. } => NodeKind::BulletList,
            Self::ListItem { .. } => NodeKind::ListItem,
            Self::BlockQuote { .. } => NodeKind::BlockQuote,
            Self::ThematicBreak => NodeKind::ThematicBreak,
            Self::LineBreak => NodeKind::LineBreak,
            Self::Html { .. } => NodeKind::Html,
        }
    }

    pub fn children(&self) -> &[ContentNode] {
        match self {
            Self::Document { children }
            | Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::Emphasis { children }
            | Self::Strong { children }
            | Self::Strikethrough { children }
            | Self::Link { children, .. }
            | Self::List { children, .. }
            | Self::ListItem { children }
            | Self::BlockQuote { children } => children,
            _ => &[],
        }
    }

    /// Concatenated text content, with line breaks flattened to spaces.
    pub fn plain_text(&self) -> String {
        let mut buffer = String::new();
        self.collect_text(&mut buffer);
        buffer
    }

    fn collect_text(&self, buffer: &mut String) {
        match self {
            Self::Text { value } => buffer.push_str(value),
            Self::InlineCode { code } => buffer.push_str(code),
            Self::SoftBreak | Self::LineBreak => buffer.push(' '),
            Self::Image { alt: Some(alt), .. } => buffer.push_str(alt),
            _ => {
                for child in self.children() {
                    child.collect_text(buffer);
                }
            }
        }
    }
}

/// Discriminator used to key renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Root,
    Heading(u8),
    Paragraph,
    Text,
    Emphasis,
    Strong,
    Strikethrough,
    InlineCode,
    Link,
    Image,
    CodeBlock,
    Table,
    BulletList,
    OrderedList,
    ListItem,
    BlockQuote,
    ThematicBreak,
    LineBreak,
    Html,
}

impl NodeKind {
    pub const HEADINGS: [NodeKind; 6] = [
        NodeKind::Heading(1),
        NodeKind::Heading(2),
        NodeKind::Heading(3),
        NodeKind::Heading(4),
        NodeKind::Heading(5),
        NodeKind::Heading(6),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Heading(1) => "h1",
            NodeKind::Heading(2) => "h2",
            NodeKind::Heading(3) => "h3",
            NodeKind::Heading(4) => "h4",
            NodeKind::Heading(5) => "h5",
            NodeKind::Heading(_) => "h6",
            NodeKind::Paragraph => "p",
            NodeKind::Text => "text",
            NodeKind::Emphasis => "em",
            NodeKind::Strong => "strong",
            NodeKind::Strikethrough => "del",
            NodeKind::InlineCode => "inlineCode",
            NodeKind::Link => "a",
            NodeKind::Image => "img",
            NodeKind::CodeBlock => "code",
            NodeKind::Table => "table",
            NodeKind::BulletList => "ul",
            NodeKind::OrderedList => "ol",
            NodeKind::ListItem => "li",
            NodeKind::BlockQuote => "blockquote",
            NodeKind::ThematicBreak => "hr",
            NodeKind::LineBreak => "br",
            NodeKind::Html => "html",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown node kind `{0}`")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let kind = match value {
            "root" => NodeKind::Root,
            "h1" => NodeKind::Heading(1),
            "h2" => NodeKind::Heading(2),
            "h3" => NodeKind::Heading(3),
            "h4" => NodeKind::Heading(4),
            "h5" => NodeKind::Heading(5),
            "h6" => NodeKind::Heading(6),
            "p" => NodeKind::Paragraph,
            "text" => NodeKind::Text,
            "em" => NodeKind::Emphasis,
            "strong" => NodeKind::Strong,
            "del" => NodeKind::Strikethrough,
            "inlineCode" => NodeKind::InlineCode,
            "a" => NodeKind::Link,
            "img" => NodeKind::Image,
            "code" => NodeKind::CodeBlock,
            "table" => NodeKind::Table,
            "ul" => NodeKind::BulletList,
            "ol" => NodeKind::OrderedList,
            "li" => NodeKind::ListItem,
            "blockquote" => NodeKind::BlockQuote,
            "hr" => NodeKind::ThematicBreak,
            "br" => NodeKind::LineBreak,
            "html" => NodeKind::Html,
            other => return Err(UnknownNodeKind(other.to_string())),
        };
        Ok(kind)
    }
}

/// Ordered HTML attributes. Names are kept unique; setting a name twice
/// replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Serialise as ` name="value"` pairs, each prefixed by a space.
    pub fn to_html(&self) -> String {
        self.iter()
            .map(|(name, value)| format!(" {name}=\"{}\"", escape_attribute(value)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |attributes, (name, value)| {
                attributes.with(name, value)
            })
    }
}

/// Heading discovered while rendering, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingAnchor {
    pub level: u8,
    pub text: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub html: String,
    pub headings: Vec<HeadingAnchor>,
}

/// Structured errors surfaced by the rendering pipeline.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("syntax highlighting failed: {language}: {message}")]
    Highlighting { language: String, message: String },
    #[error("renderer for `{expected}` received a `{found}` node")]
    Mismatch { expected: NodeKind, found: NodeKind },
    #[error("renderer override for `{kind}` failed: {message}")]
    Override { kind: NodeKind, message: String },
    #[error("no renderer registered for `{kind}`")]
    MissingRenderer { kind: NodeKind },
}

impl RenderError {
    pub fn override_failed(kind: NodeKind, message: impl Into<String>) -> Self {
        Self::Override {
            kind,
            message: message.into(),
        }
    }
}
