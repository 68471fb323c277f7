use std::{borrow::Cow, sync::Arc};

use comrak::options::Options;
use metrics::counter;
use tracing::debug;

use crate::domain::slug::slugify;

use super::{
    highlight::{Highlighter, SyntectHighlighter},
    parse::{default_options, parse_markdown},
    table::{RendererOverrides, RendererTable},
    types::{Attributes, ContentNode, HeadingAnchor, RenderError, RenderedDocument},
};

const METRIC_DOCUMENTS_RENDERED: &str = "folio_documents_rendered_total";

/// Markdown → HTML using a table of per-kind renderers.
#[derive(Clone)]
pub struct DocumentRenderer {
    options: Options<'static>,
    builtins: RendererTable,
}

impl DocumentRenderer {
    pub fn new(highlighter: Arc<dyn Highlighter>) -> Self {
        Self::with_table(RendererTable::builtin(highlighter))
    }

    /// Render with exactly `table`, which becomes the base overrides apply to.
    pub fn with_table(table: RendererTable) -> Self {
        Self {
            options: default_options(),
            builtins: table,
        }
    }

    /// Render `source`. Overrides replace built-ins for their kinds only.
    /// Non-empty `attributes` wrap the output in a `<div>` carrying them.
    pub fn render(
        &self,
        source: &str,
        overrides: &RendererOverrides,
        attributes: &Attributes,
    ) -> Result<RenderedDocument, RenderError> {
        let table = if overrides.is_empty() {
            Cow::Borrowed(&self.builtins)
        } else {
            Cow::Owned(self.builtins.merged(overrides))
        };

        let document = parse_markdown(source, &self.options);
        let body = table.render(&document)?;

        let html = if attributes.is_empty() {
            body
        } else {
            format!("<div{}>{body}</div>", attributes.to_html())
        };

        let mut headings = Vec::new();
        collect_headings(&document, &mut headings);

        counter!(METRIC_DOCUMENTS_RENDERED).increment(1);
        debug!(
            target = "folio::render",
            bytes = source.len(),
            overrides = overrides.kinds().count(),
            headings = headings.len(),
            "rendered document"
        );

        Ok(RenderedDocument { html, headings })
    }
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new(Arc::new(SyntectHighlighter::new()))
    }
}

fn collect_headings(node: &ContentNode, headings: &mut Vec<HeadingAnchor>) {
    if let ContentNode::Heading { level, .. } = node {
        let text = node.plain_text().trim().to_string();
        headings.push(HeadingAnchor {
            level: *level,
            slug: slugify(&text),
            text,
        });
        return;
    }
    for child in node.children() {
        collect_headings(child, headings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render::types::NodeKind;

    struct EchoHighlighter;

    impl Highlighter for EchoHighlighter {
        fn highlight(&self, code: &str, language: Option<&str>) -> Result<String, RenderError> {
            Ok(format!("[{}]{}", language.unwrap_or("none"), code.trim_end()))
        }
    }

    fn renderer() -> DocumentRenderer {
        DocumentRenderer::new(Arc::new(EchoHighlighter))
    }

    #[test]
    fn renders_full_document_with_builtins() {
        let source = "# Hello World\n\nSee [docs](https://docs.rs) or [home](/).\n\n```rust\nfn main() {}\n```\n";
        let rendered = renderer()
            .render(source, &RendererOverrides::new(), &Attributes::new())
            .expect("render");

        assert_eq!(
            rendered.html,
            concat!(
                "<h1 id=\"hello-world\"><a href=\"#hello-world\" class=\"anchor\"></a>Hello World</h1>\n",
                "<p>See <a href=\"https://docs.rs\" target=\"_blank\" rel=\"noopener noreferrer\">docs</a> or <a href=\"/\">home</a>.</p>\n",
                "<pre><code class=\"language-rust\">[rust]fn main() {}</code></pre>\n",
            )
        );
        assert_eq!(
            rendered.headings,
            vec![HeadingAnchor {
                level: 1,
                text: "Hello World".to_string(),
                slug: "hello-world".to_string(),
            }]
        );
    }

    #[test]
    fn no_attributes_means_no_wrapper() {
        let rendered = renderer()
            .render("plain", &RendererOverrides::new(), &Attributes::new())
            .expect("render");
        assert_eq!(rendered.html, "<p>plain</p>\n");
    }

    #[test]
    fn pass_through_attributes_wrap_output() {
        let attributes = Attributes::new().with("class", "prose").with("id", "post");
        let rendered = renderer()
            .render("plain", &RendererOverrides::new(), &attributes)
            .expect("render");
        assert_eq!(
            rendered.html,
            "<div class=\"prose\" id=\"post\"><p>plain</p>\n</div>"
        );
    }

    #[test]
    fn overrides_take_precedence_over_builtins() {
        let overrides = RendererOverrides::new()
            .with(NodeKind::Heading(2), |node, _ctx| {
                Ok(format!("<h2>{}</h2>", node.plain_text().to_uppercase()))
            })
            .with(NodeKind::Image, |_, _| Ok("<figure></figure>".to_string()));

        let rendered = renderer()
            .render(
                "# Title\n\n## Section\n\n![alt](/a.png)\n",
                &overrides,
                &Attributes::new(),
            )
            .expect("render");

        assert!(rendered.html.contains("<h2>SECTION</h2>"));
        assert!(rendered.html.contains("<p><figure></figure></p>"));
        assert!(rendered.html.contains("<h1 id=\"title\">"));
    }

    #[test]
    fn paired_inline_html_survives_sanitising() {
        let rendered = renderer()
            .render(
                "Press <kbd>Ctrl</kbd> now <script>x()</script>",
                &RendererOverrides::new(),
                &Attributes::new(),
            )
            .expect("render");

        assert_eq!(rendered.html, "<p>Press <kbd>Ctrl</kbd> now </p>\n");
    }

    #[test]
    fn duplicate_headings_share_slug() {
        let rendered = renderer()
            .render(
                "## Notes\n\n## Notes\n",
                &RendererOverrides::new(),
                &Attributes::new(),
            )
            .expect("render");

        assert_eq!(rendered.html.matches("id=\"notes\"").count(), 2);
        assert_eq!(rendered.headings.len(), 2);
    }

    #[test]
    fn highlighter_failure_aborts_render() {
        struct Broken;
        impl Highlighter for Broken {
            fn highlight(&self, _: &str, _: Option<&str>) -> Result<String, RenderError> {
                Err(RenderError::Highlighting {
                    language: "rust".to_string(),
                    message: "boom".to_string(),
                })
            }
        }

        let err = DocumentRenderer::new(Arc::new(Broken))
            .render("```rust\nx\n```\n", &RendererOverrides::new(), &Attributes::new())
            .expect_err("must fail");
        assert!(err.to_string().contains("boom"));
    }
}
