use comrak::{
    Arena,
    nodes::{AstNode, ListType, NodeValue},
    options::Options,
    parse_document,
};

use super::{
    escape::escape_html,
    types::{Attributes, ContentNode},
};

pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.front_matter_delimiter = Some("---".to_string());
    options
}

/// Parse markdown into a [`ContentNode::Document`].
pub(crate) fn parse_markdown(source: &str, options: &Options<'static>) -> ContentNode {
    let arena = Arena::new();
    let root = parse_document(&arena, source, options);
    ContentNode::Document {
        children: convert_children(root, false),
    }
}

fn convert_children<'a>(node: &'a AstNode<'a>, tight: bool) -> Vec<ContentNode> {
    let mut children = Vec::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        children.extend(convert(next, tight));
        child = next.next_sibling();
    }
    join_inline_html(children)
}

/// Inline HTML arrives one tag at a time. A run of tags, together with the
/// plain text between them, becomes a single fragment so open and close tags
/// are sanitised as a pair. Text inside the run is escaped.
fn join_inline_html(children: Vec<ContentNode>) -> Vec<ContentNode> {
    if !children
        .iter()
        .any(|child| matches!(child, ContentNode::Html { .. }))
    {
        return children;
    }

    let mut joined = Vec::with_capacity(children.len());
    let mut fragment: Option<String> = None;
    let mut held = Vec::new();

    for child in children {
        match child {
            ContentNode::Html { raw } => {
                let buffer = fragment.get_or_insert_with(String::new);
                for between in held.drain(..) {
                    match between {
                        ContentNode::Text { value } => buffer.push_str(&escape_html(&value)),
                        _ => buffer.push('\n'),
                    }
                }
                buffer.push_str(&raw);
            }
            ContentNode::Text { .. } | ContentNode::SoftBreak if fragment.is_some() => {
                held.push(child);
            }
            other => {
                if let Some(raw) = fragment.take() {
                    joined.push(ContentNode::Html { raw });
                }
                joined.append(&mut held);
                joined.push(other);
            }
        }
    }

    if let Some(raw) = fragment {
        joined.push(ContentNode::Html { raw });
    }
    joined.append(&mut held);
    joined
}

/// Convert one comrak node. Containers without a counterpart splice their
/// children into the parent; everything else without one is dropped.
fn convert<'a>(node: &'a AstNode<'a>, tight: bool) -> Vec<ContentNode> {
    let data = node.data.borrow();
    let converted = match &data.value {
        NodeValue::FrontMatter(_) => return Vec::new(),
        NodeValue::Heading(heading) => ContentNode::Heading {
            level: heading.level,
            children: convert_children(node, false),
        },
        NodeValue::Paragraph if tight => return convert_children(node, false),
        NodeValue::Paragraph => ContentNode::Paragraph {
            children: convert_children(node, false),
        },
        NodeValue::Text(text) => ContentNode::text(text.to_string()),
        NodeValue::SoftBreak => ContentNode::SoftBreak,
        NodeValue::LineBreak => ContentNode::LineBreak,
        NodeValue::Emph => ContentNode::Emphasis {
            children: convert_children(node, false),
        },
        NodeValue::Strong => ContentNode::Strong {
            children: convert_children(node, false),
        },
        NodeValue::Strikethrough => ContentNode::Strikethrough {
            children: convert_children(node, false),
        },
        NodeValue::Code(code) => ContentNode::InlineCode {
            code: code.literal.clone(),
        },
        NodeValue::Link(link) => ContentNode::Link {
            href: link.url.clone(),
            title: non_empty(&link.title),
            children: convert_children(node, false),
        },
        NodeValue::Image(link) => {
            let mut attributes = Attributes::new();
            if let Some(title) = non_empty(&link.title) {
                attributes.set("title", title);
            }
            ContentNode::Image {
                src: link.url.clone(),
                alt: non_empty(&collect_inline_text(node)),
                attributes,
            }
        }
        NodeValue::CodeBlock(block) => ContentNode::CodeBlock {
            code: block.literal.clone(),
            language: block
                .info
                .split_whitespace()
                .next()
                .map(ToString::to_string),
        },
        NodeValue::Table(_) => convert_table(node),
        NodeValue::List(list) => ContentNode::List {
            ordered: list.list_type == ListType::Ordered,
            start: list.start,
            children: convert_children(node, list.tight),
        },
        NodeValue::Item(_) => ContentNode::ListItem {
            children: convert_children(node, tight),
        },
        NodeValue::BlockQuote => ContentNode::BlockQuote {
            children: convert_children(node, false),
        },
        NodeValue::ThematicBreak => ContentNode::ThematicBreak,
        NodeValue::HtmlBlock(block) => ContentNode::Html {
            raw: block.literal.clone(),
        },
        NodeValue::HtmlInline(raw) => ContentNode::Html { raw: raw.clone() },
        _ => return convert_children(node, tight),
    };
    vec![converted]
}

fn convert_table<'a>(node: &'a AstNode<'a>) -> ContentNode {
    let mut headers = Vec::new();
    let mut rows = Vec::new();

    let mut row = node.first_child();
    while let Some(current) = row {
        let is_header = matches!(current.data.borrow().value, NodeValue::TableRow(true));
        let mut cells = Vec::new();
        let mut cell = current.first_child();
        while let Some(next) = cell {
            cells.push(collect_inline_text(next));
            cell = next.next_sibling();
        }

        if is_header && headers.is_empty() {
            headers = cells;
        } else {
            rows.push(cells);
        }
        row = current.next_sibling();
    }

    ContentNode::Table { headers, rows }
}

fn collect_inline_text(node: &AstNode<'_>) -> String {
    fn walk(node: &AstNode<'_>, buffer: &mut String) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                _ => {}
            }
        }
        let mut child = node.first_child();
        while let Some(next) = child {
            walk(next, buffer);
            child = next.next_sibling();
        }
    }

    let mut text = String::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        walk(next, &mut text);
        child = next.next_sibling();
    }
    text
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<ContentNode> {
        match parse_markdown(source, &default_options()) {
            ContentNode::Document { children } => children,
            other => panic!("expected document, got {other:?}"),
        }
    }

    #[test]
    fn headings_keep_level_and_inline_children() {
        let nodes = parse("## Hello *World*");
        assert_eq!(
            nodes,
            vec![ContentNode::Heading {
                level: 2,
                children: vec![
                    ContentNode::text("Hello "),
                    ContentNode::Emphasis {
                        children: vec![ContentNode::text("World")],
                    },
                ],
            }]
        );
    }

    #[test]
    fn front_matter_is_not_content() {
        let nodes = parse("---\ntitle: Hidden\n---\n\nVisible");
        assert_eq!(
            nodes,
            vec![ContentNode::Paragraph {
                children: vec![ContentNode::text("Visible")],
            }]
        );
    }

    #[test]
    fn tables_split_header_and_rows() {
        let nodes = parse("| a | b |\n|---|---|\n| 1 | `2` |\n| 3 | 4 |\n");
        assert_eq!(
            nodes,
            vec![ContentNode::Table {
                headers: vec!["a".to_string(), "b".to_string()],
                rows: vec![
                    vec!["1".to_string(), "2".to_string()],
                    vec!["3".to_string(), "4".to_string()],
                ],
            }]
        );
    }

    #[test]
    fn images_carry_alt_and_title() {
        let nodes = parse("![A cat](/cat.png \"Cat\")");
        let ContentNode::Paragraph { children } = &nodes[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            children[0],
            ContentNode::Image {
                src: "/cat.png".to_string(),
                alt: Some("A cat".to_string()),
                attributes: Attributes::new().with("title", "Cat"),
            }
        );
    }

    #[test]
    fn code_blocks_use_first_info_token_as_language() {
        let nodes = parse("```rust ignore\nfn main() {}\n```\n");
        assert_eq!(
            nodes,
            vec![ContentNode::CodeBlock {
                code: "fn main() {}\n".to_string(),
                language: Some("rust".to_string()),
            }]
        );
    }

    #[test]
    fn inline_html_tags_join_with_the_text_between_them() {
        let nodes = parse("Press <kbd>Ctrl</kbd> & <kbd>C</kbd> now");
        let ContentNode::Paragraph { children } = &nodes[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            children,
            &vec![
                ContentNode::text("Press "),
                ContentNode::Html {
                    raw: "<kbd>Ctrl</kbd> &amp; <kbd>C</kbd>".to_string(),
                },
                ContentNode::text(" now"),
            ]
        );
    }

    #[test]
    fn tight_list_items_drop_paragraph_wrappers() {
        let nodes = parse("3. one\n4. two\n");
        let ContentNode::List {
            ordered,
            start,
            children,
        } = &nodes[0]
        else {
            panic!("expected list");
        };
        assert!(*ordered);
        assert_eq!(*start, 3);
        assert_eq!(
            children[0],
            ContentNode::ListItem {
                children: vec![ContentNode::text("one")],
            }
        );
    }
}
