//! Escaping for text and attribute values written by the built-in renderers.
//! Code literals go through `ammonia::clean_text` instead.

/// Escape `&`, `<`, `>` and `"` so `value` reads as literal text.
pub(crate) fn escape_html(value: &str) -> String {
    escape(value, false)
}

/// [`escape_html`] with line breaks and tabs folded into spaces.
pub(crate) fn escape_attribute(value: &str) -> String {
    escape(value, true)
}

fn escape(value: &str, fold_whitespace: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' if fold_whitespace => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<b>Fish & \"Chips\"</b>"),
            "&lt;b&gt;Fish &amp; &quot;Chips&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("a\nb"), "a\nb");
        assert_eq!(escape_attribute("a\nb\t<c>"), "a b &lt;c&gt;");
    }
}
