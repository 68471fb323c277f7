use once_cell::sync::Lazy;
use syntect::{
    highlighting::ThemeSet,
    html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use super::types::RenderError;

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "syntax-" };
const STYLESHEET_THEME: &str = "InspiredGitHub";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Turns source code into highlighted markup placed inside `<pre><code>`.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<String, RenderError>;
}

/// Class-based highlighting with syntect's bundled grammars. Unknown
/// languages fall back to plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self
    }

    /// Stylesheet for the `syntax-` prefixed classes this highlighter emits.
    pub fn stylesheet() -> Result<String, RenderError> {
        let theme = THEME_SET
            .themes
            .get(STYLESHEET_THEME)
            .ok_or_else(|| RenderError::Highlighting {
                language: "css".to_string(),
                message: format!("theme `{STYLESHEET_THEME}` is not bundled"),
            })?;

        css_for_theme_with_class_style(theme, CLASS_STYLE).map_err(|err| {
            RenderError::Highlighting {
                language: "css".to_string(),
                message: err.to_string(),
            }
        })
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<String, RenderError> {
        let syntax_set: &SyntaxSet = &SYNTAX_SET;
        let lang_token = language.unwrap_or("text");
        let syntax = find_syntax(syntax_set, lang_token)
            .unwrap_or_else(|| syntax_set.find_syntax_plain_text());

        let mut code_with_newline = code.to_string();
        if !code_with_newline.ends_with('\n') {
            code_with_newline.push('\n');
        }

        let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code_with_newline.as_str()) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| RenderError::Highlighting {
                    language: lang_token.to_string(),
                    message: err.to_string(),
                })?;
        }

        Ok(generator.finalize())
    }
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(token))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}
