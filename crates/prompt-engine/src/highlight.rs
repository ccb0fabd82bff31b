//! HTML syntax highlighting for template editors

use crate::scanner::{Token, scan};

/// CSS class on well-formed placeholders
pub const VARIABLE_CLASS: &str = "prompt-variable";

/// CSS class on malformed placeholders
pub const ERROR_CLASS: &str = "prompt-variable-error";

/// Render a template as an HTML fragment with placeholders wrapped in spans
///
/// Each placeholder becomes
/// `<span class="prompt-variable" data-variable="name">{{name}}</span>`. All
/// template text is HTML-escaped, so the output is safe to inject as raw HTML.
///
/// # Examples
///
/// ```
/// use prompt_engine::highlight;
///
/// let html = highlight("Hello {{name}}!");
/// assert_eq!(
///     html,
///     r#"Hello <span class="prompt-variable" data-variable="name">{{name}}</span>!"#
/// );
/// ```
pub fn highlight(template: &str) -> String {
    let mut html = String::with_capacity(template.len() * 2);

    for token in scan(template) {
        match token {
            Token::Text(text) => html.push_str(&html_escape(text)),
            Token::Placeholder { name, raw, .. } => {
                html.push_str(&format!(
                    r#"<span class="{VARIABLE_CLASS}" data-variable="{}">{}</span>"#,
                    html_escape(name),
                    html_escape(raw)
                ));
            }
            Token::Malformed { raw, reason, .. } => {
                html.push_str(&format!(
                    r#"<span class="{ERROR_CLASS}" title="{}">{}</span>"#,
                    html_escape(&reason.describe(raw)),
                    html_escape(raw)
                ));
            }
        }
    }

    html
}

impl crate::TemplateParser {
    /// Highlight the parser's template, see [`highlight`]
    pub fn highlight(&self) -> String {
        highlight(self.template())
    }
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
