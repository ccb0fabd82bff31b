//! Template renderer
//!
//! Substitutes placeholders with caller data, applies the fallback policy for
//! missing values and estimates the token cost of the result.

use crate::error::{PromptError, Result};
use crate::parser::TemplateParser;
use crate::scanner::{Token, scan};
use crate::tokens::estimate_tokens;
use crate::types::{RenderResult, ReplacedValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// What to write for a variable that has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Leave the original `{{name}}` token in place
    #[default]
    Keep,
    /// Substitute the empty string
    Empty,
    /// Substitute from [`RenderOptions::default_values`], else the empty string
    Default,
}

/// Options for a render call
///
/// # Examples
///
/// ```
/// use prompt_engine::{FallbackPolicy, RenderOptions};
///
/// let options = RenderOptions::new()
///     .fallback(FallbackPolicy::Default)
///     .default_value("tone", "friendly")
///     .strict(true);
/// assert_eq!(options.fallback, FallbackPolicy::Default);
/// assert!(options.auto_fill_defaults);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub fallback: FallbackPolicy,
    /// Missing values are a validation failure for the caller
    pub strict: bool,
    /// Use declared variable defaults before falling back
    pub auto_fill_defaults: bool,
    /// Values used by [`FallbackPolicy::Default`]
    pub default_values: Map<String, Value>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::Keep,
            strict: false,
            auto_fill_defaults: true,
            default_values: Map::new(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn auto_fill_defaults(mut self, enabled: bool) -> Self {
        self.auto_fill_defaults = enabled;
        self
    }

    /// Add a value for [`FallbackPolicy::Default`]
    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_values.insert(name.into(), value.into());
        self
    }
}

impl TemplateParser {
    /// Render the template against `data`
    ///
    /// Values are resolved in this order: the exact key in `data` (a JSON `null`
    /// counts as absent), the declared default when
    /// [`RenderOptions::auto_fill_defaults`] is set, then the fallback policy.
    /// Dotted names are looked up as literal keys.
    ///
    /// Missing data never fails the call, even in strict mode; see
    /// [`RenderResult::strict_violation`]. The only error is a value that cannot
    /// be serialized.
    pub fn render(&self, data: &Map<String, Value>, options: &RenderOptions) -> Result<RenderResult> {
        let tokens = scan(self.template());
        let parsed = self.analyze(&tokens);

        let mut replaced = IndexMap::new();
        let mut missing = Vec::new();
        // `None` keeps the original token text
        let mut substitutions: HashMap<&str, Option<String>> = HashMap::new();

        for variable in &parsed.variables {
            let name = variable.name.as_str();

            if let Some(value) = present(data.get(name)) {
                let text = stringify(name, value)?;
                replaced.insert(
                    name.to_string(),
                    ReplacedValue {
                        original: value.clone(),
                        replaced: text.clone(),
                        is_default: false,
                    },
                );
                substitutions.insert(name, Some(text));
                continue;
            }

            if options.auto_fill_defaults {
                if let Some(value) = present(variable.default_value.as_ref()) {
                    let text = stringify(name, value)?;
                    replaced.insert(
                        name.to_string(),
                        ReplacedValue {
                            original: value.clone(),
                            replaced: text.clone(),
                            is_default: true,
                        },
                    );
                    substitutions.insert(name, Some(text));
                    continue;
                }
            }

            let substitution = match options.fallback {
                FallbackPolicy::Keep => None,
                FallbackPolicy::Empty => Some(String::new()),
                FallbackPolicy::Default => match present(options.default_values.get(name)) {
                    Some(value) => {
                        let text = stringify(name, value)?;
                        replaced.insert(
                            name.to_string(),
                            ReplacedValue {
                                original: value.clone(),
                                replaced: text.clone(),
                                is_default: true,
                            },
                        );
                        substitutions.insert(name, Some(text));
                        continue;
                    }
                    None => Some(String::new()),
                },
            };
            missing.push(name.to_string());
            substitutions.insert(name, substitution);
        }

        let mut text = String::with_capacity(self.template().len());
        for token in &tokens {
            match token {
                Token::Text(literal) => text.push_str(literal),
                Token::Placeholder { name, raw, .. } => match substitutions.get(name) {
                    Some(Some(value)) => text.push_str(value),
                    _ => text.push_str(raw),
                },
                Token::Malformed { raw, .. } => text.push_str(raw),
            }
        }

        let token_estimate = estimate_tokens(&text);
        tracing::debug!(
            replaced = replaced.len(),
            missing = missing.len(),
            token_estimate,
            strict = options.strict,
            "Rendered template"
        );

        Ok(RenderResult {
            text,
            replaced,
            missing,
            token_estimate,
            strict: options.strict,
        })
    }
}

/// Render a template without declared variables
///
/// # Examples
///
/// ```
/// use prompt_engine::{render, RenderOptions};
/// use serde_json::json;
///
/// let data = json!({ "name": "World" });
/// let result = render("Hello {{name}}!", data.as_object().unwrap(), &RenderOptions::default())?;
/// assert_eq!(result.text, "Hello World!");
/// assert!(result.replaced.contains_key("name"));
/// assert!(result.missing.is_empty());
/// # Ok::<(), prompt_engine::PromptError>(())
/// ```
pub fn render(
    template: &str,
    data: &Map<String, Value>,
    options: &RenderOptions,
) -> Result<RenderResult> {
    TemplateParser::new(template).render(data, options)
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Scalars stringify directly, objects and arrays as indented JSON
fn stringify(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string_pretty(value)
            .map_err(|e| PromptError::serialization(format!("variable '{name}'"), e)),
    }
}
