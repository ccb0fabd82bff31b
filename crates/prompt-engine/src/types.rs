//! Data model shared by the parser, renderer and export adapters

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Semantic type of a template variable
///
/// Serialized in snake_case, so [`VariableType::ImageUrl`] becomes `"image_url"`.
///
/// # Examples
///
/// ```
/// use prompt_engine::VariableType;
///
/// assert_eq!(VariableType::ImageUrl.as_str(), "image_url");
/// assert_eq!(VariableType::default(), VariableType::String);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    /// Short free-form string
    #[default]
    String,
    /// Long-form content
    Text,
    /// Numeric value
    Number,
    /// True/false flag
    Boolean,
    /// Structured value rendered as indented JSON
    Json,
    /// Link to an image or other resource
    ImageUrl,
}

impl VariableType {
    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::String => "string",
            VariableType::Text => "text",
            VariableType::Number => "number",
            VariableType::Boolean => "boolean",
            VariableType::Json => "json",
            VariableType::ImageUrl => "image_url",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unique placeholder of a template plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Identifier or dotted path as written between the braces
    pub name: String,

    /// Inferred or declared type
    #[serde(rename = "type", default)]
    pub var_type: VariableType,

    /// Whether missing data for this variable is an error for the caller
    #[serde(default = "default_required")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// `true` when `var_type` came from name heuristics
    #[serde(default)]
    pub inferred: bool,
}

fn default_required() -> bool {
    true
}

impl Variable {
    /// Create a declared variable with an explicit type
    pub fn new(name: impl Into<String>, var_type: VariableType) -> Self {
        Self {
            name: name.into(),
            var_type,
            required: true,
            description: None,
            default_value: None,
            inferred: false,
        }
    }

    /// Set whether the variable is required
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Attach a description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a default value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Whether the name is a dotted path such as `user.name`
    pub fn is_nested_path(&self) -> bool {
        self.name.contains('.')
    }
}

/// Character offsets into a template, end exclusive
///
/// Offsets count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Category of a parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorKind {
    /// Malformed placeholder
    Syntax,
    /// Self-referential or unresolved reference
    Reference,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic the template author has to fix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    #[serde(rename = "type")]
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind: ParseErrorKind::Syntax,
        }
    }

    pub fn reference(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind: ParseErrorKind::Reference,
        }
    }
}

/// An advisory diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Output of a parse call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParseResult {
    /// Unique variables in first-occurrence order
    pub variables: Vec<Variable>,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<ParseWarning>,
}

impl ParseResult {
    /// `true` when no errors were reported
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Variable names in first-occurrence order
    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// Record of one substituted variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacedValue {
    /// The value as supplied (or the default that was used)
    pub original: Value,
    /// The text written into the output
    pub replaced: String,
    /// `true` when the value came from a default rather than caller data
    #[serde(default)]
    pub is_default: bool,
}

/// Output of a render call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub text: String,
    /// Substituted variables in template order
    pub replaced: IndexMap<String, ReplacedValue>,
    /// Variables without a value under the active fallback policy
    pub missing: Vec<String>,
    /// Heuristic token count of `text`
    pub token_estimate: usize,
    /// Whether the render ran in strict mode
    #[serde(default)]
    pub strict: bool,
}

impl RenderResult {
    /// `true` when every variable had a value
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// `true` when strict mode was requested and some variables were missing
    ///
    /// Callers treat this as a validation failure; rendering itself never fails
    /// for missing data.
    pub fn strict_violation(&self) -> bool {
        self.strict && !self.missing.is_empty()
    }
}
