//! Template parser
//!
//! This module provides [`TemplateParser`], which extracts the unique
//! `{{variable}}` placeholders of a template together with diagnostics.

use crate::inference::infer_type;
use crate::scanner::{Token, scan};
use crate::types::{ParseError, ParseResult, ParseWarning, Span, Variable};
use serde_json::Value;
use std::collections::HashMap;

/// Parser over one raw template
///
/// A parser can carry declared variables from an owning prompt definition. A
/// declared variable replaces the inferred metadata of the placeholder with the
/// same name, which is how descriptions and default values reach the renderer.
///
/// # Examples
///
/// ```
/// use prompt_engine::{TemplateParser, Variable, VariableType};
///
/// let parser = TemplateParser::with_declared(
///     "Summarize {{article}} in {{limit}} words",
///     vec![Variable::new("limit", VariableType::Number).default_value(100)],
/// );
///
/// let result = parser.parse();
/// assert_eq!(result.variable_names(), vec!["article", "limit"]);
/// assert!(result.get("article").unwrap().inferred);
/// assert!(!result.get("limit").unwrap().inferred);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateParser {
    template: String,
    declared: Vec<Variable>,
}

impl TemplateParser {
    /// Create a parser with no declared variables
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            declared: Vec::new(),
        }
    }

    /// Create a parser with declared variable metadata
    pub fn with_declared(
        template: impl Into<String>,
        declared: impl IntoIterator<Item = Variable>,
    ) -> Self {
        Self {
            template: template.into(),
            declared: declared.into_iter().collect(),
        }
    }

    /// The raw template
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parse the template
    ///
    /// Parsing never fails; malformed placeholders are reported in
    /// [`ParseResult::errors`] and the remaining placeholders are still extracted.
    pub fn parse(&self) -> ParseResult {
        self.analyze(&scan(&self.template))
    }

    pub(crate) fn analyze(&self, tokens: &[Token<'_>]) -> ParseResult {
        let mut result = ParseResult::default();
        let mut first_seen: HashMap<&str, Span> = HashMap::new();

        for token in tokens {
            match token {
                Token::Placeholder { name, span, .. } => {
                    if first_seen.contains_key(name) {
                        continue;
                    }
                    first_seen.insert(*name, *span);

                    let variable = self.resolve_variable(name);
                    if variable.is_nested_path() {
                        result.warnings.push(nested_path_warning(name));
                    }
                    result.variables.push(variable);
                }
                Token::Malformed { raw, span, reason } => {
                    result
                        .errors
                        .push(ParseError::syntax(reason.describe(raw), *span));
                }
                Token::Text(_) => {}
            }
        }

        for declared in &self.declared {
            match first_seen.get(declared.name.as_str()) {
                Some(span) => {
                    if refers_to_itself(declared) {
                        result.errors.push(ParseError::reference(
                            format!(
                                "Default value of '{}' refers to the variable itself",
                                declared.name
                            ),
                            *span,
                        ));
                    }
                }
                None => result.warnings.push(ParseWarning {
                    message: format!(
                        "Variable '{}' is declared but not used in the template",
                        declared.name
                    ),
                    variable: Some(declared.name.clone()),
                    suggestion: Some(format!(
                        "Add {{{{{}}}}} to the template or remove the declaration",
                        declared.name
                    )),
                }),
            }
        }

        tracing::debug!(
            variables = result.variables.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Parsed template"
        );

        result
    }

    fn resolve_variable(&self, name: &str) -> Variable {
        match self.declared.iter().find(|d| d.name == name) {
            Some(declared) => Variable {
                inferred: false,
                ..declared.clone()
            },
            None => Variable {
                name: name.to_string(),
                var_type: infer_type(name),
                required: true,
                description: None,
                default_value: None,
                inferred: true,
            },
        }
    }
}

/// Parse a template without declared variables
///
/// # Examples
///
/// ```
/// use prompt_engine::parse;
///
/// let result = parse("{{name}} and {{name}} again");
/// assert_eq!(result.variables.len(), 1);
/// assert_eq!(result.variables[0].name, "name");
/// ```
pub fn parse(template: &str) -> ParseResult {
    TemplateParser::new(template).parse()
}

fn nested_path_warning(name: &str) -> ParseWarning {
    ParseWarning {
        message: format!(
            "Variable '{name}' uses a nested path; it is looked up as a literal key, not traversed"
        ),
        variable: Some(name.to_string()),
        suggestion: Some(format!("Use a flat name such as '{}'", name.replace('.', "_"))),
    }
}

fn refers_to_itself(variable: &Variable) -> bool {
    let Some(Value::String(default)) = &variable.default_value else {
        return false;
    };
    scan(default).iter().any(|token| {
        matches!(token, Token::Placeholder { name, .. } if *name == variable.name)
    })
}
