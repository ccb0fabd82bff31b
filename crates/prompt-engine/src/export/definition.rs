//! Prompt definitions consumed by the export adapters

use crate::parser::TemplateParser;
use crate::types::Variable;
use serde::{Deserialize, Serialize};

/// Model used when a definition has no model configuration
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 1.0;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Sampling configuration attached to a prompt
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelConfig {
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn temperature_or_default(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn top_p_or_default(&self) -> f64 {
        self.top_p.unwrap_or(DEFAULT_TOP_P)
    }

    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// A stored prompt: template plus the metadata around it
///
/// Every field is optional on input; adapters degrade to empty values instead
/// of failing on a partial definition.
///
/// # Examples
///
/// ```
/// use prompt_engine::{PromptDefinition, Variable, VariableType};
///
/// let definition = PromptDefinition::new("Greeting", "greeting", "Hello {{name}}!")
///     .with_variable(Variable::new("name", VariableType::String).description("Who to greet"))
///     .with_tags(["demo"]);
///
/// assert_eq!(definition.input_variables(), vec!["name"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub template_content: String,
    pub variables: Vec<Variable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_config: Option<ModelConfig>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PromptDefinition {
    pub fn new(
        name: impl Into<String>,
        key: impl Into<String>,
        template_content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            template_content: template_content.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_model_config(mut self, config: ModelConfig) -> Self {
        self.model_config = Some(config);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Parser over the template carrying the declared variables
    pub fn parser(&self) -> TemplateParser {
        TemplateParser::with_declared(self.template_content.clone(), self.variables.clone())
    }

    /// Declared variable names, or the parsed ones when nothing is declared
    pub fn input_variables(&self) -> Vec<String> {
        if self.variables.is_empty() {
            crate::parse(&self.template_content).variable_names()
        } else {
            self.variables.iter().map(|v| v.name.clone()).collect()
        }
    }

    /// Model configuration, or all defaults
    pub fn model_config_or_default(&self) -> ModelConfig {
        self.model_config.clone().unwrap_or_default()
    }

    /// `key`, else `name`, else `"prompt"`
    pub(crate) fn file_stem(&self) -> &str {
        [self.key.as_str(), self.name.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("prompt")
    }
}
