//! JSON-based export formats

use super::definition::PromptDefinition;
use crate::error::{PromptError, Result};
use crate::scanner::{Token, scan};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value, json};

/// Value of the `exportFormat` tag in JSON exports
pub const EXPORT_FORMAT_TAG: &str = "prompt-engine";

/// Full snapshot of a definition, tagged with `exportFormat` and `exportAt`
///
/// # Examples
///
/// ```
/// use prompt_engine::{export_as_json, PromptDefinition};
///
/// let definition = PromptDefinition::new("Greeting", "greeting", "Hello {{name}}!");
/// let json = export_as_json(&definition, true)?;
///
/// let value: serde_json::Value = serde_json::from_str(&json)?;
/// assert_eq!(value["name"], "Greeting");
/// assert_eq!(value["exportFormat"], "prompt-engine");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn export_as_json(definition: &PromptDefinition, pretty: bool) -> Result<String> {
    let mut value = serde_json::to_value(definition)
        .map_err(|e| PromptError::serialization("prompt definition", e))?;

    if let Value::Object(map) = &mut value {
        map.insert("exportFormat".to_string(), json!(EXPORT_FORMAT_TAG));
        map.insert(
            "exportAt".to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
    }

    to_json(&value, pretty)
}

/// Read a definition back from [`export_as_json`] output
///
/// The export tags are ignored, so plain definition JSON is accepted as well.
pub fn import_from_json(json: &str) -> Result<PromptDefinition> {
    Ok(serde_json::from_str(json)?)
}

/// LangChain `PromptTemplate` in f-string format
pub fn export_as_langchain(definition: &PromptDefinition) -> Result<String> {
    let value = json!({
        "_type": "prompt",
        "input_variables": definition.input_variables(),
        "template": to_f_string(&definition.template_content),
        "template_format": "f-string",
        "metadata": metadata(definition),
    });
    to_json(&value, true)
}

/// LangChain `ChatPromptTemplate` with the template as one system message
pub fn export_as_langchain_chat(definition: &PromptDefinition) -> Result<String> {
    let input_variables = definition.input_variables();
    let value = json!({
        "_type": "chat_prompt",
        "input_variables": input_variables,
        "messages": [{
            "role": "system",
            "content": to_f_string(&definition.template_content),
            "input_variables": input_variables,
        }],
        "template_format": "f-string",
        "metadata": metadata(definition),
    });
    to_json(&value, true)
}

/// Chat-completions request body with the template as the system message
///
/// Missing model settings fall back to `gpt-4o`, temperature 0.7, top_p 1 and
/// 2048 max tokens.
pub fn export_as_openai(definition: &PromptDefinition) -> Result<String> {
    let config = definition.model_config_or_default();
    let value = json!({
        "model": config.model_or_default(),
        "messages": [{
            "role": "system",
            "content": definition.template_content,
        }],
        "temperature": config.temperature_or_default(),
        "top_p": config.top_p_or_default(),
        "max_tokens": config.max_tokens_or_default(),
    });
    to_json(&value, true)
}

fn metadata(definition: &PromptDefinition) -> Value {
    let mut map = Map::new();
    map.insert("name".to_string(), json!(definition.name));
    map.insert("key".to_string(), json!(definition.key));
    if let Some(description) = &definition.description {
        map.insert("description".to_string(), json!(description));
    }
    map.insert("tags".to_string(), json!(definition.tags));
    if let Some(category) = &definition.category {
        map.insert("category".to_string(), json!(category));
    }
    if let Some(version) = &definition.version {
        map.insert("version".to_string(), json!(version));
    }
    Value::Object(map)
}

/// Rewrite `{{name}}` placeholders as `{name}` and escape literal braces
fn to_f_string(template: &str) -> String {
    let escape = |text: &str| text.replace('{', "{{").replace('}', "}}");
    scan(template)
        .into_iter()
        .map(|token| match token {
            Token::Text(text) => escape(text),
            Token::Placeholder { name, .. } => format!("{{{name}}}"),
            Token::Malformed { raw, .. } => escape(raw),
        })
        .collect()
}

pub(super) fn to_json(value: &Value, pretty: bool) -> Result<String> {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|e| PromptError::serialization("export", e))
}
