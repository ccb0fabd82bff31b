//! Markdown export, rendered with MiniJinja

use super::definition::PromptDefinition;
use crate::error::{PromptError, Result};
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use serde_json::Value;

/// Default values longer than this are cut off in the variable table
const DEFAULT_DISPLAY_LIMIT: usize = 30;

const MARKDOWN_TEMPLATE: &str = r"# {{ title }}

{% if description %}
{{ description }}

{% endif %}
## Metadata

- **Key**: `{{ key }}`
- **Category**: {{ category }}
- **Version**: {{ version }}
- **Tags**: {{ tags }}

{% if variables %}
## Variables

| Name | Type | Required | Description | Default |
| --- | --- | --- | --- | --- |
{% for v in variables %}
| `{{ v.name }}` | {{ v.type }} | {{ v.required }} | {{ v.description }} | {{ v.default }} |
{% endfor %}

{% endif %}
## Template

{{ fence }}text
{{ template }}
{{ fence }}
{% if model %}

## Model Configuration

{% for line in model %}
- {{ line }}
{% endfor %}
{% endif %}
";

#[derive(Debug, Serialize)]
struct MarkdownContext<'a> {
    title: &'a str,
    description: Option<&'a str>,
    key: &'a str,
    category: &'a str,
    version: &'a str,
    tags: String,
    variables: Vec<MarkdownVariable>,
    fence: String,
    template: &'a str,
    model: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MarkdownVariable {
    name: String,
    #[serde(rename = "type")]
    var_type: &'static str,
    required: &'static str,
    description: String,
    default: String,
}

/// Human-readable document describing a prompt definition
///
/// Sections: title and description, metadata, a variable table, the raw
/// template as a fenced code block, and the model configuration when present.
pub fn export_as_markdown(definition: &PromptDefinition) -> Result<String> {
    let context = MarkdownContext {
        title: non_empty(&definition.name).unwrap_or("Untitled Prompt"),
        description: definition.description.as_deref().and_then(non_empty),
        key: non_empty(&definition.key).unwrap_or("-"),
        category: definition
            .category
            .as_deref()
            .and_then(non_empty)
            .unwrap_or("-"),
        version: definition
            .version
            .as_deref()
            .and_then(non_empty)
            .unwrap_or("-"),
        tags: if definition.tags.is_empty() {
            "-".to_string()
        } else {
            definition.tags.join(", ")
        },
        variables: definition
            .variables
            .iter()
            .map(|v| MarkdownVariable {
                name: v.name.clone(),
                var_type: v.var_type.as_str(),
                required: if v.required { "Yes" } else { "No" },
                description: v
                    .description
                    .as_deref()
                    .map_or_else(|| "-".to_string(), table_cell),
                default: v
                    .default_value
                    .as_ref()
                    .map_or_else(|| "-".to_string(), display_default),
            })
            .collect(),
        fence: fence_for(&definition.template_content),
        template: &definition.template_content,
        model: definition
            .model_config
            .as_ref()
            .map(|config| {
                let mut lines = Vec::new();
                if let Some(model) = &config.model {
                    lines.push(format!("**Model**: {model}"));
                }
                if let Some(temperature) = config.temperature {
                    lines.push(format!("**Temperature**: {temperature}"));
                }
                if let Some(top_p) = config.top_p {
                    lines.push(format!("**Top P**: {top_p}"));
                }
                if let Some(max_tokens) = config.max_tokens {
                    lines.push(format!("**Max Tokens**: {max_tokens}"));
                }
                lines
            })
            .unwrap_or_default(),
    };

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);

    env.render_str(MARKDOWN_TEMPLATE, &context)
        .map_err(|e| PromptError::TemplateRender {
            name: "markdown".to_string(),
            detail: e.to_string(),
        })
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Keep a value on one table row
fn table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn display_default(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let cell = table_cell(&text);
    if cell.chars().count() > DEFAULT_DISPLAY_LIMIT {
        let truncated: String = cell.chars().take(DEFAULT_DISPLAY_LIMIT).collect();
        format!("{truncated}...")
    } else {
        cell
    }
}

/// A backtick fence longer than any backtick run in `content`
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}
