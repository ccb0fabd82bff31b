//! Export adapters for prompt definitions
//!
//! Every adapter is a pure function of the definition (plus the clock for the
//! `exportAt` tag). [`export_prompt`] dispatches on [`ExportFormat`] and names
//! the output file after the definition key.

mod definition;
mod formats;
mod markdown;
mod preview;

pub use definition::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TOP_P, ModelConfig,
    PromptDefinition,
};
pub use formats::{
    EXPORT_FORMAT_TAG, export_as_json, export_as_langchain, export_as_langchain_chat,
    export_as_openai, import_from_json,
};
pub use markdown::export_as_markdown;
pub use preview::{PREVIEW_PARAM, generate_preview_link, parse_preview_link};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported export targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Json,
    Langchain,
    LangchainChat,
    Markdown,
    Openai,
}

impl ExportFormat {
    pub const ALL: [Self; 5] = [
        Self::Json,
        Self::Langchain,
        Self::LangchainChat,
        Self::Markdown,
        Self::Openai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Langchain => "langchain",
            Self::LangchainChat => "langchain-chat",
            Self::Markdown => "markdown",
            Self::Openai => "openai",
        }
    }

    /// File suffix appended to the sanitized definition key
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => ".json",
            Self::Langchain => ".langchain.json",
            Self::LangchainChat => ".langchain-chat.json",
            Self::Markdown => ".md",
            Self::Openai => ".openai.json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown",
            _ => "application/json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(ExportFormat::as_str).collect();
                format!(
                    "Unknown export format '{s}', expected one of: {}",
                    known.join(", ")
                )
            })
    }
}

/// How to export a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Only affects the `json` format; the other JSON formats are always pretty
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            pretty: true,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Output of [`export_prompt`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPrompt {
    pub content: String,
    pub filename: String,
    pub mime_type: String,
}

/// Export a definition in the requested format
///
/// # Examples
///
/// ```
/// use prompt_engine::{export_prompt, ExportFormat, ExportOptions, PromptDefinition};
///
/// let definition = PromptDefinition::new("Greeting", "greeting", "Hello {{name}}!");
/// let exported = export_prompt(&definition, &ExportOptions::new(ExportFormat::Markdown))?;
///
/// assert_eq!(exported.filename, "greeting.md");
/// assert_eq!(exported.mime_type, "text/markdown");
/// assert!(exported.content.starts_with("# Greeting"));
/// # Ok::<(), prompt_engine::PromptError>(())
/// ```
pub fn export_prompt(
    definition: &PromptDefinition,
    options: &ExportOptions,
) -> Result<ExportedPrompt> {
    let content = match options.format {
        ExportFormat::Json => export_as_json(definition, options.pretty)?,
        ExportFormat::Langchain => export_as_langchain(definition)?,
        ExportFormat::LangchainChat => export_as_langchain_chat(definition)?,
        ExportFormat::Markdown => export_as_markdown(definition)?,
        ExportFormat::Openai => export_as_openai(definition)?,
    };

    let filename = format!(
        "{}{}",
        sanitize_filename(definition.file_stem()),
        options.format.extension()
    );
    tracing::debug!(format = %options.format, %filename, "Exported prompt");

    Ok(ExportedPrompt {
        content,
        filename,
        mime_type: options.format.mime_type().to_string(),
    })
}

/// Replace everything outside `[A-Za-z0-9_-]` with `_`
pub fn sanitize_filename(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
