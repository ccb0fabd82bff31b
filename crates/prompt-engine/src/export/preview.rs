//! Shareable preview links
//!
//! The definition travels base64-encoded in the `data` query parameter. Links
//! are unsigned and carry no expiry; they are a convenience for sharing drafts,
//! not an access control mechanism.

use super::definition::PromptDefinition;
use super::formats::to_json;
use crate::error::{PromptError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

/// Query parameter carrying the encoded definition
pub const PREVIEW_PARAM: &str = "data";

const PREVIEW_PATH: [&str; 2] = ["prompt", "preview"];

/// Build `{base_url}/prompt/preview?data=<base64 json>`
///
/// # Examples
///
/// ```
/// use prompt_engine::{generate_preview_link, parse_preview_link, PromptDefinition};
///
/// let definition = PromptDefinition::new("Greeting", "greeting", "Hello {{name}}!");
/// let link = generate_preview_link(&definition, "https://prompts.example.com")?;
/// assert!(link.starts_with("https://prompts.example.com/prompt/preview?data="));
///
/// assert_eq!(parse_preview_link(&link)?, definition);
/// # Ok::<(), prompt_engine::PromptError>(())
/// ```
pub fn generate_preview_link(definition: &PromptDefinition, base_url: &str) -> Result<String> {
    let mut url = Url::parse(base_url).map_err(|e| PromptError::InvalidUrl {
        url: base_url.to_string(),
        detail: e.to_string(),
    })?;

    let snapshot = serde_json::to_value(definition)
        .map_err(|e| PromptError::serialization("prompt definition", e))?;
    let encoded = STANDARD.encode(to_json(&snapshot, false)?);

    url.path_segments_mut()
        .map_err(|()| PromptError::InvalidUrl {
            url: base_url.to_string(),
            detail: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(PREVIEW_PATH);
    url.query_pairs_mut().append_pair(PREVIEW_PARAM, &encoded);

    Ok(url.into())
}

/// Decode a link produced by [`generate_preview_link`]
pub fn parse_preview_link(link: &str) -> Result<PromptDefinition> {
    let url = Url::parse(link).map_err(|e| PromptError::InvalidUrl {
        url: link.to_string(),
        detail: e.to_string(),
    })?;

    let encoded = url
        .query_pairs()
        .find(|(name, _)| name == PREVIEW_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            PromptError::InvalidPreviewLink(format!("missing '{PREVIEW_PARAM}' parameter"))
        })?;

    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| PromptError::InvalidPreviewLink(e.to_string()))?;

    Ok(serde_json::from_slice(&bytes)?)
}
