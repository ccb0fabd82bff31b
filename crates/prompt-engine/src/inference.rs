//! Name-based type inference
//!
//! Templates carry no type declarations, so a variable's type is guessed from
//! its name. [`RULES`] is evaluated top to bottom and the first matching rule
//! wins; names that match nothing are [`VariableType::String`].
//!
//! Precedence: image/url cues, then JSON cues, then boolean cues, then content
//! cues, then numeric cues. `textCount` is therefore `text`, and `imageCount`
//! is `image_url`.

use crate::types::VariableType;

/// A single way a name can match a rule
#[derive(Debug, Clone, Copy)]
enum Cue {
    /// Substring of the lower-cased name
    Contains(&'static [&'static str]),
    /// Whole word token
    Word(&'static [&'static str]),
    /// First word token only
    Leading(&'static [&'static str]),
    /// Suffix of the lower-cased name
    Suffix(&'static [&'static str]),
}

impl Cue {
    fn matches(self, lowered: &str, words: &[String]) -> bool {
        match self {
            Cue::Contains(needles) => needles.iter().any(|n| lowered.contains(n)),
            Cue::Word(needles) => words.iter().any(|w| needles.contains(&w.as_str())),
            Cue::Leading(needles) => words
                .first()
                .is_some_and(|w| needles.contains(&w.as_str())),
            Cue::Suffix(needles) => needles.iter().any(|n| lowered.ends_with(n)),
        }
    }
}

#[derive(Debug)]
struct Rule {
    cues: &'static [Cue],
    var_type: VariableType,
}

const RULES: &[Rule] = &[
    Rule {
        cues: &[
            Cue::Contains(&["image", "img", "url", "avatar", "photo"]),
            Cue::Word(&["icon", "picture", "link"]),
        ],
        var_type: VariableType::ImageUrl,
    },
    Rule {
        cues: &[
            Cue::Contains(&["json"]),
            Cue::Word(&["data", "config", "options", "payload", "metadata", "schema"]),
        ],
        var_type: VariableType::Json,
    },
    Rule {
        cues: &[
            Cue::Leading(&["is", "has", "should", "can", "enable", "allow"]),
            Cue::Word(&["flag", "enabled"]),
        ],
        var_type: VariableType::Boolean,
    },
    Rule {
        cues: &[
            Cue::Contains(&["content", "text", "description", "message", "context"]),
            Cue::Word(&[
                "body",
                "article",
                "question",
                "answer",
                "summary",
                "paragraph",
                "prompt",
            ]),
        ],
        var_type: VariableType::Text,
    },
    Rule {
        cues: &[
            Cue::Word(&[
                "count", "number", "num", "age", "amount", "total", "price", "quantity", "size",
                "limit", "max", "min", "score", "index", "year", "days",
            ]),
            Cue::Suffix(&["count"]),
        ],
        var_type: VariableType::Number,
    },
];

/// Infer a variable type from its name
///
/// # Examples
///
/// ```
/// use prompt_engine::{infer_type, VariableType};
///
/// assert_eq!(infer_type("imageUrl"), VariableType::ImageUrl);
/// assert_eq!(infer_type("content"), VariableType::Text);
/// assert_eq!(infer_type("count"), VariableType::Number);
/// assert_eq!(infer_type("name"), VariableType::String);
/// ```
pub fn infer_type(name: &str) -> VariableType {
    let lowered = name.to_lowercase();
    let words = split_words(name);

    RULES
        .iter()
        .find(|rule| rule.cues.iter().any(|cue| cue.matches(&lowered, &words)))
        .map_or(VariableType::String, |rule| rule.var_type)
}

/// Split an identifier on `_`, `-`, `.` and lower-to-upper camelCase boundaries
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("imageUrl"), vec!["image", "url"]);
        assert_eq!(split_words("max_tokens"), vec!["max", "tokens"]);
        assert_eq!(split_words("user.name"), vec!["user", "name"]);
        assert_eq!(split_words("HTMLBody"), vec!["htmlbody"]);
        assert_eq!(split_words("page2Title"), vec!["page2", "title"]);
    }

    #[test]
    fn test_image_url_rule() {
        assert_eq!(infer_type("imageUrl"), VariableType::ImageUrl);
        assert_eq!(infer_type("avatar"), VariableType::ImageUrl);
        assert_eq!(infer_type("product_photo"), VariableType::ImageUrl);
        assert_eq!(infer_type("icon"), VariableType::ImageUrl);
    }

    #[test]
    fn test_json_rule() {
        assert_eq!(infer_type("jsonPayload"), VariableType::Json);
        assert_eq!(infer_type("userData"), VariableType::Json);
        assert_eq!(infer_type("config"), VariableType::Json);
    }

    #[test]
    fn test_boolean_rule() {
        assert_eq!(infer_type("isActive"), VariableType::Boolean);
        assert_eq!(infer_type("has_access"), VariableType::Boolean);
        assert_eq!(infer_type("featureFlag"), VariableType::Boolean);
    }

    #[test]
    fn test_text_rule() {
        assert_eq!(infer_type("content"), VariableType::Text);
        assert_eq!(infer_type("userMessage"), VariableType::Text);
        assert_eq!(infer_type("question"), VariableType::Text);
    }

    #[test]
    fn test_number_rule() {
        assert_eq!(infer_type("count"), VariableType::Number);
        assert_eq!(infer_type("itemCount"), VariableType::Number);
        assert_eq!(infer_type("wordcount"), VariableType::Number);
        assert_eq!(infer_type("user_age"), VariableType::Number);
        assert_eq!(infer_type("max_tokens"), VariableType::Number);
    }

    #[test]
    fn test_default_string() {
        assert_eq!(infer_type("name"), VariableType::String);
        assert_eq!(infer_type("language"), VariableType::String);
        assert_eq!(infer_type("username"), VariableType::String);
    }

    #[test]
    fn test_precedence() {
        // image before content, content before number
        assert_eq!(infer_type("imageDescription"), VariableType::ImageUrl);
        assert_eq!(infer_type("textCount"), VariableType::Text);
        assert_eq!(infer_type("isImage"), VariableType::ImageUrl);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(infer_type("IMAGE_URL"), VariableType::ImageUrl);
        assert_eq!(infer_type("Content"), VariableType::Text);
    }
}
