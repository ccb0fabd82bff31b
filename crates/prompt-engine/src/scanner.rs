//! Placeholder scanner
//!
//! Splits a template into literal text, well-formed placeholders and malformed
//! placeholders. The parser, renderer and highlighter all walk the same token
//! stream so they agree on what counts as a placeholder.

use crate::types::Span;
use regex::Regex;
use std::sync::LazyLock;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// One or more ASCII word segments joined by dots
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*$").expect("identifier pattern is valid")
});

/// Why a placeholder could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Malformed {
    /// `{{` without a matching `}}`
    Unclosed,
    /// `{{}}` or only whitespace between the braces
    Empty,
    /// Characters outside `[A-Za-z0-9_.]`, or empty path segments
    InvalidIdentifier,
}

impl Malformed {
    pub(crate) fn describe(self, raw: &str) -> String {
        match self {
            Malformed::Unclosed => format!("Unclosed placeholder '{raw}': missing '}}}}'"),
            Malformed::Empty => format!("Empty placeholder '{raw}'"),
            Malformed::InvalidIdentifier => format!(
                "Invalid variable name in '{raw}': use letters, digits, underscores and dots"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Placeholder {
        /// Trimmed identifier
        name: &'a str,
        /// Full token text including braces
        raw: &'a str,
        span: Span,
    },
    Malformed {
        raw: &'a str,
        span: Span,
        reason: Malformed,
    },
}

/// Converts increasing byte offsets into character offsets without rescanning
struct CharCursor<'a> {
    source: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            byte: 0,
            chars: 0,
        }
    }

    fn offset(&mut self, byte: usize) -> usize {
        self.chars += self.source[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }

    fn span(&mut self, start: usize, end: usize) -> Span {
        Span::new(self.offset(start), self.offset(end))
    }
}

/// Scan a template into tokens
///
/// Scanning never fails: malformed placeholders become [`Token::Malformed`] and
/// scanning resumes right after them.
pub(crate) fn scan(template: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut cursor = CharCursor::new(template);
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(found) = template[pos..].find(OPEN) {
        let mut open = pos + found;
        // Extra leading braces of a `{{{` run are literal text
        while template[open + 1..].starts_with(OPEN) {
            open += 1;
        }
        let inner_start = open + OPEN.len();
        let close = template[inner_start..].find(CLOSE).map(|i| inner_start + i);
        let next_open = template[inner_start..].find(OPEN).map(|i| inner_start + i);

        if open > text_start {
            tokens.push(Token::Text(&template[text_start..open]));
        }

        match close {
            Some(close) if next_open.is_none_or(|next| next > close) => {
                let end = close + CLOSE.len();
                let raw = &template[open..end];
                let name = template[inner_start..close].trim();
                let span = cursor.span(open, end);

                let token = if name.is_empty() {
                    Token::Malformed {
                        raw,
                        span,
                        reason: Malformed::Empty,
                    }
                } else if IDENTIFIER.is_match(name) {
                    Token::Placeholder { name, raw, span }
                } else {
                    Token::Malformed {
                        raw,
                        span,
                        reason: Malformed::InvalidIdentifier,
                    }
                };
                tokens.push(token);
                pos = end;
            }
            _ => {
                // Runs up to the next opening braces so the rest still scans
                let end = next_open.unwrap_or(template.len());
                tokens.push(Token::Malformed {
                    raw: &template[open..end],
                    span: cursor.span(open, end),
                    reason: Malformed::Unclosed,
                });
                pos = end;
            }
        }
        text_start = pos;
    }

    if text_start < template.len() {
        tokens.push(Token::Text(&template[text_start..]));
    }

    tokens
}
