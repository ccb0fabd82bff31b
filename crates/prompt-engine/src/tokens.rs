//! Heuristic token estimation
//!
//! Approximates LLM input cost for display. It is not any model's tokenizer:
//! every CJK character counts as one token and every run of other
//! non-whitespace characters counts as 1.5 tokens, rounded up over the total.

/// Estimate the token count of `text`
///
/// # Examples
///
/// ```
/// use prompt_engine::estimate_tokens;
///
/// assert_eq!(estimate_tokens(""), 0);
/// assert_eq!(estimate_tokens("Hello World!"), 3);
/// assert_eq!(estimate_tokens("你好"), 2);
/// ```
pub fn estimate_tokens(text: &str) -> usize {
    let mut cjk = 0usize;
    let mut words = 0usize;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            cjk += 1;
            in_word = false;
        } else if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            words += 1;
            in_word = true;
        }
    }

    cjk + (words * 3).div_ceil(2)
}

/// Han ideographs, kana, hangul and full-width forms
fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{3040}'..='\u{30FF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{AC00}'..='\u{D7AF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{FF00}'..='\u{FFEF}'
            | '\u{3000}'..='\u{303F}'
    )
}
