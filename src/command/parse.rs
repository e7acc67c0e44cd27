//! Line-level helpers: whitespace trimming, tokenizing and the trailing `&`.

/// Characters treated as token separators.
pub const WHITESPACE: &[char] = &[' ', '\n', '\r', '\t', '\x0c', '\x0b'];

pub fn trim(line: &str) -> &str {
    line.trim_matches(WHITESPACE)
}

/// Split a line into whitespace-delimited tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    trim(line)
        .split(WHITESPACE)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when the last non-whitespace character is `&`.
pub fn is_background(line: &str) -> bool {
    line.trim_end_matches(WHITESPACE).ends_with('&')
}

/// Remove a trailing `&` and the whitespace before it.
pub fn strip_background(line: &str) -> &str {
    let trimmed = line.trim_end_matches(WHITESPACE);
    match trimmed.strip_suffix('&') {
        Some(rest) => rest.trim_end_matches(WHITESPACE),
        None => trimmed,
    }
}

/// Drop the first `count` tokens and return the untouched remainder of the line.
pub fn skip_tokens(line: &str, count: usize) -> &str {
    let mut rest = trim(line);
    for _ in 0..count {
        rest = match rest.find(WHITESPACE) {
            Some(idx) => rest[idx..].trim_start_matches(WHITESPACE),
            None => "",
        };
    }
    rest
}
