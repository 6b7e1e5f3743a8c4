//! Resilient parsing of JSON embedded in LLM completions.
//!
//! Model output routinely wraps the document in Markdown fences or prose,
//! slips comments between fields, leaves control characters or stray
//! backslashes inside string literals, and gets cut off mid-structure by the
//! token limit. The pipeline here cleans the text step by step and only then
//! hands it to a strict parser, balancing open structures once when the
//! parse dies at end of input.
//!
//! The boundary heuristic (first opening bracket to last closing bracket) is
//! deliberately simple: it tolerates prose before and after a single
//! document, and is wrong when a completion carries several top-level JSON
//! values. That limitation is accepted.

use serde_json::Value;
use tracing::warn;

/// Scanner state for the string-aware passes. `Escape` is only reachable
/// from inside a string literal; a backslash outside a string has no escape
/// semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString,
    Escape,
}

/// How much repair a parse needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    /// The sanitized text parsed strictly on the first attempt.
    None,
    /// The text was truncated; appending closing delimiters made it parse.
    Balanced,
    /// Balancing did not help either; the caller gets an empty object.
    EmptyDocument,
}

/// Run the full repair pipeline and parse the result.
///
/// Lexical defects (fences, comments, bad escapes, raw control characters)
/// are always repaired. A truncation-style failure triggers one bracket
/// balancing retry, and a failed retry degrades to `{}`. Any other parse
/// error is returned as-is rather than risking fabricated data.
pub fn repair_and_parse(raw: &str) -> Result<(Value, Repair), serde_json::Error> {
    let cleaned = strip_fences(raw);
    let candidate = locate_candidate(cleaned);
    let sanitized = sanitize_string_literals(&strip_comments(candidate));

    match serde_json::from_str::<Value>(&sanitized) {
        Ok(v) => Ok((v, Repair::None)),
        Err(e) if e.is_eof() => {
            warn!("JSON appears truncated; balancing brackets and retrying");
            let balanced = balance_brackets(&sanitized);
            match serde_json::from_str::<Value>(&balanced) {
                Ok(v) => Ok((v, Repair::Balanced)),
                Err(retry_err) => {
                    warn!(%retry_err, "bracket balancing did not help; using empty document");
                    Ok((Value::Object(serde_json::Map::new()), Repair::EmptyDocument))
                }
            }
        }
        Err(e) => Err(e),
    }
}

/// Remove Markdown code-fence markers around the payload.
///
/// Strips a leading triple-backtick fence (with an optional `json` language
/// tag), a trailing fence, and one enclosing pair of single backticks.
/// Backticks inside the body are preserved.
pub fn strip_fences(raw: &str) -> &str {
    let mut s = raw.trim();

    if let Some(rest) = s.strip_prefix("```") {
        s = strip_lang_tag(rest).trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }

    if s.len() > 1 && s.starts_with('`') && s.ends_with('`') {
        s = s[1..s.len() - 1].trim();
    }
    s
}

/// Drop a `json` language tag sitting directly after an opening fence.
fn strip_lang_tag(s: &str) -> &str {
    let tagged = s.trim_start();
    if let Some(rest) = tagged.strip_prefix("json") {
        // word boundary: "json" followed by an identifier char is payload
        if !rest.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return rest;
        }
    }
    s
}

/// Cut the substring most likely to be the intended JSON document: from the
/// first `{` or `[` to the last `}` or `]`.
pub fn locate_candidate(cleaned: &str) -> &str {
    let start = match (cleaned.find('{'), cleaned.find('[')) {
        (Some(c), Some(s)) => c.min(s),
        (Some(c), None) => c,
        (None, Some(s)) => s,
        (None, None) => {
            warn!("no opening bracket found; trying to parse the whole cleaned text");
            0
        }
    };

    let end = match (cleaned.rfind('}'), cleaned.rfind(']')) {
        (Some(c), Some(s)) => Some(c.max(s)),
        (c, s) => c.or(s),
    };

    // closing delimiters are single-byte, so +1 stays on a char boundary
    let end_excl = match end {
        Some(e) if e >= start => e + 1,
        _ => cleaned.len(),
    };

    cleaned[start..end_excl].trim()
}

/// Remove `//` line comments and `/* */` block comments outside string
/// literals. Comment markers inside strings are data and stay untouched; an
/// unterminated block comment silently swallows the rest of the text.
pub fn strip_comments(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut state = ScanState::Normal;
    let mut chars = json.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            ScanState::Escape => {
                out.push(c);
                state = ScanState::InString;
            }
            ScanState::InString => {
                out.push(c);
                match c {
                    '\\' => state = ScanState::Escape,
                    '"' => state = ScanState::Normal,
                    _ => {}
                }
            }
            ScanState::Normal => match c {
                '"' => {
                    out.push(c);
                    state = ScanState::InString;
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    while let Some(&n) = chars.peek() {
                        if n == '\n' || n == '\r' {
                            break;
                        }
                        chars.next();
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    let mut prev = '\0';
                    for n in chars.by_ref() {
                        if prev == '*' && n == '/' {
                            break;
                        }
                        prev = n;
                    }
                }
                _ => out.push(c),
            },
        }
    }
    out
}

const ESCAPABLE: [char; 9] = ['"', '\\', '/', 'b', 'f', 'n', 'r', 't', 'u'];

/// Repair string literals so a strict parser accepts them.
///
/// Invalid escape sequences such as `\S` become `\\S` (a literal backslash
/// followed by the character), raw control characters inside strings are
/// replaced by their escaped forms, and a trailing lone backslash becomes
/// `\\`. The visible meaning of the text is never altered.
pub fn sanitize_string_literals(json: &str) -> String {
    let mut out = String::with_capacity(json.len() + 16);
    let mut state = ScanState::Normal;

    for c in json.chars() {
        match state {
            ScanState::Escape => {
                if ESCAPABLE.contains(&c) {
                    out.push(c);
                } else {
                    // the backslash is already emitted; doubling it turns the
                    // invalid pair into escaped-backslash + literal character
                    out.push('\\');
                    out.push(c);
                }
                state = ScanState::InString;
            }
            ScanState::InString => match c {
                '\\' => {
                    out.push(c);
                    state = ScanState::Escape;
                }
                '"' => {
                    out.push(c);
                    state = ScanState::Normal;
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{0008}' => out.push_str("\\b"),
                '\u{000C}' => out.push_str("\\f"),
                c if (c as u32) < 0x20 => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                _ => out.push(c),
            },
            ScanState::Normal => {
                if c == '"' {
                    state = ScanState::InString;
                }
                out.push(c);
            }
        }
    }

    // text ended mid-escape: keep the backslash as an escaped backslash
    if state == ScanState::Escape {
        out.push('\\');
    }
    out
}

/// Append the closing delimiters a truncated document is missing.
///
/// Walks the text with the same string-aware scanner as the other passes,
/// keeping a stack of open `{`/`[`, then closes an unterminated string and
/// the open structures in reverse nesting order. Mismatched closers are
/// left alone; such input fails the retry and degrades to `{}`.
pub fn balance_brackets(json: &str) -> String {
    let mut state = ScanState::Normal;
    let mut stack: Vec<char> = Vec::new();

    for c in json.chars() {
        match state {
            ScanState::Escape => state = ScanState::InString,
            ScanState::InString => match c {
                '\\' => state = ScanState::Escape,
                '"' => state = ScanState::Normal,
                _ => {}
            },
            ScanState::Normal => match c {
                '"' => state = ScanState::InString,
                '{' | '[' => stack.push(c),
                '}' => {
                    if stack.last() == Some(&'{') {
                        stack.pop();
                    }
                }
                ']' => {
                    if stack.last() == Some(&'[') {
                        stack.pop();
                    }
                }
                _ => {}
            },
        }
    }

    let mut fixed = String::from(json);
    if state != ScanState::Normal {
        fixed.push('"');
    }
    for open in stack.into_iter().rev() {
        fixed.push(if open == '{' { '}' } else { ']' });
    }
    fixed
}
