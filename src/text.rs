// Small text helpers used by the import parser

use std::path::Path;

/// Marker that joins a physical line with the next one
pub const CONTINUATION_MARKER: char = '\\';

/// `true` when `value` begins with `prefix`. A prefix longer than the
/// value never matches.
pub fn starts_with(value: &str, prefix: &str) -> bool {
    value.starts_with(prefix)
}

/// `true` when `value` ends with `suffix`. A suffix longer than the
/// value never matches.
pub fn ends_with(value: &str, suffix: &str) -> bool {
    value.ends_with(suffix)
}

/// Strip surrounding whitespace and every carriage return. Interior
/// whitespace between other characters is kept as is.
pub fn trim(input: &str) -> String {
    if input.contains('\r') {
        input.replace('\r', "").trim().to_string()
    } else {
        input.trim().to_string()
    }
}

/// Remainder of `line` after a leading `keyword` that is followed by
/// whitespace. `"import os"` with keyword `import` gives `Some("os")`,
/// `"imported = 1"` gives `None`.
pub fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    if !starts_with(line, keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    match rest.chars().next() {
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        _ => None,
    }
}

/// Drop a trailing `#` comment. Hashes inside string literals are kept.
pub fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '\'') | (None, '"') => quote = Some(c),
            (None, '#') => return line[..idx].trim_end(),
            _ => {}
        }
    }

    line
}

/// Text before the continuation marker when `line` ends with one
pub fn strip_continuation(line: &str) -> Option<&str> {
    if line.ends_with(CONTINUATION_MARKER) {
        line.rfind(CONTINUATION_MARKER).map(|idx| &line[..idx])
    } else {
        None
    }
}

/// Module name of a source file: its file name without the extension
pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
