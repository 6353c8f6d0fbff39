// Splits the name list of a single import statement

use crate::text::trim;
use once_cell::sync::Lazy;
use regex::Regex;

/// `<name> as <alias>`, where the name may be dotted
static ALIAS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\w.]+)\s+as\s+\w+$").expect("Invalid regex pattern")
});

/// Extract the imported names from the part of an import statement that
/// follows the `import` keyword.
///
/// `"a, b as c, d"` gives `["a", "b", "d"]`: the list is split on commas,
/// any `as <alias>` suffix is dropped and each name is trimmed. Order is
/// preserved. Parentheses around the list and empty pieces left by a
/// trailing comma are ignored.
pub fn parse_import_names(line: &str) -> Vec<String> {
    let trimmed = trim(line);
    let names = trimmed
        .strip_prefix('(')
        .map(|rest| rest.strip_suffix(')').unwrap_or(rest))
        .unwrap_or(&trimmed);

    names
        .split(',')
        .map(trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            let original = ALIAS_PATTERN
                .captures(&piece)
                .map(|caps| caps[1].to_string());
            original.unwrap_or(piece)
        })
        .collect()
}
