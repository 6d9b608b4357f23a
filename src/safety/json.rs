//! HTML-safe JSON serialization.

use serde::Serialize;

// HTML metacharacters and their \u escapes. serde_json does not escape
// these by default, which matters when JSON ends up inline in markup.
const REPLACEMENTS: [(char, &str); 3] =
    [('<', "\\u003c"), ('>', "\\u003e"), ('&', "\\u0026")];

/// Serialize `value` to JSON with `<`, `>` and `&` escaped so the output
/// is safe to embed in HTML contexts.
pub fn html_safe_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string(value)?;
    for (character, replacement) in REPLACEMENTS {
        out = out.replace(character, replacement);
    }
    Ok(out)
}
