//! Marker-delimited token scanning.
//!
//! The same primitive locates `$NAME$` environment placeholders in the raw
//! configuration text and `^field^` references inside a target field template.

/// Returns every substring of `text` that starts and ends with `marker`,
/// markers included, scanning left to right.
///
/// A marker opens a token and the next marker closes it. An open marker that
/// is never closed produces nothing.
pub fn scan(text: &str, marker: char) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch != marker {
            continue;
        }

        match start {
            None => start = Some(idx),
            Some(open) => {
                tokens.push(text[open..idx + ch.len_utf8()].to_string());
                start = None;
            }
        }
    }

    tokens
}

/// Removes exactly one character from each end of `token`.
///
/// Strings shorter than two characters are returned unchanged.
pub fn strip_markers(token: &str) -> &str {
    let mut chars = token.chars();
    match (chars.next(), chars.next_back()) {
        (Some(_), Some(_)) => chars.as_str(),
        _ => token,
    }
}

/// Wraps `name` in `marker` on both sides, producing a reference token.
pub fn wrap(name: &str, marker: char) -> String {
    let mut out = String::with_capacity(name.len() + 2 * marker.len_utf8());
    out.push(marker);
    out.push_str(name);
    out.push(marker);
    out
}
