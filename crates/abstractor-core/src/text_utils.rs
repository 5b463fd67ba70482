use once_cell::sync::Lazy;
use regex::Regex;

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_spaces(s: &str) -> String {
    static WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    WS.replace_all(s, " ").trim().to_string()
}

/// One-line preview of `s`, cut at a char boundary after `max_chars` chars.
pub fn preview(s: &str, max_chars: usize) -> String {
    let flat = normalize_spaces(s);
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_spaces() {
        assert_eq!(normalize_spaces("  a \n\t b  c\n"), "a b c");
        assert_eq!(normalize_spaces(""), "");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("héllo\nwörld", 20), "héllo wörld");
        assert_eq!(preview("héllo wörld", 3), "hél...");
    }
}
