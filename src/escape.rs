//! Markdown escaping for free-text descriptions.

/// Characters that carry meaning in GitHub-flavored markdown tables and text.
const SPECIAL: &[char] = &[
    '*', '_', '[', ']', '(', ')', '#', '+', '-', '!', '~', '|', '<', '>', '`',
];

/// Prefix every markdown-significant character with a backslash.
///
/// The backslash itself is not in the set, so re-escaping escapes the same
/// characters again rather than the inserted backslashes.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
