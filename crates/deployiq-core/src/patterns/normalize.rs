//! Error-message normalization.
//!
//! Replaces the incidental parts of an error message (file paths, line
//! markers, row:col positions, quoted literals, bare integers) with fixed
//! placeholder tokens so that two occurrences of the same failure collapse
//! onto one pattern key in the knowledge base.

use std::sync::LazyLock;

use regex::Regex;

pub const STR_TOKEN: &str = "<STR>";
pub const PATH_TOKEN: &str = "<PATH>";
pub const POS_TOKEN: &str = "<POS>";
pub const NUM_TOKEN: &str = "<N>";

/// Single-, double- or back-quoted literal on one line.
static QUOTED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"'[^'\n]*'|"[^"\n]*"|`[^`\n]*`"#).ok());

/// Ordered rewrite rules, applied after quoted literals are masked so a
/// quoted path becomes a single `<STR>`. Integers go last so they do not
/// break up positions.
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // Absolute, relative, or drive-letter paths with at least one separator.
        (r"(?:[A-Za-z]:)?[\w.@\-]*(?:[\\/][\w.@\-]+)+", "<PATH>"),
        // "line 12", "Line: 12"
        (r"(?i)\bline\s*:?\s*\d+", "line <N>"),
        // "(12,5)" as emitted by tsc
        (r"\(\d+,\s*\d+\)", "(<POS>)"),
        // "12:5" and "12:5:3"
        (r"\b\d+:\d+(?::\d+)?\b", "<POS>"),
        (r"\b\d+\b", "<N>"),
        (r"\s+", " "),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Normalize an error message into its reusable pattern form.
pub fn normalize_error(message: &str) -> String {
    let mut normalized = mask_quoted(message.trim());
    for (re, replacement) in RULES.iter() {
        normalized = re.replace_all(&normalized, *replacement).into_owned();
    }
    normalized.trim().to_string()
}

/// Replace quoted literals with `<STR>`. A quote that follows a word
/// character is an apostrophe (can't, it's) and never opens a literal; the
/// scan then resumes one character later.
fn mask_quoted(text: &str) -> String {
    let Some(re) = QUOTED.as_ref() else {
        return text.to_string();
    };
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;
    while let Some(m) = re.find_at(text, pos) {
        let inside_word = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if inside_word {
            // Quotes are ASCII, so one byte on is still a char boundary.
            pos = m.start() + 1;
            continue;
        }
        out.push_str(&text[copied..m.start()]);
        out.push_str(STR_TOKEN);
        copied = m.end();
        pos = m.end();
    }
    out.push_str(&text[copied..]);
    out
}
