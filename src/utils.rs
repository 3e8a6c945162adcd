use regex::Regex;
use std::sync::LazyLock;

// Cached regexes — compiled once, reused across all calls
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static LI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<li[^>]*>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Find the largest char boundary in `s` that is <= `max_bytes`.
/// Safe for slicing: `&s[..find_char_boundary(s, max_bytes)]` never panics.
pub fn find_char_boundary(s: &str, max_bytes: usize) -> usize {
    if max_bytes >= s.len() {
        return s.len();
    }
    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    boundary
}

/// Normalize a pre-rendered menu/cart fragment for the terminal.
///
/// The backend serves fragments meant for `innerHTML`: sometimes plain
/// text, sometimes simple markup. `<br>` becomes a newline, `<li>` a
/// bullet, remaining tags are stripped, and runs of blank lines collapse.
/// Plain text passes through unchanged.
pub fn render_fragment(fragment: &str) -> String {
    let text = BR_RE.replace_all(fragment, "\n");
    let text = LI_RE.replace_all(&text, "\n- ");
    let text = TAG_RE.replace_all(&text, "");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Humanize an age in seconds for the cart snapshot display.
pub fn format_age(secs: i64) -> String {
    if secs < 2 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else {
        format!("{}m ago", secs / 60)
    }
}
