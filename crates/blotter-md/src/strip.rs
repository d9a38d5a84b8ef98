//! Plain-text stripping for post previews.
//!
//! Removes the structural marker at the start of a line and the inline
//! emphasis, strike and link syntax throughout it. The result is only used
//! for previews; full posts go through [`crate::parse_blocks`].

use regex::Regex;
use std::sync::LazyLock;

/// Heading hashes, a rule run, or a lone bullet at the start of a line.
static LEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#+|[-_*]{3,}|[-+*](?:\s|$))").expect("Invalid leading marker regex")
});

/// Paired `*`/`_` emphasis (single or double) and `~~` strike.
static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[*_]{1,2}(.+?)[*_]{1,2}|~~(.+?)~~").expect("Invalid emphasis regex")
});

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("Invalid link regex"));

/// Strip markdown markers from a single line.
///
/// Unpaired markers (`2 * 3`, a trailing `_`) are left as they are.
pub fn strip_all(line: &str) -> String {
    let line = line.trim();
    let line = LEADING_RE.replace(line, "");
    let line = line.trim();

    let line = LINK_RE.replace_all(line, "${1}");
    EMPHASIS_RE.replace_all(&line, "${1}${2}").into_owned()
}

/// Strip a line that may be missing, e.g. past the end of a document.
pub fn strip_line(line: Option<&str>) -> String {
    line.map(strip_all).unwrap_or_default()
}
