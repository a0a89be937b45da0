//! Issue key extraction from chat message text.

use std::{ops::Range, sync::OnceLock};

use regex::Regex;

/// Candidate issue key found in a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueToken {
    pub key: String,
    /// Byte offset in the scanned text (after links and emphasis were stripped).
    pub offset: usize,
}

fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Emphasis/heading delimiters, or a whole `[text](url)` link.
    RE.get_or_init(|| Regex::new(r"(?:__|[*#])|\[.*?\]\(.*?\)").expect("valid regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]\(.*?\)").expect("valid regex"))
}

fn issue_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]+-[0-9]+").expect("valid regex"))
}

/// Remove already-linked spans and emphasis markers.
pub fn strip_markup(text: &str) -> String {
    markup_re().replace_all(text, "").into_owned()
}

/// Extract candidate issue keys in order of appearance. Duplicates are kept.
pub fn extract_issue_keys(text: Option<&str>) -> Vec<IssueToken> {
    let Some(text) = text else {
        return Vec::new();
    };

    let scanned = strip_markup(text);
    issue_key_re()
        .find_iter(&scanned)
        .map(|m| IssueToken {
            key: m.as_str().to_string(),
            offset: m.start(),
        })
        .collect()
}

/// Byte ranges of `[text](url)` spans in `text`.
pub(crate) fn link_spans(text: &str) -> Vec<Range<usize>> {
    link_re().find_iter(text).map(|m| m.range()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(text: &str) -> Vec<String> {
        extract_issue_keys(Some(text))
            .into_iter()
            .map(|t| t.key)
            .collect()
    }

    #[test]
    fn finds_keys_in_order_with_duplicates() {
        assert_eq!(
            keys("ABC-1 then XY-22, then ABC-1 again"),
            vec!["ABC-1", "XY-22", "ABC-1"]
        );
    }

    #[test]
    fn empty_for_absent_or_keyless_text() {
        assert!(extract_issue_keys(None).is_empty());
        assert!(keys("").is_empty());
        assert!(keys("no keys here, abc-123 is lowercase, ABC- and -123").is_empty());
    }

    #[test]
    fn skips_already_linked_keys() {
        assert_eq!(
            keys("[ABC-1](https://example.atlassian.net/browse/ABC-1) and DEF-2"),
            vec!["DEF-2"]
        );
        assert!(keys("see [the ticket ABC-1](https://x.io/ABC-1)").is_empty());
    }

    #[test]
    fn strips_emphasis_before_matching() {
        assert_eq!(keys("**ABC-1** _x_ __DEF-2__ # GHI-3"), vec!["ABC-1", "DEF-2", "GHI-3"]);
        // A bold marker in the middle no longer splits the key.
        assert_eq!(keys("AB**C-12"), vec!["ABC-12"]);
    }

    #[test]
    fn matches_maximal_runs() {
        assert_eq!(keys("xABC-123y"), vec!["ABC-123"]);
        assert_eq!(keys("A-1-2"), vec!["A-1"]);
    }

    #[test]
    fn offsets_refer_to_scanned_text() {
        let tokens = extract_issue_keys(Some("**ABC-1** DEF-2"));
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 6);
    }

    #[test]
    fn link_spans_cover_markdown_links() {
        let text = "a [x](y) b [ABC-1](https://d/browse/ABC-1)";
        let spans = link_spans(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].clone()], "[x](y)");
        assert_eq!(&text[spans[1].clone()], "[ABC-1](https://d/browse/ABC-1)");
    }
}
