//! Title normalization applied before titles are sent for extraction.
//!
//! Removes bracketed segments (full- and half-width), hashtags, emoji and
//! pictographic symbols, then collapses whitespace. Titles that end up empty
//! are dropped.

use std::sync::LazyLock;

use regex::Regex;

/// Bracketed segments such as `【...】`, `[...]` or `（...）`, contents included.
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[【\[（].*?[】\]）]").expect("valid bracket pattern"));

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\S+").expect("valid hashtag pattern"));

static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}", // emoticons
        r"\x{1F300}-\x{1F5FF}", // symbols & pictographs
        r"\x{1F680}-\x{1F6FF}", // transport & map
        r"\x{1F1E0}-\x{1F1FF}", // flags
        r"\x{2702}-\x{27B0}",   // dingbats
        "]+",
    ))
    .expect("valid emoji pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Trailing context suffix such as `" (in the context of X)"`.
static CONTEXT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" \([^)]+\)$").expect("valid context pattern"));

/// Normalize a single title. May return an empty string.
pub fn normalize_title(title: &str) -> String {
    let text = BRACKETED.replace_all(title, " ");
    let text = HASHTAG.replace_all(&text, " ");
    let text = EMOJI.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Normalize every title and drop the ones left empty.
pub fn normalize<S: AsRef<str>>(titles: &[S]) -> Vec<String> {
    titles
        .iter()
        .map(|t| normalize_title(t.as_ref()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Strip a trailing parenthetical context from an extracted keyword.
///
/// `"Usagi (Chiikawa character)"` becomes `"Usagi"`.
pub fn clean_keyword_context(keyword: &str) -> String {
    CONTEXT_SUFFIX.replace(keyword, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_brackets_hashtags_and_emoji() {
        assert_eq!(
            normalize_title("【New Land Cruiser 70】 custom  build 🚙 #cars #offroad"),
            "custom build"
        );
        assert_eq!(normalize_title("[Live] stream (part 1)"), "stream (part 1)");
        assert_eq!(normalize_title("（公式）  ちいかわ   第1話"), "ちいかわ 第1話");
    }

    #[test]
    fn test_drops_empty_titles() {
        let titles = vec!["#only #tags", "😀😀", "  ", "kept title"];
        assert_eq!(normalize(&titles), vec!["kept title"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let titles = vec![
            "【A】 b [c] #d e",
            "[unclosed bracket title",
            "emoji🚀between#tag words",
            "  multiple\t\n spaces  ",
            "nested [a [b] c] end",
            "# lone hash",
        ];
        let once = normalize(&titles);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_keyword_context() {
        assert_eq!(clean_keyword_context("Usagi (Chiikawa character)"), "Usagi");
        assert_eq!(clean_keyword_context("Usagi"), "Usagi");
        assert_eq!(clean_keyword_context("(only parens)"), "(only parens)");
        assert_eq!(clean_keyword_context("A (x) middle"), "A (x) middle");
    }
}
