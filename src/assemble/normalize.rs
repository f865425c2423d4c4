//! Text normalization for assembled nodes.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Characters that carry no visible content.
const INVISIBLE: [char; 5] = ['\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}', '\u{feff}'];

/// Whitespace cleanup, placeholder detection and list marker stripping.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    whitespace: Regex,
    placeholder: Regex,
    list_marker: Regex,
}

impl TextNormalizer {
    /// Build the normalizer's patterns.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::Other(format!("invalid pattern: {}", e)))
        };
        Ok(Self {
            whitespace: compile(r"\s+")?,
            placeholder: compile(r"^\[[^\[\]]*\]$")?,
            list_marker: compile(
                r"^(?:[-*+•●○◦▪■□►▸◆◇➤✓]|\(?\d{1,3}[.)]|\(?[a-zA-Z][.)]|[ivxIVX]{1,4}[.)])\s+",
            )?,
        })
    }

    /// NFC-normalize, remove invisible characters, collapse whitespace runs
    /// and trim.
    pub fn clean(&self, text: &str) -> String {
        let visible: String = text.nfc().filter(|c| !INVISIBLE.contains(c)).collect();
        self.whitespace
            .replace_all(&visible, " ")
            .trim()
            .to_string()
    }

    /// NFC-normalize, remove invisible characters and trim, keeping inner
    /// line structure. Used for formula markup.
    pub fn clean_markup(&self, text: &str) -> String {
        let visible: String = text.nfc().filter(|c| !INVISIBLE.contains(c)).collect();
        visible.trim().to_string()
    }

    /// Check if text is only a bracketed placeholder such as `[Figure]`.
    pub fn is_placeholder(&self, text: &str) -> bool {
        self.placeholder.is_match(text.trim())
    }

    /// Split list text into items, one per line, markers stripped.
    pub fn list_items(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(|line| {
                let line = line.trim();
                let stripped = self.list_marker.replace(line, "");
                self.clean(&stripped)
            })
            .filter(|item| !item.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new().unwrap()
    }

    #[test]
    fn test_clean() {
        let n = normalizer();
        assert_eq!(n.clean("  Hello\u{200b}\n\t world\u{feff} "), "Hello world");
        assert_eq!(n.clean("\u{200b}"), "");
    }

    #[test]
    fn test_clean_composes_accents() {
        let n = normalizer();
        // e + combining acute
        assert_eq!(n.clean("caf\u{0065}\u{0301}"), "caf\u{00e9}");
    }

    #[test]
    fn test_clean_markup_keeps_lines() {
        let n = normalizer();
        let latex = "\n\\begin{aligned}\n  a &= b \\\\\n  c &= d\n\\end{aligned}\u{200b}\n";
        assert_eq!(
            n.clean_markup(latex),
            "\\begin{aligned}\n  a &= b \\\\\n  c &= d\n\\end{aligned}"
        );
    }

    #[test]
    fn test_placeholder() {
        let n = normalizer();
        assert!(n.is_placeholder("[Figure]"));
        assert!(n.is_placeholder(" [TableCaption] "));
        assert!(!n.is_placeholder("[1] Smith et al."));
        assert!(!n.is_placeholder("Figure"));
    }

    #[test]
    fn test_list_items() {
        let n = normalizer();
        let items = n.list_items("• first item\n2. second\n\n(c) third\n- fourth  line\nplain");
        assert_eq!(items, vec!["first item", "second", "third", "fourth line", "plain"]);
    }

    #[test]
    fn test_list_marker_needs_space() {
        let n = normalizer();
        assert_eq!(n.list_items("3.14 is pi"), vec!["3.14 is pi"]);
    }
}
