//! Read-only character and word counter

use crate::CounterSettings;
use doc_model::Node;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Character and word totals for a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    /// Grapheme clusters
    pub characters: usize,
    pub words: usize,
}

impl TextStats {
    pub fn of(doc: &Node, settings: &CounterSettings) -> Self {
        let text = doc
            .text_between(0, doc.content_size())
            .unwrap_or_default();
        Self::of_text(&text, settings)
    }

    pub fn of_text(text: &str, settings: &CounterSettings) -> Self {
        let characters = text
            .graphemes(true)
            .filter(|g| settings.count_whitespace || !g.chars().all(char::is_whitespace))
            .count();
        Self {
            characters,
            words: text.unicode_words().count(),
        }
    }

    /// Count from serialized markup
    pub fn from_markup(markup: &str, settings: &CounterSettings) -> crate::Result<Self> {
        let doc = crate::parse_markup(markup)?;
        Ok(Self::of(&doc, settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_words_and_characters() {
        let stats = TextStats::of_text("Hello, wide world", &CounterSettings::default());
        assert_eq!(stats.words, 3);
        assert_eq!(stats.characters, 15);
    }

    #[test]
    fn test_whitespace_setting() {
        let settings = CounterSettings {
            count_whitespace: true,
        };
        assert_eq!(TextStats::of_text("a b", &settings).characters, 3);
    }

    #[test]
    fn test_graphemes_count_once() {
        let stats = TextStats::of_text("e\u{301}", &CounterSettings::default());
        assert_eq!(stats.characters, 1);
    }

    #[test]
    fn test_from_markup() {
        let stats =
            TextStats::from_markup("<p>one two</p><p>three</p>", &CounterSettings::default())
                .unwrap();
        assert_eq!(stats.words, 3);
        assert_eq!(stats.characters, 11);
    }
}
