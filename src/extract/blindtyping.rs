use scraper::Html;

use super::{Extractor, find_all, find_first, text_of};
use crate::model::WordToken;

/// blindtyping.com renders each word as a div of per-letter spans.
pub struct BlindTyping;

impl Extractor for BlindTyping {
    fn name(&self) -> &'static str {
        "blindtyping"
    }

    fn extract(&self, document: &Html) -> Vec<WordToken> {
        let Some(container) = find_first(document, "#words") else {
            return Vec::new();
        };

        find_all(container, "div.TestWrapper_word__TI39_")
            .into_iter()
            .map(|word| find_all(word, "span").into_iter().map(text_of).collect())
            .collect()
    }
}
