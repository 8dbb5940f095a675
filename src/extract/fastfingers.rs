use scraper::Html;

use super::{Extractor, find_all, find_first, text_of};
use crate::model::WordToken;

/// fastfingers.net wraps each letter in a custom `<letter>` element.
pub struct Fastfingers;

impl Extractor for Fastfingers {
    fn name(&self) -> &'static str {
        "fastfingers"
    }

    fn extract(&self, document: &Html) -> Vec<WordToken> {
        let Some(wrapper) = find_first(document, "#wordWrapper") else {
            return Vec::new();
        };

        find_all(wrapper, "div.word")
            .into_iter()
            .map(|word| find_all(word, "letter").into_iter().map(text_of).collect())
            .collect()
    }
}
