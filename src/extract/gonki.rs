use scraper::Html;

use super::{Extractor, find_all, find_first, strip_spacing_glyphs, text_of};
use crate::model::WordToken;

/// gonki.nabiraem.ru keeps one span per word and draws the trailing space as a glyph.
pub struct Gonki;

impl Extractor for Gonki {
    fn name(&self) -> &'static str {
        "gonki"
    }

    fn extract(&self, document: &Html) -> Vec<WordToken> {
        let Some(editor) = find_first(document, "div.editor-text") else {
            return Vec::new();
        };

        find_all(editor, "span.word")
            .into_iter()
            .map(|word| strip_spacing_glyphs(&text_of(word)))
            .collect()
    }
}
