use scraper::Html;

use super::{Extractor, find_all, find_first, text_of};
use crate::model::WordToken;

/// The race text container, in the order the site's layout variants are tried.
const CANDIDATES: [&str; 3] = [
    "div.kdLjEPtI.gahazPRK",
    r#"div[style*="font-size: 20px"][style*="font-family: monospace"]"#,
    r#"div[class*="gahazPRK"]"#,
];

/// play.typeracer.com splits the race text into styled spans that do not line up
/// with word boundaries, so the spans are joined and re-split on whitespace.
pub struct Typeracer;

impl Extractor for Typeracer {
    fn name(&self) -> &'static str {
        "typeracer"
    }

    fn extract(&self, document: &Html) -> Vec<WordToken> {
        let Some(container) = CANDIDATES.iter().find_map(|css| find_first(document, css)) else {
            return Vec::new();
        };

        let text: String = find_all(container, "span").into_iter().map(text_of).collect();
        text.split_whitespace().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_and_extract;

    #[test]
    fn resplits_joined_spans() {
        let html = r#"
            <div class="kdLjEPtI gahazPRK">
                <span>The qu</span><span>i</span><span>ck brown  </span><span>fox.</span>
            </div>"#;
        assert_eq!(parse_and_extract(&Typeracer, html), vec!["The", "quick", "brown", "fox."]);
    }

    #[test]
    fn falls_back_to_inline_style_variant() {
        let html = r#"
            <div style="font-size: 20px; font-family: monospace;"><span>second layout</span></div>
            <div class="xx gahazPRK-ish"><span>third layout</span></div>"#;
        assert_eq!(parse_and_extract(&Typeracer, html), vec!["second", "layout"]);
    }

    #[test]
    fn falls_back_to_partial_class_variant() {
        let html = r#"<div class="abc gahazPRKzz"><span>only</span><span> this</span></div>"#;
        assert_eq!(parse_and_extract(&Typeracer, html), vec!["only", "this"]);
    }

    #[test]
    fn first_variant_wins_even_when_later_ones_exist() {
        let html = r#"
            <div class="gahazPRK-old"><span>stale</span></div>
            <div class="kdLjEPtI gahazPRK"><span>fresh</span></div>"#;
        assert_eq!(parse_and_extract(&Typeracer, html), vec!["fresh"]);
    }

    #[test]
    fn blank_text_is_empty() {
        let html = r#"<div class="kdLjEPtI gahazPRK"><span>   </span></div>"#;
        assert!(parse_and_extract(&Typeracer, html).is_empty());
    }
}
