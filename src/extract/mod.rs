//! Schema Extractors
//!
//! One extractor per supported typing site. Each knows where that site keeps the
//! practice text in its markup and how to turn it into a flat, ordered list of
//! word tokens.
//!
//! # Conventions
//!
//! - Extractors are pure: they read a parsed [`Html`] document and never touch the
//!   network or storage.
//! - Missing structure is not an error. If the root container or its children are
//!   absent, the extractor returns an empty list.
//! - Empty tokens (`""`) mark line breaks and `"\t"` marks a tab, for schemas that
//!   render those explicitly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wordfeed::extract::{Schema, parse_and_extract};
//!
//! let extractor = Schema::Fastfingers.extractor();
//! let words = parse_and_extract(extractor.as_ref(), &html);
//! ```

mod blindtyping;
mod fastfingers;
mod gonki;
mod speedcoder;
mod speedtypingonline;
mod typeracer;

pub use blindtyping::BlindTyping;
pub use fastfingers::Fastfingers;
pub use gonki::Gonki;
pub use speedcoder::Speedcoder;
pub use speedtypingonline::SpeedTypingOnline;
pub use typeracer::Typeracer;

use scraper::{ElementRef, Html, Selector};

use crate::model::WordToken;

/// Glyphs some sites render in place of a space.
const SPACING_GLYPHS: [char; 2] = ['\u{02FD}', '\u{200D}'];

pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, document: &Html) -> Vec<WordToken>;
}

/// Used when no registered site matches the page.
pub struct NoopExtractor;

impl Extractor for NoopExtractor {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn extract(&self, _document: &Html) -> Vec<WordToken> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    BlindTyping,
    Typeracer,
    Gonki,
    Speedcoder,
    Fastfingers,
    SpeedTypingOnline,
}

impl Schema {
    pub const ALL: [Schema; 6] = [
        Schema::BlindTyping,
        Schema::Typeracer,
        Schema::Gonki,
        Schema::Speedcoder,
        Schema::Fastfingers,
        Schema::SpeedTypingOnline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Schema::BlindTyping => "blindtyping",
            Schema::Typeracer => "typeracer",
            Schema::Gonki => "gonki",
            Schema::Speedcoder => "speedcoder",
            Schema::Fastfingers => "fastfingers",
            Schema::SpeedTypingOnline => "speedtypingonline",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Schema::ALL.into_iter().find(|schema| schema.as_str() == s)
    }

    /// Address substring the site is recognised by.
    pub fn site_pattern(&self) -> &'static str {
        match self {
            Schema::BlindTyping => "blindtyping.com",
            Schema::Typeracer => "play.typeracer.com",
            Schema::Gonki => "gonki.nabiraem.ru",
            Schema::Speedcoder => "speedcoder.net",
            Schema::Fastfingers => "fastfingers.net",
            Schema::SpeedTypingOnline => "speedtypingonline.com",
        }
    }

    pub fn extractor(&self) -> Box<dyn Extractor> {
        match self {
            Schema::BlindTyping => Box::new(BlindTyping),
            Schema::Typeracer => Box::new(Typeracer),
            Schema::Gonki => Box::new(Gonki),
            Schema::Speedcoder => Box::new(Speedcoder),
            Schema::Fastfingers => Box::new(Fastfingers),
            Schema::SpeedTypingOnline => Box::new(SpeedTypingOnline),
        }
    }
}

/// Parses `html` and runs `extractor` on it in one synchronous call.
pub fn parse_and_extract(extractor: &dyn Extractor, html: &str) -> Vec<WordToken> {
    let document = Html::parse_document(html);
    extractor.extract(&document)
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!("invalid selector {}: {}", css, e);
            None
        }
    }
}

/// First element in the document matching `css`.
pub(crate) fn find_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    document.select(&sel).next()
}

/// Descendants of `scope` matching `css`, in document order.
pub(crate) fn find_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => scope.select(&sel).collect(),
        None => Vec::new(),
    }
}

pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub(crate) fn strip_spacing_glyphs(s: &str) -> String {
    s.chars().filter(|c| !SPACING_GLYPHS.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_round_trip() {
        for schema in Schema::ALL {
            assert_eq!(Schema::from_str(schema.as_str()), Some(schema));
            assert_eq!(schema.extractor().name(), schema.as_str());
        }
        assert_eq!(Schema::from_str(" FastFingers "), Some(Schema::Fastfingers));
        assert_eq!(Schema::from_str("monkeytype"), None);
    }

    #[test]
    fn every_schema_is_silent_on_foreign_pages() {
        let html = "<html><body><div id=\"app\"><p>nothing to see</p></div></body></html>";
        for schema in Schema::ALL {
            let extractor = schema.extractor();
            assert!(
                parse_and_extract(extractor.as_ref(), html).is_empty(),
                "{} produced words",
                schema.as_str()
            );
            assert!(parse_and_extract(extractor.as_ref(), "").is_empty());
        }
    }

    #[test]
    fn every_schema_is_silent_on_empty_roots() {
        let pages = [
            (Schema::BlindTyping, r#"<div id="words"></div>"#),
            (Schema::Typeracer, r#"<div class="kdLjEPtI gahazPRK"></div>"#),
            (Schema::Gonki, r#"<div class="editor-text"></div>"#),
            (Schema::Speedcoder, r#"<pre id="main"></pre>"#),
            (Schema::Fastfingers, r#"<div id="wordWrapper"></div>"#),
            (Schema::SpeedTypingOnline, r#"<div id="lineDivContainer"></div>"#),
        ];
        for (schema, html) in pages {
            let extractor = schema.extractor();
            assert!(
                parse_and_extract(extractor.as_ref(), html).is_empty(),
                "{} produced words",
                schema.as_str()
            );
        }
        let lines = r#"<div id="lineDivContainer"><div class="blockLines"></div></div>"#;
        assert!(parse_and_extract(&SpeedTypingOnline, lines).is_empty());
    }

    #[test]
    fn strips_open_box_and_zwj() {
        assert_eq!(strip_spacing_glyphs("a\u{02FD}b\u{200D}c"), "abc");
    }

    #[test]
    fn bad_selector_yields_nothing() {
        let doc = Html::parse_document("<div></div>");
        assert!(find_first(&doc, "div[").is_none());
    }
}
