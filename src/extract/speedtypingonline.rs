use scraper::{ElementRef, Html};

use super::{Extractor, find_all, find_first, text_of};
use crate::model::WordToken;

/// speedtypingonline.com mixes a highlighted next-letter span with plain text runs,
/// so words are rebuilt by buffering until a blank plain-text run.
pub struct SpeedTypingOnline;

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn extract_line(line: ElementRef<'_>, out: &mut Vec<WordToken>) {
    let mut buffer = String::new();
    for part in find_all(line, ".nxtLetter, .plainText") {
        let text = text_of(part);
        if has_class(part, "nxtLetter") {
            buffer.push_str(&text);
        } else if text.trim().is_empty() {
            if !buffer.is_empty() {
                out.push(std::mem::take(&mut buffer));
            }
        } else {
            buffer.push_str(&text);
        }
    }
    if !buffer.is_empty() {
        out.push(buffer);
    }
}

impl Extractor for SpeedTypingOnline {
    fn name(&self) -> &'static str {
        "speedtypingonline"
    }

    fn extract(&self, document: &Html) -> Vec<WordToken> {
        let Some(container) = find_first(document, "#lineDivContainer") else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for line in find_all(container, ".blockLines") {
            extract_line(line, &mut out);
        }
        out
    }
}
