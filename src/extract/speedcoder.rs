use scraper::{ElementRef, Html};

use super::{Extractor, find_all, find_first, text_of};
use crate::model::WordToken;

/// speedcoder.net renders code one `<spanchar>` per character, with `ret` spanchars
/// for line breaks and `<tabchar>` for indentation.
pub struct Speedcoder;

#[derive(Default)]
struct Tokens {
    out: Vec<WordToken>,
    current: String,
}

impl Tokens {
    fn flush(&mut self) {
        if !self.current.trim().is_empty() {
            self.out.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }

    fn feed(&mut self, el: ElementRef<'_>) {
        match el.value().name() {
            "spanchar" if el.value().classes().any(|c| c == "ret") => {
                self.flush();
                self.out.push(String::new());
            }
            "spanchar" => {
                let text = text_of(el);
                if text == " " {
                    self.flush();
                } else {
                    self.current.push_str(&text);
                }
            }
            "tabchar" => {
                self.flush();
                self.out.push("\t".to_string());
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<WordToken> {
        self.flush();
        self.out
    }
}

impl Extractor for Speedcoder {
    fn name(&self) -> &'static str {
        "speedcoder"
    }

    fn extract(&self, document: &Html) -> Vec<WordToken> {
        let Some(main) = find_first(document, "pre#main") else {
            return Vec::new();
        };

        let mut tokens = Tokens::default();
        for el in find_all(main, "spanchar, tabchar") {
            tokens.feed(el);
        }
        tokens.finish()
    }
}
