//! Parsed input document
//!
//! Keeps the raw text next to its HTML tree: table strategies walk the
//! tree, payload and free-text strategies scan the raw text.

use scraper::{ElementRef, Html, Selector};

pub struct Document<'a> {
    raw: &'a str,
    html: Html,
}

impl<'a> Document<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            html: Html::parse_document(raw),
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// True for a missing or blank document
    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// All elements matching a CSS selector; an invalid selector matches nothing
    pub fn select(&self, selector_str: &str) -> Vec<ElementRef<'_>> {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        self.html.select(&selector).collect()
    }

    /// First element matching `selector_str` that comes after `anchor` in document order
    pub fn find_after<'d>(&'d self, anchor: &ElementRef<'d>, selector_str: &str) -> Option<ElementRef<'d>> {
        let selector = Selector::parse(selector_str).ok()?;
        let mut passed_anchor = false;

        for node in self.html.root_element().descendants() {
            if node.id() == anchor.id() {
                passed_anchor = true;
                continue;
            }
            if !passed_anchor {
                continue;
            }
            if let Some(element) = ElementRef::wrap(node) {
                if selector.matches(&element) {
                    return Some(element);
                }
            }
        }

        None
    }
}

impl Document<'static> {
    /// Stand-in for a document that could not be fetched
    pub fn empty() -> Self {
        Self {
            raw: "",
            html: Html::new_document(),
        }
    }
}

/// Text of an element with each text node trimmed and the pieces joined
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .concat()
}

/// Select within an element; an invalid selector matches nothing
pub fn select_in<'a>(element: &ElementRef<'a>, selector_str: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector_str) {
        Ok(selector) => element.select(&selector).collect(),
        Err(_) => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_text_joins_trimmed_nodes() {
        let doc = Document::parse("<p>  Claude <b> Opus </b>\n 4 </p>");
        let p = doc.select("p");
        assert_eq!(element_text(&p[0]), "ClaudeOpus4");
    }

    #[test]
    fn test_find_after() {
        let doc = Document::parse(
            r#"
            <div class="tabs">first</div>
            <h2 id="anchor">Heading</h2>
            <p>between</p>
            <div class="tabs">second</div>
            "#,
        );
        let anchor = doc.select("h2#anchor");
        let found = doc.find_after(&anchor[0], "div.tabs").unwrap();
        assert_eq!(element_text(&found), "second");
        assert!(doc.find_after(&anchor[0], "table").is_none());
    }

    #[test]
    fn test_empty_and_bad_selector() {
        let doc = Document::empty();
        assert!(doc.is_empty());
        assert!(doc.select("table").is_empty());
        assert!(Document::parse("<p>x</p>").select("[[[").is_empty());
    }
}
