//! HTML parsing and DOM querying.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! field extractor. They wrap `scraper` and expose only the lookups the
//! extractor needs: CSS selection, joined page text, paragraphs, and
//! "find the element that owns this text" queries.
//!
//! # Example
//!
//! ```rust
//! use trailmark_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Neist Point</h1>
//!             <p class="summary">A short walk to the lighthouse.</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! assert_eq!(doc.select_first_text("h1"), Some("Neist Point".to_string()));
//! ```

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{Result, TrailmarkError};

/// Represents a parsed HTML document.
///
/// # Example
///
/// ```rust
/// use trailmark_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// html5ever recovers from any malformed markup, so this only fails if
    /// the wrapper itself cannot be built.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Gets the raw `scraper::Html` instance.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`TrailmarkError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trailmark_core::parse::Document;
    ///
    /// let html = r#"<img src="boot.gif"><img src="boot.gif"><img src="bog.gif">"#;
    /// let doc = Document::parse(html).unwrap();
    /// assert_eq!(doc.select("img[src*=boot]").unwrap().len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Returns the trimmed text of the first element matching `selector`
    /// whose text is non-empty.
    ///
    /// Invalid selectors and empty matches both yield `None`.
    pub fn select_first_text(&self, selector: &str) -> Option<String> {
        self.select(selector).ok()?.iter().find_map(|el| {
            let text = el.text();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
    }

    /// Gets the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    /// Gets all text in the document, with text nodes joined by spaces.
    ///
    /// Joining keeps "Distance" and "12km" in adjacent cells from fusing
    /// into a single token.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect::<Vec<_>>().join(" ")
    }

    /// Trimmed text of every `<p>` element, in document order.
    pub fn paragraphs(&self) -> Vec<String> {
        match self.select("p") {
            Ok(elements) => elements.iter().map(|el| el.text().trim().to_string()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Elements that directly own a text node matching `pattern`.
    ///
    /// Each owning element is reported once per matching text node, in
    /// document order.
    pub fn text_node_parents(&'_ self, pattern: &Regex) -> Vec<Element<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                if !pattern.is_match(text) {
                    return None;
                }
                node.parent().and_then(ElementRef::wrap).map(|element| Element { element })
            })
            .collect()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| TrailmarkError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use trailmark_core::parse::Document;
///
/// let html = r#"<a href="neistpoint.shtml">Neist Point</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Neist Point");
/// assert_eq!(link.attr("href"), Some("neistpoint.shtml"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the text content of this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// The next sibling that is an element, skipping text and comments.
    pub fn next_element_sibling(&self) -> Option<Element<'a>> {
        self.element
            .next_siblings()
            .find_map(ElementRef::wrap)
            .map(|element| Element { element })
    }

    /// The enclosing element, if any.
    pub fn parent_element(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(|element| Element { element })
    }

    /// Direct children that are elements.
    pub fn child_elements(&self) -> Vec<Element<'a>> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|element| Element { element })
            .collect()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`TrailmarkError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}
