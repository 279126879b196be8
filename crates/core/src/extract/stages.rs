//! Stage text recovery.
//!
//! Two strategies run in order: explicit "Stage N" markers, then
//! paragraphs that read like directions. The first strategy producing any
//! stages wins.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::parse::{Document, Element};

static STAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bStage\s+\d+").unwrap());
static STAGE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bStage\s+\d+\s*[:.\-–]?\s*").unwrap());

/// Marker text at or below this many characters is a bare heading.
const HEADING_MAX_CHARS: usize = 20;

/// Minimum paragraph length for the wayfinding fallback.
const WAYFINDING_MIN_CHARS: usize = 50;

const INLINE_TAGS: &[&str] = &["strong", "b", "em", "i", "span", "a", "u"];

const WAYFINDING_WORDS: &[&str] = &["follow", "path", "track", "head", "continue", "turn"];

type StageStrategy = (&'static str, fn(&Document, usize) -> Vec<String>);

const STRATEGIES: &[StageStrategy] = &[("stage markers", marked_stages), ("wayfinding paragraphs", wayfinding_paragraphs)];

/// Stage text blocks in page order.
///
/// `max_fallback` caps the paragraph fallback so pages full of prose
/// cannot produce unbounded stage lists.
pub fn extract_stages(doc: &Document, max_fallback: usize) -> Vec<String> {
    for (name, strategy) in STRATEGIES {
        let stages = strategy(doc, max_fallback);
        if !stages.is_empty() {
            debug!(strategy = name, count = stages.len(), "extracted stages");
            return stages;
        }
    }
    Vec::new()
}

/// Text following each "Stage N" marker, with the marker removed.
fn marked_stages(doc: &Document, _max_fallback: usize) -> Vec<String> {
    let mut stages: Vec<String> = Vec::new();

    for owner in doc.text_node_parents(&STAGE_MARKER) {
        let block = enclosing_block(owner);
        let own_text = block.text();

        let raw = if own_text.trim().chars().count() > HEADING_MAX_CHARS {
            own_text
        } else {
            block.next_element_sibling().map(|next| next.text()).unwrap_or_default()
        };

        let description = collapse_whitespace(&STAGE_LABEL.replace_all(&raw, ""));
        if description.is_empty() || stages.last() == Some(&description) {
            continue;
        }
        stages.push(description);
    }

    stages
}

/// Substantial paragraphs using direction vocabulary, numbered implicitly.
fn wayfinding_paragraphs(doc: &Document, max_fallback: usize) -> Vec<String> {
    doc.paragraphs()
        .into_iter()
        .filter(|text| text.chars().count() > WAYFINDING_MIN_CHARS)
        .filter(|text| {
            let lower = text.to_lowercase();
            WAYFINDING_WORDS.iter().any(|word| lower.contains(word))
        })
        .map(|text| collapse_whitespace(&text))
        .take(max_fallback)
        .collect()
}

/// Climbs out of inline formatting so `<p><b>Stage 1</b> Follow...</p>`
/// resolves to the paragraph.
fn enclosing_block(element: Element<'_>) -> Element<'_> {
    if INLINE_TAGS.contains(&element.tag_name().as_str())
        && let Some(parent) = element.parent_element()
    {
        return parent;
    }
    element
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marked_stages_inline_and_heading() {
        let html = r#"
            <body>
                <p><strong>Stage 1</strong> Leave the car park and follow the track towards the headland.</p>
                <h3>Stage 2</h3>
                <p>Climb steadily to the summit cairn for wide views.</p>
                <h3>Stage 3:</h3>
                <p>Return the same way back to the start.</p>
            </body>
        "#;
        let doc = Document::parse(html).unwrap();
        let stages = extract_stages(&doc, 10);

        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0], "Leave the car park and follow the track towards the headland.");
        assert_eq!(stages[1], "Climb steadily to the summit cairn for wide views.");
        assert!(!stages.iter().any(|s| s.to_lowercase().contains("stage")));
    }

    #[test]
    fn test_marker_without_description_is_dropped() {
        let html = r#"<body><h3>Stage 1</h3></body>"#;
        let doc = Document::parse(html).unwrap();
        assert!(marked_stages(&doc, 10).is_empty());
    }

    #[test]
    fn test_wayfinding_fallback() {
        let html = r#"
            <body>
                <p>Short note.</p>
                <p>From the lay-by follow the obvious path uphill past the old sheepfold and a gate.</p>
                <p>This paragraph is long enough but describes only the history of the glen itself.</p>
                <p>At the junction turn left and continue along the forestry track to the bridge.</p>
            </body>
        "#;
        let doc = Document::parse(html).unwrap();
        let stages = extract_stages(&doc, 10);

        assert_eq!(stages.len(), 2);
        assert!(stages[0].starts_with("From the lay-by"));
        assert!(stages[1].starts_with("At the junction"));
    }

    #[test]
    fn test_wayfinding_fallback_is_capped() {
        let paragraph = "<p>Continue along the track through the trees for a good while longer.</p>";
        let html = format!("<body>{}</body>", paragraph.repeat(25));
        let doc = Document::parse(&html).unwrap();

        assert_eq!(extract_stages(&doc, 10).len(), 10);
        assert_eq!(extract_stages(&doc, 3).len(), 3);
    }

    #[test]
    fn test_no_stages() {
        let doc = Document::parse("<body><p>Nothing to see.</p></body>").unwrap();
        assert!(extract_stages(&doc, 10).is_empty());
    }
}
