//! Field extraction from walk pages.
//!
//! [`extract_page`] turns a parsed walk page into a [`RawWalkSignal`]. It
//! never fails: a field that cannot be recovered is left absent, and the
//! title falls back to a placeholder.

pub mod listing;
pub mod stages;
pub mod stats;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::parse::Document;
use crate::region::region_key_from_url;
use crate::signal::{ListingRow, RawWalkSignal};

pub use listing::{extract_listing, listing_difficulty_word, select_popular};
pub use stages::extract_stages;

/// Candidate title locations, most specific first.
const TITLE_SELECTORS: &[&str] = &["h1", ".walk-title", "title"];

/// Paragraphs at or below this length are not taken as a summary.
const SUMMARY_MIN_CHARS: usize = 100;

static TERRAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bTerrain\b").unwrap());
static TERRAIN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bTerrain\s*[:\-]?\s*([^.]+\.?)").unwrap());
static DIFFICULTY_ICON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)grade|boot|difficulty").unwrap());

/// Extracts every recoverable field from a walk page.
///
/// # Example
///
/// ```rust
/// use trailmark_core::{Document, PipelineConfig, extract_page};
///
/// let html = r#"<h1>Loch an Eilein</h1><p>Distance 6km. Time 2 hours.</p>"#;
/// let doc = Document::parse(html).unwrap();
/// let signal = extract_page(
///     &doc,
///     "https://www.walkhighlands.co.uk/cairngorms/loch-an-eilein.shtml",
///     &PipelineConfig::default(),
/// );
///
/// assert_eq!(signal.title.as_deref(), Some("Loch an Eilein"));
/// assert_eq!(signal.distance_km, Some(6.0));
/// assert_eq!(signal.duration_minutes, Some(120.0));
/// assert_eq!(signal.region_key.as_deref(), Some("cairngorms"));
/// ```
pub fn extract_page(doc: &Document, source_url: &str, config: &PipelineConfig) -> RawWalkSignal {
    let text = doc.text_content();

    let signal = RawWalkSignal {
        title: Some(extract_title(doc, config)),
        summary: extract_summary(doc),
        distance_km: stats::distance_km(&text),
        duration_minutes: stats::duration_minutes(&text),
        ascent_m: stats::ascent_m(&text),
        difficulty_rating: count_difficulty_icons(doc),
        overall_rating: stats::overall_rating(&text),
        bog_factor: count_images(doc, |src| src.contains("bog")),
        grid_ref: stats::grid_ref(&text),
        terrain: extract_terrain(doc),
        region_key: region_key_from_url(source_url),
        source_url: source_url.to_string(),
        stages: extract_stages(doc, config.max_fallback_stages),
        scraped_at: Some(time::OffsetDateTime::now_utc()),
    };

    debug!(
        url = source_url,
        title = signal.title.as_deref().unwrap_or_default(),
        stages = signal.stages.len(),
        "extracted page"
    );
    signal
}

/// Converts a listing row into a signal. Rows carry no stages.
pub fn extract_row(row: ListingRow) -> RawWalkSignal {
    RawWalkSignal::from(row)
}

/// First non-empty title candidate with the site-name suffix removed.
pub fn extract_title(doc: &Document, config: &PipelineConfig) -> String {
    TITLE_SELECTORS
        .iter()
        .filter_map(|selector| doc.select_first_text(selector))
        .map(|title| strip_site_suffix(&title, &config.site_name_suffix))
        .find(|title| !title.is_empty())
        .unwrap_or_else(|| config.placeholder_title.clone())
}

fn strip_site_suffix(title: &str, suffix: &str) -> String {
    let suffix = suffix.trim();
    let title = if suffix.is_empty() {
        title
    } else {
        title.split(suffix).next().unwrap_or(title)
    };
    title.trim().to_string()
}

/// The named summary region, else the first substantial paragraph.
pub fn extract_summary(doc: &Document) -> String {
    if let Some(summary) = doc.select_first_text("div.summary") {
        return summary;
    }

    doc.paragraphs()
        .into_iter()
        .find(|p| p.chars().count() > SUMMARY_MIN_CHARS)
        .unwrap_or_default()
}

/// Difficulty is graded by a row of repeated icons; the count is the grade.
fn count_difficulty_icons(doc: &Document) -> Option<u32> {
    count_images(doc, |src| DIFFICULTY_ICON.is_match(src) && !src.contains("bog"))
}

fn count_images(doc: &Document, predicate: impl Fn(&str) -> bool) -> Option<u32> {
    let count = doc
        .select("img[src]")
        .map(|imgs| {
            imgs.iter()
                .filter_map(|img| img.attr("src"))
                .filter(|src| predicate(&src.to_lowercase()))
                .count()
        })
        .unwrap_or(0);
    (count > 0).then_some(count as u32)
}

/// Sentence following a "Terrain" label.
fn extract_terrain(doc: &Document) -> Option<String> {
    doc.text_node_parents(&TERRAIN_LABEL).iter().find_map(|owner| {
        let text = owner.text();
        let caps = TERRAIN_TEXT.captures(&text)?;
        let terrain = caps.get(1)?.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        (!terrain.is_empty()).then_some(terrain)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALK_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Neist Point Lighthouse Walk - WalkHighlands</title></head>
        <body>
            <div class="summary">A short but steep walk to the lighthouse at Neist Point, with dramatic cliff scenery.</div>
            <table>
                <tr><td>Distance</td><td>2.25km</td></tr>
                <tr><td>Time</td><td>1 - 1.5 hours</td></tr>
                <tr><td>Ascent</td><td>95m</td></tr>
                <tr><td>Start Grid Ref</td><td>NG126478</td></tr>
                <tr><td>Grade</td><td><img src="/grade.gif"><img src="/grade.gif"></td></tr>
                <tr><td>Bog factor</td><td><img src="/bog.gif"></td></tr>
            </table>
            <p>Terrain: Good path with steep concrete steps. Care needed near cliffs.</p>
            <h3>Stage 1</h3>
            <p>From the car park descend the steps and follow the path out towards the lighthouse.</p>
        </body>
        </html>
    "#;

    #[test]
    fn test_extract_page_fields() {
        let doc = Document::parse(WALK_HTML).unwrap();
        let signal = extract_page(
            &doc,
            "https://www.walkhighlands.co.uk/skye/neistpoint.shtml",
            &PipelineConfig::default(),
        );

        assert_eq!(signal.title.as_deref(), Some("Neist Point Lighthouse Walk"));
        assert!(signal.summary.starts_with("A short but steep walk"));
        assert_eq!(signal.distance_km, Some(2.25));
        assert_eq!(signal.duration_minutes, Some(90.0));
        assert_eq!(signal.ascent_m, Some(95));
        assert_eq!(signal.grid_ref.as_deref(), Some("NG126478"));
        assert_eq!(signal.difficulty_rating, Some(2));
        assert_eq!(signal.bog_factor, Some(1));
        assert_eq!(signal.terrain.as_deref(), Some("Good path with steep concrete steps."));
        assert_eq!(signal.region_key.as_deref(), Some("skye"));
        assert_eq!(signal.stages.len(), 1);
        assert!(signal.scraped_at.is_some());
    }

    #[test]
    fn test_title_prefers_heading() {
        let doc = Document::parse("<title>Page - WalkHighlands</title><h1>Ben Nevis</h1>").unwrap();
        assert_eq!(extract_title(&doc, &PipelineConfig::default()), "Ben Nevis");
    }

    #[test]
    fn test_title_placeholder() {
        let doc = Document::parse("<body><p>nothing</p></body>").unwrap();
        assert_eq!(extract_title(&doc, &PipelineConfig::default()), "Unknown Walk");
    }

    #[test]
    fn test_title_suffix_only_falls_through() {
        let doc = Document::parse("<h1> - WalkHighlands</h1><div class=\"walk-title\">Fairy Glen</div>").unwrap();
        assert_eq!(extract_title(&doc, &PipelineConfig::default()), "Fairy Glen");
    }

    #[test]
    fn test_summary_paragraph_fallback() {
        let long = "x".repeat(120);
        let html = format!("<p>short</p><p>{}</p>", long);
        let doc = Document::parse(&html).unwrap();
        assert_eq!(extract_summary(&doc), long);
    }

    #[test]
    fn test_malformed_page_is_total() {
        let doc = Document::parse("<<<not really html").unwrap();
        let signal = extract_page(&doc, "", &PipelineConfig::default());

        assert_eq!(signal.title.as_deref(), Some("Unknown Walk"));
        assert_eq!(signal.distance_km, None);
        assert_eq!(signal.difficulty_rating, None);
        assert_eq!(signal.region_key, None);
        assert!(signal.stages.is_empty());
    }
}
