//! Region listing pages: tables of walks with boot-icon grades.

use url::Url;

use super::stats::{cell_distance_km, cell_duration_minutes};
use crate::parse::{Document, Element};
use crate::region::region_display_name;
use crate::signal::ListingRow;

/// Root of the source site; listing links are relative to `<root>/<region>/`.
pub const SITE_ROOT: &str = "https://www.walkhighlands.co.uk";

/// Word for a listing boot count. Listing grades use a five-step scale
/// that is independent of the four difficulty tiers.
pub fn listing_difficulty_word(level: u32) -> &'static str {
    match level {
        1 => "Easy",
        2 => "Moderate",
        3 => "Challenging",
        4 => "Hard",
        5 => "Very Hard",
        _ => "Unknown",
    }
}

/// Walk rows from every table on a listing page.
///
/// Rows with fewer than three cells, header rows and rows without a link
/// in the first cell are skipped.
pub fn extract_listing(doc: &Document, region_key: &str) -> Vec<ListingRow> {
    let Ok(rows) = doc.select("tr") else {
        return Vec::new();
    };
    let base = Url::parse(&format!("{}/{}/", SITE_ROOT, region_key)).ok();

    rows.iter()
        .filter_map(|row| listing_row(row, region_key, base.as_ref()))
        .collect()
}

fn listing_row(row: &Element<'_>, region_key: &str, base: Option<&Url>) -> Option<ListingRow> {
    let cells: Vec<Element<'_>> = row
        .child_elements()
        .into_iter()
        .filter(|cell| matches!(cell.tag_name().as_str(), "td" | "th"))
        .collect();

    if cells.len() < 3 {
        return None;
    }
    if cells.iter().any(|cell| cell.tag_name() == "th" || cell.text().contains("Walk Name")) {
        return None;
    }

    let link = cells[0].select("a").ok()?.into_iter().next()?;
    let title = link.text().trim().to_string();
    if title.is_empty() {
        return None;
    }
    let href = link.attr("href")?;
    let source_url = match base {
        Some(base) => base.join(href).ok()?.to_string(),
        None => href.to_string(),
    };

    let level = cells[1].select("img[src*=\"boot\"]").map(|imgs| imgs.len() as u32).unwrap_or(0);
    let difficulty = listing_difficulty_word(level);
    let region = region_display_name(region_key);

    Some(ListingRow {
        title: Some(title),
        description: Some(format!("A {} walk in {}", difficulty.to_lowercase(), region)),
        region: Some(region),
        difficulty: Some(difficulty.to_string()),
        difficulty_level: Some(level),
        distance_km: cell_distance_km(&cells[2].text()),
        duration_minutes: cells.get(3).and_then(|cell| cell_duration_minutes(&cell.text())),
        source_url: Some(source_url),
    })
}

/// Easiest and shortest walks first, truncated to `limit`.
pub fn select_popular(mut rows: Vec<ListingRow>, limit: usize) -> Vec<ListingRow> {
    rows.sort_by(|a, b| {
        let level = a.difficulty_level.unwrap_or(1).cmp(&b.difficulty_level.unwrap_or(1));
        level.then_with(|| a.distance_km.unwrap_or(0.0).total_cmp(&b.distance_km.unwrap_or(0.0)))
    });
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_HTML: &str = r#"
        <html><body>
        <table>
            <tr><th>Walk Name</th><th>Grade</th><th>Distance</th><th>Time</th></tr>
            <tr>
                <td><a href="neistpoint.shtml">Neist Point lighthouse</a></td>
                <td><img src="/images/boot.gif"><img src="/images/boot.gif"></td>
                <td>2.25km</td>
                <td>1 - 1.5 hours</td>
            </tr>
            <tr>
                <td><a href="coral-beaches.shtml">Coral Beaches</a></td>
                <td><img src="/images/boot.gif"></td>
                <td>3,5km</td>
                <td>45 mins</td>
            </tr>
            <tr><td>Advert</td><td colspan="2">No link here</td></tr>
            <tr><td>No link</td><td></td><td>4km</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_extract_listing_rows() {
        let doc = Document::parse(LISTING_HTML).unwrap();
        let rows = extract_listing(&doc, "skye");

        assert_eq!(rows.len(), 2);
        let neist = &rows[0];
        assert_eq!(neist.title.as_deref(), Some("Neist Point lighthouse"));
        assert_eq!(neist.source_url.as_deref(), Some("https://www.walkhighlands.co.uk/skye/neistpoint.shtml"));
        assert_eq!(neist.difficulty_level, Some(2));
        assert_eq!(neist.difficulty.as_deref(), Some("Moderate"));
        assert_eq!(neist.distance_km, Some(2.25));
        assert_eq!(neist.duration_minutes, Some(60.0));
        assert_eq!(neist.region.as_deref(), Some("Skye"));
        assert_eq!(neist.description.as_deref(), Some("A moderate walk in Skye"));

        assert_eq!(rows[1].distance_km, Some(3.5));
        assert_eq!(rows[1].duration_minutes, Some(45.0));
    }

    #[test]
    fn test_listing_difficulty_words() {
        assert_eq!(listing_difficulty_word(3), "Challenging");
        assert_eq!(listing_difficulty_word(0), "Unknown");
        assert_eq!(listing_difficulty_word(9), "Unknown");
    }

    #[test]
    fn test_select_popular_orders_and_limits() {
        let row = |title: &str, level: u32, distance: f64| ListingRow {
            title: Some(title.to_string()),
            difficulty_level: Some(level),
            distance_km: Some(distance),
            ..Default::default()
        };
        let rows = vec![row("hard", 4, 3.0), row("long easy", 1, 9.0), row("short easy", 1, 2.0)];

        let selected = select_popular(rows, 2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].title.as_deref(), Some("short easy"));
        assert_eq!(selected[1].title.as_deref(), Some("long easy"));
    }
}
