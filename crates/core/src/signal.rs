//! Raw signals recovered from walk pages and listing rows.
//!
//! A [`RawWalkSignal`] is the loosely-typed output of extraction. Every
//! field may be absent; absence is resolved later by the classifier and
//! normalizer through their stated defaults.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Fields recovered from one walk page or listing row, before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWalkSignal {
    pub title: Option<String>,
    /// Free-text summary of the walk; empty when nothing was found.
    pub summary: String,
    /// Distance in kilometres.
    pub distance_km: Option<f64>,
    /// Duration in minutes. Ranges are reduced to their upper bound.
    pub duration_minutes: Option<f64>,
    /// Total ascent in metres.
    pub ascent_m: Option<u32>,
    /// Count of difficulty markers (boot icons) on the page.
    pub difficulty_rating: Option<u32>,
    /// Secondary "N/5" rating, used when no difficulty markers exist.
    pub overall_rating: Option<u32>,
    /// Count of bog-factor markers on the page.
    pub bog_factor: Option<u32>,
    /// Ordnance Survey grid reference, e.g. `NG126478`.
    pub grid_ref: Option<String>,
    pub terrain: Option<String>,
    /// Source-site region key, e.g. `skye`.
    pub region_key: Option<String>,
    pub source_url: String,
    /// Stage text blocks in page order. Blank blocks are allowed here and
    /// dropped during normalization.
    pub stages: Vec<String>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub scraped_at: Option<OffsetDateTime>,
}

impl RawWalkSignal {
    /// Title, summary and stage text joined and lowercased for keyword scans.
    pub fn combined_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.stages.len() + 2);
        if let Some(title) = &self.title {
            parts.push(title);
        }
        parts.push(&self.summary);
        parts.extend(self.stages.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}

/// One row from a region listing page.
///
/// This is the JSON shape produced by the listing stage and consumed by
/// `trailmark convert`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<u32>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<ListingRow> for RawWalkSignal {
    fn from(row: ListingRow) -> Self {
        let region_key = row
            .region
            .filter(|r| !r.trim().is_empty())
            .or_else(|| row.source_url.as_deref().and_then(crate::region::region_key_from_url));

        Self {
            title: row.title.filter(|t| !t.trim().is_empty()),
            summary: row.description.unwrap_or_default(),
            distance_km: row.distance_km,
            duration_minutes: row.duration_minutes,
            difficulty_rating: row.difficulty_level,
            region_key,
            source_url: row.source_url.unwrap_or_default(),
            ..Default::default()
        }
    }
}
