//! Assembly of the output [`WalkRecord`].
//!
//! Normalization is total: every field of the record gets a value, either
//! from the signal or from the defaults in [`PipelineConfig`]. Coordinates
//! and engagement numbers are estimates drawn from the injected random
//! source, not measurements.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::classify::{ClassifiedFeatures, DifficultyTier, RouteType, Tag, WalkType};
use crate::config::PipelineConfig;
use crate::region::{region_center, resolve_region_slug};
use crate::signal::RawWalkSignal;
use crate::synthesize::Synthesized;
use crate::{Result, TrailmarkError};

pub const FEATURED_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=800&h=600&fit=crop";

/// Walks at or under this distance get [`Tag::ShortWalk`].
pub const SHORT_WALK_MAX_KM: f64 = 3.0;
/// Walks at or over this distance get [`Tag::LongDistance`].
pub const LONG_DISTANCE_MIN_KM: f64 = 10.0;

/// Used when neither the title nor the placeholder yields a slug.
const FALLBACK_SLUG: &str = "walk";

static NON_SLUG_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SLUG_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_-]+").unwrap());

/// A normalized walk, ready for loading into the application database.
///
/// Field names serialize in camelCase; they are the compatibility surface
/// with the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkRecord {
    pub title: String,
    pub slug: String,
    pub region_slug: String,
    pub description: String,
    pub short_description: String,
    pub detailed_description: String,
    /// Kilometres.
    pub distance: f64,
    /// Metres.
    pub ascent: u32,
    pub difficulty: DifficultyTier,
    /// Hours.
    pub estimated_time: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres; an estimate, not a surveyed height.
    pub max_elevation: u32,
    pub route_type: RouteType,
    pub walk_type: WalkType,
    pub terrain: Option<String>,
    pub start_grid_ref: Option<String>,
    pub bog_factor: Option<u32>,
    pub tags: BTreeSet<Tag>,
    pub stages: Vec<StageRecord>,
    pub source_url: String,
    pub featured_image_url: String,
    pub is_published: bool,
    pub view_count: u32,
    pub like_count: u32,
    pub report_count: u32,
    pub average_rating: f64,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub scraped_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub converted_at: OffsetDateTime,
}

/// One numbered stage of a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    /// 1-based ordinal.
    pub stage: u32,
    pub description: String,
}

impl WalkRecord {
    /// Checks the record invariants.
    ///
    /// Normalization upholds these for any signal the extractor produces;
    /// signals built from outside data (listing rows) can still carry
    /// values like a negative distance, which surface here.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !is_slug(&self.slug) {
            return Err(format!("invalid slug {:?}", self.slug));
        }
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(format!("invalid distance {}", self.distance));
        }
        if !self.estimated_time.is_finite() || self.estimated_time < 0.0 {
            return Err(format!("invalid estimated time {}", self.estimated_time));
        }
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err("non-finite coordinates".to_string());
        }
        if self.stages.iter().enumerate().any(|(i, stage)| stage.stage as usize != i + 1) {
            return Err("stage ordinals are not dense".to_string());
        }
        Ok(())
    }

    /// [`WalkRecord::validate`] as a [`TrailmarkError::RecordFailed`].
    pub fn check(self, index: usize) -> Result<Self> {
        match self.validate() {
            Ok(()) => Ok(self),
            Err(reason) => Err(TrailmarkError::RecordFailed { index, title: self.title, reason }),
        }
    }
}

/// URL-safe slug: lowercase alphanumerics separated by single hyphens.
///
/// ```rust
/// use trailmark_core::slugify;
///
/// assert_eq!(slugify("Neist Point Lighthouse Walk"), "neist-point-lighthouse-walk");
/// assert_eq!(slugify("  Sgùrr na Cìche -- (via Glen Dessary)  "), "sgurr-na-ciche-via-glen-dessary");
/// ```
pub fn slugify(title: &str) -> String {
    let folded = title.nfkd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&folded, "");
    let joined = SLUG_SEPARATORS.replace_all(stripped.trim(), "-");
    joined.trim_matches('-').to_string()
}

fn is_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug.chars().all(|c| c == '-' || (c.is_alphanumeric() && !c.is_uppercase()))
}

/// Ascent estimated from distance at the tier's climb rate, clamped.
pub fn estimate_ascent(distance_km: f64, tier: DifficultyTier, config: &PipelineConfig) -> u32 {
    let estimate = (distance_km * tier.ascent_rate_per_km()).round().max(0.0) as u32;
    let (start, end) = (*config.ascent_clamp.start(), *config.ascent_clamp.end());
    estimate.clamp(start.min(end), start.max(end))
}

/// Region centre with independent uniform jitter on each axis.
pub fn estimate_coordinates<R: Rng + ?Sized>(region_slug: &str, jitter: f64, rng: &mut R) -> (f64, f64) {
    let (latitude, longitude) = region_center(region_slug);
    let jitter = jitter.abs();
    (
        round_to(latitude + rng.random_range(-jitter..=jitter), 5),
        round_to(longitude + rng.random_range(-jitter..=jitter), 5),
    )
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Classified tags plus the distance tags.
pub fn merge_tags(tags: &BTreeSet<Tag>, distance_km: Option<f64>) -> BTreeSet<Tag> {
    let mut merged = tags.clone();
    if let Some(distance) = distance_km {
        if distance <= SHORT_WALK_MAX_KM {
            merged.insert(Tag::ShortWalk);
        }
        if distance >= LONG_DISTANCE_MIN_KM {
            merged.insert(Tag::LongDistance);
        }
    }
    merged
}

/// Builds the output record.
///
/// `rng` supplies coordinate jitter and the sampled engagement numbers.
pub fn normalize<R: Rng + ?Sized>(
    signal: &RawWalkSignal, features: &ClassifiedFeatures, synthesized: Synthesized, config: &PipelineConfig,
    rng: &mut R,
) -> WalkRecord {
    let title = signal
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(config.placeholder_title.as_str())
        .to_string();

    let slug = [title.as_str(), config.placeholder_title.as_str()]
        .iter()
        .map(|candidate| slugify(candidate))
        .find(|slug| !slug.is_empty())
        .unwrap_or_else(|| FALLBACK_SLUG.to_string());

    let region_slug = resolve_region_slug(signal.region_key.as_deref());

    let distance = signal.distance_km.unwrap_or(config.default_distance_km);
    let ascent = match (signal.ascent_m, signal.distance_km) {
        (Some(ascent), _) => ascent,
        (None, Some(distance)) => estimate_ascent(distance, features.difficulty_tier, config),
        (None, None) => config.default_ascent_m,
    };
    let estimated_time = signal
        .duration_minutes
        .map(|minutes| minutes / 60.0)
        .unwrap_or(config.default_hours);

    let (latitude, longitude) = estimate_coordinates(&region_slug, config.jitter, rng);

    let stages = synthesized
        .stages
        .into_iter()
        .enumerate()
        .map(|(i, description)| StageRecord { stage: i as u32 + 1, description })
        .collect();

    WalkRecord {
        title,
        slug,
        region_slug,
        description: synthesized.summary,
        short_description: synthesized.short_description,
        detailed_description: synthesized.detailed_description,
        distance,
        ascent,
        difficulty: features.difficulty_tier,
        estimated_time,
        latitude,
        longitude,
        max_elevation: ascent.saturating_add(config.elevation_offset_m),
        route_type: features.route_type,
        walk_type: features.walk_type,
        terrain: signal.terrain.clone(),
        start_grid_ref: signal.grid_ref.clone(),
        bog_factor: signal.bog_factor,
        tags: merge_tags(&features.tags, signal.distance_km),
        stages,
        source_url: signal.source_url.clone(),
        featured_image_url: FEATURED_IMAGE_URL.to_string(),
        is_published: true,
        view_count: rng.random_range(50..=200),
        like_count: rng.random_range(5..=50),
        report_count: rng.random_range(0..=5),
        average_rating: round_to(3.8 + rng.random::<f64>(), 1),
        scraped_at: signal.scraped_at,
        converted_at: OffsetDateTime::now_utc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::synthesize::synthesize;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    fn run(signal: &RawWalkSignal, seed: u64) -> WalkRecord {
        let config = PipelineConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let features = classify(signal);
        let synthesized = synthesize(signal, &features, &config, &mut rng);
        normalize(signal, &features, synthesized, &config, &mut rng)
    }

    #[rstest]
    #[case("Neist Point Lighthouse Walk", "neist-point-lighthouse-walk")]
    #[case("  Ben Nevis   (Mountain Track)  ", "ben-nevis-mountain-track")]
    #[case("Sgùrr Alasdair", "sgurr-alasdair")]
    #[case("Coire Lagan -- Loch", "coire-lagan-loch")]
    #[case("under_score walk", "under-score-walk")]
    #[case("!!!", "")]
    #[case("ℌighland Trail", "highland-trail")]
    #[case("ℑona Abbey", "iona-abbey")]
    fn test_slugify(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(slugify(title), expected);
    }

    #[rstest]
    #[case("Neist Point Lighthouse Walk")]
    #[case("Stac Pollaidh -- the 'path' round")]
    #[case("An Teallach: Sàil Liath")]
    #[case("--Édifice   Historique--")]
    #[case("ℌighland Trail")]
    fn test_slug_idempotent(#[case] title: &str) {
        let slug = slugify(title);
        let as_title = slug.replace('-', " ");
        assert_eq!(slugify(&as_title), slug);
        assert_eq!(slugify(&slug), slug);
        assert!(is_slug(&slug));
        assert!(!slug.chars().any(char::is_whitespace));
    }

    #[test]
    fn test_ascent_estimate_is_clamped() {
        let config = PipelineConfig::default();
        assert_eq!(estimate_ascent(4.0, DifficultyTier::Moderate, &config), 300);
        assert_eq!(estimate_ascent(0.1, DifficultyTier::Easy, &config), 10);
        assert_eq!(estimate_ascent(40.0, DifficultyTier::Strenuous, &config), 2000);
    }

    #[test]
    fn test_ascent_estimate_reversed_clamp() {
        let config = PipelineConfig { ascent_clamp: 800..=20, ..Default::default() };
        assert_eq!(estimate_ascent(1.0, DifficultyTier::Easy, &config), 25);
        assert_eq!(estimate_ascent(40.0, DifficultyTier::Strenuous, &config), 800);
    }

    #[test]
    fn test_coordinates_stay_within_jitter() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let (lat, lon) = estimate_coordinates("cairngorms-aviemore", 0.1, &mut rng);
            assert!((lat - 57.1).abs() <= 0.10001);
            assert!((lon + 3.8).abs() <= 0.10001);
        }
        let (lat, lon) = estimate_coordinates("nowhere", 0.0, &mut rng);
        assert_eq!((lat, lon), (57.3, -6.2));
    }

    #[test]
    fn test_empty_signal_gets_defaults() {
        let record = run(&RawWalkSignal::default(), 5);

        assert_eq!(record.title, "Unknown Walk");
        assert_eq!(record.slug, "unknown-walk");
        assert_eq!(record.region_slug, "highlands");
        assert_eq!(record.distance, 5.0);
        assert_eq!(record.ascent, 100);
        assert_eq!(record.max_elevation, 300);
        assert_eq!(record.estimated_time, 2.0);
        assert_eq!(record.difficulty, DifficultyTier::Moderate);
        assert_eq!(record.route_type, RouteType::Linear);
        assert!(record.stages.is_empty());
        assert!(record.tags.is_empty());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_zero_stages_normalize() {
        let signal = RawWalkSignal {
            title: Some("Coral Beaches".to_string()),
            distance_km: Some(3.5),
            stages: Vec::new(),
            ..Default::default()
        };
        let record = run(&signal, 1);
        assert!(record.stages.is_empty());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_stage_ordinals_dense_after_blank_drop() {
        let signal = RawWalkSignal {
            title: Some("Quiraing".to_string()),
            stages: vec![
                "Start at the pass.".to_string(),
                String::new(),
                "Follow the path below the cliffs.".to_string(),
                "  \n ".to_string(),
                "Return over the top.".to_string(),
            ],
            ..Default::default()
        };
        let record = run(&signal, 2);

        let ordinals: Vec<u32> = record.stages.iter().map(|s| s.stage).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert!(record.stages.len() <= signal.stages.len());
    }

    #[test]
    fn test_derived_numbers_and_tags() {
        let signal = RawWalkSignal {
            title: Some("Ben Nevis".to_string()),
            distance_km: Some(17.0),
            duration_minutes: Some(480.0),
            difficulty_rating: Some(4),
            region_key: Some("fortwilliam".to_string()),
            ..Default::default()
        };
        let record = run(&signal, 3);

        assert_eq!(record.region_slug, "fort-william");
        assert_eq!(record.ascent, 2000);
        assert_eq!(record.max_elevation, 2200);
        assert_eq!(record.estimated_time, 8.0);
        assert!(record.tags.contains(&Tag::LongDistance));
        assert!(!record.tags.contains(&Tag::ShortWalk));
    }

    #[test]
    fn test_sampled_values_in_range_and_seeded() {
        let signal = RawWalkSignal { title: Some("Old Man of Storr".to_string()), ..Default::default() };
        let a = run(&signal, 42);
        let b = run(&signal, 42);

        assert!((50..=200).contains(&a.view_count));
        assert!((5..=50).contains(&a.like_count));
        assert!(a.report_count <= 5);
        assert!((3.8..=4.8).contains(&a.average_rating));

        assert_eq!((a.latitude, a.longitude), (b.latitude, b.longitude));
        assert_eq!((a.view_count, a.like_count, a.average_rating), (b.view_count, b.like_count, b.average_rating));
    }

    #[test]
    fn test_json_round_trip() {
        let signal = RawWalkSignal {
            title: Some("Neist Point Lighthouse Walk".to_string()),
            summary: "A walk along the cliff top to the lighthouse.".to_string(),
            distance_km: Some(2.25),
            duration_minutes: Some(90.0),
            grid_ref: Some("NG126478".to_string()),
            region_key: Some("skye".to_string()),
            stages: vec!["Descend the steps.".to_string(), "Return the same way.".to_string()],
            scraped_at: Some(OffsetDateTime::now_utc()),
            ..Default::default()
        };
        let record = run(&signal, 9);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"regionSlug\":\"isle-of-skye\""));
        assert!(json.contains("\"estimatedTime\":1.5"));
        assert!(json.contains("\"maxElevation\""));
        assert!(json.contains("\"routeType\""));
        assert!(json.contains("\"sourceUrl\""));

        let parsed: WalkRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_check_reports_failure() {
        let signal = RawWalkSignal {
            title: Some("Broken row".to_string()),
            distance_km: Some(-3.0),
            ..Default::default()
        };
        let result = run(&signal, 0).check(4);
        assert!(matches!(result, Err(TrailmarkError::RecordFailed { index: 4, .. })));
    }
}
