//! Classification of raw signals into closed categories.
//!
//! Every lookup here is static data. Walk type and route type are
//! single-winner scans where table order breaks ties; tags are an
//! independent multi-label scan.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::signal::RawWalkSignal;

/// One of four closed difficulty categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy,
    Moderate,
    Hard,
    Strenuous,
}

impl DifficultyTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Moderate => "Moderate",
            Self::Hard => "Hard",
            Self::Strenuous => "Strenuous",
        }
    }

    /// Metres of climb per kilometre used to estimate a missing ascent.
    pub fn ascent_rate_per_km(self) -> f64 {
        match self {
            Self::Easy => 25.0,
            Self::Moderate => 75.0,
            Self::Hard => 125.0,
            Self::Strenuous => 200.0,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteType {
    Circular,
    #[serde(rename = "Out and Back")]
    OutAndBack,
    Linear,
}

/// The best-matching scenic category, used to pick a summary template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkType {
    Coastal,
    Mountain,
    Forest,
    Historic,
    Waterfall,
    Loch,
    General,
}

/// The fixed tag vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Wildlife,
    Photography,
    FamilyFriendly,
    Challenging,
    Historic,
    Coastal,
    Lighthouse,
    Forest,
    Waterfall,
    Viewpoint,
    Bridge,
    Island,
    Loch,
    ShortWalk,
    LongDistance,
}

impl Tag {
    pub const ALL: [Tag; 15] = [
        Tag::Wildlife,
        Tag::Photography,
        Tag::FamilyFriendly,
        Tag::Challenging,
        Tag::Historic,
        Tag::Coastal,
        Tag::Lighthouse,
        Tag::Forest,
        Tag::Waterfall,
        Tag::Viewpoint,
        Tag::Bridge,
        Tag::Island,
        Tag::Loch,
        Tag::ShortWalk,
        Tag::LongDistance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Wildlife => "wildlife",
            Tag::Photography => "photography",
            Tag::FamilyFriendly => "family-friendly",
            Tag::Challenging => "challenging",
            Tag::Historic => "historic",
            Tag::Coastal => "coastal",
            Tag::Lighthouse => "lighthouse",
            Tag::Forest => "forest",
            Tag::Waterfall => "waterfall",
            Tag::Viewpoint => "viewpoint",
            Tag::Bridge => "bridge",
            Tag::Island => "island",
            Tag::Loch => "loch",
            Tag::ShortWalk => "short-walk",
            Tag::LongDistance => "long-distance",
        }
    }
}

/// Categorical features derived from a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFeatures {
    pub walk_type: WalkType,
    pub route_type: RouteType,
    pub difficulty_tier: DifficultyTier,
    pub tags: BTreeSet<Tag>,
}

/// Inclusive upper bounds per tier; ratings above the last bound are Strenuous.
pub type ThresholdTable = [(u32, DifficultyTier); 3];

/// Boot-icon count (0-4+).
pub const PRIMARY_THRESHOLDS: ThresholdTable =
    [(1, DifficultyTier::Easy), (2, DifficultyTier::Moderate), (3, DifficultyTier::Hard)];

/// Overall "N/5" rating (0-5+).
pub const SECONDARY_THRESHOLDS: ThresholdTable =
    [(2, DifficultyTier::Easy), (3, DifficultyTier::Moderate), (4, DifficultyTier::Hard)];

pub const DEFAULT_TIER: DifficultyTier = DifficultyTier::Moderate;

/// Checked in order; the first category with a matching keyword wins.
pub static WALK_TYPE_KEYWORDS: &[(WalkType, &[&str])] = &[
    (WalkType::Coastal, &["beach", "bay", "cliff", "coast", "lighthouse", "headland", "point"]),
    (WalkType::Mountain, &["ben", "peak", "summit", "mountain", "hill", "ridge"]),
    (WalkType::Forest, &["forest", "woods", "woodland", "trees", "pine", "oak"]),
    (WalkType::Historic, &["castle", "fort", "broch", "dun", "ruins", "historic", "ancient"]),
    (WalkType::Waterfall, &["falls", "waterfall", "cascade", "gorge"]),
    (WalkType::Loch, &["loch", "lake", "reservoir"]),
];

/// Checked before [`OUT_AND_BACK_KEYWORDS`].
pub static CIRCULAR_KEYWORDS: &[&str] = &["circuit", "circular", "loop", "round", "return to start"];

pub static OUT_AND_BACK_KEYWORDS: &[&str] = &["out and back", "there and back", "return same way", "retrace"];

pub static TAG_KEYWORDS: &[(Tag, &[&str])] = &[
    (Tag::Wildlife, &["wildlife", "birds", "deer", "eagles", "otter", "seals"]),
    (Tag::Photography, &["views", "scenic", "panoramic", "spectacular", "dramatic"]),
    (Tag::FamilyFriendly, &["easy", "gentle", "accessible", "family"]),
    (Tag::Challenging, &["steep", "strenuous", "demanding", "difficult"]),
    (Tag::Historic, &["castle", "ruins", "ancient", "heritage", "historic"]),
    (Tag::Coastal, &["beach", "cliff", "sea", "ocean", "lighthouse"]),
    (Tag::Lighthouse, &["lighthouse"]),
    (Tag::Forest, &["woodland", "forest", "trees", "nature"]),
    (Tag::Waterfall, &["waterfall", "falls", "cascade"]),
    (Tag::Viewpoint, &["views", "viewpoint", "panorama", "vista"]),
    (Tag::Bridge, &["bridge", "crossing"]),
    (Tag::Island, &["island", "isle"]),
    (Tag::Loch, &["loch"]),
];

/// Classifies a signal. Identical signals always yield identical features.
///
/// # Example
///
/// ```rust
/// use trailmark_core::{RawWalkSignal, classify};
/// use trailmark_core::classify::{DifficultyTier, RouteType, WalkType};
///
/// let signal = RawWalkSignal {
///     title: Some("Loch an Eilein circuit".to_string()),
///     difficulty_rating: Some(1),
///     ..Default::default()
/// };
/// let features = classify(&signal);
///
/// assert_eq!(features.walk_type, WalkType::Loch);
/// assert_eq!(features.route_type, RouteType::Circular);
/// assert_eq!(features.difficulty_tier, DifficultyTier::Easy);
/// ```
pub fn classify(signal: &RawWalkSignal) -> ClassifiedFeatures {
    let text = signal.combined_text();
    ClassifiedFeatures {
        walk_type: walk_type(&text),
        route_type: route_type(&text),
        difficulty_tier: difficulty_tier(signal.difficulty_rating, signal.overall_rating),
        tags: tags(&text),
    }
}

/// Primary rating through [`PRIMARY_THRESHOLDS`], else secondary through
/// [`SECONDARY_THRESHOLDS`], else [`DEFAULT_TIER`].
pub fn difficulty_tier(primary: Option<u32>, secondary: Option<u32>) -> DifficultyTier {
    match (primary, secondary) {
        (Some(rating), _) => tier_for(rating, &PRIMARY_THRESHOLDS),
        (None, Some(rating)) => tier_for(rating, &SECONDARY_THRESHOLDS),
        (None, None) => DEFAULT_TIER,
    }
}

fn tier_for(rating: u32, table: &ThresholdTable) -> DifficultyTier {
    table
        .iter()
        .find(|(upper, _)| rating <= *upper)
        .map(|(_, tier)| *tier)
        .unwrap_or(DifficultyTier::Strenuous)
}

/// `text` must already be lowercase.
pub fn walk_type(text: &str) -> WalkType {
    WALK_TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(text, keywords))
        .map(|(walk_type, _)| *walk_type)
        .unwrap_or(WalkType::General)
}

/// `text` must already be lowercase.
pub fn route_type(text: &str) -> RouteType {
    if contains_any(text, CIRCULAR_KEYWORDS) {
        RouteType::Circular
    } else if contains_any(text, OUT_AND_BACK_KEYWORDS) {
        RouteType::OutAndBack
    } else {
        RouteType::Linear
    }
}

/// `text` must already be lowercase.
pub fn tags(text: &str) -> BTreeSet<Tag> {
    TAG_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(text, keywords))
        .map(|(tag, _)| *tag)
        .collect()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| contains_keyword(text, keyword))
}

/// Whether `keyword` occurs at the start of a word in `text`.
///
/// "round" matches "round" and "rounded" but not "around".
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    text.match_indices(keyword).any(|(start, _)| {
        text[..start]
            .chars()
            .next_back()
            .is_none_or(|prev| !prev.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, DifficultyTier::Easy)]
    #[case(1, DifficultyTier::Easy)]
    #[case(2, DifficultyTier::Moderate)]
    #[case(3, DifficultyTier::Hard)]
    #[case(4, DifficultyTier::Strenuous)]
    #[case(9, DifficultyTier::Strenuous)]
    fn test_primary_thresholds(#[case] rating: u32, #[case] expected: DifficultyTier) {
        assert_eq!(difficulty_tier(Some(rating), None), expected);
        assert_eq!(difficulty_tier(Some(rating), Some(5)), expected);
    }

    #[rstest]
    #[case(0, DifficultyTier::Easy)]
    #[case(2, DifficultyTier::Easy)]
    #[case(3, DifficultyTier::Moderate)]
    #[case(4, DifficultyTier::Hard)]
    #[case(5, DifficultyTier::Strenuous)]
    #[case(7, DifficultyTier::Strenuous)]
    fn test_secondary_thresholds(#[case] rating: u32, #[case] expected: DifficultyTier) {
        assert_eq!(difficulty_tier(None, Some(rating)), expected);
    }

    #[test]
    fn test_missing_ratings_default_to_moderate() {
        assert_eq!(difficulty_tier(None, None), DifficultyTier::Moderate);
    }

    #[test]
    fn test_walk_type_order_breaks_ties() {
        assert_eq!(walk_type("a beach below the ben"), WalkType::Coastal);
        assert_eq!(walk_type("summit ridge above the loch"), WalkType::Mountain);
        assert_eq!(walk_type("falls beside the loch"), WalkType::Waterfall);
        assert_eq!(walk_type("a stroll in town"), WalkType::General);
    }

    #[test]
    fn test_circular_beats_out_and_back() {
        assert_eq!(route_type("a circuit, or an out and back to the cairn"), RouteType::Circular);
        assert_eq!(route_type("an out and back to the cairn"), RouteType::OutAndBack);
        assert_eq!(route_type("retrace your steps"), RouteType::OutAndBack);
        assert_eq!(route_type("from the village to the bay"), RouteType::Linear);
    }

    #[test]
    fn test_keyword_matches_word_starts_only() {
        assert!(contains_keyword("a round of the hill", "round"));
        assert!(contains_keyword("rounded summit", "round"));
        assert!(!contains_keyword("the surrounding hills", "round"));
        assert!(!contains_keyword("wander around", "round"));
        assert!(contains_keyword("return to start", "return to start"));
    }

    #[test]
    fn test_tags_are_multi_label() {
        let found = tags("dramatic cliff views to the lighthouse, watch for seals");
        let expected: BTreeSet<Tag> =
            [Tag::Photography, Tag::Coastal, Tag::Lighthouse, Tag::Viewpoint, Tag::Wildlife].into_iter().collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_tags_deterministic_and_in_vocabulary() {
        let text = "an easy woodland walk to a waterfall and an old bridge on the isle";
        let first = tags(text);
        let second = tags(text);
        assert_eq!(first, second);
        assert!(first.iter().all(|tag| Tag::ALL.contains(tag)));
    }

    #[test]
    fn test_neist_point_scenario() {
        let signal = RawWalkSignal {
            title: Some("Neist Point Lighthouse Walk".to_string()),
            summary: "A walk along the cliff top to the lighthouse.".to_string(),
            ..Default::default()
        };
        let features = classify(&signal);

        assert_eq!(features.walk_type, WalkType::Coastal);
        assert!(features.tags.contains(&Tag::Coastal));
        assert!(features.tags.contains(&Tag::Lighthouse));
        assert_eq!(features.route_type, RouteType::Linear);
        assert_eq!(features.difficulty_tier, DifficultyTier::Moderate);
    }

    #[test]
    fn test_secondary_rating_scenario() {
        let signal = RawWalkSignal { difficulty_rating: None, overall_rating: Some(5), ..Default::default() };
        assert_eq!(classify(&signal).difficulty_tier, DifficultyTier::Strenuous);
    }

    #[test]
    fn test_tag_serialization() {
        let json = serde_json::to_string(&Tag::FamilyFriendly).unwrap();
        assert_eq!(json, "\"family-friendly\"");
        for tag in Tag::ALL {
            assert_eq!(serde_json::to_string(&tag).unwrap(), format!("\"{}\"", tag.as_str()));
        }
        assert_eq!(serde_json::to_string(&RouteType::OutAndBack).unwrap(), "\"Out and Back\"");
    }
}
