//! Templated prose for walk records.
//!
//! This is a deliberately coarse, template-driven rewrite and not general
//! paraphrase generation. Summaries come from one fixed sentence per walk
//! type with a handful of substituted fields. Stage descriptions come from
//! a small decision table keyed on position and a few words of the source
//! stage text. Source text only selects which fixed narrative applies; it
//! is never copied into the output.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::classify::{ClassifiedFeatures, WalkType, contains_keyword};
use crate::config::PipelineConfig;
use crate::region::{region_by_slug, region_display_name, resolve_region_slug};
use crate::signal::RawWalkSignal;

/// Prose derived from one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesized {
    pub summary: String,
    pub short_description: String,
    pub detailed_description: String,
    /// One narrative per non-blank source stage, in source order.
    pub stages: Vec<String>,
}

/// Values substituted into a summary template.
pub struct TemplateFields<'a> {
    /// Tier word, lowercased.
    pub difficulty: String,
    /// Region display name.
    pub region: String,
    pub highlight: &'a str,
    /// Named feature from the title, or a generic stand-in.
    pub feature: String,
    pub forest_type: &'a str,
}

type Template = fn(&TemplateFields<'_>) -> String;

/// One summary template per walk type. [`WalkType::General`] has none and
/// gets [`fallback_summary`].
static TEMPLATES: &[(WalkType, Template)] = &[
    (WalkType::Coastal, coastal),
    (WalkType::Mountain, mountain),
    (WalkType::Forest, forest),
    (WalkType::Historic, historic),
    (WalkType::Waterfall, waterfall),
    (WalkType::Loch, loch),
];

fn coastal(f: &TemplateFields<'_>) -> String {
    format!(
        "Discover Scotland's dramatic coastline on this {} walk to {}, where {} creates a scene of raw Highland beauty.",
        f.difficulty, f.feature, f.highlight
    )
}

fn mountain(f: &TemplateFields<'_>) -> String {
    format!(
        "Experience breathtaking Highland scenery on this {} walk in {}, offering {} and spectacular mountain vistas.",
        f.difficulty, f.region, f.highlight
    )
}

fn forest(f: &TemplateFields<'_>) -> String {
    format!(
        "Journey through ancient {} on this peaceful {} walk, where {} and diverse wildlife create a perfect Highland escape.",
        f.forest_type, f.difficulty, f.highlight
    )
}

fn historic(f: &TemplateFields<'_>) -> String {
    format!(
        "Explore Scotland's rich heritage on this {} walk to {}, combining {} with centuries of Highland history.",
        f.difficulty, f.feature, f.highlight
    )
}

fn waterfall(f: &TemplateFields<'_>) -> String {
    format!(
        "Follow rushing Highland waters on this {} walk to {}, where {} showcases nature's power in spectacular fashion.",
        f.difficulty, f.feature, f.highlight
    )
}

fn loch(f: &TemplateFields<'_>) -> String {
    format!(
        "Circuit the pristine waters of {} on this {} walk, where {} and perfect reflections create Highland walking at its finest.",
        f.feature, f.difficulty, f.highlight
    )
}

static HIGHLIGHTS: &[(WalkType, &str)] = &[
    (WalkType::Coastal, "dramatic sea cliffs and Atlantic views"),
    (WalkType::Mountain, "panoramic Highland vistas"),
    (WalkType::Forest, "ancient woodland and wildlife"),
    (WalkType::Historic, "fascinating clan history"),
    (WalkType::Waterfall, "thundering cascades"),
    (WalkType::Loch, "mirror-like reflections in Highland waters"),
];

const GENERIC_HIGHLIGHT: &str = "spectacular scenery";
const GENERIC_FEATURE: &str = "this Highland destination";

/// Title patterns for a recognisable named place, tried in order.
static NAMED_FEATURES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)\b(\w+\s+Point)\b", r"(?i)\b(\w+\s+Glen)\b", r"(?i)\b(Loch\s+\w+)\b"]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
});

const START_NARRATIVE: &str = "Begin your walk from the designated parking area. The initial section follows well-marked paths through the local terrain, offering early glimpses of the landscape ahead.";

const ASCENT_NARRATIVE: &str = "The route now climbs toward higher ground, with increasing views as you gain elevation. Take care on steeper sections and enjoy the expanding Highland panorama.";

const RETURN_NARRATIVE: &str = "For the return journey, retrace your route while enjoying different perspectives of the scenery you passed earlier. The changing light often reveals new aspects of the landscape.";

/// Interchangeable "continue" narratives; one is picked at random per stage.
const CONTINUE_NARRATIVES: &[&str] = &[
    "Continue along the established route, following waymarkers and natural features. The path leads through varied Highland terrain typical of this region.",
    "From this point the route carries on through open country, guided by waymarkers and natural features. The terrain here is typical of this part of the Highlands.",
    "The path now continues across changing ground, following waymarkers and obvious natural features. Expect the varied Highland terrain this region is known for.",
];

const ASCENT_CUES: &[&str] = &["summit", "top"];
const RETURN_CUES: &[&str] = &["return", "back"];

/// Builds the summary, descriptions and stage narratives for a signal.
///
/// `rng` only varies the generic stage narrative; everything else is a
/// pure function of the signal and its features.
pub fn synthesize<R: Rng + ?Sized>(
    signal: &RawWalkSignal, features: &ClassifiedFeatures, config: &PipelineConfig, rng: &mut R,
) -> Synthesized {
    let region_slug = resolve_region_slug(signal.region_key.as_deref());
    let summary = summary(signal, features, &region_slug);
    let short_description = short_description(&summary, config.short_description_chars);
    let detailed_description = detailed_description(&summary, signal.distance_km, &region_slug);

    Synthesized { summary, short_description, detailed_description, stages: stage_narratives(&signal.stages, rng) }
}

/// Summary sentence from the walk type's template, or the fallback.
pub fn summary(signal: &RawWalkSignal, features: &ClassifiedFeatures, region_slug: &str) -> String {
    let region = region_display_name(region_slug);
    let difficulty = features.difficulty_tier.as_str().to_lowercase();

    let Some((_, template)) = TEMPLATES.iter().find(|(walk_type, _)| *walk_type == features.walk_type) else {
        return fallback_summary(&difficulty, &region);
    };

    let fields = TemplateFields {
        difficulty,
        region,
        highlight: highlight(features.walk_type),
        feature: named_feature(signal.title.as_deref().unwrap_or_default()),
        forest_type: if signal.summary.to_lowercase().contains("pine") {
            "Caledonian forest"
        } else {
            "native woodland"
        },
    };
    template(&fields)
}

pub fn fallback_summary(difficulty: &str, region: &str) -> String {
    format!(
        "Experience the beauty of the Scottish Highlands on this {} walk near {}, offering spectacular scenery and authentic Highland character.",
        difficulty, region
    )
}

fn highlight(walk_type: WalkType) -> &'static str {
    HIGHLIGHTS
        .iter()
        .find(|(t, _)| *t == walk_type)
        .map(|(_, h)| *h)
        .unwrap_or(GENERIC_HIGHLIGHT)
}

/// First named place recognised in a title, e.g. "Neist Point".
pub fn named_feature(title: &str) -> String {
    NAMED_FEATURES
        .iter()
        .find_map(|pattern| pattern.captures(title).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| GENERIC_FEATURE.to_string())
}

/// Text up to and including the first full stop, else the first
/// `max_chars` characters with an ellipsis when anything was cut.
pub fn short_description(summary: &str, max_chars: usize) -> String {
    if let Some(end) = summary.find('.') {
        return summary[..=end].trim().to_string();
    }
    if summary.chars().count() <= max_chars {
        return summary.trim().to_string();
    }
    let prefix: String = summary.chars().take(max_chars).collect();
    format!("{}...", prefix.trim_end())
}

/// Summary, a distance sentence and the region's context paragraph.
pub fn detailed_description(summary: &str, distance_km: Option<f64>, region_slug: &str) -> String {
    let mut paragraphs = vec![summary.to_string()];
    if let Some(distance) = distance_km {
        paragraphs.push(distance_sentence(distance));
    }
    if let Some(region) = region_by_slug(region_slug) {
        paragraphs.push(region.context.to_string());
    }
    paragraphs.join("\n\n")
}

fn distance_sentence(distance: f64) -> String {
    if distance <= 2.0 {
        format!("This short {:.1}km walk is perfect for a quick outdoor adventure.", distance)
    } else if distance <= 5.0 {
        format!("At {:.1}km, this walk offers a good balance of exercise and scenery.", distance)
    } else {
        format!("This {:.1}km walk provides a substantial outdoor challenge.", distance)
    }
}

/// One narrative per non-blank stage. Blank stages are dropped here so
/// that ordinals assigned later stay dense.
pub fn stage_narratives<R: Rng + ?Sized>(stages: &[String], rng: &mut R) -> Vec<String> {
    stages
        .iter()
        .filter(|text| !text.trim().is_empty())
        .enumerate()
        .map(|(position, text)| stage_narrative(position, text, rng).to_string())
        .collect()
}

fn stage_narrative<R: Rng + ?Sized>(position: usize, text: &str, rng: &mut R) -> &'static str {
    let lower = text.to_lowercase();
    if position == 0 {
        START_NARRATIVE
    } else if ASCENT_CUES.iter().any(|cue| contains_keyword(&lower, cue)) {
        ASCENT_NARRATIVE
    } else if RETURN_CUES.iter().any(|cue| contains_keyword(&lower, cue)) {
        RETURN_NARRATIVE
    } else {
        CONTINUE_NARRATIVES[rng.random_range(0..CONTINUE_NARRATIVES.len())]
    }
}
