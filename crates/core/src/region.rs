//! Static region tables: source-site keys, target slugs, centre points and
//! descriptive context.

use url::Url;

/// Region slug used when no region can be recovered at all.
pub const DEFAULT_REGION_SLUG: &str = "highlands";

/// Region whose centre stands in for unrecognised regions.
pub const FALLBACK_CENTER_SLUG: &str = "isle-of-skye";

/// A known walking region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    /// Path segment the source site uses, e.g. `fortwilliam`.
    pub key: &'static str,
    /// Slug in the target application, e.g. `fort-william`.
    pub slug: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// One-sentence flavour paragraph for detailed descriptions.
    pub context: &'static str,
}

pub static REGIONS: &[Region] = &[
    Region {
        key: "skye",
        slug: "isle-of-skye",
        latitude: 57.3,
        longitude: -6.2,
        context: "Located on Scotland's most dramatic island, this walk showcases Skye's unique geological formations and breathtaking landscapes.",
    },
    Region {
        key: "fortwilliam",
        slug: "fort-william",
        latitude: 56.8,
        longitude: -5.1,
        context: "In the shadow of Ben Nevis, this walk is part of Scotland's outdoor capital, offering Highland drama and natural beauty.",
    },
    Region {
        key: "torridon",
        slug: "torridon-gairloch",
        latitude: 57.6,
        longitude: -5.5,
        context: "Set in the heart of the northwest Highlands, this route features ancient sandstone peaks and pristine wilderness.",
    },
    Region {
        key: "cairngorms",
        slug: "cairngorms-aviemore",
        latitude: 57.1,
        longitude: -3.8,
        context: "Within Britain's largest national park, this walk combines ancient forests, wildlife, and Highland scenery.",
    },
    Region {
        key: "lochlomond",
        slug: "loch-lomond",
        latitude: 56.1,
        longitude: -4.6,
        context: "Near Scotland's most famous loch, this walk offers accessible Highland beauty close to major population centres.",
    },
    Region {
        key: "argyll",
        slug: "argyll-oban",
        latitude: 56.0,
        longitude: -5.2,
        context: "In Argyll's diverse landscape of sea lochs and hills, this walk showcases western Scotland's maritime Highland character.",
    },
    Region {
        key: "ullapool",
        slug: "ullapool-assynt",
        latitude: 57.9,
        longitude: -5.1,
        context: "In Scotland's geological wonderland, this walk features some of the country's oldest rocks and most unique landscapes.",
    },
    Region {
        key: "perthshire",
        slug: "perthshire",
        latitude: 56.7,
        longitude: -3.9,
        context: "In the gateway to the Highlands, this walk combines accessibility with genuine Highland character and history.",
    },
];

/// Region key from the first path segment of a walk URL.
///
/// Walk pages live at `/<region>/<walk>.shtml`; URLs with fewer than two
/// path segments carry no region.
pub fn region_key_from_url(source_url: &str) -> Option<String> {
    let url = Url::parse(source_url).ok()?;
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(segments[0].to_lowercase())
}

/// Maps a source-site region key to a target slug.
///
/// Unmapped keys pass through lowercased with whitespace runs hyphenated.
pub fn region_slug(key: &str) -> String {
    let normalized = key.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
    match REGIONS.iter().find(|r| r.key == normalized) {
        Some(region) => region.slug.to_string(),
        None => normalized,
    }
}

/// Region slug for an optional key, defaulting to [`DEFAULT_REGION_SLUG`].
pub fn resolve_region_slug(key: Option<&str>) -> String {
    match key.map(region_slug) {
        Some(slug) if !slug.is_empty() => slug,
        _ => DEFAULT_REGION_SLUG.to_string(),
    }
}

/// Looks up a region by its target slug.
pub fn region_by_slug(slug: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.slug == slug)
}

/// Centre point for a region slug, falling back to [`FALLBACK_CENTER_SLUG`].
pub fn region_center(slug: &str) -> (f64, f64) {
    let region = region_by_slug(slug)
        .or_else(|| region_by_slug(FALLBACK_CENTER_SLUG))
        .unwrap_or(&REGIONS[0]);
    (region.latitude, region.longitude)
}

/// Human-readable region name: `isle-of-skye` becomes `Isle Of Skye`.
pub fn region_display_name(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
