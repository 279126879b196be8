//! Numeric walk statistics recovered from page text.
//!
//! Each field has an ordered list of [`Strategy`] values. The first
//! strategy whose pattern matches and whose captures parse wins, so a new
//! pattern is added by appending to the list.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

/// One pattern in a fallback chain.
pub struct Strategy<T> {
    name: &'static str,
    pattern: Regex,
    read: fn(&Captures) -> Option<T>,
}

impl<T> Strategy<T> {
    fn new(name: &'static str, pattern: &str, read: fn(&Captures) -> Option<T>) -> Self {
        Self { name, pattern: Regex::new(pattern).unwrap(), read }
    }
}

/// Runs `strategies` in order against `text` and returns the first value.
pub fn first_match<T>(field: &str, text: &str, strategies: &[Strategy<T>]) -> Option<T> {
    for (position, strategy) in strategies.iter().enumerate() {
        if let Some(caps) = strategy.pattern.captures(text)
            && let Some(value) = (strategy.read)(&caps)
        {
            if position > 0 {
                debug!(field, strategy = strategy.name, "recovered with fallback pattern");
            }
            return Some(value);
        }
    }
    None
}

fn number(caps: &Captures, group: usize) -> Option<f64> {
    caps.get(group)?.as_str().replace(',', "").parse().ok()
}

fn first_number(caps: &Captures) -> Option<f64> {
    number(caps, 1)
}

/// Upper bound of an optional `a - b` range.
fn upper_bound(caps: &Captures) -> Option<f64> {
    number(caps, 2).or_else(|| number(caps, 1))
}

fn hours_to_minutes(caps: &Captures) -> Option<f64> {
    upper_bound(caps).map(|hours| hours * 60.0)
}

fn days_to_minutes(caps: &Captures) -> Option<f64> {
    first_number(caps).map(|days| days * 24.0 * 60.0)
}

fn whole_metres(caps: &Captures) -> Option<u32> {
    first_number(caps).filter(|m| *m >= 0.0).map(|m| m.round() as u32)
}

fn small_integer(caps: &Captures) -> Option<u32> {
    caps.get(1)?.as_str().parse().ok()
}

fn grid_reference(caps: &Captures) -> Option<String> {
    Some(caps.get(1)?.as_str().replace(' ', "").to_uppercase())
}

static DISTANCE: LazyLock<Vec<Strategy<f64>>> = LazyLock::new(|| {
    vec![
        Strategy::new("labelled", r"(?i)\bDistance\s*:?\s*(\d+(?:\.\d+)?)\s*km", first_number),
        Strategy::new("bare", r"(?i)(\d+(?:\.\d+)?)\s*km\b", first_number),
    ]
});

static DURATION: LazyLock<Vec<Strategy<f64>>> = LazyLock::new(|| {
    vec![
        Strategy::new(
            "labelled",
            r"(?i)\bTime\s*:?\s*(\d+(?:\.\d+)?)(?:\s*(?:-|–|to)\s*(\d+(?:\.\d+)?))?\s*(?:hours?|hrs?)\b",
            hours_to_minutes,
        ),
        Strategy::new(
            "hour range",
            r"(?i)(\d+(?:\.\d+)?)\s*(?:-|–|to)\s*(\d+(?:\.\d+)?)\s*(?:hours?|hrs?)\b",
            hours_to_minutes,
        ),
        Strategy::new("hours", r"(?i)(\d+(?:\.\d+)?)\s*(?:hours?|hrs?)\b", hours_to_minutes),
        Strategy::new("minutes", r"(?i)(\d+)\s*(?:mins?|minutes)\b", first_number),
        Strategy::new("days", r"(?i)(\d+(?:\.\d+)?)\s*days?\b", days_to_minutes),
    ]
});

static ASCENT: LazyLock<Vec<Strategy<u32>>> = LazyLock::new(|| {
    vec![
        Strategy::new("labelled", r"(?i)\bAscent\s*:?\s*(\d[\d,]*)\s*m\b", whole_metres),
        Strategy::new(
            "bare",
            r"(?i)(\d[\d,]*)\s*m(?:etres|eters)?\s+(?:of\s+)?(?:ascent|climb(?:ing)?)\b",
            whole_metres,
        ),
    ]
});

static GRID_REF: LazyLock<Vec<Strategy<String>>> = LazyLock::new(|| {
    vec![
        Strategy::new("labelled", r"(?i)\bGrid\s*Ref\w*\s*:?\s*([A-Z]{2}\d{6})\b", grid_reference),
        Strategy::new("bare", r"\b([A-Z]{2}\d{6})\b", grid_reference),
    ]
});

static OVERALL_RATING: LazyLock<Vec<Strategy<u32>>> =
    LazyLock::new(|| vec![Strategy::new("out of five", r"\b(\d+)\s*/\s*5\b", small_integer)]);

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());

/// Distance in kilometres.
pub fn distance_km(text: &str) -> Option<f64> {
    first_match("distance", text, &DISTANCE)
}

/// Duration in minutes, taking the upper bound of a range.
pub fn duration_minutes(text: &str) -> Option<f64> {
    first_match("duration", text, &DURATION)
}

/// Total ascent in metres.
pub fn ascent_m(text: &str) -> Option<u32> {
    first_match("ascent", text, &ASCENT)
}

/// Two letters followed by six digits, uppercased.
pub fn grid_ref(text: &str) -> Option<String> {
    first_match("grid_ref", text, &GRID_REF)
}

/// An "N/5" rating.
pub fn overall_rating(text: &str) -> Option<u32> {
    first_match("overall_rating", text, &OVERALL_RATING)
}

/// First number in a listing cell, accepting a decimal comma.
pub fn cell_distance_km(text: &str) -> Option<f64> {
    let text = text.replace(',', ".");
    NUMBER.captures(&text).and_then(|caps| caps.get(1)?.as_str().parse().ok())
}

/// Listing-cell duration such as "2 days", "3.5 hours" or "45 mins", in minutes.
pub fn cell_duration_minutes(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    let value: f64 = NUMBER.captures(&lower)?.get(1)?.as_str().parse().ok()?;

    if lower.contains("day") {
        Some(value * 24.0 * 60.0)
    } else if lower.contains("hour") || lower.contains("hr") {
        Some(value * 60.0)
    } else if lower.contains("min") {
        Some(value.trunc())
    } else {
        None
    }
}
