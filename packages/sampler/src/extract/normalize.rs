//! Value normalization: prices, URLs, brands and spec strings.

use regex::Regex;
use std::sync::LazyLock;

static RE_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("price pattern is valid"));
static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"20\d{2}").expect("year pattern is valid"));
static RE_RECENT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"20(?:2[4-9]|3[0-9])").expect("year pattern is valid"));
static RE_LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{3})(?:W|\s*cm)?\b").expect("length pattern is valid"));
static RE_FIRST_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("integer pattern is valid"));
static RE_RATING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9](?:\.[0-9]+)?").expect("rating pattern is valid"));

/// Snowboard brands recognized in titles, in match priority order.
pub const BRANDS: &[&str] = &[
    "Burton",
    "Lib Tech",
    "Jones",
    "Capita",
    "Never Summer",
    "Salomon",
    "K2",
    "Rossignol",
    "Arbor",
    "Ride",
    "GNU",
    "Nitro",
    "Yes",
    "Rome",
    "Flow",
    "Bataleon",
    "Atomic",
    "Head",
    "Volkl",
    "Slash",
    "Weston",
    "Prior",
    "Korua",
    "CAPiTA",
    "Dinosaurs Will Die",
    "Endeavor",
];

/// Plausible snowboard lengths in centimetres.
pub const BOARD_LENGTH_RANGE: std::ops::RangeInclusive<u16> = 140..=180;

/// Parse a display price into a decimal.
///
/// Everything except digits, `.` and `,` is dropped, commas are removed and
/// the first numeric token is taken: `"$1,299.00"` is `1299.0`.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    RE_PRICE.find(&cleaned)?.as_str().parse().ok()
}

/// Make a link absolute against the catalog origin.
pub fn absolute_url(url: &str, base: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return base.to_string();
    }
    if url.starts_with("http") {
        return url.to_string();
    }
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

/// Accept only attribute values that look like real image locations.
pub fn is_image_src(value: &str) -> bool {
    value.starts_with("http") || value.starts_with('/')
}

/// Brand from a product title.
///
/// Scans title words in order; at each word every brand is tried, and a
/// multi-word brand matches when it starts at that word. Falls back to the
/// first word.
pub fn extract_brand(title: &str) -> Option<String> {
    let words: Vec<&str> = title.split_whitespace().collect();
    for start in 0..words.len() {
        for brand in BRANDS {
            let brand_words: Vec<&str> = brand.split_whitespace().collect();
            let end = start + brand_words.len();
            if end > words.len() {
                continue;
            }
            let matches = words[start..end]
                .iter()
                .zip(&brand_words)
                .all(|(word, expected)| word.eq_ignore_ascii_case(expected));
            if matches {
                return Some((*brand).to_string());
            }
        }
    }
    words.first().map(|w| (*w).to_string())
}

/// Four-digit model year from a detail-page label.
pub fn parse_year(text: &str) -> Option<u16> {
    RE_YEAR.find(text)?.as_str().parse().ok()
}

/// Model year mentioned in a product name (2024 to 2039).
pub fn year_from_name(name: &str) -> Option<u16> {
    RE_RECENT_YEAR.find(name)?.as_str().parse().ok()
}

/// Board lengths within [`BOARD_LENGTH_RANGE`], ascending and deduplicated.
///
/// Wide variants (`"160W"`) count as their base length.
pub fn parse_board_lengths<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<u16> {
    let mut lengths: Vec<u16> = texts
        .into_iter()
        .flat_map(|text| RE_LENGTH.captures_iter(text))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u16>().ok())
        .filter(|len| BOARD_LENGTH_RANGE.contains(len))
        .collect();
    lengths.sort_unstable();
    lengths.dedup();
    lengths
}

/// First integer in a text, e.g. `"(42 reviews)"`.
pub fn parse_count(text: &str) -> Option<u32> {
    RE_FIRST_INT.find(text)?.as_str().parse().ok()
}

/// Average rating, from a `data-rating`-style attribute or display text.
pub fn parse_rating(text: &str) -> Option<f32> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<f32>() {
        return Some(value);
    }
    RE_RATING.find(trimmed)?.as_str().parse().ok()
}

/// Title-case a spec keyword: `"wood core"` becomes `"Wood Core"`.
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
