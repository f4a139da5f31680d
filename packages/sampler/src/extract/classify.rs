//! Keyword classification into skill level and riding style.
//!
//! Tables are checked in order and the first set with any hit wins, so a
//! board mentioning both "park" and "powder" is freestyle. Keywords match
//! as plain substrings of the lowercased text: "pro" fires on "Proto" and
//! "Process", "soft" on "softer".
//!
//! Note that the freeride set contains "mountain", which also fires on
//! "all mountain" text. Boards whose URL path carries `all-mountain` will
//! therefore classify as freeride unless an earlier freestyle keyword hits.

use url::Url;

use crate::types::taxonomy::{CategoryKey, RidingStyle, SkillLevel};

/// Skill keyword sets in match order. Anything unmatched is intermediate.
pub const SKILL_KEYWORDS: &[(SkillLevel, &[&str])] = &[
    (
        SkillLevel::Expert,
        &["expert", "pro", "advanced", "aggressive", "stiff", "competition"],
    ),
    (
        SkillLevel::Advanced,
        &["advanced", "performance", "high-end", "precision", "responsive"],
    ),
    (
        SkillLevel::Beginner,
        &["beginner", "learning", "first", "starter", "easy", "forgiving", "soft"],
    ),
];

/// Style keyword sets in match order. Anything unmatched is all-mountain.
pub const STYLE_KEYWORDS: &[(RidingStyle, &[&str])] = &[
    (
        RidingStyle::Freestyle,
        &["freestyle", "park", "pipe", "jib", "twin", "street"],
    ),
    (
        RidingStyle::Freeride,
        &["freeride", "backcountry", "mountain", "big mountain", "charging"],
    ),
    (
        RidingStyle::Powder,
        &["powder", "deep", "float", "surf", "tapered"],
    ),
    (
        RidingStyle::Carving,
        &["carving", "carve", "groomed", "piste", "racing"],
    ),
];

/// Lowercased text searched for keywords.
#[derive(Debug, Clone, Default)]
pub struct KeywordText {
    text: String,
}

impl KeywordText {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_lowercase(),
        }
    }

    /// Build from several parts joined by spaces.
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Self {
        let joined = parts.into_iter().collect::<Vec<_>>().join(" ");
        Self::new(&joined)
    }

    /// True when `keyword` occurs anywhere in the text.
    pub fn contains(&self, keyword: &str) -> bool {
        !keyword.is_empty() && self.text.contains(&keyword.to_lowercase())
    }

    pub fn contains_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|keyword| self.contains(keyword))
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Skill level from matching text.
pub fn classify_skill(text: &KeywordText) -> SkillLevel {
    SKILL_KEYWORDS
        .iter()
        .find(|(_, keywords)| text.contains_any(keywords))
        .map(|(level, _)| *level)
        .unwrap_or(SkillLevel::Intermediate)
}

/// Riding style from matching text.
pub fn classify_style(text: &KeywordText) -> RidingStyle {
    STYLE_KEYWORDS
        .iter()
        .find(|(_, keywords)| text.contains_any(keywords))
        .map(|(style, _)| *style)
        .unwrap_or(RidingStyle::AllMountain)
}

/// Path component of a product URL; the raw string when it does not parse.
pub fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    }
}

/// Category from a record's title, description and own URL.
///
/// Skill reads the title and description; style also reads the URL path.
pub fn classify(title: &str, description: Option<&str>, url: Option<&str>) -> CategoryKey {
    let description = description.unwrap_or("");
    let path = url.map(url_path).unwrap_or_default();

    let skill_text = KeywordText::from_parts([title, description]);
    let style_text = KeywordText::from_parts([title, description, path.as_str()]);
    CategoryKey::new(classify_skill(&skill_text), classify_style(&style_text))
}
