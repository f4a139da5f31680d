//! Fixed classification dimensions and the category key built from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SamplerError;

/// Target rider skill level, in order of progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// All skill levels in declaration order.
    pub const ALL: [SkillLevel; 4] = [
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Advanced,
        SkillLevel::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
            SkillLevel::Expert => "expert",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillLevel {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| SamplerError::config(format!("unknown skill level: {s}")))
    }
}

/// Primary riding style of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RidingStyle {
    AllMountain,
    Freeride,
    Freestyle,
    Powder,
    Carving,
}

impl RidingStyle {
    /// All riding styles in declaration order.
    pub const ALL: [RidingStyle; 5] = [
        RidingStyle::AllMountain,
        RidingStyle::Freeride,
        RidingStyle::Freestyle,
        RidingStyle::Powder,
        RidingStyle::Carving,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RidingStyle::AllMountain => "all-mountain",
            RidingStyle::Freeride => "freeride",
            RidingStyle::Freestyle => "freestyle",
            RidingStyle::Powder => "powder",
            RidingStyle::Carving => "carving",
        }
    }
}

impl fmt::Display for RidingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RidingStyle {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RidingStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| SamplerError::config(format!("unknown riding style: {s}")))
    }
}

/// Identity of one sampling matrix cell.
///
/// Rendered as `"{skill}_{style}"`, e.g. `intermediate_all-mountain`, and
/// serialized the same way so it can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CategoryKey {
    pub skill: SkillLevel,
    pub style: RidingStyle,
}

impl CategoryKey {
    pub const fn new(skill: SkillLevel, style: RidingStyle) -> Self {
        Self { skill, style }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.skill, self.style)
    }
}

impl FromStr for CategoryKey {
    type Err = SamplerError;

    /// Parse `"{skill}_{style}"`. Styles contain hyphens, never underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (skill, style) = s
            .split_once('_')
            .ok_or_else(|| SamplerError::config(format!("malformed category key: {s}")))?;
        Ok(Self::new(skill.parse()?, style.parse()?))
    }
}

impl From<CategoryKey> for String {
    fn from(key: CategoryKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for CategoryKey {
    type Error = SamplerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
