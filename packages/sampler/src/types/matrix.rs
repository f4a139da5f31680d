//! Static sampling matrix: per-category target counts.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};
use crate::types::taxonomy::{CategoryKey, RidingStyle, SkillLevel};

/// Read-only table of target counts per (skill, style) pair.
///
/// Entry order is significant: it is the tie-break order for priority
/// scoring, so two trackers built from the same matrix always agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixEntries", into = "MatrixEntries")]
pub struct SamplingMatrix {
    entries: Vec<(CategoryKey, u32)>,
}

/// Wire form; deserialization goes through [`SamplingMatrix::from_entries`].
#[derive(Serialize, Deserialize)]
struct MatrixEntries {
    entries: Vec<(CategoryKey, u32)>,
}

impl TryFrom<MatrixEntries> for SamplingMatrix {
    type Error = SamplerError;

    fn try_from(raw: MatrixEntries) -> Result<Self> {
        Self::from_entries(raw.entries)
    }
}

impl From<SamplingMatrix> for MatrixEntries {
    fn from(matrix: SamplingMatrix) -> Self {
        Self {
            entries: matrix.entries,
        }
    }
}

impl Default for SamplingMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

impl SamplingMatrix {
    /// The balanced 50-board matrix.
    pub fn standard() -> Self {
        use RidingStyle::*;
        use SkillLevel::*;

        let rows: [(SkillLevel, [u32; 5]); 4] = [
            (Beginner, [3, 2, 3, 1, 1]),
            (Intermediate, [4, 3, 4, 2, 2]),
            (Advanced, [4, 4, 4, 3, 2]),
            (Expert, [2, 2, 2, 1, 1]),
        ];
        let styles = [AllMountain, Freeride, Freestyle, Powder, Carving];

        let entries = rows
            .into_iter()
            .flat_map(|(skill, targets)| {
                styles
                    .into_iter()
                    .zip(targets)
                    .map(move |(style, target)| (CategoryKey::new(skill, style), target))
            })
            .collect();

        Self { entries }
    }

    /// Build a matrix from explicit entries, in the given order.
    ///
    /// Fails on duplicate keys or when no entry has a positive target.
    pub fn from_entries(entries: impl IntoIterator<Item = (CategoryKey, u32)>) -> Result<Self> {
        let mut collected: Vec<(CategoryKey, u32)> = Vec::new();
        for (key, target) in entries {
            if collected.iter().any(|(existing, _)| *existing == key) {
                return Err(SamplerError::config(format!(
                    "duplicate matrix entry: {key}"
                )));
            }
            collected.push((key, target));
        }

        let matrix = Self { entries: collected };
        if matrix.total() == 0 {
            return Err(SamplerError::config("sampling matrix has no positive targets"));
        }
        Ok(matrix)
    }

    /// Target for a category (0 if not in the matrix).
    pub fn target_for(&self, key: CategoryKey) -> u32 {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, target)| *target)
            .unwrap_or(0)
    }

    /// Sum of all targets: the overall collection goal.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, t)| *t as usize).sum()
    }

    /// Categories with a positive target, in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = (CategoryKey, u32)> + '_ {
        self.entries.iter().copied().filter(|(_, t)| *t > 0)
    }

    /// All entries including zero targets.
    pub fn entries(&self) -> &[(CategoryKey, u32)] {
        &self.entries
    }
}
