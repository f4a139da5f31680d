//! Per-category quota bookkeeping with priority scoring.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::types::matrix::SamplingMatrix;
use crate::types::record::Record;
use crate::types::taxonomy::{CategoryKey, RidingStyle, SkillLevel};

/// Lifecycle of a category. `Complete` is terminal within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryState {
    Pending,
    Complete,
}

/// Quota state of one matrix cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatus {
    pub key: CategoryKey,
    pub target: u32,
    pub current: u32,
    /// Portion of `current` loaded from persisted progress.
    pub seeded: u32,
    pub state: CategoryState,
    pub priority: f64,
}

impl CategoryStatus {
    fn new(key: CategoryKey, target: u32) -> Self {
        let mut status = Self {
            key,
            target,
            current: 0,
            seeded: 0,
            state: CategoryState::Pending,
            priority: 0.0,
        };
        status.refresh();
        status
    }

    pub fn is_complete(&self) -> bool {
        self.state == CategoryState::Complete
    }

    pub fn remaining(&self) -> u32 {
        self.target.saturating_sub(self.current)
    }

    /// Re-derive state and priority from the counts.
    fn refresh(&mut self) {
        if self.current >= self.target {
            self.state = CategoryState::Complete;
        }
        self.priority = match self.state {
            CategoryState::Complete => 0.0,
            CategoryState::Pending => priority_score(self.target, self.current),
        };
    }
}

/// Urgency of an incomplete category: categories further behind score higher.
///
/// `remaining * (1 + (1 - current / target))`, zero once `current >= target`.
pub fn priority_score(target: u32, current: u32) -> f64 {
    if target == 0 || current >= target {
        return 0.0;
    }
    let remaining = f64::from(target - current);
    let ratio = f64::from(current) / f64::from(target);
    remaining * (1.0 + (1.0 - ratio))
}

/// Tracks admissions against the sampling matrix.
///
/// Owned by a single collector; not shared between tasks.
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    categories: IndexMap<CategoryKey, CategoryStatus>,
    target_total: usize,
    admitted: usize,
}

impl QuotaTracker {
    /// One category per positive matrix entry, in matrix order.
    pub fn new(matrix: &SamplingMatrix) -> Self {
        Self::with_target_total(matrix, matrix.total())
    }

    /// Like [`QuotaTracker::new`] with an explicit overall goal.
    pub fn with_target_total(matrix: &SamplingMatrix, target_total: usize) -> Self {
        let categories: IndexMap<_, _> = matrix
            .categories()
            .map(|(key, target)| (key, CategoryStatus::new(key, target)))
            .collect();

        info!(
            categories = categories.len(),
            target_total, "Quota tracker initialized"
        );

        Self {
            categories,
            target_total,
            admitted: 0,
        }
    }

    /// True iff the category is tracked and still pending.
    pub fn can_admit(&self, key: CategoryKey) -> bool {
        match self.categories.get(&key) {
            Some(status) => !status.is_complete(),
            None => {
                warn!(category = %key, "Unknown category");
                false
            }
        }
    }

    /// Count a persisted record against its category.
    ///
    /// Returns false, changing nothing, when the category cannot admit.
    pub fn admit(&mut self, record: &Record) -> bool {
        let key = record.category;
        if !self.can_admit(key) {
            debug!(category = %key, name = %record.name, "Category full, rejecting record");
            return false;
        }

        let Some(status) = self.categories.get_mut(&key) else {
            return false;
        };
        status.current += 1;
        status.refresh();
        let (current, target, complete) = (status.current, status.target, status.is_complete());
        self.admitted += 1;

        if complete {
            info!(category = %key, current, target, "Category complete");
        }
        info!(category = %key, name = %record.name, current, target, "Admitted record");

        self.refresh_priorities();
        true
    }

    /// Seed counts from persisted progress, clamped to each target.
    ///
    /// Unknown categories are ignored. Seeded counts are kept apart from
    /// this session's admissions.
    pub fn load_progress(&mut self, progress: &HashMap<CategoryKey, usize>) {
        for (key, count) in progress {
            let Some(status) = self.categories.get_mut(key) else {
                debug!(category = %key, count, "Ignoring progress for untracked category");
                continue;
            };
            let clamped = (*count).min(status.target as usize) as u32;
            if clamped > status.current {
                status.seeded += clamped - status.current;
                status.current = clamped;
            }
        }
        self.refresh_priorities();
        info!(seeded = self.seeded_total(), "Loaded existing progress");
    }

    fn refresh_priorities(&mut self) {
        for status in self.categories.values_mut() {
            status.refresh();
        }
    }

    /// Incomplete category with the highest priority; ties go to matrix order.
    pub fn next_priority_category(&self) -> Option<CategoryKey> {
        self.next_priority_excluding(&HashSet::new())
    }

    /// Like [`QuotaTracker::next_priority_category`], skipping `excluded`.
    pub fn next_priority_excluding(&self, excluded: &HashSet<CategoryKey>) -> Option<CategoryKey> {
        let mut best: Option<&CategoryStatus> = None;
        for status in self.categories.values() {
            if status.is_complete() || excluded.contains(&status.key) {
                continue;
            }
            // Strictly greater: the earlier category keeps a tie.
            match best {
                Some(current) if status.priority <= current.priority => {}
                _ => best = Some(status),
            }
        }
        best.map(|status| status.key)
    }

    /// Up to `limit` incomplete categories, highest priority first.
    pub fn priority_categories(&self, limit: usize) -> Vec<CategoryKey> {
        let mut pending: Vec<&CategoryStatus> = self
            .categories
            .values()
            .filter(|s| !s.is_complete())
            .collect();
        pending.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        pending.into_iter().take(limit).map(|s| s.key).collect()
    }

    /// Every category complete, or the overall goal reached.
    pub fn is_complete(&self) -> bool {
        self.total_collected() >= self.target_total
            || self.categories.values().all(CategoryStatus::is_complete)
    }

    pub fn status(&self, key: CategoryKey) -> Option<&CategoryStatus> {
        self.categories.get(&key)
    }

    /// All categories in matrix order.
    pub fn statuses(&self) -> impl Iterator<Item = &CategoryStatus> {
        self.categories.values()
    }

    /// Records counted so far, seeded ones included.
    pub fn total_collected(&self) -> usize {
        self.categories.values().map(|s| s.current as usize).sum()
    }

    /// Records admitted in this session.
    pub fn admitted_this_session(&self) -> usize {
        self.admitted
    }

    pub fn seeded_total(&self) -> usize {
        self.categories.values().map(|s| s.seeded as usize).sum()
    }

    pub fn target_total(&self) -> usize {
        self.target_total
    }

    pub fn completion_percentage(&self) -> f64 {
        if self.target_total == 0 {
            return 100.0;
        }
        (self.total_collected() as f64 / self.target_total as f64 * 100.0).min(100.0)
    }

    /// Read-only aggregate view of progress.
    pub fn completion_summary(&self) -> CompletionSummary {
        let breakdown: IndexMap<CategoryKey, CategoryProgress> = self
            .categories
            .values()
            .map(|s| {
                (
                    s.key,
                    CategoryProgress {
                        current: s.current,
                        target: s.target,
                        complete: s.is_complete(),
                        priority: s.priority,
                    },
                )
            })
            .collect();

        let by_skill = SkillLevel::ALL
            .into_iter()
            .map(|skill| (skill, self.group(|k| k.skill == skill)))
            .collect();
        let by_style = RidingStyle::ALL
            .into_iter()
            .map(|style| (style, self.group(|k| k.style == style)))
            .collect();

        CompletionSummary {
            overall: OverallProgress {
                collected: self.total_collected(),
                admitted_this_session: self.admitted,
                target: self.target_total,
                percentage: self.completion_percentage(),
                is_complete: self.is_complete(),
            },
            completed_categories: self.categories.values().filter(|s| s.is_complete()).count(),
            total_categories: self.categories.len(),
            breakdown,
            by_skill,
            by_style,
            next_priorities: self.priority_categories(3),
        }
    }

    fn group(&self, include: impl Fn(&CategoryKey) -> bool) -> GroupProgress {
        let members: Vec<&CategoryStatus> = self
            .categories
            .values()
            .filter(|s| include(&s.key))
            .collect();
        GroupProgress {
            current: members.iter().map(|s| s.current as usize).sum(),
            target: members.iter().map(|s| s.target as usize).sum(),
            completed_categories: members.iter().filter(|s| s.is_complete()).count(),
            total_categories: members.len(),
        }
    }
}

/// Snapshot returned by [`QuotaTracker::completion_summary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub overall: OverallProgress,
    pub completed_categories: usize,
    pub total_categories: usize,
    pub breakdown: IndexMap<CategoryKey, CategoryProgress>,
    pub by_skill: IndexMap<SkillLevel, GroupProgress>,
    pub by_style: IndexMap<RidingStyle, GroupProgress>,
    pub next_priorities: Vec<CategoryKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallProgress {
    pub collected: usize,
    pub admitted_this_session: usize,
    pub target: usize,
    pub percentage: f64,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub current: u32,
    pub target: u32,
    pub complete: bool,
    pub priority: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProgress {
    pub current: usize,
    pub target: usize,
    pub completed_categories: usize,
    pub total_categories: usize,
}
