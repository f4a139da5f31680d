//! Category quota tracking.

pub mod tracker;

pub use tracker::{
    priority_score, CategoryProgress, CategoryState, CategoryStatus, CompletionSummary,
    GroupProgress, OverallProgress, QuotaTracker,
};
