//! Property tests for quota tracker invariants.

use catalog_sampler::{
    CategoryKey, QuotaTracker, Record, RidingStyle, SamplingMatrix, SkillLevel,
};
use proptest::prelude::*;
use std::collections::HashMap;

fn all_keys() -> Vec<CategoryKey> {
    SkillLevel::ALL
        .iter()
        .flat_map(|skill| RidingStyle::ALL.iter().map(move |style| CategoryKey::new(*skill, *style)))
        .collect()
}

/// Random matrix over every category with at least one positive target.
fn matrix_strategy() -> impl Strategy<Value = SamplingMatrix> {
    prop::collection::vec(0u32..4, 20).prop_map(|mut targets| {
        if targets.iter().all(|t| *t == 0) {
            targets[0] = 1;
        }
        let entries: Vec<_> = all_keys().into_iter().zip(targets).collect();
        SamplingMatrix::from_entries(entries).unwrap()
    })
}

/// Indices into `all_keys()` for a stream of admission attempts.
fn attempts_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..20, 0..80)
}

proptest! {
    #[test]
    fn counts_stay_within_targets(matrix in matrix_strategy(), attempts in attempts_strategy()) {
        let keys = all_keys();
        let mut tracker = QuotaTracker::new(&matrix);

        for (i, idx) in attempts.iter().enumerate() {
            tracker.admit(&Record::new(format!("Board {i}"), keys[*idx]));
            for status in tracker.statuses() {
                prop_assert!(status.current <= status.target);
            }
        }
    }

    #[test]
    fn sum_of_counts_equals_admissions(matrix in matrix_strategy(), attempts in attempts_strategy()) {
        let keys = all_keys();
        let mut tracker = QuotaTracker::new(&matrix);
        let mut admitted = 0usize;

        for (i, idx) in attempts.iter().enumerate() {
            if tracker.admit(&Record::new(format!("Board {i}"), keys[*idx])) {
                admitted += 1;
            }
        }

        prop_assert_eq!(tracker.total_collected(), admitted);
        prop_assert_eq!(tracker.admitted_this_session(), admitted);
    }

    #[test]
    fn complete_category_refuses_admission(matrix in matrix_strategy(), attempts in attempts_strategy()) {
        let keys = all_keys();
        let mut tracker = QuotaTracker::new(&matrix);

        for (i, idx) in attempts.iter().enumerate() {
            let key = keys[*idx];
            let was_admissible = tracker.can_admit(key);
            let before = tracker.status(key).map(|s| s.current);

            let admitted = tracker.admit(&Record::new(format!("Board {i}"), key));

            prop_assert_eq!(admitted, was_admissible);
            if !admitted {
                prop_assert_eq!(tracker.status(key).map(|s| s.current), before);
            }
        }
    }

    #[test]
    fn next_priority_is_never_complete(matrix in matrix_strategy(), attempts in attempts_strategy()) {
        let keys = all_keys();
        let mut tracker = QuotaTracker::new(&matrix);

        for (i, idx) in attempts.iter().enumerate() {
            tracker.admit(&Record::new(format!("Board {i}"), keys[*idx]));
            if let Some(next) = tracker.next_priority_category() {
                let status = tracker.status(next).unwrap();
                prop_assert!(!status.is_complete());
                prop_assert!(status.priority > 0.0);
            }
        }
    }

    #[test]
    fn seeding_never_exceeds_targets(matrix in matrix_strategy(), counts in prop::collection::vec(0usize..10, 20)) {
        let progress: HashMap<CategoryKey, usize> = all_keys().into_iter().zip(counts).collect();
        let mut tracker = QuotaTracker::new(&matrix);
        tracker.load_progress(&progress);

        for status in tracker.statuses() {
            prop_assert!(status.current <= status.target);
        }
        prop_assert_eq!(tracker.admitted_this_session(), 0);
    }
}

#[test]
fn fewer_behind_scores_lower() {
    use catalog_sampler::quota::priority_score;
    assert!(priority_score(10, 0) > priority_score(10, 9));
    assert_eq!(priority_score(10, 10), 0.0);
}
