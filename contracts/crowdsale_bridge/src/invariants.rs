#![allow(dead_code)]

extern crate std;

use crate::types::{Goal, Lifecycle, Rewards, SaleTotals};
use crate::CrowdsaleBridgeClient;

/// INV-1: Reported totals are never negative.
pub fn assert_totals_non_negative(totals: &SaleTotals) {
    assert!(
        totals.total_collected >= 0 && totals.total_collected_eth >= 0 && totals.total_sold >= 0,
        "INV-1 violated: negative totals {:?}",
        totals
    );
}

/// INV-2: Once written, the accounting record never changes.
pub fn assert_totals_unchanged(original: &SaleTotals, current: &SaleTotals) {
    assert_eq!(
        original, current,
        "INV-2 violated: totals changed from {:?} to {:?}",
        original, current
    );
}

/// INV-3: A reward never exceeds its basis while rates stay at or below 100%.
pub fn assert_rewards_bounded(totals: &SaleTotals, rewards: &Rewards) {
    assert!(
        rewards.eth_reward >= 0 && rewards.eth_reward <= totals.native_basis(),
        "INV-3 violated: eth reward {} outside [0, {}]",
        rewards.eth_reward,
        totals.native_basis()
    );
    assert!(
        rewards.token_reward >= 0 && rewards.token_reward <= totals.total_sold,
        "INV-3 violated: token reward {} outside [0, {}]",
        rewards.token_reward,
        totals.total_sold
    );
}

/// INV-4: Goal bounds are ordered and non-negative.
pub fn assert_goal_ordered(goal: &Goal) {
    assert!(
        0 <= goal.minimal && goal.minimal <= goal.hard_cap,
        "INV-4 violated: goal {:?} is not ordered",
        goal
    );
}

/// INV-5: Lifecycle flags only move forward.
///   notified  -> never unset
///   finished  -> requires notified, never unset
///   successful -> only meaningful once finished
pub fn assert_valid_lifecycle_transition(from: &Lifecycle, to: &Lifecycle) {
    assert!(!from.started || to.started, "INV-5 violated: started was unset");
    assert!(!from.notified || to.notified, "INV-5 violated: notified was unset");
    assert!(!from.finished || to.finished, "INV-5 violated: finished was unset");
    assert!(
        !to.finished || to.notified,
        "INV-5 violated: finished without notification"
    );
    if from.finished {
        assert_eq!(
            from.successful, to.successful,
            "INV-5 violated: success flag changed after finish"
        );
    }
}

/// INV-6: A finished bridge stays finished and reports a consistent outcome.
pub fn assert_lifecycle_terminal(bridge: &CrowdsaleBridgeClient) {
    assert!(bridge.is_notified(), "INV-6 violated: finished before notified");
    assert!(bridge.is_finished(), "INV-6 violated: bridge not finished");
    assert_ne!(
        bridge.is_successful(),
        bridge.is_failed(),
        "INV-6 violated: success and failure reported together"
    );
    assert!(!bridge.is_active(), "INV-6 violated: finished bridge still active");
}
