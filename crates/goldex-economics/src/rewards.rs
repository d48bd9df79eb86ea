//! # Staking Reward Accrual
//!
//! Reward-per-token accounting for GBAR paid to GOLD stakers. A reward is
//! streamed linearly over one duration; each staker accrues in proportion to
//! their share of the total staked while the stream runs.
//!
//! ```text
//! rewardPerToken(t) = stored + (min(t, periodFinish) - lastUpdate) * rate / totalStaked
//! earned(a)         = balance(a) * (rewardPerToken - paid(a)) / 10^18 + rewards(a)
//! ```
//!
//! `rate` and `rewardPerToken` carry [`REWARD_PRECISION`] so that small
//! rewards spread over a day and over few grams do not truncate to zero.
//! Everything here is integer arithmetic on plain values.

use goldex_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed-point scale of `reward_rate` and `reward_per_token`
pub const REWARD_PRECISION: u128 = 1_000_000_000_000_000_000; // 10^18

/// Default length of one reward stream
pub const REWARD_DURATION_SECS: i64 = ONE_DAY_SECS;

/// Global reward stream state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardState {
    /// GBAR units per second, scaled by `REWARD_PRECISION`
    pub reward_rate: u128,
    /// Accumulated reward per staked gram, scaled
    pub reward_per_token_stored: u128,
    /// Last time the accumulator was brought forward
    pub last_update_time: Timestamp,
    /// End of the current stream
    pub period_finish: Timestamp,
    /// Length of a stream
    pub reward_duration: i64,
}

impl RewardState {
    pub fn new(reward_duration: i64) -> Self {
        Self {
            reward_rate: 0,
            reward_per_token_stored: 0,
            last_update_time: 0,
            period_finish: 0,
            reward_duration,
        }
    }

    /// `min(now, period_finish)`
    pub fn last_time_reward_applicable(&self, now: Timestamp) -> Timestamp {
        now.min(self.period_finish)
    }

    /// Accumulated reward per gram at `now`
    pub fn reward_per_token(&self, total_staked: u128, now: Timestamp) -> u128 {
        if total_staked == 0 {
            return self.reward_per_token_stored;
        }
        let elapsed = (self.last_time_reward_applicable(now) - self.last_update_time).max(0) as u128;
        self.reward_per_token_stored + elapsed * self.reward_rate / total_staked
    }

    /// Reward still to be streamed in the current period
    pub fn remaining_reward(&self, now: Timestamp) -> u128 {
        if now >= self.period_finish {
            return 0;
        }
        (self.period_finish - now) as u128 * self.reward_rate / REWARD_PRECISION
    }
}

impl Default for RewardState {
    fn default() -> Self {
        Self::new(REWARD_DURATION_SECS)
    }
}

/// Per-account reward bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRewards {
    /// `reward_per_token` at the account's last sync
    pub reward_per_token_paid: u128,
    /// Accrued, unclaimed reward in GBAR units
    pub rewards: u128,
}

/// Reward earned by an account holding `balance` at `reward_per_token`
pub fn earned(balance: u128, reward_per_token: u128, account: &AccountRewards) -> u128 {
    let delta = reward_per_token.saturating_sub(account.reward_per_token_paid);
    balance * delta / REWARD_PRECISION + account.rewards
}

/// Bring the global accumulator and one account forward to `now`
///
/// Returns the updated pair without touching the inputs; callers commit the
/// result once the rest of the operation has validated.
pub fn sync_rewards(
    account: &AccountRewards,
    balance: u128,
    global: &RewardState,
    total_staked: u128,
    now: Timestamp,
) -> (AccountRewards, RewardState) {
    let global = sync_global(global, total_staked, now);
    let account = AccountRewards {
        rewards: earned(balance, global.reward_per_token_stored, account),
        reward_per_token_paid: global.reward_per_token_stored,
    };
    (account, global)
}

/// Bring only the global accumulator forward
pub fn sync_global(global: &RewardState, total_staked: u128, now: Timestamp) -> RewardState {
    RewardState {
        reward_per_token_stored: global.reward_per_token(total_staked, now),
        last_update_time: global.last_time_reward_applicable(now),
        ..*global
    }
}

/// Start a new stream of `reward` from `now`
///
/// Reward left from an unfinished stream is folded into the new rate.
pub fn notify_reward_amount(
    global: &RewardState,
    total_staked: u128,
    reward: u128,
    now: Timestamp,
) -> Result<RewardState> {
    let mut next = sync_global(global, total_staked, now);
    let duration = next.reward_duration.max(1) as u128;

    let scaled = reward
        .checked_mul(REWARD_PRECISION)
        .ok_or(GoldexError::ArithmeticOverflow("notify_reward_amount"))?;
    let total = if now >= next.period_finish {
        scaled
    } else {
        let remaining = (next.period_finish - now) as u128;
        scaled
            .checked_add(remaining * next.reward_rate)
            .ok_or(GoldexError::ArithmeticOverflow("notify_reward_amount"))?
    };

    next.reward_rate = total / duration;
    next.last_update_time = now;
    next.period_finish = now + next.reward_duration;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DAY: i64 = ONE_DAY_SECS;

    #[test]
    fn test_no_stakers_keeps_stored() {
        let state = RewardState {
            reward_rate: 1_000 * REWARD_PRECISION,
            reward_per_token_stored: 42,
            ..RewardState::default()
        };
        assert_eq!(state.reward_per_token(0, 1_000), 42);
    }

    #[test]
    fn test_full_period_single_staker() {
        let state = notify_reward_amount(&RewardState::default(), 100, 86_400, 0).unwrap();
        assert_eq!(state.reward_rate, REWARD_PRECISION);
        assert_eq!(state.period_finish, DAY);

        // accrual stops at period_finish
        let rpt = state.reward_per_token(100, 10 * DAY);
        let paid = earned(100, rpt, &AccountRewards::default());
        assert_eq!(paid, 86_400);
    }

    #[test]
    fn test_sync_is_pure() {
        let global = notify_reward_amount(&RewardState::default(), 10, 1_000_000, 0).unwrap();
        let account = AccountRewards::default();

        let (a1, g1) = sync_rewards(&account, 10, &global, 10, DAY / 2);
        let (a2, g2) = sync_rewards(&account, 10, &global, 10, DAY / 2);
        assert_eq!((a1, g1), (a2, g2));
        assert_eq!(global.last_update_time, 0);
        assert_eq!(g1.last_update_time, DAY / 2);
        assert_eq!(a1.reward_per_token_paid, g1.reward_per_token_stored);
        // half the stream, less truncation
        assert_eq!(a1.rewards, 499_999);
    }

    #[test]
    fn test_leftover_carried() {
        let first = notify_reward_amount(&RewardState::default(), 1, 86_400, 0).unwrap();
        let second = notify_reward_amount(&first, 1, 86_400, DAY / 2).unwrap();

        // half of the first stream remains plus the new reward
        assert_eq!(second.reward_rate, (43_200 + 86_400) * REWARD_PRECISION / 86_400);
        assert_eq!(second.period_finish, DAY / 2 + DAY);
        assert_eq!(first.remaining_reward(DAY / 2), 43_200);
    }

    #[test]
    fn test_overflow_reported() {
        assert_eq!(
            notify_reward_amount(&RewardState::default(), 1, u128::MAX / 2, 0),
            Err(GoldexError::ArithmeticOverflow("notify_reward_amount"))
        );
    }

    proptest! {
        #[test]
        fn prop_stakers_never_overpaid(
            a in 1u128..1_000_000,
            b in 1u128..1_000_000,
            reward in 0u128..1_000_000_000_000,
            at in 0i64..2 * DAY,
        ) {
            let total = a + b;
            let state = notify_reward_amount(&RewardState::default(), total, reward, 0).unwrap();
            let rpt = state.reward_per_token(total, at);
            let paid_a = earned(a, rpt, &AccountRewards::default());
            let paid_b = earned(b, rpt, &AccountRewards::default());
            prop_assert!(paid_a + paid_b <= reward);
        }

        #[test]
        fn prop_accrual_monotone(
            balance in 1u128..1_000_000,
            reward in 1u128..1_000_000_000_000,
            t1 in 0i64..DAY,
            dt in 0i64..DAY,
        ) {
            let state = notify_reward_amount(&RewardState::default(), balance, reward, 0).unwrap();
            let e1 = earned(balance, state.reward_per_token(balance, t1), &AccountRewards::default());
            let e2 = earned(balance, state.reward_per_token(balance, t1 + dt), &AccountRewards::default());
            prop_assert!(e1 <= e2);
        }
    }
}
