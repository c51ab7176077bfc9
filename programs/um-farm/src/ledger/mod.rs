//! Position accounting: settlement of pending reward around every stake change.
//!
//! Everything here is pure state transition over `FarmConfig`, `Pool` and
//! `Position` values. Instruction handlers load the accounts, run one of these
//! functions, and only then perform the token CPIs described by the returned
//! value, so no external program ever observes half-updated farm state.

pub mod batch;
pub mod registry;

#[cfg(test)]
mod scenarios;

pub use batch::*;
pub use registry::*;

use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::{FarmConfig, Pool, Position};

/// Stake mutation applied after settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakeChange {
    Deposit(u64),
    Withdraw(u64),
}

/// Outcome of one settled stake change, in the order the CPIs must run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Stake to pull from the participant into the pool vault.
    pub deposited: u64,
    /// Stake to return from the pool vault to the participant.
    pub withdrawn: u64,
    /// Reward to mint to the participant.
    pub pending: u64,
    /// Participant's stake after the change.
    pub staked_amount: u64,
}

impl Settlement {
    pub fn interactions(&self, pool_id: u64) -> impl Iterator<Item = Interaction> {
        [
            (self.deposited > 0).then_some(Interaction::PullStake {
                pool_id,
                amount: self.deposited,
            }),
            (self.withdrawn > 0).then_some(Interaction::PushStake {
                pool_id,
                amount: self.withdrawn,
            }),
            (self.pending > 0).then_some(Interaction::MintReward {
                pool_id,
                amount: self.pending,
            }),
        ]
        .into_iter()
        .flatten()
    }
}

/// Outcome of an emergency exit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmergencyExit {
    /// Whole stake returned to the participant.
    pub amount: u64,
    /// Pending reward given up.
    pub forfeited_reward: u64,
}

/// Advances `pool`, settles `position` against the new accumulator, applies
/// `change` and re-bases the reward debt.
///
/// Either every field of `pool` and `position` is updated or, on error, none is.
pub fn settle_position(
    farm: &FarmConfig,
    pool: &mut Pool,
    position: &mut Position,
    change: StakeChange,
    current_slot: u64,
) -> Result<Settlement> {
    if let StakeChange::Withdraw(amount) = change {
        require_gte!(position.staked_amount, amount, ErrorCode::InsufficientStake);
    }

    let mut next_pool = pool.clone();
    let mut next_position = position.clone();

    next_pool.advance(farm, current_slot)?;
    let acc_reward_per_share = next_pool.acc_reward_per_share;
    let pending = next_position.pending_reward(acc_reward_per_share)?;

    let mut settlement = Settlement {
        pending,
        ..Default::default()
    };
    match change {
        StakeChange::Deposit(amount) => {
            next_position.staked_amount = next_position
                .staked_amount
                .checked_add(amount)
                .ok_or(ErrorCode::ArithmeticOverflow)?;
            next_pool.add_stake(amount)?;
            settlement.deposited = amount;
        }
        StakeChange::Withdraw(amount) => {
            next_position.staked_amount = next_position
                .staked_amount
                .checked_sub(amount)
                .ok_or(ErrorCode::InsufficientStake)?;
            next_pool.remove_stake(amount)?;
            settlement.withdrawn = amount;
        }
    }
    next_position.checkpoint(acc_reward_per_share)?;
    next_position.record_claim(pending)?;
    settlement.staked_amount = next_position.staked_amount;

    *pool = next_pool;
    *position = next_position;
    Ok(settlement)
}

/// Removes the whole stake of `position` without paying its pending reward.
///
/// The pool is still advanced first so that the remaining stakers keep what
/// they earned for the slots already elapsed.
pub fn forfeit_position(
    farm: &FarmConfig,
    pool: &mut Pool,
    position: &mut Position,
    current_slot: u64,
) -> Result<EmergencyExit> {
    let mut next_pool = pool.clone();
    next_pool.advance(farm, current_slot)?;
    let forfeited_reward = position.pending_reward(next_pool.acc_reward_per_share)?;
    let amount = position.staked_amount;
    next_pool.remove_stake(amount)?;

    *pool = next_pool;
    position.staked_amount = 0;
    position.reward_debt = 0;
    Ok(EmergencyExit {
        amount,
        forfeited_reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farm() -> FarmConfig {
        FarmConfig {
            reward_per_slot_base: 1_000_000,
            reward_multiplier: 1,
            total_allocation_weight: 250,
            pool_count: 2,
            ..Default::default()
        }
    }

    fn pool() -> Pool {
        Pool {
            allocation_weight: 100,
            last_accrual_slot: 100,
            ..Default::default()
        }
    }

    #[test]
    fn first_deposit_has_nothing_to_settle() {
        let (mut pool, mut position) = (pool(), Position::default());
        let settlement =
            settle_position(&farm(), &mut pool, &mut position, StakeChange::Deposit(1_000_000), 105)
                .unwrap();
        assert_eq!(settlement.pending, 0);
        assert_eq!(settlement.deposited, 1_000_000);
        assert_eq!(pool.total_staked, 1_000_000);
        assert_eq!(pool.last_accrual_slot, 105);
        assert_eq!(position.reward_debt, 0);
        assert_eq!(position.pending_reward(pool.acc_reward_per_share).unwrap(), 0);
    }

    #[test]
    fn zero_deposit_harvests() {
        let (mut pool, mut position) = (pool(), Position::default());
        settle_position(&farm(), &mut pool, &mut position, StakeChange::Deposit(1_000_000), 100)
            .unwrap();
        let settlement =
            settle_position(&farm(), &mut pool, &mut position, StakeChange::Deposit(0), 102)
                .unwrap();
        assert_eq!(settlement.pending, 800_000);
        assert_eq!(settlement.deposited, 0);
        assert_eq!(position.staked_amount, 1_000_000);
        assert_eq!(position.reward_debt, 800_000);
        assert_eq!(position.total_reward_claimed, 800_000);
        assert_eq!(
            settlement.interactions(0).collect::<Vec<_>>(),
            vec![Interaction::MintReward {
                pool_id: 0,
                amount: 800_000
            }]
        );
    }

    #[test]
    fn zero_withdraw_behaves_like_zero_deposit() {
        let (mut pool_a, mut position_a) = (pool(), Position::default());
        settle_position(&farm(), &mut pool_a, &mut position_a, StakeChange::Deposit(7_777), 100)
            .unwrap();
        let (mut pool_b, mut position_b) = (pool_a.clone(), position_a.clone());

        let by_deposit =
            settle_position(&farm(), &mut pool_a, &mut position_a, StakeChange::Deposit(0), 109)
                .unwrap();
        let by_withdraw =
            settle_position(&farm(), &mut pool_b, &mut position_b, StakeChange::Withdraw(0), 109)
                .unwrap();
        assert_eq!(by_deposit, by_withdraw);
        assert_eq!(position_a.reward_debt, position_b.reward_debt);
        assert_eq!(pool_a.acc_reward_per_share, pool_b.acc_reward_per_share);
    }

    #[test]
    fn withdraw_above_stake_changes_nothing() {
        let (mut pool, mut position) = (pool(), Position::default());
        settle_position(&farm(), &mut pool, &mut position, StakeChange::Deposit(500), 100).unwrap();
        let (pool_before, position_before) = (pool.clone(), position.clone());

        let err =
            settle_position(&farm(), &mut pool, &mut position, StakeChange::Withdraw(501), 150)
                .unwrap_err();
        assert_eq!(err, error!(ErrorCode::InsufficientStake));
        assert_eq!(pool.last_accrual_slot, pool_before.last_accrual_slot);
        assert_eq!(pool.acc_reward_per_share, pool_before.acc_reward_per_share);
        assert_eq!(pool.total_staked, pool_before.total_staked);
        assert_eq!(position.staked_amount, position_before.staked_amount);
        assert_eq!(position.reward_debt, position_before.reward_debt);
    }

    #[test]
    fn full_withdraw_pays_out_and_zeroes_debt() {
        let (mut pool, mut position) = (pool(), Position::default());
        settle_position(&farm(), &mut pool, &mut position, StakeChange::Deposit(1_000_000), 100)
            .unwrap();
        let settlement = settle_position(
            &farm(),
            &mut pool,
            &mut position,
            StakeChange::Withdraw(1_000_000),
            101,
        )
        .unwrap();
        assert_eq!(settlement.pending, 400_000);
        assert_eq!(settlement.withdrawn, 1_000_000);
        assert_eq!(settlement.staked_amount, 0);
        assert_eq!(position.reward_debt, 0);
        assert_eq!(pool.total_staked, 0);
    }

    #[test]
    fn overflow_leaves_state_untouched() {
        let (mut pool, mut position) = (pool(), Position::default());
        settle_position(&farm(), &mut pool, &mut position, StakeChange::Deposit(u64::MAX), 100)
            .unwrap();
        let (pool_before, position_before) = (pool.clone(), position.clone());

        assert!(
            settle_position(&farm(), &mut pool, &mut position, StakeChange::Deposit(1), 120)
                .is_err()
        );
        assert_eq!(pool.last_accrual_slot, pool_before.last_accrual_slot);
        assert_eq!(pool.total_staked, pool_before.total_staked);
        assert_eq!(position.staked_amount, position_before.staked_amount);
    }

    #[test]
    fn emergency_exit_forfeits_pending_only() {
        let farm = farm();
        let (mut pool, mut alice, mut bob) = (pool(), Position::default(), Position::default());
        settle_position(&farm, &mut pool, &mut alice, StakeChange::Deposit(1_000_000), 100).unwrap();
        settle_position(&farm, &mut pool, &mut bob, StakeChange::Deposit(1_000_000), 100).unwrap();

        let exit = forfeit_position(&farm, &mut pool, &mut alice, 102).unwrap();
        assert_eq!(exit.amount, 1_000_000);
        assert_eq!(exit.forfeited_reward, 400_000);
        assert_eq!(alice.staked_amount, 0);
        assert_eq!(alice.reward_debt, 0);
        assert_eq!(pool.total_staked, 1_000_000);
        // Bob keeps his half of the two elapsed slots.
        assert_eq!(bob.pending_reward(pool.acc_reward_per_share).unwrap(), 400_000);
    }
}
