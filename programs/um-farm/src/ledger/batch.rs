//! All-or-nothing execution of several settlements in one instruction.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::ledger::{settle_position, Settlement, StakeChange};
use crate::states::{FarmConfig, Pool, Position};
use crate::MAX_BATCH_CALLS;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchAction {
    Deposit { amount: u64 },
    Withdraw { amount: u64 },
    /// Settle pending reward without moving stake.
    Harvest,
}

impl BatchAction {
    pub fn stake_change(self) -> StakeChange {
        match self {
            BatchAction::Deposit { amount } => StakeChange::Deposit(amount),
            BatchAction::Withdraw { amount } => StakeChange::Withdraw(amount),
            BatchAction::Harvest => StakeChange::Deposit(0),
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchCall {
    pub pool_id: u64,
    pub action: BatchAction,
}

/// In-memory copy of one pool and the caller's position in it.
#[derive(Clone, Debug, Default)]
pub struct PoolSlot {
    pub pool: Pool,
    pub position: Position,
}

/// Token movement owed once farm state has been committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    /// Participant token account -> pool vault.
    PullStake { pool_id: u64, amount: u64 },
    /// Pool vault -> participant token account.
    PushStake { pool_id: u64, amount: u64 },
    /// Newly minted reward -> participant reward account.
    MintReward { pool_id: u64, amount: u64 },
}

impl Interaction {
    pub fn pool_id(&self) -> u64 {
        match *self {
            Interaction::PullStake { pool_id, .. }
            | Interaction::PushStake { pool_id, .. }
            | Interaction::MintReward { pool_id, .. } => pool_id,
        }
    }
}

/// Result of staging a batch: the post-batch accounts and the CPIs to run, in order.
#[derive(Clone, Debug, Default)]
pub struct StagedBatch {
    pub slots: BTreeMap<u64, PoolSlot>,
    pub settlements: Vec<Settlement>,
    pub interactions: Vec<Interaction>,
}

impl StagedBatch {
    pub fn reward_minted(&self) -> Result<u64> {
        self.interactions
            .iter()
            .filter_map(|interaction| match *interaction {
                Interaction::MintReward { amount, .. } => Some(amount),
                _ => None,
            })
            .try_fold(0u64, |total, amount| total.checked_add(amount))
            .ok_or_else(|| error!(ErrorCode::ArithmeticOverflow))
    }
}

/// Distinct pool ids of `calls`, in order of first appearance.
///
/// This is the order in which the instruction expects per-pool remaining accounts.
pub fn batch_pool_ids(calls: &[BatchCall]) -> Vec<u64> {
    let mut pool_ids: Vec<u64> = Vec::with_capacity(calls.len());
    for call in calls {
        if !pool_ids.contains(&call.pool_id) {
            pool_ids.push(call.pool_id);
        }
    }
    pool_ids
}

/// Runs every call in order against a copy of `slots`.
///
/// Nothing in `slots` is modified; on success the caller commits
/// `StagedBatch::slots` and then performs `StagedBatch::interactions`.
pub fn stage_batch(
    farm: &FarmConfig,
    slots: &BTreeMap<u64, PoolSlot>,
    calls: &[BatchCall],
    current_slot: u64,
) -> Result<StagedBatch> {
    require_gte!(MAX_BATCH_CALLS, calls.len(), ErrorCode::TooManyBatchCalls);

    let mut staged = StagedBatch {
        slots: slots.clone(),
        settlements: Vec::with_capacity(calls.len()),
        interactions: Vec::new(),
    };
    for call in calls {
        farm.require_pool_id(call.pool_id)?;
        let slot = staged
            .slots
            .get_mut(&call.pool_id)
            .ok_or(ErrorCode::MissingRemainingAccount)?;
        let settlement = settle_position(
            farm,
            &mut slot.pool,
            &mut slot.position,
            call.action.stake_change(),
            current_slot,
        )?;
        staged.interactions.extend(settlement.interactions(call.pool_id));
        staged.settlements.push(settlement);
    }
    Ok(staged)
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

    /// Pools 0 and 1, each with 1_000_000 staked by the same owner at slot 0.
    fn funded_slots() -> BTreeMap<u64, PoolSlot> {
        [(0u64, 100u64), (1, 150)]
            .into_iter()
            .map(|(pool_id, allocation_weight)| {
                let slot = PoolSlot {
                    pool: Pool {
                        pool_id,
                        allocation_weight,
                        total_staked: 1_000_000,
                        ..Default::default()
                    },
                    position: Position {
                        staked_amount: 1_000_000,
                        ..Default::default()
                    },
                };
                (pool_id, slot)
            })
            .collect()
    }

    fn harvest(pool_id: u64) -> BatchCall {
        BatchCall {
            pool_id,
            action: BatchAction::Harvest,
        }
    }

    #[test]
    fn harvest_both_pools_clears_pending() {
        let farm = farm();
        let slots = funded_slots();
        let staged = stage_batch(&farm, &slots, &[harvest(0), harvest(1)], 1).unwrap();

        assert_eq!(
            staged.interactions,
            vec![
                Interaction::MintReward {
                    pool_id: 0,
                    amount: 400_000
                },
                Interaction::MintReward {
                    pool_id: 1,
                    amount: 600_000
                },
            ]
        );
        assert_eq!(staged.reward_minted().unwrap(), 1_000_000);
        for slot in staged.slots.values() {
            assert_eq!(
                slot.position
                    .pending_reward(slot.pool.acc_reward_per_share)
                    .unwrap(),
                0
            );
        }
        // The input is never touched.
        assert_eq!(slots[&0].pool.last_accrual_slot, 0);
    }

    #[test]
    fn failing_call_discards_the_whole_batch() {
        let farm = farm();
        let slots = funded_slots();
        let calls = [
            harvest(0),
            BatchCall {
                pool_id: 1,
                action: BatchAction::Withdraw { amount: 1_000_001 },
            },
        ];
        assert_eq!(
            stage_batch(&farm, &slots, &calls, 1).unwrap_err(),
            error!(ErrorCode::InsufficientStake)
        );
        let pool0 = &slots[&0];
        assert_eq!(
            pool0
                .position
                .pending_reward(pool0.pool.projected_acc_reward_per_share(&farm, 1).unwrap())
                .unwrap(),
            400_000
        );
    }

    #[test]
    fn later_calls_see_earlier_effects() {
        let farm = farm();
        let calls = [
            BatchCall {
                pool_id: 0,
                action: BatchAction::Withdraw { amount: 1_000_000 },
            },
            BatchCall {
                pool_id: 1,
                action: BatchAction::Deposit { amount: 1_000_000 },
            },
            BatchCall {
                pool_id: 0,
                action: BatchAction::Deposit { amount: 10 },
            },
        ];
        let staged = stage_batch(&farm, &funded_slots(), &calls, 1).unwrap();
        assert_eq!(staged.slots[&0].position.staked_amount, 10);
        assert_eq!(staged.slots[&0].pool.total_staked, 10);
        assert_eq!(staged.slots[&1].position.staked_amount, 2_000_000);
        assert_eq!(
            staged.interactions,
            vec![
                Interaction::PushStake {
                    pool_id: 0,
                    amount: 1_000_000
                },
                Interaction::MintReward {
                    pool_id: 0,
                    amount: 400_000
                },
                Interaction::PullStake {
                    pool_id: 1,
                    amount: 1_000_000
                },
                Interaction::MintReward {
                    pool_id: 1,
                    amount: 600_000
                },
                Interaction::PullStake {
                    pool_id: 0,
                    amount: 10
                },
            ]
        );
        assert_eq!(staged.settlements.len(), 3);
    }

    #[test]
    fn unknown_or_unloaded_pool_is_rejected() {
        let farm = farm();
        assert_eq!(
            stage_batch(&farm, &funded_slots(), &[harvest(2)], 1).unwrap_err(),
            error!(ErrorCode::InvalidPool)
        );
        let mut only_pool0 = funded_slots();
        only_pool0.remove(&1);
        assert_eq!(
            stage_batch(&farm, &only_pool0, &[harvest(1)], 1).unwrap_err(),
            error!(ErrorCode::MissingRemainingAccount)
        );
    }

    #[test]
    fn batch_size_is_bounded() {
        let calls = vec![harvest(0); MAX_BATCH_CALLS + 1];
        assert_eq!(
            stage_batch(&farm(), &funded_slots(), &calls, 1).unwrap_err(),
            error!(ErrorCode::TooManyBatchCalls)
        );
        assert!(stage_batch(&farm(), &funded_slots(), &calls[1..], 1).is_ok());
    }

    #[test]
    fn pool_ids_keep_first_appearance_order() {
        let calls = [harvest(3), harvest(1), harvest(3), harvest(0), harvest(1)];
        assert_eq!(batch_pool_ids(&calls), vec![3, 1, 0]);
    }
}
