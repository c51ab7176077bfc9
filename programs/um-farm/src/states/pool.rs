use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::rewards::RewardCalculator;
use crate::states::FarmConfig;

//
// ──────────────────────────────────────────────────────────────────────────────
// Pool Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive pool accounts (`POOL_SEED + pool_id`).
pub const POOL_SEED: &str = "pool";

/// One weighted staking pool.
///
/// Pools are appended by `add_pool` and never removed; `pool_id` is the pool's
/// index in that append-only list and is part of the PDA seeds.
///
/// `acc_reward_per_share` is the reward earned by one staked unit since the
/// pool was created, scaled by `ACC_REWARD_PRECISION`. Only `advance` writes it.
#[account]
#[derive(Default, Debug)]
pub struct Pool {
    /// PDA bump for this account.
    pub bump: u8,

    /// Index in the pool registry.
    pub pool_id: u64,

    /// Mint of the asset staked in this pool.
    pub staked_mint: Pubkey,

    /// Program-owned token account holding every position's stake.
    pub staked_vault: Pubkey,

    /// Share of farm issuance, relative to `FarmConfig::total_allocation_weight`.
    pub allocation_weight: u64,

    /// Reward per staked unit, scaled by `ACC_REWARD_PRECISION`. Never decreases.
    pub acc_reward_per_share: u128,

    /// Slot up to which `acc_reward_per_share` is current.
    pub last_accrual_slot: u64,

    /// Sum of `staked_amount` over every position of this pool.
    pub total_staked: u64,
}

impl Pool {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 8: pool_id
    /// - 32 * 2: two Pubkeys
    /// - 8 * 3: three u64 fields
    /// - 16: one u128 field
    pub const LEN: usize = 8 + 1 + 8 + 32 * 2 + 8 * 3 + 16;

    pub fn seeds(pool_id: u64) -> [u8; 8] {
        pool_id.to_le_bytes()
    }

    /// Reward issued to this pool between `last_accrual_slot` and `current_slot`.
    ///
    /// Zero when the slot has not moved or nothing is staked.
    pub fn unaccrued_reward(&self, farm: &FarmConfig, current_slot: u64) -> Result<u128> {
        if current_slot <= self.last_accrual_slot || self.total_staked == 0 {
            return Ok(0);
        }
        RewardCalculator::issued_reward(
            current_slot - self.last_accrual_slot,
            farm.reward_per_slot()?,
            self.allocation_weight,
            farm.total_allocation_weight,
        )
    }

    /// Accumulator value `advance(current_slot)` would store, without storing it.
    pub fn projected_acc_reward_per_share(
        &self,
        farm: &FarmConfig,
        current_slot: u64,
    ) -> Result<u128> {
        let issued = self.unaccrued_reward(farm, current_slot)?;
        if issued == 0 {
            return Ok(self.acc_reward_per_share);
        }
        let increment = RewardCalculator::acc_increment(issued, self.total_staked)?;
        let acc = self
            .acc_reward_per_share
            .checked_add(increment)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(acc)
    }

    /// Brings the accumulator up to `current_slot` and returns the reward issued.
    ///
    /// Slots that elapse while the pool is empty are skipped; their reward is
    /// never issued.
    pub fn advance(&mut self, farm: &FarmConfig, current_slot: u64) -> Result<u128> {
        if current_slot <= self.last_accrual_slot {
            return Ok(0);
        }
        let issued = self.unaccrued_reward(farm, current_slot)?;
        self.acc_reward_per_share = self.projected_acc_reward_per_share(farm, current_slot)?;
        self.last_accrual_slot = current_slot;
        Ok(issued)
    }

    pub fn add_stake(&mut self, amount: u64) -> Result<()> {
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn remove_stake(&mut self, amount: u64) -> Result<()> {
        self.total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(ErrorCode::InsufficientStake)?;
        Ok(())
    }
}
