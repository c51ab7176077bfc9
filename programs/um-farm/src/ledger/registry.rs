//! Pool registry: append-only pool list and the farm-wide totals derived from it.

use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::{FarmConfig, Pool};
use crate::MAX_POOLS;

/// Checks that `pools` is exactly the farm's pool list in id order.
pub fn require_complete_pool_list(farm: &FarmConfig, pools: &[Pool]) -> Result<()> {
    require_eq!(
        pools.len() as u64,
        farm.pool_count,
        ErrorCode::PoolListMismatch
    );
    for (index, pool) in pools.iter().enumerate() {
        require_eq!(pool.pool_id, index as u64, ErrorCode::PoolListMismatch);
    }
    Ok(())
}

/// Advances every pool to `current_slot` and returns the total reward issued.
///
/// `pools` must be the complete pool list so that no pool can be skipped
/// across a farm-wide rate or weight change.
pub fn mass_update(farm: &FarmConfig, pools: &mut [Pool], current_slot: u64) -> Result<u128> {
    require_complete_pool_list(farm, pools)?;
    let mut issued = 0u128;
    for pool in pools.iter_mut() {
        issued = issued
            .checked_add(pool.advance(farm, current_slot)?)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
    }
    Ok(issued)
}

/// Appends `pool` to the registry and returns its id.
///
/// Weight zero is allowed: the pool exists but receives nothing until reweighted.
/// Fails with `PoolLimitReached` once `MAX_POOLS` pools exist.
pub fn register_pool(
    farm: &mut FarmConfig,
    pool: &mut Pool,
    allocation_weight: u64,
    staked_mint: Pubkey,
    staked_vault: Pubkey,
    current_slot: u64,
) -> Result<u64> {
    let pool_id = farm.pool_count;
    require_gt!(MAX_POOLS, pool_id, ErrorCode::PoolLimitReached);
    let total_allocation_weight = farm
        .total_allocation_weight
        .checked_add(allocation_weight)
        .ok_or(ErrorCode::ArithmeticOverflow)?;
    let pool_count = pool_id
        .checked_add(1)
        .ok_or(ErrorCode::ArithmeticOverflow)?;

    pool.pool_id = pool_id;
    pool.staked_mint = staked_mint;
    pool.staked_vault = staked_vault;
    pool.allocation_weight = allocation_weight;
    pool.acc_reward_per_share = 0;
    pool.last_accrual_slot = farm.accrual_start(current_slot);
    pool.total_staked = 0;

    farm.total_allocation_weight = total_allocation_weight;
    farm.pool_count = pool_count;
    Ok(pool_id)
}

/// Replaces the weight of `pool` and returns the previous one.
pub fn reweight_pool(farm: &mut FarmConfig, pool: &mut Pool, allocation_weight: u64) -> Result<u64> {
    farm.require_pool_id(pool.pool_id)?;
    let previous = pool.allocation_weight;
    let total_allocation_weight = farm
        .total_allocation_weight
        .checked_sub(previous)
        .and_then(|total| total.checked_add(allocation_weight))
        .ok_or(ErrorCode::ArithmeticOverflow)?;

    farm.total_allocation_weight = total_allocation_weight;
    pool.allocation_weight = allocation_weight;
    Ok(previous)
}

/// Settles every pool at the old multiplier, then switches to `reward_multiplier`.
///
/// Returns the previous multiplier.
pub fn apply_reward_multiplier(
    farm: &mut FarmConfig,
    pools: &mut [Pool],
    reward_multiplier: u64,
    current_slot: u64,
) -> Result<u64> {
    require_gt!(reward_multiplier, 0, ErrorCode::InvalidParam);
    farm.reward_per_slot_base
        .checked_mul(reward_multiplier)
        .ok_or(ErrorCode::ArithmeticOverflow)?;
    mass_update(farm, pools, current_slot)?;

    let previous = farm.reward_multiplier;
    farm.reward_multiplier = reward_multiplier;
    Ok(previous)
}
