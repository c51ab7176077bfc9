use crate::error::ErrorCode;
use crate::ledger::apply_reward_multiplier;
use crate::states::*;
use crate::utils::{load_pools, store_pools};
use anchor_lang::prelude::*;
use std::ops::DerefMut;

/// Accounts context for `set_reward_multiplier`.
///
/// Remaining accounts: every pool (writable) in id order.
#[derive(Accounts)]
pub struct SetRewardMultiplier<'info> {
    #[account(
        constraint = farm_config.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump = farm_config.bump,
    )]
    pub farm_config: Account<'info, FarmConfig>,
}

/// Prices every elapsed slot at the current multiplier, then switches to
/// `reward_multiplier` for the slots to come.
///
/// # Fails
/// - `Unauthorized` if the signer is not the farm admin.
/// - `InvalidParam` if `reward_multiplier` is zero.
/// - `PoolListMismatch` if the remaining accounts are not every pool in id order.
pub fn set_reward_multiplier<'info>(
    ctx: Context<'_, '_, '_, 'info, SetRewardMultiplier<'info>>,
    reward_multiplier: u64,
) -> Result<()> {
    let current_slot = Clock::get()?.slot;
    let farm_config = ctx.accounts.farm_config.deref_mut();

    let mut pools = load_pools(ctx.remaining_accounts)?;
    let previous_multiplier =
        apply_reward_multiplier(farm_config, &mut pools, reward_multiplier, current_slot)?;
    store_pools(ctx.remaining_accounts, &pools)?;
    msg!(
        "Reward multiplier {} -> {} at slot {}",
        previous_multiplier,
        reward_multiplier,
        current_slot
    );

    emit!(RewardMultiplierUpdated {
        previous_multiplier,
        reward_multiplier,
        slot: current_slot,
    });
    Ok(())
}
