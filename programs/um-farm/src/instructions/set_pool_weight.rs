use crate::error::ErrorCode;
use crate::ledger::{mass_update, reweight_pool};
use crate::states::*;
use crate::utils::{load_pools, next_remaining_account, store_pools};
use anchor_lang::prelude::*;
use std::ops::DerefMut;

/// Accounts context for `set_pool_weight`.
///
/// Remaining accounts (all writable):
/// - `settle_existing = true`: every pool in id order.
/// - `settle_existing = false`: only the target pool.
#[derive(Accounts)]
pub struct SetPoolWeight<'info> {
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

/// Changes the allocation weight of `pool_id`.
///
/// With `settle_existing`, every pool is advanced first so that the new weight
/// ratio only applies to future slots.
///
/// # Fails
/// - `Unauthorized` if the signer is not the farm admin.
/// - `InvalidPool` if `pool_id` is not registered.
/// - `PoolListMismatch` if the remaining accounts do not match the mode above.
pub fn set_pool_weight<'info>(
    ctx: Context<'_, '_, '_, 'info, SetPoolWeight<'info>>,
    pool_id: u64,
    allocation_weight: u64,
    settle_existing: bool,
) -> Result<()> {
    let farm_config = ctx.accounts.farm_config.deref_mut();
    farm_config.require_pool_id(pool_id)?;
    let current_slot = Clock::get()?.slot;

    let (infos, mut pools, index) = if settle_existing {
        let pools = load_pools(ctx.remaining_accounts)?;
        (ctx.remaining_accounts, pools, pool_id as usize)
    } else {
        let info = next_remaining_account(&mut ctx.remaining_accounts.iter())?;
        let pools = load_pools(std::slice::from_ref(info))?;
        require_eq!(pools[0].pool_id, pool_id, ErrorCode::PoolListMismatch);
        (&ctx.remaining_accounts[..1], pools, 0)
    };

    if settle_existing {
        mass_update(farm_config, &mut pools, current_slot)?;
    }
    let pool = pools
        .get_mut(index)
        .ok_or_else(|| error!(ErrorCode::PoolListMismatch))?;
    let previous_weight = reweight_pool(farm_config, pool, allocation_weight)?;
    store_pools(infos, &pools)?;
    msg!(
        "Pool {} weight {} -> {}",
        pool_id,
        previous_weight,
        allocation_weight
    );

    emit!(PoolWeightUpdated {
        pool_id,
        previous_weight,
        allocation_weight,
        total_allocation_weight: farm_config.total_allocation_weight,
        settled_existing: settle_existing,
    });
    Ok(())
}
