use crate::ledger::mass_update;
use crate::states::*;
use crate::utils::{load_pools, store_pools};
use anchor_lang::prelude::*;

/// Accounts context for `update_pool`. Permissionless.
#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct UpdatePool<'info> {
    #[account(
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump = farm_config.bump,
    )]
    pub farm_config: Account<'info, FarmConfig>,

    #[account(
        mut,
        seeds = [POOL_SEED.as_bytes(), &Pool::seeds(pool_id)],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,
}

/// Brings one pool's accumulator up to the current slot.
pub fn update_pool(ctx: Context<UpdatePool>, pool_id: u64) -> Result<()> {
    let farm_config = &ctx.accounts.farm_config;
    farm_config.require_pool_id(pool_id)?;
    let current_slot = Clock::get()?.slot;

    let pool = &mut ctx.accounts.pool;
    let issued = pool.advance(farm_config, current_slot)?;

    emit!(PoolUpdated {
        pool_id,
        issued,
        acc_reward_per_share: pool.acc_reward_per_share,
        last_accrual_slot: pool.last_accrual_slot,
    });
    Ok(())
}

/// Accounts context for `mass_update_pools`. Permissionless.
///
/// Remaining accounts: every pool (writable) in id order.
#[derive(Accounts)]
pub struct MassUpdatePools<'info> {
    #[account(
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump = farm_config.bump,
    )]
    pub farm_config: Account<'info, FarmConfig>,
}

/// Brings every pool's accumulator up to the current slot.
pub fn mass_update_pools<'info>(
    ctx: Context<'_, '_, '_, 'info, MassUpdatePools<'info>>,
) -> Result<()> {
    let current_slot = Clock::get()?.slot;
    let mut pools = load_pools(ctx.remaining_accounts)?;
    let issued = mass_update(&ctx.accounts.farm_config, &mut pools, current_slot)?;
    store_pools(ctx.remaining_accounts, &pools)?;
    msg!("Advanced {} pools, issued {}", pools.len(), issued);
    Ok(())
}
