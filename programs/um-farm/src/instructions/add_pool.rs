use crate::error::ErrorCode;
use crate::ledger::{mass_update, register_pool};
use crate::states::*;
use crate::utils::{load_pools, require_same_token_program, store_pools};
use crate::POOL_VAULT_SEED;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use std::ops::DerefMut;

/// Accounts context for `add_pool`.
///
/// Remaining accounts: when `settle_existing` is set, every existing pool
/// (writable) in id order. Otherwise none are read.
#[derive(Accounts)]
pub struct AddPool<'info> {
    /// Farm admin; pays for the pool and its vault.
    #[account(
        mut,
        constraint = farm_config.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    /// Farm authority PDA, owner of the new vault.
    ///
    /// CHECK: PDA derivation enforced via seeds. Only its key is read.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump = farm_config.bump,
    )]
    pub farm_config: Account<'info, FarmConfig>,

    /// New pool, addressed by the id it is about to receive.
    #[account(
        init,
        seeds = [POOL_SEED.as_bytes(), &Pool::seeds(farm_config.pool_count)],
        bump,
        payer = owner,
        space = Pool::LEN
    )]
    pub pool: Account<'info, Pool>,

    /// Asset staked in the new pool.
    #[account(mint::token_program = token_program)]
    pub staked_mint: Box<InterfaceAccount<'info, Mint>>,

    /// UM reward mint; must share `token_program` with `staked_mint`.
    #[account(address = farm_config.reward_mint @ ErrorCode::InvalidMint)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Program-owned vault holding the pool's stake.
    #[account(
        init,
        seeds = [POOL_VAULT_SEED.as_bytes(), pool.key().as_ref()],
        bump,
        payer = owner,
        token::mint = staked_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub pool_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

/// Appends a pool to the registry and returns its id.
///
/// With `settle_existing`, every existing pool is first advanced to the current
/// slot at the old weight total, so the growth of `total_allocation_weight`
/// only dilutes slots that have not elapsed yet.
///
/// # Fails
/// - `Unauthorized` if the signer is not the farm admin.
/// - `TokenProgramMismatch` if the staked mint and the reward mint are owned by
///   different token programs.
/// - `PoolLimitReached` once `MAX_POOLS` pools exist.
/// - `PoolListMismatch` if `settle_existing` is set and the remaining accounts
///   are not exactly every existing pool in id order.
pub fn add_pool<'info>(
    ctx: Context<'_, '_, '_, 'info, AddPool<'info>>,
    allocation_weight: u64,
    settle_existing: bool,
) -> Result<u64> {
    require_same_token_program(
        &ctx.accounts.staked_mint.to_account_info(),
        &ctx.accounts.reward_mint.to_account_info(),
    )?;
    let current_slot = Clock::get()?.slot;
    let farm_config = ctx.accounts.farm_config.deref_mut();

    if settle_existing {
        let mut pools = load_pools(ctx.remaining_accounts)?;
        mass_update(farm_config, &mut pools, current_slot)?;
        store_pools(ctx.remaining_accounts, &pools)?;
    }

    let pool = ctx.accounts.pool.deref_mut();
    pool.bump = ctx.bumps.pool;
    let pool_id = register_pool(
        farm_config,
        pool,
        allocation_weight,
        ctx.accounts.staked_mint.key(),
        ctx.accounts.pool_vault.key(),
        current_slot,
    )?;
    msg!(
        "Pool {} added with weight {} of {}",
        pool_id,
        allocation_weight,
        farm_config.total_allocation_weight
    );

    emit!(PoolAdded {
        pool_id,
        staked_mint: pool.staked_mint,
        allocation_weight,
        total_allocation_weight: farm_config.total_allocation_weight,
        settled_existing: settle_existing,
    });
    Ok(pool_id)
}
