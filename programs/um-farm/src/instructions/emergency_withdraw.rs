use crate::error::ErrorCode;
use crate::ledger::forfeit_position;
use crate::states::*;
use crate::utils::transfer_from_pool_vault_to_user;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use std::ops::DerefMut;

/// Exit path that never touches the reward mint.
///
/// Usable even if minting is broken: the participant gets the whole stake back
/// and gives up whatever reward was pending.
#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct EmergencyWithdraw<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump = farm_config.bump,
    )]
    pub farm_config: Account<'info, FarmConfig>,

    /// Farm authority PDA, owner of the pool vault.
    ///
    /// CHECK: PDA derivation enforced via seeds; used only as CPI signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED.as_bytes(), &Pool::seeds(pool_id)],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        mut,
        seeds = [
            POSITION_SEED.as_bytes(),
            pool.key().as_ref(),
            owner.key().as_ref(),
        ],
        bump = position.bump,
    )]
    pub position: Account<'info, Position>,

    #[account(address = pool.staked_mint @ ErrorCode::InvalidMint)]
    pub staked_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, address = pool.staked_vault @ ErrorCode::InvalidVault)]
    pub pool_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = staked_mint,
        token::token_program = token_program,
    )]
    pub owner_staked_token: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Returns the caller's whole stake in `pool_id` and forfeits pending reward.
///
/// The pool is advanced first, so other stakers keep what the elapsed slots
/// earned them; the forfeited amount is simply never minted.
pub fn emergency_withdraw(ctx: Context<EmergencyWithdraw>, pool_id: u64) -> Result<()> {
    let farm_config = &ctx.accounts.farm_config;
    farm_config.require_pool_id(pool_id)?;
    let current_slot = Clock::get()?.slot;

    let exit = forfeit_position(
        farm_config,
        ctx.accounts.pool.deref_mut(),
        ctx.accounts.position.deref_mut(),
        current_slot,
    )?;

    // Commit farm state before any token program is invoked.
    ctx.accounts.pool.exit(&crate::ID)?;
    ctx.accounts.position.exit(&crate::ID)?;

    transfer_from_pool_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.pool_vault.to_account_info(),
        ctx.accounts.owner_staked_token.to_account_info(),
        ctx.accounts.staked_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        exit.amount,
        ctx.accounts.staked_mint.decimals,
        &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]],
    )?;
    msg!(
        "Emergency withdraw of {} from pool {}, {} reward forfeited",
        exit.amount,
        pool_id,
        exit.forfeited_reward
    );

    emit!(EmergencyWithdrawn {
        owner: ctx.accounts.owner.key(),
        pool_id,
        amount: exit.amount,
        forfeited_reward: exit.forfeited_reward,
    });
    Ok(())
}
