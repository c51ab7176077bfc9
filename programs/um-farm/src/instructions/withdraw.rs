use crate::error::ErrorCode;
use crate::ledger::{settle_position, StakeChange};
use crate::states::*;
use crate::utils::{mint_reward_to_user, transfer_from_pool_vault_to_user};
use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use std::ops::DerefMut;

/// Accounts required to unstake from a pool.
#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump = farm_config.bump,
    )]
    pub farm_config: Account<'info, FarmConfig>,

    /// Farm authority PDA, owner of the pool vault and UM mint authority.
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

    /// Destination of the returned stake.
    #[account(
        mut,
        token::mint = staked_mint,
        token::token_program = token_program,
    )]
    pub owner_staked_token: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = farm_config.reward_mint @ ErrorCode::InvalidMint)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = reward_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_reward_token: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

/// Pays out pending reward, then returns `amount` of stake from `pool_id`.
///
/// # Fails
/// - `InvalidPool` if `pool_id` is not registered.
/// - `InsufficientStake` if `amount` exceeds the caller's stake; nothing changes.
/// - `TransferFailed` if the vault transfer or the reward mint fails.
pub fn withdraw(ctx: Context<Withdraw>, pool_id: u64, amount: u64) -> Result<()> {
    let farm_config = &ctx.accounts.farm_config;
    farm_config.require_pool_id(pool_id)?;
    let current_slot = Clock::get()?.slot;
    let owner = ctx.accounts.owner.key();

    let settlement = settle_position(
        farm_config,
        ctx.accounts.pool.deref_mut(),
        ctx.accounts.position.deref_mut(),
        StakeChange::Withdraw(amount),
        current_slot,
    )?;

    // Commit farm state before any token program is invoked.
    ctx.accounts.pool.exit(&crate::ID)?;
    ctx.accounts.position.exit(&crate::ID)?;

    let signer_seeds: &[&[&[u8]]] = &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]];
    transfer_from_pool_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.pool_vault.to_account_info(),
        ctx.accounts.owner_staked_token.to_account_info(),
        ctx.accounts.staked_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        settlement.withdrawn,
        ctx.accounts.staked_mint.decimals,
        signer_seeds,
    )?;
    mint_reward_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.reward_mint.to_account_info(),
        ctx.accounts.owner_reward_token.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        settlement.pending,
        signer_seeds,
    )?;

    if settlement.pending > 0 {
        emit!(RewardHarvested {
            owner,
            pool_id,
            amount: settlement.pending,
        });
    }
    emit!(Withdrawn {
        owner,
        pool_id,
        amount,
        staked_amount: settlement.staked_amount,
    });
    Ok(())
}
