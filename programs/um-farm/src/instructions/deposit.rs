use crate::error::ErrorCode;
use crate::ledger::{settle_position, StakeChange};
use crate::states::*;
use crate::utils::{mint_reward_to_user, transfer_from_user_to_pool_vault};
use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use std::ops::DerefMut;

/// Accounts required to stake into a pool (or, with a zero amount, to harvest).
///
/// Flow summary:
/// 1) Advance the pool accumulator to the current slot.
/// 2) Settle the caller's pending reward against it.
/// 3) Apply the stake increase and re-base the reward debt.
/// 4) Persist pool and position, then pull the stake and mint the reward.
#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct Deposit<'info> {
    /// Participant staking and receiving reward.
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump = farm_config.bump,
    )]
    pub farm_config: Account<'info, FarmConfig>,

    /// Farm authority PDA, signs reward mints.
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

    /// Caller's position in `pool` (created on first deposit).
    #[account(
        init_if_needed,
        seeds = [
            POSITION_SEED.as_bytes(),
            pool.key().as_ref(),
            owner.key().as_ref(),
        ],
        bump,
        payer = owner,
        space = Position::LEN
    )]
    pub position: Account<'info, Position>,

    #[account(address = pool.staked_mint @ ErrorCode::InvalidMint)]
    pub staked_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, address = pool.staked_vault @ ErrorCode::InvalidVault)]
    pub pool_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Source of the stake.
    #[account(
        mut,
        token::mint = staked_mint,
        token::authority = owner,
        token::token_program = token_program,
    )]
    pub owner_staked_token: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = farm_config.reward_mint @ ErrorCode::InvalidMint)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Caller's UM account; created if missing.
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

/// Stakes `amount` into `pool_id` after paying out pending reward.
///
/// A zero `amount` only harvests.
///
/// # Fails
/// - `InvalidPool` if `pool_id` is not registered.
/// - `TransferFailed` if the stake cannot be pulled or the reward cannot be minted.
/// - `ArithmeticOverflow` on any overflowing step.
pub fn deposit(ctx: Context<Deposit>, pool_id: u64, amount: u64) -> Result<()> {
    let farm_config = &ctx.accounts.farm_config;
    farm_config.require_pool_id(pool_id)?;
    let current_slot = Clock::get()?.slot;
    let owner = ctx.accounts.owner.key();
    let pool_key = ctx.accounts.pool.key();

    let position = ctx.accounts.position.deref_mut();
    if !position.is_initialized() {
        position.bump = ctx.bumps.position;
        position.pool = pool_key;
        position.owner = owner;
    }
    let settlement = settle_position(
        farm_config,
        ctx.accounts.pool.deref_mut(),
        position,
        StakeChange::Deposit(amount),
        current_slot,
    )?;

    // Commit farm state before any token program is invoked.
    ctx.accounts.pool.exit(&crate::ID)?;
    ctx.accounts.position.exit(&crate::ID)?;

    transfer_from_user_to_pool_vault(
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.owner_staked_token.to_account_info(),
        ctx.accounts.pool_vault.to_account_info(),
        ctx.accounts.staked_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        settlement.deposited,
        ctx.accounts.staked_mint.decimals,
    )?;
    mint_reward_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.reward_mint.to_account_info(),
        ctx.accounts.owner_reward_token.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        settlement.pending,
        &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]],
    )?;

    if settlement.pending > 0 {
        emit!(RewardHarvested {
            owner,
            pool_id,
            amount: settlement.pending,
        });
    }
    emit!(Deposited {
        owner,
        pool_id,
        amount,
        staked_amount: settlement.staked_amount,
    });
    Ok(())
}
