use crate::error::ErrorCode;
use crate::ledger::{batch_pool_ids, stage_batch, BatchAction, BatchCall, Interaction, PoolSlot};
use crate::states::*;
use crate::utils::{
    load_mint, load_program_account, load_token_account, mint_reward_to_user,
    next_remaining_account, store_program_account, transfer_from_pool_vault_to_user,
    transfer_from_user_to_pool_vault,
};
use crate::MAX_BATCH_CALLS;
use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use std::collections::BTreeMap;

/// Accounts shared by every call of a batch.
///
/// Remaining accounts: for each distinct pool, in order of first appearance in
/// `calls`, the five accounts
/// `[pool (w), position (w), pool_vault (w), owner_staked_token (w), staked_mint]`.
/// Positions must already exist.
#[derive(Accounts)]
pub struct ExecuteBatch<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump = farm_config.bump,
    )]
    pub farm_config: Account<'info, FarmConfig>,

    /// Farm authority PDA, owner of every pool vault and UM mint authority.
    ///
    /// CHECK: PDA derivation enforced via seeds; used only as CPI signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

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

/// Raw accounts of one pool touched by the batch.
struct PoolAccounts<'a, 'info> {
    pool: &'a AccountInfo<'info>,
    position: &'a AccountInfo<'info>,
    vault: &'a AccountInfo<'info>,
    owner_token: &'a AccountInfo<'info>,
    mint: &'a AccountInfo<'info>,
    decimals: u8,
}

/// Executes `calls` in order as one atomic unit.
///
/// Every call is first staged on in-memory copies of the touched pools and
/// positions. Only when all of them succeed are the accounts written back and
/// the collected transfers and mints performed, in call order. Any failure
/// aborts the instruction with no account modified.
///
/// # Fails
/// - `TooManyBatchCalls` above `MAX_BATCH_CALLS` calls.
/// - `InvalidPool`, `InsufficientStake`, `ArithmeticOverflow` from any call.
/// - `MissingRemainingAccount`, `PoolListMismatch`, `PositionMismatch`,
///   `InvalidVault`, `InvalidMint` if the remaining accounts do not match `calls`.
/// - `TransferFailed` if any transfer or mint fails.
pub fn execute_batch<'info>(
    ctx: Context<'_, '_, '_, 'info, ExecuteBatch<'info>>,
    calls: Vec<BatchCall>,
) -> Result<()> {
    require_gte!(MAX_BATCH_CALLS, calls.len(), ErrorCode::TooManyBatchCalls);
    let farm_config = &ctx.accounts.farm_config;
    let owner = ctx.accounts.owner.key();
    let token_program = ctx.accounts.token_program.key();
    let current_slot = Clock::get()?.slot;

    // --- Load and validate per-pool accounts ---
    let mut remaining = ctx.remaining_accounts.iter();
    let mut handles: BTreeMap<u64, PoolAccounts> = BTreeMap::new();
    let mut slots: BTreeMap<u64, PoolSlot> = BTreeMap::new();
    for pool_id in batch_pool_ids(&calls) {
        farm_config.require_pool_id(pool_id)?;
        let pool_info = next_remaining_account(&mut remaining)?;
        let position_info = next_remaining_account(&mut remaining)?;
        let vault_info = next_remaining_account(&mut remaining)?;
        let owner_token_info = next_remaining_account(&mut remaining)?;
        let mint_info = next_remaining_account(&mut remaining)?;

        let pool: Pool = load_program_account(pool_info)?;
        require_eq!(pool.pool_id, pool_id, ErrorCode::PoolListMismatch);
        let position: Position = load_program_account(position_info)?;
        require_keys_eq!(position.pool, pool_info.key(), ErrorCode::PositionMismatch);
        require_keys_eq!(position.owner, owner, ErrorCode::PositionMismatch);
        require_keys_eq!(vault_info.key(), pool.staked_vault, ErrorCode::InvalidVault);
        require_keys_eq!(mint_info.key(), pool.staked_mint, ErrorCode::InvalidMint);
        let mint = load_mint(mint_info, &token_program)?;
        let owner_token = load_token_account(owner_token_info, &token_program)?;
        require_keys_eq!(owner_token.mint, pool.staked_mint, ErrorCode::InvalidMint);

        handles.insert(
            pool_id,
            PoolAccounts {
                pool: pool_info,
                position: position_info,
                vault: vault_info,
                owner_token: owner_token_info,
                mint: mint_info,
                decimals: mint.decimals,
            },
        );
        slots.insert(pool_id, PoolSlot { pool, position });
    }

    // --- Stage every call; nothing is written if one fails ---
    let staged = stage_batch(farm_config, &slots, &calls, current_slot)?;

    // --- Commit farm state before any token program is invoked ---
    for (pool_id, slot) in &staged.slots {
        let accounts = handles
            .get(pool_id)
            .ok_or_else(|| error!(ErrorCode::MissingRemainingAccount))?;
        store_program_account(accounts.pool, &slot.pool)?;
        store_program_account(accounts.position, &slot.position)?;
    }

    // --- Interactions, in call order ---
    let signer_seeds: &[&[&[u8]]] = &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]];
    for interaction in &staged.interactions {
        let accounts = handles
            .get(&interaction.pool_id())
            .ok_or_else(|| error!(ErrorCode::MissingRemainingAccount))?;
        match *interaction {
            Interaction::PullStake { amount, .. } => transfer_from_user_to_pool_vault(
                ctx.accounts.owner.to_account_info(),
                accounts.owner_token.clone(),
                accounts.vault.clone(),
                accounts.mint.clone(),
                ctx.accounts.token_program.to_account_info(),
                amount,
                accounts.decimals,
            )?,
            Interaction::PushStake { amount, .. } => transfer_from_pool_vault_to_user(
                ctx.accounts.authority.to_account_info(),
                accounts.vault.clone(),
                accounts.owner_token.clone(),
                accounts.mint.clone(),
                ctx.accounts.token_program.to_account_info(),
                amount,
                accounts.decimals,
                signer_seeds,
            )?,
            Interaction::MintReward { amount, .. } => mint_reward_to_user(
                ctx.accounts.authority.to_account_info(),
                ctx.accounts.reward_mint.to_account_info(),
                ctx.accounts.owner_reward_token.to_account_info(),
                ctx.accounts.token_program.to_account_info(),
                amount,
                signer_seeds,
            )?,
        }
    }

    // --- Events ---
    for (call, settlement) in calls.iter().zip(&staged.settlements) {
        if settlement.pending > 0 {
            emit!(RewardHarvested {
                owner,
                pool_id: call.pool_id,
                amount: settlement.pending,
            });
        }
        match call.action {
            BatchAction::Deposit { amount } => emit!(Deposited {
                owner,
                pool_id: call.pool_id,
                amount,
                staked_amount: settlement.staked_amount,
            }),
            BatchAction::Withdraw { amount } => emit!(Withdrawn {
                owner,
                pool_id: call.pool_id,
                amount,
                staked_amount: settlement.staked_amount,
            }),
            BatchAction::Harvest => {}
        }
    }
    let reward_minted = staged.reward_minted()?;
    msg!(
        "Batch of {} calls over {} pools minted {}",
        calls.len(),
        staged.slots.len(),
        reward_minted
    );
    emit!(BatchExecuted {
        owner,
        calls: calls.len() as u32,
        reward_minted,
    });
    Ok(())
}
