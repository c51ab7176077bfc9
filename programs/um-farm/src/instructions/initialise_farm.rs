use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token_interface::{Mint, TokenInterface};
use std::ops::DerefMut;

/// Accounts context for `initialise_farm`.
///
/// This handler:
/// - Creates the singleton `FarmConfig` holding the reward rate and registry totals.
/// - Pins the reward mint, which must already name the farm authority PDA as its
///   mint authority so that settlement can issue UM.
#[derive(Accounts)]
pub struct InitialiseFarm<'info> {
    /// Program-level admin; pays for the config account.
    #[account(
        mut,
        address = crate::admin::id() @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    /// Farm authority PDA (mint authority of UM, owner of every pool vault).
    ///
    /// CHECK: PDA derivation enforced via seeds. Only its key is read.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// Farm configuration (rate, multiplier, registry totals).
    #[account(
        init,
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump,
        payer = owner,
        space = FarmConfig::LEN
    )]
    pub farm_config: Account<'info, FarmConfig>,

    /// UM reward mint.
    #[account(
        mint::token_program = token_program,
        constraint = reward_mint.mint_authority == COption::Some(authority.key()) @ ErrorCode::MissingMintAuthority,
    )]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Token program owning the reward mint.
    pub token_program: Interface<'info, TokenInterface>,

    /// Solana System Program.
    pub system_program: Program<'info, System>,
}

/// Writes the initial farm configuration.
///
/// # Parameters
/// - `admin`: Holder of the administrative capability from now on.
/// - `reward_per_slot_base`: UM issued per slot across the farm, before the multiplier.
/// - `reward_multiplier`: Initial multiplier, must be positive.
/// - `genesis_slot`: No reward accrues before this slot.
///
/// # Fails
/// - `Unauthorized` if the signer is not the program-level admin.
/// - `MissingMintAuthority` if the farm authority cannot mint UM.
/// - `InvalidParam` for a zero multiplier or a rate that overflows once multiplied.
pub fn initialise_farm(
    ctx: Context<InitialiseFarm>,
    admin: Pubkey,
    reward_per_slot_base: u64,
    reward_multiplier: u64,
    genesis_slot: u64,
) -> Result<()> {
    require_keys_neq!(admin, Pubkey::default(), ErrorCode::InvalidParam);
    require_gt!(reward_multiplier, 0, ErrorCode::InvalidParam);

    let farm_config = ctx.accounts.farm_config.deref_mut();
    farm_config.bump = ctx.bumps.farm_config;
    farm_config.admin = admin;
    farm_config.reward_mint = ctx.accounts.reward_mint.key();
    farm_config.reward_per_slot_base = reward_per_slot_base;
    farm_config.reward_multiplier = reward_multiplier;
    farm_config.genesis_slot = genesis_slot;
    farm_config.total_allocation_weight = 0;
    farm_config.pool_count = 0;
    farm_config
        .reward_per_slot()
        .map_err(|_| error!(ErrorCode::InvalidParam))?;
    msg!("Farm config initialized");

    emit!(FarmInitialized {
        admin,
        reward_mint: farm_config.reward_mint,
        reward_per_slot_base,
        reward_multiplier,
        genesis_slot,
    });
    Ok(())
}
