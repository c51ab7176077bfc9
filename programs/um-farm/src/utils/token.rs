use crate::error::ErrorCode;
use anchor_lang::prelude::*;
use anchor_spl::token_interface;

/// Moves stake from a participant's token account into a pool vault.
///
/// `authority` is the participant and signs the outer transaction.
pub fn transfer_from_user_to_pool_vault<'a>(
    authority: AccountInfo<'a>,
    from: AccountInfo<'a>,
    to_vault: AccountInfo<'a>,
    mint: AccountInfo<'a>,
    token_program: AccountInfo<'a>,
    amount: u64,
    mint_decimals: u8,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_interface::transfer_checked(
        CpiContext::new(
            token_program,
            token_interface::TransferChecked {
                from,
                to: to_vault,
                authority,
                mint,
            },
        ),
        amount,
        mint_decimals,
    )
    .map_err(|err| {
        msg!("stake transfer into vault failed: {:?}", err);
        error!(ErrorCode::TransferFailed)
    })
}

/// Returns stake from a pool vault, signed by the farm authority PDA.
pub fn transfer_from_pool_vault_to_user<'a>(
    authority: AccountInfo<'a>,
    from_vault: AccountInfo<'a>,
    to: AccountInfo<'a>,
    mint: AccountInfo<'a>,
    token_program: AccountInfo<'a>,
    amount: u64,
    mint_decimals: u8,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_interface::transfer_checked(
        CpiContext::new_with_signer(
            token_program,
            token_interface::TransferChecked {
                from: from_vault,
                to,
                authority,
                mint,
            },
            signer_seeds,
        ),
        amount,
        mint_decimals,
    )
    .map_err(|err| {
        msg!("stake transfer out of vault failed: {:?}", err);
        error!(ErrorCode::TransferFailed)
    })
}

/// Mints freshly issued reward to a participant, signed by the farm authority PDA.
pub fn mint_reward_to_user<'a>(
    authority: AccountInfo<'a>,
    reward_mint: AccountInfo<'a>,
    to: AccountInfo<'a>,
    token_program: AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_interface::mint_to(
        CpiContext::new_with_signer(
            token_program,
            token_interface::MintTo {
                mint: reward_mint,
                to,
                authority,
            },
            signer_seeds,
        ),
        amount,
    )
    .map_err(|err| {
        msg!("reward mint failed: {:?}", err);
        error!(ErrorCode::TransferFailed)
    })
}
