//! Manual (de)serialization of accounts passed through `remaining_accounts`.
//!
//! Instructions that touch a variable number of pools cannot name them in their
//! `Accounts` struct, so they borrow the raw infos, decode them here, work on the
//! owned values and write them back only once the whole operation succeeded.

use anchor_lang::prelude::*;
use anchor_lang::Owner;
use anchor_spl::token_interface::{Mint, TokenAccount};

use crate::error::ErrorCode;
use crate::states::Pool;

pub fn next_remaining_account<'a, 'info>(
    accounts: &mut impl Iterator<Item = &'a AccountInfo<'info>>,
) -> Result<&'a AccountInfo<'info>>
where
    'info: 'a,
{
    accounts
        .next()
        .ok_or_else(|| error!(ErrorCode::MissingRemainingAccount))
}

/// Decodes an account owned by this program, checking owner and discriminator.
pub fn load_program_account<T: AccountDeserialize + Owner>(info: &AccountInfo) -> Result<T> {
    if *info.owner != T::owner() {
        return Err(anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram.into());
    }
    let data = info.try_borrow_data()?;
    T::try_deserialize(&mut &data[..])
}

/// Writes `account` back into `info`. The account must have been passed writable.
pub fn store_program_account<T: AccountSerialize>(info: &AccountInfo, account: &T) -> Result<()> {
    if !info.is_writable {
        return Err(anchor_lang::error::ErrorCode::ConstraintMut.into());
    }
    let mut new_data: Vec<u8> = Vec::new();
    account.try_serialize(&mut new_data)?;

    let mut data = info.try_borrow_mut_data()?;
    if new_data.len() > data.len() {
        return Err(ProgramError::AccountDataTooSmall.into());
    }
    data[..new_data.len()].copy_from_slice(&new_data);
    Ok(())
}

pub fn load_pools(infos: &[AccountInfo]) -> Result<Vec<Pool>> {
    infos.iter().map(load_program_account::<Pool>).collect()
}

pub fn store_pools(infos: &[AccountInfo], pools: &[Pool]) -> Result<()> {
    require_eq!(infos.len(), pools.len(), ErrorCode::PoolListMismatch);
    for (info, pool) in infos.iter().zip(pools) {
        store_program_account(info, pool)?;
    }
    Ok(())
}

/// Checks that both mints live under the same token program, since every
/// stake and reward movement of a pool runs through one `token_program`.
pub fn require_same_token_program(staked_mint: &AccountInfo, reward_mint: &AccountInfo) -> Result<()> {
    require_keys_eq!(
        *staked_mint.owner,
        *reward_mint.owner,
        ErrorCode::TokenProgramMismatch
    );
    Ok(())
}

/// Decodes a mint owned by `token_program`.
pub fn load_mint(info: &AccountInfo, token_program: &Pubkey) -> Result<Mint> {
    if info.owner != token_program {
        return Err(anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram.into());
    }
    let data = info.try_borrow_data()?;
    Mint::try_deserialize(&mut &data[..])
}

/// Decodes a token account owned by `token_program`.
pub fn load_token_account(info: &AccountInfo, token_program: &Pubkey) -> Result<TokenAccount> {
    if info.owner != token_program {
        return Err(anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram.into());
    }
    let data = info.try_borrow_data()?;
    TokenAccount::try_deserialize(&mut &data[..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_bytes(pool: &Pool) -> Vec<u8> {
        let mut data = Vec::new();
        pool.try_serialize(&mut data).unwrap();
        data.resize(Pool::LEN, 0);
        data
    }

    #[test]
    fn pool_survives_load_and_store() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0u64;
        let mut data = pool_bytes(&Pool {
            pool_id: 3,
            allocation_weight: 40,
            ..Default::default()
        });
        let info = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &owner, false, 0);

        let mut pool: Pool = load_program_account(&info).unwrap();
        assert_eq!(pool.pool_id, 3);
        pool.total_staked = 99;
        store_program_account(&info, &pool).unwrap();

        let reloaded: Pool = load_program_account(&info).unwrap();
        assert_eq!(reloaded.total_staked, 99);
        assert_eq!(reloaded.allocation_weight, 40);
    }

    #[test]
    fn foreign_accounts_are_rejected() {
        let key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0u64;
        let mut data = pool_bytes(&Pool::default());
        let info = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &owner, false, 0);
        assert!(load_program_account::<Pool>(&info).is_err());
    }

    #[test]
    fn readonly_accounts_are_not_written() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0u64;
        let mut data = pool_bytes(&Pool::default());
        let info = AccountInfo::new(&key, false, false, &mut lamports, &mut data, &owner, false, 0);
        assert!(store_program_account(&info, &Pool::default()).is_err());
    }

    #[test]
    fn mints_must_share_a_token_program() {
        let (staked, reward) = (Pubkey::new_unique(), Pubkey::new_unique());
        let (token, token_2022) = (Pubkey::new_unique(), Pubkey::new_unique());
        let (mut staked_lamports, mut reward_lamports) = (0u64, 0u64);
        let (mut staked_data, mut reward_data) = (vec![0u8; 82], vec![0u8; 82]);
        let staked_info = AccountInfo::new(
            &staked,
            false,
            false,
            &mut staked_lamports,
            &mut staked_data,
            &token_2022,
            false,
            0,
        );
        let reward_info = AccountInfo::new(
            &reward,
            false,
            false,
            &mut reward_lamports,
            &mut reward_data,
            &token,
            false,
            0,
        );
        assert_eq!(
            require_same_token_program(&staked_info, &reward_info).unwrap_err(),
            error!(ErrorCode::TokenProgramMismatch)
        );
        assert!(require_same_token_program(&reward_info, &reward_info).is_ok());
    }

    #[test]
    fn missing_remaining_account_is_reported() {
        let infos: Vec<AccountInfo> = Vec::new();
        assert_eq!(
            next_remaining_account(&mut infos.iter()).unwrap_err(),
            error!(ErrorCode::MissingRemainingAccount)
        );
    }
}
