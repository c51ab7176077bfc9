use anchor_lang::AccountDeserialize;
use anyhow::{format_err, Result};
use serde::Serialize;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{account::Account, pubkey::Pubkey};
use um_farm::states::{
    FarmConfig, Pool, Position, FARM_CONFIG_SEED, POOL_SEED, POSITION_SEED,
};

pub fn deserialize_anchor_account<T: AccountDeserialize>(account: &Account) -> Result<T> {
    let mut data: &[u8] = &account.data;
    T::try_deserialize(&mut data).map_err(Into::into)
}

pub fn get_farm_config_address(program_id: &Pubkey) -> Pubkey {
    let (farm_config, _bump) =
        Pubkey::find_program_address(&[FARM_CONFIG_SEED.as_bytes()], program_id);
    farm_config
}

pub fn get_authority_address(program_id: &Pubkey) -> Pubkey {
    let (authority, _bump) =
        Pubkey::find_program_address(&[um_farm::AUTH_SEED.as_bytes()], program_id);
    authority
}

pub fn get_pool_address(program_id: &Pubkey, pool_id: u64) -> Pubkey {
    let (pool, _bump) = Pubkey::find_program_address(
        &[POOL_SEED.as_bytes(), &Pool::seeds(pool_id)],
        program_id,
    );
    pool
}

pub fn get_pool_vault_address(program_id: &Pubkey, pool: &Pubkey) -> Pubkey {
    let (pool_vault, _bump) = Pubkey::find_program_address(
        &[um_farm::POOL_VAULT_SEED.as_bytes(), pool.as_ref()],
        program_id,
    );
    pool_vault
}

pub fn get_position_address(program_id: &Pubkey, pool: &Pubkey, owner: &Pubkey) -> Pubkey {
    let (position, _bump) = Pubkey::find_program_address(
        &[POSITION_SEED.as_bytes(), pool.as_ref(), owner.as_ref()],
        program_id,
    );
    position
}

/// Associated token account of `owner` for `mint` under `token_program`.
pub fn get_owner_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address_with_program_id(
        owner,
        mint,
        token_program,
    )
}

pub fn load_farm_config(rpc_client: &RpcClient, program_id: &Pubkey) -> Result<FarmConfig> {
    let account = rpc_client.get_account(&get_farm_config_address(program_id))?;
    deserialize_anchor_account::<FarmConfig>(&account)
}

/// Loads every registered pool, in id order.
pub fn load_pools(rpc_client: &RpcClient, program_id: &Pubkey, pool_count: u64) -> Result<Vec<Pool>> {
    let addresses: Vec<Pubkey> = (0..pool_count)
        .map(|pool_id| get_pool_address(program_id, pool_id))
        .collect();
    let mut pools = Vec::with_capacity(addresses.len());
    // getMultipleAccounts is capped at 100 keys per request.
    for chunk in addresses.chunks(100) {
        for (address, account) in chunk.iter().zip(rpc_client.get_multiple_accounts(chunk)?) {
            let account = account.ok_or_else(|| format_err!("pool {} not found", address))?;
            pools.push(deserialize_anchor_account::<Pool>(&account)?);
        }
    }
    Ok(pools)
}

pub fn load_pool(rpc_client: &RpcClient, program_id: &Pubkey, pool_id: u64) -> Result<Pool> {
    let account = rpc_client.get_account(&get_pool_address(program_id, pool_id))?;
    deserialize_anchor_account::<Pool>(&account)
}

pub fn load_position(
    rpc_client: &RpcClient,
    program_id: &Pubkey,
    pool_id: u64,
    owner: &Pubkey,
) -> Result<Option<Position>> {
    let pool = get_pool_address(program_id, pool_id);
    let address = get_position_address(program_id, &pool, owner);
    match rpc_client.get_multiple_accounts(&[address])?.pop().flatten() {
        Some(account) => Ok(Some(deserialize_anchor_account::<Position>(&account)?)),
        None => Ok(None),
    }
}

/// Program that owns `mint` (SPL Token or Token-2022).
pub fn get_token_program(rpc_client: &RpcClient, mint: &Pubkey) -> Result<Pubkey> {
    let owner = rpc_client.get_account(mint)?.owner;
    require_token_program(mint, &owner)?;
    Ok(owner)
}

fn require_token_program(mint: &Pubkey, owner: &Pubkey) -> Result<()> {
    if *owner != spl_token::id() && *owner != spl_token_2022::id() {
        return Err(format_err!("{} is not a token mint, owner {}", mint, owner));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PoolView {
    pub pool_id: u64,
    pub address: String,
    pub staked_mint: String,
    pub staked_vault: String,
    pub allocation_weight: u64,
    pub acc_reward_per_share: String,
    pub last_accrual_slot: u64,
    pub total_staked: u64,
}

impl PoolView {
    pub fn new(program_id: &Pubkey, pool: &Pool) -> Self {
        Self {
            pool_id: pool.pool_id,
            address: get_pool_address(program_id, pool.pool_id).to_string(),
            staked_mint: pool.staked_mint.to_string(),
            staked_vault: pool.staked_vault.to_string(),
            allocation_weight: pool.allocation_weight,
            // JSON numbers cannot hold a u128.
            acc_reward_per_share: pool.acc_reward_per_share.to_string(),
            last_accrual_slot: pool.last_accrual_slot,
            total_staked: pool.total_staked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PositionView {
    pub pool_id: u64,
    pub owner: String,
    pub staked_amount: u64,
    pub reward_debt: String,
    pub total_reward_claimed: u64,
    pub pending_reward: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_addresses_are_distinct_per_id() {
        let program_id = um_farm::ID;
        let pool0 = get_pool_address(&program_id, 0);
        let pool1 = get_pool_address(&program_id, 1);
        assert_ne!(pool0, pool1);
        assert_eq!(pool0, get_pool_address(&program_id, 0));
        assert_ne!(
            get_pool_vault_address(&program_id, &pool0),
            get_pool_vault_address(&program_id, &pool1)
        );
    }

    #[test]
    fn position_address_depends_on_owner() {
        let program_id = um_farm::ID;
        let pool = get_pool_address(&program_id, 0);
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        assert_ne!(
            get_position_address(&program_id, &pool, &alice),
            get_position_address(&program_id, &pool, &bob)
        );
    }

    #[test]
    fn only_token_programs_own_mints() {
        let mint = Pubkey::new_unique();
        assert!(require_token_program(&mint, &spl_token::id()).is_ok());
        assert!(require_token_program(&mint, &spl_token_2022::id()).is_ok());
        assert!(require_token_program(&mint, &Pubkey::new_unique()).is_err());
    }

    #[test]
    fn pool_view_keeps_accumulator_exact() {
        let pool = Pool {
            pool_id: 2,
            acc_reward_per_share: u128::MAX,
            ..Default::default()
        };
        let json = serde_json::to_value(PoolView::new(&um_farm::ID, &pool)).unwrap();
        assert_eq!(json["pool_id"], 2);
        assert_eq!(json["acc_reward_per_share"], u128::MAX.to_string());
    }
}
