use anchor_client::{Client, Cluster, Program};
use anchor_lang::prelude::AccountMeta;
use anyhow::{format_err, Result};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Keypair, system_program};
use std::rc::Rc;

use um_farm::accounts as farm_accounts;
use um_farm::instruction as farm_instructions;
use um_farm::ledger::{batch_pool_ids, BatchCall};
use um_farm::states::Pool;

use crate::instructions::utils::{
    get_authority_address, get_farm_config_address, get_owner_token_address, get_pool_address,
    get_pool_vault_address, get_position_address,
};

use super::super::{read_keypair_file, ClientConfig};

/// Writable metas for pools `0..pool_count`, in id order.
pub fn pool_list_metas(program_id: &Pubkey, pool_count: u64) -> Vec<AccountMeta> {
    (0..pool_count)
        .map(|pool_id| AccountMeta::new(get_pool_address(program_id, pool_id), false))
        .collect()
}

/// Remaining accounts of `execute_batch`: five per distinct pool, in order of
/// first appearance in `calls`.
pub fn batch_remaining_metas(
    program_id: &Pubkey,
    owner: &Pubkey,
    calls: &[BatchCall],
    staked_mint_of: impl Fn(u64) -> Option<Pubkey>,
    token_program: &Pubkey,
) -> Result<Vec<AccountMeta>> {
    let mut metas = Vec::new();
    for pool_id in batch_pool_ids(calls) {
        let staked_mint = staked_mint_of(pool_id)
            .ok_or_else(|| format_err!("pool {} is not registered", pool_id))?;
        let pool = get_pool_address(program_id, pool_id);
        metas.push(AccountMeta::new(pool, false));
        metas.push(AccountMeta::new(
            get_position_address(program_id, &pool, owner),
            false,
        ));
        metas.push(AccountMeta::new(get_pool_vault_address(program_id, &pool), false));
        metas.push(AccountMeta::new(
            get_owner_token_address(owner, &staked_mint, token_program),
            false,
        ));
        metas.push(AccountMeta::new_readonly(staked_mint, false));
    }
    Ok(metas)
}

fn program_for(config: &ClientConfig, signer_path: &str) -> Result<Program<Rc<Keypair>>> {
    let signer = read_keypair_file(signer_path)?;
    let url = Cluster::Custom(config.http_url.clone(), config.ws_url.clone());
    let client = Client::new(url, Rc::new(signer));
    Ok(client.program(config.um_farm_program)?)
}

pub fn initialise_farm_instr(
    config: &ClientConfig,
    admin: Pubkey,
    reward_mint: Pubkey,
    reward_per_slot_base: u64,
    reward_multiplier: u64,
    genesis_slot: u64,
    token_program: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.admin_path)?;
    let instructions = program
        .request()
        .accounts(farm_accounts::InitialiseFarm {
            owner: program.payer(),
            authority: get_authority_address(&program.id()),
            farm_config: get_farm_config_address(&program.id()),
            reward_mint,
            token_program,
            system_program: system_program::id(),
        })
        .args(farm_instructions::InitialiseFarm {
            admin,
            reward_per_slot_base,
            reward_multiplier,
            genesis_slot,
        })
        .instructions()?;
    Ok(instructions)
}

pub fn add_pool_instr(
    config: &ClientConfig,
    staked_mint: Pubkey,
    reward_mint: Pubkey,
    allocation_weight: u64,
    settle_existing: bool,
    pool_count: u64,
    token_program: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.admin_path)?;
    let pool = get_pool_address(&program.id(), pool_count);
    let mut request = program
        .request()
        .accounts(farm_accounts::AddPool {
            owner: program.payer(),
            authority: get_authority_address(&program.id()),
            farm_config: get_farm_config_address(&program.id()),
            pool,
            staked_mint,
            reward_mint,
            pool_vault: get_pool_vault_address(&program.id(), &pool),
            token_program,
            system_program: system_program::id(),
        })
        .args(farm_instructions::AddPool {
            allocation_weight,
            settle_existing,
        });
    if settle_existing {
        request = request.accounts(pool_list_metas(&program.id(), pool_count));
    }
    Ok(request.instructions()?)
}

pub fn set_pool_weight_instr(
    config: &ClientConfig,
    pool_id: u64,
    allocation_weight: u64,
    settle_existing: bool,
    pool_count: u64,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.admin_path)?;
    let remaining = if settle_existing {
        pool_list_metas(&program.id(), pool_count)
    } else {
        vec![AccountMeta::new(get_pool_address(&program.id(), pool_id), false)]
    };
    let instructions = program
        .request()
        .accounts(farm_accounts::SetPoolWeight {
            owner: program.payer(),
            farm_config: get_farm_config_address(&program.id()),
        })
        .accounts(remaining)
        .args(farm_instructions::SetPoolWeight {
            pool_id,
            allocation_weight,
            settle_existing,
        })
        .instructions()?;
    Ok(instructions)
}

pub fn set_reward_multiplier_instr(
    config: &ClientConfig,
    reward_multiplier: u64,
    pool_count: u64,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.admin_path)?;
    let instructions = program
        .request()
        .accounts(farm_accounts::SetRewardMultiplier {
            owner: program.payer(),
            farm_config: get_farm_config_address(&program.id()),
        })
        .accounts(pool_list_metas(&program.id(), pool_count))
        .args(farm_instructions::SetRewardMultiplier { reward_multiplier })
        .instructions()?;
    Ok(instructions)
}

pub fn update_pool_instr(config: &ClientConfig, pool_id: u64) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.payer_path)?;
    let instructions = program
        .request()
        .accounts(farm_accounts::UpdatePool {
            farm_config: get_farm_config_address(&program.id()),
            pool: get_pool_address(&program.id(), pool_id),
        })
        .args(farm_instructions::UpdatePool { pool_id })
        .instructions()?;
    Ok(instructions)
}

pub fn mass_update_pools_instr(config: &ClientConfig, pool_count: u64) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.payer_path)?;
    let instructions = program
        .request()
        .accounts(farm_accounts::MassUpdatePools {
            farm_config: get_farm_config_address(&program.id()),
        })
        .accounts(pool_list_metas(&program.id(), pool_count))
        .args(farm_instructions::MassUpdatePools {})
        .instructions()?;
    Ok(instructions)
}

pub fn deposit_instr(
    config: &ClientConfig,
    pool: &Pool,
    reward_mint: Pubkey,
    amount: u64,
    token_program: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.payer_path)?;
    let owner = program.payer();
    let pool_address = get_pool_address(&program.id(), pool.pool_id);
    let instructions = program
        .request()
        .accounts(farm_accounts::Deposit {
            owner,
            farm_config: get_farm_config_address(&program.id()),
            authority: get_authority_address(&program.id()),
            pool: pool_address,
            position: get_position_address(&program.id(), &pool_address, &owner),
            staked_mint: pool.staked_mint,
            pool_vault: pool.staked_vault,
            owner_staked_token: get_owner_token_address(&owner, &pool.staked_mint, &token_program),
            reward_mint,
            owner_reward_token: get_owner_token_address(&owner, &reward_mint, &token_program),
            token_program,
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .args(farm_instructions::Deposit {
            pool_id: pool.pool_id,
            amount,
        })
        .instructions()?;
    Ok(instructions)
}

pub fn withdraw_instr(
    config: &ClientConfig,
    pool: &Pool,
    reward_mint: Pubkey,
    amount: u64,
    token_program: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.payer_path)?;
    let owner = program.payer();
    let pool_address = get_pool_address(&program.id(), pool.pool_id);
    let instructions = program
        .request()
        .accounts(farm_accounts::Withdraw {
            owner,
            farm_config: get_farm_config_address(&program.id()),
            authority: get_authority_address(&program.id()),
            pool: pool_address,
            position: get_position_address(&program.id(), &pool_address, &owner),
            staked_mint: pool.staked_mint,
            pool_vault: pool.staked_vault,
            owner_staked_token: get_owner_token_address(&owner, &pool.staked_mint, &token_program),
            reward_mint,
            owner_reward_token: get_owner_token_address(&owner, &reward_mint, &token_program),
            token_program,
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .args(farm_instructions::Withdraw {
            pool_id: pool.pool_id,
            amount,
        })
        .instructions()?;
    Ok(instructions)
}

pub fn emergency_withdraw_instr(
    config: &ClientConfig,
    pool: &Pool,
    token_program: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.payer_path)?;
    let owner = program.payer();
    let pool_address = get_pool_address(&program.id(), pool.pool_id);
    let instructions = program
        .request()
        .accounts(farm_accounts::EmergencyWithdraw {
            owner,
            farm_config: get_farm_config_address(&program.id()),
            authority: get_authority_address(&program.id()),
            pool: pool_address,
            position: get_position_address(&program.id(), &pool_address, &owner),
            staked_mint: pool.staked_mint,
            pool_vault: pool.staked_vault,
            owner_staked_token: get_owner_token_address(&owner, &pool.staked_mint, &token_program),
            token_program,
        })
        .args(farm_instructions::EmergencyWithdraw {
            pool_id: pool.pool_id,
        })
        .instructions()?;
    Ok(instructions)
}

/// `position_exists` decides whether the optional position account is passed.
pub fn pending_reward_instr(
    config: &ClientConfig,
    pool_id: u64,
    participant: Pubkey,
    position_exists: bool,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.payer_path)?;
    let pool = get_pool_address(&program.id(), pool_id);
    let instructions = program
        .request()
        .accounts(farm_accounts::PendingReward {
            farm_config: get_farm_config_address(&program.id()),
            pool,
            position: position_exists
                .then(|| get_position_address(&program.id(), &pool, &participant)),
        })
        .args(farm_instructions::PendingReward {
            pool_id,
            participant,
        })
        .instructions()?;
    Ok(instructions)
}

pub fn execute_batch_instr(
    config: &ClientConfig,
    calls: Vec<BatchCall>,
    pools: &[Pool],
    reward_mint: Pubkey,
    token_program: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, &config.payer_path)?;
    let owner = program.payer();
    let remaining = batch_remaining_metas(
        &program.id(),
        &owner,
        &calls,
        |pool_id| {
            pools
                .iter()
                .find(|pool| pool.pool_id == pool_id)
                .map(|pool| pool.staked_mint)
        },
        &token_program,
    )?;
    let instructions = program
        .request()
        .accounts(farm_accounts::ExecuteBatch {
            owner,
            farm_config: get_farm_config_address(&program.id()),
            authority: get_authority_address(&program.id()),
            reward_mint,
            owner_reward_token: get_owner_token_address(&owner, &reward_mint, &token_program),
            token_program,
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .accounts(remaining)
        .args(farm_instructions::ExecuteBatch { calls })
        .instructions()?;
    Ok(instructions)
}
