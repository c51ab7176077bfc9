use anyhow::{format_err, Result};
use clap::Parser;
use configparser::ini::Ini;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use std::str::FromStr;
use um_farm::ledger::{BatchAction, BatchCall};

mod instructions;
use instructions::farm_instructions::*;
use instructions::rpc::*;
use instructions::utils::*;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    http_url: String,
    ws_url: String,
    payer_path: String,
    admin_path: String,
    um_farm_program: Pubkey,
}

fn required(config: &Ini, key: &str) -> Result<String> {
    let value = config
        .get("Global", key)
        .ok_or_else(|| format_err!("{} is missing from [Global]", key))?;
    if value.is_empty() {
        return Err(format_err!("{} must not be empty", key));
    }
    Ok(value)
}

fn parse_cfg(config: &Ini) -> Result<ClientConfig> {
    let program_str = required(config, "um_farm_program")?;
    let um_farm_program = Pubkey::from_str(&program_str)
        .map_err(|e| format_err!("invalid um_farm_program {}: {}", program_str, e))?;
    Ok(ClientConfig {
        http_url: required(config, "http_url")?,
        ws_url: required(config, "ws_url")?,
        payer_path: required(config, "payer_path")?,
        admin_path: required(config, "admin_path")?,
        um_farm_program,
    })
}

fn load_cfg(client_config: &str) -> Result<ClientConfig> {
    let mut config = Ini::new();
    config
        .load(client_config)
        .map_err(|e| format_err!("failed to load {}: {}", client_config, e))?;
    parse_cfg(&config)
}

fn read_keypair_file(s: &str) -> Result<Keypair> {
    solana_sdk::signature::read_keypair_file(s)
        .map_err(|_| format_err!("failed to read keypair from {}", s))
}

fn sign_and_send(
    rpc_client: &RpcClient,
    instructions: &[Instruction],
    signer: &Keypair,
) -> Result<()> {
    let signers = vec![signer];
    let recent_hash = rpc_client.get_latest_blockhash()?;
    let txn = Transaction::new_signed_with_payer(
        instructions,
        Some(&signer.pubkey()),
        &signers,
        recent_hash,
    );
    let signature = send_txn(rpc_client, &txn, true)?;
    println!("{}", signature);
    Ok(())
}

#[derive(Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub command: UmFarmCommands,
}

#[derive(Debug, Parser)]
pub enum UmFarmCommands {
    InitialiseFarm {
        #[arg(long)]
        admin: Pubkey,
        #[arg(long)]
        reward_mint: Pubkey,
        #[arg(long)]
        reward_per_slot_base: u64,
        #[arg(long, default_value_t = 1)]
        reward_multiplier: u64,
        #[arg(long, default_value_t = 0)]
        genesis_slot: u64,
    },
    AddPool {
        #[arg(long)]
        staked_mint: Pubkey,
        #[arg(long)]
        allocation_weight: u64,
        #[arg(long)]
        settle_existing: bool,
    },
    SetPoolWeight {
        #[arg(long)]
        pool_id: u64,
        #[arg(long)]
        allocation_weight: u64,
        #[arg(long)]
        settle_existing: bool,
    },
    SetRewardMultiplier {
        #[arg(long)]
        reward_multiplier: u64,
    },
    UpdatePool {
        #[arg(long)]
        pool_id: u64,
    },
    MassUpdatePools {},
    Deposit {
        #[arg(long)]
        pool_id: u64,
        #[arg(long)]
        amount: u64,
    },
    Withdraw {
        #[arg(long)]
        pool_id: u64,
        #[arg(long)]
        amount: u64,
    },
    Harvest {
        #[arg(long)]
        pool_id: u64,
    },
    /// Harvests several pools in one atomic batch.
    HarvestAll {
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        pool_ids: Vec<u64>,
    },
    EmergencyWithdraw {
        #[arg(long)]
        pool_id: u64,
    },
    PendingReward {
        #[arg(long)]
        pool_id: u64,
        /// Defaults to the payer.
        #[arg(long)]
        participant: Option<Pubkey>,
    },
    ListPools {},
    ShowPosition {
        #[arg(long)]
        pool_id: u64,
        /// Defaults to the payer.
        #[arg(long)]
        owner: Option<Pubkey>,
    },
}

fn main() -> Result<()> {
    let client_config = "client_config.ini";
    let farm_config = load_cfg(client_config)?;
    let program_id = farm_config.um_farm_program;
    let payer = read_keypair_file(&farm_config.payer_path)?;
    let rpc_client = RpcClient::new(farm_config.http_url.to_string());

    let opts = Opts::parse();
    match opts.command {
        UmFarmCommands::InitialiseFarm {
            admin,
            reward_mint,
            reward_per_slot_base,
            reward_multiplier,
            genesis_slot,
        } => {
            let token_program = get_token_program(&rpc_client, &reward_mint)?;
            let instructions = initialise_farm_instr(
                &farm_config,
                admin,
                reward_mint,
                reward_per_slot_base,
                reward_multiplier,
                genesis_slot,
                token_program,
            )?;
            let admin_keypair = read_keypair_file(&farm_config.admin_path)?;
            sign_and_send(&rpc_client, &instructions, &admin_keypair)?;
        }
        UmFarmCommands::AddPool {
            staked_mint,
            allocation_weight,
            settle_existing,
        } => {
            let state = load_farm_config(&rpc_client, &program_id)?;
            if state.pool_count >= um_farm::MAX_POOLS {
                return Err(format_err!("farm already holds {} pools", state.pool_count));
            }
            let token_program = get_token_program(&rpc_client, &staked_mint)?;
            let reward_token_program = get_token_program(&rpc_client, &state.reward_mint)?;
            if token_program != reward_token_program {
                return Err(format_err!(
                    "{} is owned by {} but the reward mint by {}",
                    staked_mint,
                    token_program,
                    reward_token_program
                ));
            }
            let instructions = add_pool_instr(
                &farm_config,
                staked_mint,
                state.reward_mint,
                allocation_weight,
                settle_existing,
                state.pool_count,
                token_program,
            )?;
            let admin_keypair = read_keypair_file(&farm_config.admin_path)?;
            sign_and_send(&rpc_client, &instructions, &admin_keypair)?;
            println!("pool id: {}", state.pool_count);
        }
        UmFarmCommands::SetPoolWeight {
            pool_id,
            allocation_weight,
            settle_existing,
        } => {
            let state = load_farm_config(&rpc_client, &program_id)?;
            let instructions = set_pool_weight_instr(
                &farm_config,
                pool_id,
                allocation_weight,
                settle_existing,
                state.pool_count,
            )?;
            let admin_keypair = read_keypair_file(&farm_config.admin_path)?;
            sign_and_send(&rpc_client, &instructions, &admin_keypair)?;
        }
        UmFarmCommands::SetRewardMultiplier { reward_multiplier } => {
            let state = load_farm_config(&rpc_client, &program_id)?;
            let instructions =
                set_reward_multiplier_instr(&farm_config, reward_multiplier, state.pool_count)?;
            let admin_keypair = read_keypair_file(&farm_config.admin_path)?;
            sign_and_send(&rpc_client, &instructions, &admin_keypair)?;
        }
        UmFarmCommands::UpdatePool { pool_id } => {
            let instructions = update_pool_instr(&farm_config, pool_id)?;
            sign_and_send(&rpc_client, &instructions, &payer)?;
        }
        UmFarmCommands::MassUpdatePools {} => {
            let state = load_farm_config(&rpc_client, &program_id)?;
            let instructions = mass_update_pools_instr(&farm_config, state.pool_count)?;
            sign_and_send(&rpc_client, &instructions, &payer)?;
        }
        UmFarmCommands::Deposit { pool_id, amount } => {
            let state = load_farm_config(&rpc_client, &program_id)?;
            let pool = load_pool(&rpc_client, &program_id, pool_id)?;
            let token_program = get_token_program(&rpc_client, &state.reward_mint)?;
            let instructions =
                deposit_instr(&farm_config, &pool, state.reward_mint, amount, token_program)?;
            sign_and_send(&rpc_client, &instructions, &payer)?;
        }
        UmFarmCommands::Harvest { pool_id } => {
            // A zero deposit settles and pays the pending reward.
            let amount = 0;
            let state = load_farm_config(&rpc_client, &program_id)?;
            let pool = load_pool(&rpc_client, &program_id, pool_id)?;
            let token_program = get_token_program(&rpc_client, &state.reward_mint)?;
            let instructions =
                deposit_instr(&farm_config, &pool, state.reward_mint, amount, token_program)?;
            sign_and_send(&rpc_client, &instructions, &payer)?;
        }
        UmFarmCommands::Withdraw { pool_id, amount } => {
            let state = load_farm_config(&rpc_client, &program_id)?;
            let pool = load_pool(&rpc_client, &program_id, pool_id)?;
            let token_program = get_token_program(&rpc_client, &state.reward_mint)?;
            let instructions =
                withdraw_instr(&farm_config, &pool, state.reward_mint, amount, token_program)?;
            sign_and_send(&rpc_client, &instructions, &payer)?;
        }
        UmFarmCommands::HarvestAll { pool_ids } => {
            let state = load_farm_config(&rpc_client, &program_id)?;
            let pools = load_pools(&rpc_client, &program_id, state.pool_count)?;
            let token_program = get_token_program(&rpc_client, &state.reward_mint)?;
            let calls = pool_ids
                .into_iter()
                .map(|pool_id| BatchCall {
                    pool_id,
                    action: BatchAction::Harvest,
                })
                .collect();
            let instructions =
                execute_batch_instr(&farm_config, calls, &pools, state.reward_mint, token_program)?;
            sign_and_send(&rpc_client, &instructions, &payer)?;
        }
        UmFarmCommands::EmergencyWithdraw { pool_id } => {
            let pool = load_pool(&rpc_client, &program_id, pool_id)?;
            let token_program = get_token_program(&rpc_client, &pool.staked_mint)?;
            let instructions = emergency_withdraw_instr(&farm_config, &pool, token_program)?;
            sign_and_send(&rpc_client, &instructions, &payer)?;
        }
        UmFarmCommands::PendingReward {
            pool_id,
            participant,
        } => {
            let participant = participant.unwrap_or_else(|| payer.pubkey());
            let position_exists =
                load_position(&rpc_client, &program_id, pool_id, &participant)?.is_some();
            let instructions =
                pending_reward_instr(&farm_config, pool_id, participant, position_exists)?;
            let data = simulate_return_data(&rpc_client, &instructions, &payer.pubkey())?;
            println!("{}", decode_u64_return(&data)?);
        }
        UmFarmCommands::ListPools {} => {
            let state = load_farm_config(&rpc_client, &program_id)?;
            let pools = load_pools(&rpc_client, &program_id, state.pool_count)?;
            let views: Vec<PoolView> = pools
                .iter()
                .map(|pool| PoolView::new(&program_id, pool))
                .collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        UmFarmCommands::ShowPosition { pool_id, owner } => {
            let owner = owner.unwrap_or_else(|| payer.pubkey());
            let state = load_farm_config(&rpc_client, &program_id)?;
            let pool = load_pool(&rpc_client, &program_id, pool_id)?;
            let position = load_position(&rpc_client, &program_id, pool_id, &owner)?
                .ok_or_else(|| format_err!("{} has no position in pool {}", owner, pool_id))?;
            let slot = rpc_client.get_slot()?;
            let acc_reward_per_share = pool.projected_acc_reward_per_share(&state, slot)?;
            let view = PositionView {
                pool_id,
                owner: owner.to_string(),
                staked_amount: position.staked_amount,
                reward_debt: position.reward_debt.to_string(),
                total_reward_claimed: position.total_reward_claimed,
                pending_reward: position.pending_reward(acc_reward_per_share)?,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}
