use anchor_lang::prelude::*;

declare_id!("7kpgzHTDAW4LKx8bCFAvh5E2fmg4TfSMc1686K5EsqnX");

pub mod admin {
    use anchor_lang::prelude::declare_id;
    declare_id!("59gB785vT5vSH11YaCmFKQrC339xR8RRFfeDNG8FwTAh");
}

pub const AUTH_SEED: &str = "farm_authority";
pub const POOL_VAULT_SEED: &str = "pool_vault";

/// Scale of `Pool::acc_reward_per_share`.
pub const ACC_REWARD_PRECISION: u128 = 1_000_000_000_000;

/// Upper bound on calls in one `execute_batch`.
pub const MAX_BATCH_CALLS: usize = 16;

/// Upper bound on registered pools. Mass updates pass every pool as a
/// remaining account, and `add_pool` with settlement must still fit in one
/// legacy transaction.
pub const MAX_POOLS: u64 = 20;

pub mod error;
pub mod instructions;
pub mod ledger;
pub mod rewards;
pub mod states;
pub mod utils;

use instructions::*;
use ledger::BatchCall;

#[program]
pub mod um_farm {

    use super::*;

    pub fn initialise_farm(
        ctx: Context<InitialiseFarm>,
        admin: Pubkey,
        reward_per_slot_base: u64,
        reward_multiplier: u64,
        genesis_slot: u64,
    ) -> Result<()> {
        instructions::initialise_farm(
            ctx,
            admin,
            reward_per_slot_base,
            reward_multiplier,
            genesis_slot,
        )
    }

    pub fn add_pool<'info>(
        ctx: Context<'_, '_, '_, 'info, AddPool<'info>>,
        allocation_weight: u64,
        settle_existing: bool,
    ) -> Result<u64> {
        instructions::add_pool(ctx, allocation_weight, settle_existing)
    }

    pub fn set_pool_weight<'info>(
        ctx: Context<'_, '_, '_, 'info, SetPoolWeight<'info>>,
        pool_id: u64,
        allocation_weight: u64,
        settle_existing: bool,
    ) -> Result<()> {
        instructions::set_pool_weight(ctx, pool_id, allocation_weight, settle_existing)
    }

    pub fn set_reward_multiplier<'info>(
        ctx: Context<'_, '_, '_, 'info, SetRewardMultiplier<'info>>,
        reward_multiplier: u64,
    ) -> Result<()> {
        instructions::set_reward_multiplier(ctx, reward_multiplier)
    }

    pub fn update_pool(ctx: Context<UpdatePool>, pool_id: u64) -> Result<()> {
        instructions::update_pool(ctx, pool_id)
    }

    pub fn mass_update_pools<'info>(
        ctx: Context<'_, '_, '_, 'info, MassUpdatePools<'info>>,
    ) -> Result<()> {
        instructions::mass_update_pools(ctx)
    }

    pub fn deposit(ctx: Context<Deposit>, pool_id: u64, amount: u64) -> Result<()> {
        instructions::deposit(ctx, pool_id, amount)
    }

    pub fn withdraw(ctx: Context<Withdraw>, pool_id: u64, amount: u64) -> Result<()> {
        instructions::withdraw(ctx, pool_id, amount)
    }

    pub fn emergency_withdraw(ctx: Context<EmergencyWithdraw>, pool_id: u64) -> Result<()> {
        instructions::emergency_withdraw(ctx, pool_id)
    }

    pub fn pending_reward(
        ctx: Context<PendingReward>,
        pool_id: u64,
        participant: Pubkey,
    ) -> Result<u64> {
        instructions::pending_reward(ctx, pool_id, participant)
    }

    pub fn execute_batch<'info>(
        ctx: Context<'_, '_, '_, 'info, ExecuteBatch<'info>>,
        calls: Vec<BatchCall>,
    ) -> Result<()> {
        instructions::execute_batch(ctx, calls)
    }
}
