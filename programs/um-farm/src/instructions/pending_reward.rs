use crate::states::*;
use anchor_lang::prelude::*;

/// Read-only view of one participant's claimable reward.
///
/// `position` is optional: a participant who never deposited has nothing pending.
#[derive(Accounts)]
#[instruction(pool_id: u64, participant: Pubkey)]
pub struct PendingReward<'info> {
    #[account(
        seeds = [FARM_CONFIG_SEED.as_bytes()],
        bump = farm_config.bump,
    )]
    pub farm_config: Account<'info, FarmConfig>,

    #[account(
        seeds = [POOL_SEED.as_bytes(), &Pool::seeds(pool_id)],
        bump = pool.bump,
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        seeds = [
            POSITION_SEED.as_bytes(),
            pool.key().as_ref(),
            participant.as_ref(),
        ],
        bump = position.bump,
    )]
    pub position: Option<Account<'info, Position>>,
}

/// Reward `participant` would receive if they settled in the current slot.
///
/// Projects the pool accumulator forward without storing it, so repeated calls
/// within a slot agree and no account is written.
pub fn pending_reward(ctx: Context<PendingReward>, pool_id: u64, participant: Pubkey) -> Result<u64> {
    let farm_config = &ctx.accounts.farm_config;
    farm_config.require_pool_id(pool_id)?;

    let Some(position) = ctx.accounts.position.as_ref() else {
        return Ok(0);
    };
    let current_slot = Clock::get()?.slot;
    let acc_reward_per_share = ctx
        .accounts
        .pool
        .projected_acc_reward_per_share(farm_config, current_slot)?;
    let pending = position.pending_reward(acc_reward_per_share)?;

    msg!(
        "Pending reward of {} in pool {}: {}",
        participant,
        pool_id,
        pending
    );
    Ok(pending)
}
