use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: Emitted for off-chain indexers/clients to track farm state changes
// ──────────────────────────────────────────────────────────────────────────────
//

/// Emitted once when the farm configuration is initialized.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct FarmInitialized {
    /// Farm admin.
    pub admin: Pubkey,
    /// Reward mint minted by the farm authority.
    pub reward_mint: Pubkey,
    /// Reward units per slot before the multiplier.
    pub reward_per_slot_base: u64,
    /// Initial multiplier.
    pub reward_multiplier: u64,
    /// First slot that accrues reward.
    pub genesis_slot: u64,
}

/// Emitted when a pool is appended to the registry.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct PoolAdded {
    pub pool_id: u64,
    pub staked_mint: Pubkey,
    pub allocation_weight: u64,
    /// Registry total after the pool was added.
    pub total_allocation_weight: u64,
    /// Whether every existing pool was settled first.
    pub settled_existing: bool,
}

/// Emitted when a pool's allocation weight changes.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct PoolWeightUpdated {
    pub pool_id: u64,
    pub previous_weight: u64,
    pub allocation_weight: u64,
    pub total_allocation_weight: u64,
    pub settled_existing: bool,
}

/// Emitted when the admin changes the reward multiplier.
///
/// Every pool has been advanced at `previous_multiplier` up to `slot`.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardMultiplierUpdated {
    pub previous_multiplier: u64,
    pub reward_multiplier: u64,
    pub slot: u64,
}

/// Emitted by `update_pool` after the accumulator moved.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct PoolUpdated {
    pub pool_id: u64,
    /// Reward issued to the pool by this update.
    pub issued: u128,
    pub acc_reward_per_share: u128,
    pub last_accrual_slot: u64,
}

/// Emitted when stake enters a pool (zero for a pure harvest).
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Deposited {
    pub owner: Pubkey,
    pub pool_id: u64,
    pub amount: u64,
    /// Owner's stake after the deposit.
    pub staked_amount: u64,
}

/// Emitted when stake leaves a pool.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Withdrawn {
    pub owner: Pubkey,
    pub pool_id: u64,
    pub amount: u64,
    /// Owner's stake after the withdrawal.
    pub staked_amount: u64,
}

/// Emitted whenever settlement mints pending reward to a participant.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardHarvested {
    pub owner: Pubkey,
    pub pool_id: u64,
    pub amount: u64,
}

/// Emitted when a participant pulls their whole stake and forfeits pending reward.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct EmergencyWithdrawn {
    pub owner: Pubkey,
    pub pool_id: u64,
    pub amount: u64,
    pub forfeited_reward: u64,
}

/// Emitted once per successful `execute_batch`.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct BatchExecuted {
    pub owner: Pubkey,
    pub calls: u32,
    /// Sum of reward minted across every call.
    pub reward_minted: u64,
}
