use anchor_lang::prelude::*;

use crate::error::ErrorCode;

//
// ──────────────────────────────────────────────────────────────────────────────
// Farm Configuration Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the farm configuration account.
pub const FARM_CONFIG_SEED: &str = "farm_config";

/// Global reward rate and registry totals shared by every pool.
///
/// Created once by `initialise_farm`. The rate fields decide how much UM is
/// issued per slot across the whole farm; `total_allocation_weight` decides how
/// that issuance is split between pools.
#[account]
#[derive(Default, Debug)]
pub struct FarmConfig {
    /// PDA bump for this account.
    pub bump: u8,

    /// Holder of the administrative capability (pool registry, rate changes).
    pub admin: Pubkey,

    /// Reward mint. The farm authority PDA must be its mint authority.
    pub reward_mint: Pubkey,

    /// Reward units issued per slot, before the multiplier.
    pub reward_per_slot_base: u64,

    /// Administrative scaling factor applied to `reward_per_slot_base`.
    pub reward_multiplier: u64,

    /// No reward accrues for slots before this one.
    pub genesis_slot: u64,

    /// Sum of `allocation_weight` over every pool.
    pub total_allocation_weight: u64,

    /// Number of pools ever added; the next pool receives this id.
    pub pool_count: u64,
}

impl FarmConfig {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32 * 2: two Pubkeys
    /// - 8 * 5: five u64 fields
    pub const LEN: usize = 8 + 1 + 32 * 2 + 8 * 5;

    pub fn is_admin(&self, key: &Pubkey) -> bool {
        self.admin == *key || *key == crate::admin::id()
    }

    /// Effective issuance per slot: `reward_per_slot_base * reward_multiplier`.
    pub fn reward_per_slot(&self) -> Result<u64> {
        self.reward_per_slot_base
            .checked_mul(self.reward_multiplier)
            .ok_or_else(|| error!(ErrorCode::ArithmeticOverflow))
    }

    /// First slot a pool created at `current_slot` starts accruing from.
    pub fn accrual_start(&self, current_slot: u64) -> u64 {
        current_slot.max(self.genesis_slot)
    }

    pub fn require_pool_id(&self, pool_id: u64) -> Result<()> {
        require!(pool_id < self.pool_count, ErrorCode::InvalidPool);
        Ok(())
    }
}
