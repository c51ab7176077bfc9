use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::rewards::RewardCalculator;

//
// ──────────────────────────────────────────────────────────────────────────────
// Position Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive position accounts (`POSITION_SEED + pool + owner`).
pub const POSITION_SEED: &str = "position";

/// One participant's stake in one pool.
///
/// Created lazily by the first `deposit` into a pool and never closed.
///
/// `reward_debt` is the reward the current stake had already earned (or been
/// paid) at the last settlement, so the unclaimed entitlement is always
/// `staked_amount * acc_reward_per_share / ACC_REWARD_PRECISION - reward_debt`.
#[account]
#[derive(Default, Debug)]
pub struct Position {
    /// PDA bump for this account.
    pub bump: u8,

    /// Pool this position stakes into.
    pub pool: Pubkey,

    /// Participant owning the stake.
    pub owner: Pubkey,

    /// Amount currently staked.
    pub staked_amount: u64,

    /// Settlement baseline in reward units. Zero whenever `staked_amount` is zero.
    pub reward_debt: u128,

    /// Total UM minted to this position's owner.
    pub total_reward_claimed: u64,
}

impl Position {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32 * 2: two Pubkeys
    /// - 8 * 2: two u64 fields
    /// - 16: one u128 field
    pub const LEN: usize = 8 + 1 + 32 * 2 + 8 * 2 + 16;

    pub fn is_initialized(&self) -> bool {
        self.owner != Pubkey::default()
    }

    pub fn pending_reward(&self, acc_reward_per_share: u128) -> Result<u64> {
        RewardCalculator::pending(self.staked_amount, acc_reward_per_share, self.reward_debt)
    }

    /// Re-bases `reward_debt` on the current stake.
    pub fn checkpoint(&mut self, acc_reward_per_share: u128) -> Result<()> {
        self.reward_debt = RewardCalculator::accrued(self.staked_amount, acc_reward_per_share)?;
        Ok(())
    }

    pub fn record_claim(&mut self, amount: u64) -> Result<()> {
        self.total_reward_claimed = self
            .total_reward_claimed
            .checked_add(amount)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_position_has_nothing_pending() {
        let position = Position::default();
        assert!(!position.is_initialized());
        assert_eq!(position.pending_reward(123_456_789).unwrap(), 0);
    }

    #[test]
    fn checkpoint_clears_pending() {
        let mut position = Position {
            staked_amount: 1_000_000,
            ..Default::default()
        };
        let acc = 400_000_000_000;
        assert_eq!(position.pending_reward(acc).unwrap(), 400_000);
        position.checkpoint(acc).unwrap();
        assert_eq!(position.reward_debt, 400_000);
        assert_eq!(position.pending_reward(acc).unwrap(), 0);
        assert_eq!(position.pending_reward(2 * acc).unwrap(), 400_000);
    }

    #[test]
    fn checkpoint_with_no_stake_zeroes_debt() {
        let mut position = Position {
            reward_debt: 99,
            ..Default::default()
        };
        position.checkpoint(u128::MAX).unwrap();
        assert_eq!(position.reward_debt, 0);
    }
}
