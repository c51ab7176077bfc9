//! Reward issuance and entitlement calculations

use crate::{error::ErrorCode, rewards::fixed_point::mul_div_floor, ACC_REWARD_PRECISION};
use anchor_lang::prelude::*;

/// Stateless reward math shared by pool accrual, settlement and projections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardCalculator {}

impl RewardCalculator {
    /// Reward issued to one pool over `slots_elapsed` slots.
    ///
    /// `slots_elapsed * reward_per_slot * allocation_weight / total_allocation_weight`,
    /// floored. A farm without any weight issues nothing.
    pub fn issued_reward(
        slots_elapsed: u64,
        reward_per_slot: u64,
        allocation_weight: u64,
        total_allocation_weight: u64,
    ) -> Result<u128> {
        if total_allocation_weight == 0 {
            return Ok(0);
        }
        let farm_issuance = u128::from(slots_elapsed)
            .checked_mul(u128::from(reward_per_slot))
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        let issued = mul_div_floor(
            farm_issuance,
            u128::from(allocation_weight),
            u128::from(total_allocation_weight),
        )
        .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(issued)
    }

    /// Accumulator increase for `issued` reward spread over `total_staked`.
    pub fn acc_increment(issued: u128, total_staked: u64) -> Result<u128> {
        require_gt!(total_staked, 0, ErrorCode::ArithmeticOverflow);
        let increment = mul_div_floor(issued, ACC_REWARD_PRECISION, u128::from(total_staked))
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(increment)
    }

    /// Reward earned by `staked_amount` since the accumulator was zero.
    pub fn accrued(staked_amount: u64, acc_reward_per_share: u128) -> Result<u128> {
        let accrued = mul_div_floor(
            u128::from(staked_amount),
            acc_reward_per_share,
            ACC_REWARD_PRECISION,
        )
        .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(accrued)
    }

    /// Unclaimed entitlement: `accrued(staked, acc) - reward_debt`.
    pub fn pending(
        staked_amount: u64,
        acc_reward_per_share: u128,
        reward_debt: u128,
    ) -> Result<u64> {
        let pending = Self::accrued(staked_amount, acc_reward_per_share)?
            .checked_sub(reward_debt)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        let pending = u64::try_from(pending).map_err(|_| ErrorCode::ArithmeticOverflow)?;
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_reward_splits_by_weight() {
        // 100 of 250 points at 1_000_000 per slot.
        assert_eq!(
            RewardCalculator::issued_reward(1, 1_000_000, 100, 250).unwrap(),
            400_000
        );
        assert_eq!(
            RewardCalculator::issued_reward(2, 1_000_000, 150, 250).unwrap(),
            1_200_000
        );
    }

    #[test]
    fn weightless_farm_issues_nothing() {
        assert_eq!(RewardCalculator::issued_reward(10, 5, 0, 0).unwrap(), 0);
    }

    #[test]
    fn issued_reward_handles_extreme_inputs() {
        let issued =
            RewardCalculator::issued_reward(u64::MAX, u64::MAX, u64::MAX, u64::MAX).unwrap();
        assert_eq!(issued, u128::from(u64::MAX) * u128::from(u64::MAX));
    }

    #[test]
    fn acc_increment_is_scaled_and_floored() {
        assert_eq!(
            RewardCalculator::acc_increment(400_000, 1_000_000).unwrap(),
            400_000_000_000
        );
        assert_eq!(RewardCalculator::acc_increment(1, 3).unwrap(), 333_333_333_333);
    }

    #[test]
    fn acc_increment_rejects_empty_pool() {
        assert!(RewardCalculator::acc_increment(1, 0).is_err());
    }

    #[test]
    fn pending_subtracts_reward_debt() {
        let acc = 400_000_000_000;
        assert_eq!(RewardCalculator::pending(1_000_000, acc, 0).unwrap(), 400_000);
        assert_eq!(
            RewardCalculator::pending(1_000_000, acc, 400_000).unwrap(),
            0
        );
    }

    #[test]
    fn pending_below_debt_is_an_error() {
        assert_eq!(
            RewardCalculator::pending(1, 0, 1).unwrap_err(),
            error!(ErrorCode::ArithmeticOverflow)
        );
    }
}
