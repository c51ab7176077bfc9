//! Floor-rounded fixed-point helpers for the reward accumulator.

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

/// `floor(a * b / denominator)`.
///
/// The product is formed in 256 bits, so only a quotient that does not fit in
/// `u128` (or a zero denominator) yields `None`.
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let quotient = U256::from(a)
        .checked_mul(U256::from(b))?
        .checked_div(U256::from(denominator))?;
    if quotient > U256::from(u128::MAX) {
        return None;
    }
    Some(quotient.as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rounds_toward_zero() {
        assert_eq!(mul_div_floor(7, 3, 2), Some(10));
        assert_eq!(mul_div_floor(1, 1, 3), Some(0));
    }

    #[test]
    fn wide_intermediate_does_not_overflow() {
        let scale = 1_000_000_000_000u128;
        assert_eq!(mul_div_floor(u128::MAX, scale, scale), Some(u128::MAX));
    }

    #[test]
    fn oversized_quotient_or_zero_denominator_is_none() {
        assert_eq!(mul_div_floor(u128::MAX, 2, 1), None);
        assert_eq!(mul_div_floor(1, 1, 0), None);
    }

    proptest! {
        #[test]
        fn matches_native_arithmetic_when_it_fits(
            a in 0u128..u64::MAX as u128,
            b in 0u128..u64::MAX as u128,
            d in 1u128..u64::MAX as u128,
        ) {
            prop_assert_eq!(mul_div_floor(a, b, d), Some(a * b / d));
        }
    }
}
