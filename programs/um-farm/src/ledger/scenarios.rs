//! Multi-participant reward flows run end to end through the ledger.

use anchor_lang::prelude::*;
use proptest::prelude::*;
use quickcheck::quickcheck;

use crate::ledger::{
    forfeit_position, mass_update, register_pool, settle_position, StakeChange,
};
use crate::states::{FarmConfig, Pool, Position};

const RATE: u64 = 1_000_000;

fn farm() -> FarmConfig {
    FarmConfig {
        reward_per_slot_base: RATE,
        reward_multiplier: 1,
        ..Default::default()
    }
}

fn pool(farm: &mut FarmConfig, weight: u64, slot: u64) -> Pool {
    let mut pool = Pool::default();
    register_pool(
        farm,
        &mut pool,
        weight,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        slot,
    )
    .unwrap();
    pool
}

fn pending(farm: &FarmConfig, pool: &Pool, position: &Position, slot: u64) -> u64 {
    let acc = pool.projected_acc_reward_per_share(farm, slot).unwrap();
    position.pending_reward(acc).unwrap()
}

#[test]
fn sole_staker_accrues_weighted_share_per_slot() {
    let mut farm = farm();
    let mut pool0 = pool(&mut farm, 100, 0);
    let _pool1 = pool(&mut farm, 150, 0);
    let mut alice = Position::default();

    settle_position(&farm, &mut pool0, &mut alice, StakeChange::Deposit(1_000), 10).unwrap();
    assert_eq!(pending(&farm, &pool0, &alice, 11), 400_000);
    assert_eq!(pending(&farm, &pool0, &alice, 12), 800_000);
    assert_eq!(pending(&farm, &pool0, &alice, 12), 800_000);
}

#[test]
fn late_joiner_starts_from_zero() {
    let mut farm = farm();
    let mut pool = pool(&mut farm, 1, 0);
    let mut alice = Position::default();
    let mut bob = Position::default();

    settle_position(&farm, &mut pool, &mut alice, StakeChange::Deposit(4), 0).unwrap();
    let entry = settle_position(&farm, &mut pool, &mut bob, StakeChange::Deposit(7), 50).unwrap();

    assert_eq!(entry.pending, 0);
    assert_eq!(pending(&farm, &pool, &bob, 50), 0);
    assert_eq!(pending(&farm, &pool, &alice, 50), 50 * RATE);
}

#[test]
fn new_stake_does_not_dilute_earned_reward() {
    let mut farm = farm();
    let mut pool = pool(&mut farm, 1, 0);
    let mut alice = Position::default();
    let mut bob = Position::default();

    settle_position(&farm, &mut pool, &mut alice, StakeChange::Deposit(100), 0).unwrap();
    settle_position(&farm, &mut pool, &mut bob, StakeChange::Deposit(900), 10).unwrap();

    // 10 slots alone, then 10 slots holding a tenth of the pool.
    assert_eq!(pending(&farm, &pool, &alice, 20), 10 * RATE + RATE);
    assert_eq!(pending(&farm, &pool, &bob, 20), 9 * RATE);
}

#[test]
fn empty_pool_slots_issue_nothing() {
    let mut farm = farm();
    let mut pool = pool(&mut farm, 1, 0);
    let mut alice = Position::default();

    settle_position(&farm, &mut pool, &mut alice, StakeChange::Deposit(10), 0).unwrap();
    let exit = settle_position(&farm, &mut pool, &mut alice, StakeChange::Withdraw(10), 5).unwrap();
    assert_eq!(exit.pending, 5 * RATE);

    settle_position(&farm, &mut pool, &mut alice, StakeChange::Deposit(10), 100).unwrap();
    assert_eq!(pending(&farm, &pool, &alice, 101), RATE);
    assert_eq!(alice.total_reward_claimed, 5 * RATE);
}

#[test]
fn mass_update_keeps_positions_whole() {
    let mut farm = farm();
    let mut pools = vec![pool(&mut farm, 1, 0), pool(&mut farm, 3, 0)];
    let mut alice = Position::default();

    settle_position(&farm, &mut pools[1], &mut alice, StakeChange::Deposit(8), 0).unwrap();
    let issued = mass_update(&farm, &mut pools, 4).unwrap();

    assert_eq!(issued, 3 * u128::from(RATE));
    assert_eq!(pending(&farm, &pools[1], &alice, 4), 3 * RATE);
    assert_eq!(pools[0].last_accrual_slot, 4);
}

#[derive(Clone, Debug)]
enum Step {
    Deposit { user: usize, amount: u64 },
    Withdraw { user: usize, percent: u64 },
    Harvest { user: usize },
    Emergency { user: usize },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..3, 1u64..1_000_000_000).prop_map(|(user, amount)| Step::Deposit { user, amount }),
        (0usize..3, 0u64..=100).prop_map(|(user, percent)| Step::Withdraw { user, percent }),
        (0usize..3).prop_map(|user| Step::Harvest { user }),
        (0usize..3).prop_map(|user| Step::Emergency { user }),
    ]
}

proptest! {
    #[test]
    fn paid_and_owed_reward_matches_issuance(
        steps in proptest::collection::vec((step(), 0u64..50), 1..40),
    ) {
        let mut farm = farm();
        let mut pool = pool(&mut farm, 1, 0);
        let mut positions = vec![Position::default(); 3];

        let mut slot = 0u64;
        let mut issued = 0u128;
        let mut paid = 0u128;
        for (step, elapsed) in steps.iter() {
            if pool.total_staked > 0 {
                issued += u128::from(*elapsed) * u128::from(RATE);
            }
            slot += elapsed;
            match *step {
                Step::Deposit { user, amount } => {
                    let s = settle_position(&farm, &mut pool, &mut positions[user], StakeChange::Deposit(amount), slot).unwrap();
                    paid += u128::from(s.pending);
                }
                Step::Withdraw { user, percent } => {
                    let amount = positions[user].staked_amount * percent / 100;
                    let s = settle_position(&farm, &mut pool, &mut positions[user], StakeChange::Withdraw(amount), slot).unwrap();
                    paid += u128::from(s.pending);
                }
                Step::Harvest { user } => {
                    let s = settle_position(&farm, &mut pool, &mut positions[user], StakeChange::Deposit(0), slot).unwrap();
                    paid += u128::from(s.pending);
                }
                Step::Emergency { user } => {
                    let exit = forfeit_position(&farm, &mut pool, &mut positions[user], slot).unwrap();
                    paid += u128::from(exit.forfeited_reward);
                }
            }
            let staked: u64 = positions.iter().map(|p| p.staked_amount).sum();
            prop_assert_eq!(pool.total_staked, staked);
        }

        let owed: u128 = positions
            .iter()
            .map(|position| u128::from(pending(&farm, &pool, position, slot)))
            .sum();
        // Each accumulator step and each settlement rounds by less than one unit.
        let rounding = (steps.len() as u128 + 1) * (positions.len() as u128 + 1);
        prop_assert!(issued.abs_diff(paid + owed) <= rounding);
    }
}

quickcheck! {
    fn projected_pending_matches_settled_pending(staked: u32, first: u16, second: u16) -> bool {
        let staked = u64::from(staked) + 1;
        let mut farm = farm();
        let mut pool = pool(&mut farm, 1, 0);
        let mut alice = Position::default();
        settle_position(&farm, &mut pool, &mut alice, StakeChange::Deposit(staked), u64::from(first)).unwrap();

        let slot = u64::from(first) + u64::from(second);
        let viewed = pending(&farm, &pool, &alice, slot);
        let viewed_again = pending(&farm, &pool, &alice, slot);
        let harvested = settle_position(&farm, &mut pool, &mut alice, StakeChange::Deposit(0), slot)
            .unwrap()
            .pending;
        viewed == viewed_again && viewed == harvested
    }
}
