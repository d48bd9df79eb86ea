//! Integration tests for GOLD staking and daily fee distribution
//!
//! Runs a year of daily payouts against a stream of fee-paying transfers.

use goldex_core::prelude::*;
use goldex_economics::{Protocol, ProtocolConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

const START: Timestamp = 1_700_000_000;
const DAY: i64 = ONE_DAY_SECS;

fn setup() -> (Protocol, Arc<ManualClock>, Address) {
    let clock = Arc::new(ManualClock::new(START));
    let config = ProtocolConfig::default();
    let owner = config.owner;
    let protocol = Protocol::deploy(config, clock.clone()).unwrap();
    (protocol, clock, owner)
}

fn traders() -> [Address; 4] {
    [
        Address::derive("trader/0"),
        Address::derive("trader/1"),
        Address::derive("trader/2"),
        Address::derive("trader/3"),
    ]
}

/// Fund a random trader and let it pay a random transfer
fn random_transfer(p: &mut Protocol, owner: Address, rng: &mut ChaCha8Rng) -> u128 {
    let accounts = traders();
    let from = accounts[rng.gen_range(0..accounts.len())];
    let to = accounts[rng.gen_range(0..accounts.len())];
    let amount = rng.gen_range(100..=10_000) * ONE_GBAR;
    p.mint_gbar(owner, amount).unwrap();
    p.gbar_vault_withdraw_to(owner, from, amount).unwrap();
    p.gbar_transfer(from, to, amount).unwrap().fee
}

#[test]
fn test_stake_and_withdraw() {
    let (mut p, _, owner) = setup();
    let alice = Address::derive("alice");
    let stake_vault = p.deployment().stake_vault;
    p.mint_gold(owner, alice, 5_000).unwrap();

    assert_eq!(p.stake(alice, 1_000), Err(GoldexError::AmountExceedsAllowance));
    p.gold_approve(alice, stake_vault, 1_000).unwrap();
    p.stake(alice, 1_000).unwrap();

    assert_eq!(p.stake_vault().total_supply(), 1_000);
    assert_eq!(p.stake_vault().total_stakers(), 1);
    assert_eq!(p.gold().balance_of(&alice), 4_000);

    assert_eq!(
        p.withdraw_gold(alice, 1_001),
        Err(GoldexError::CannotWithdrawMoreThanStaked(1_000))
    );
    let bob = Address::derive("bob");
    assert_eq!(p.withdraw_gold(bob, 1), Err(GoldexError::EntryDoesNotExist(bob)));

    p.withdraw_gold(alice, 1_000).unwrap();
    assert_eq!(p.gold().balance_of(&alice), 5_000);
    assert_eq!(p.stake_vault().total_supply(), 0);
    assert_eq!(p.stake_vault().total_stakers(), 0);
}

#[test]
fn test_payout_requires_finished_period() {
    let (mut p, clock, owner) = setup();
    p.stake_mint(owner, Address::derive("alice"), 500).unwrap();

    assert_eq!(
        p.set_payout_values(),
        Err(GoldexError::DistributionPeriodNotFinished(START + DAY))
    );
    assert_eq!(p.distribute_rewards(), Err(GoldexError::DistributionNotOpen));

    clock.advance(DAY);
    assert_eq!(p.set_payout_values(), Ok(0));
    assert_eq!(p.set_payout_values(), Err(GoldexError::DistributionAlreadyOpen));
    assert_eq!(p.distribute_rewards(), Ok(0));
    assert_eq!(p.distributor().period_finish(), START + 2 * DAY);
}

#[test]
fn test_year_of_daily_payouts() {
    let (mut p, clock, owner) = setup();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let alice = Address::derive("alice");
    let bob = Address::derive("bob");
    let stake_vault = p.deployment().stake_vault;
    let distributor = p.deployment().fee_distributor;
    let company = p.distributor().company();

    p.mint_gold(owner, alice, 1_000).unwrap();
    p.gold_approve(alice, stake_vault, 1_000).unwrap();
    p.stake(alice, 1_000).unwrap();
    p.stake_mint(owner, bob, 500).unwrap();

    let mut fees = 0u128;
    let mut paid = 0u128;
    let mut last_earned = 0u128;

    for day in 1..=365 {
        clock.set(START + day * DAY);
        for _ in 0..20 {
            fees += random_transfer(&mut p, owner, &mut rng);
        }

        let collected = p.gbar().balance_of(&distributor);
        assert_eq!(collected, fees - paid - p.gbar().balance_of(&company));

        let interest = p.set_payout_values().unwrap();
        assert!(interest <= collected / 2);
        assert_eq!(p.distribute_rewards(), Ok(interest));
        paid += interest;

        let alice_earned = p.earned(&alice);
        assert!(alice_earned >= last_earned);
        last_earned = alice_earned;
    }

    assert!(paid > 0);
    assert!(paid <= fees / 2);
    assert!(p.gbar().balance_of(&company) >= paid);
    assert_eq!(p.gbar().balance_of(&stake_vault), paid);

    // let the last stream run out, then everyone claims
    clock.advance(DAY);
    let alice_reward = p.claim_rewards(alice).unwrap();
    let bob_reward = p.claim_rewards(bob).unwrap();
    assert!(alice_reward > bob_reward);
    assert!(alice_reward + bob_reward <= paid);
    assert_eq!(p.gbar().balance_of(&alice), alice_reward);
    assert_eq!(p.gbar().balance_of(&stake_vault), paid - alice_reward - bob_reward);
    assert_eq!(p.claim_rewards(alice), Ok(0));
    assert_eq!(p.events().named("reward_paid").count(), 2);
}

#[test]
fn test_old_fees_never_push_rewards_past_half() {
    let (mut p, clock, owner) = setup();
    let [from, to, ..] = traders();
    let company = p.distributor().company();
    p.stake_mint(owner, Address::derive("whale"), 1_000_000).unwrap();

    p.mint_gbar(owner, 100 * ONE_GBAR).unwrap();
    p.gbar_vault_withdraw_to(owner, from, 100 * ONE_GBAR).unwrap();
    let fees = p.gbar_transfer(from, to, 100 * ONE_GBAR).unwrap().fee;
    assert_eq!(fees, ONE_GBAR);

    let mut paid = 0;
    for day in 1..=30 {
        clock.set(START + day * DAY);
        p.set_payout_values().unwrap();
        paid += p.distribute_rewards().unwrap();
    }

    assert_eq!(paid, fees / 2);
    assert_eq!(p.gbar().balance_of(&company), fees / 2);
    assert_eq!(p.gbar().balance_of(&p.deployment().fee_distributor), 0);
    assert_eq!(p.events().named("reward_added").count(), 1);
}

#[test]
fn test_blacklisted_company_blocks_payout() {
    let (mut p, clock, owner) = setup();
    let [from, to, ..] = traders();
    let company = p.distributor().company();
    p.stake_mint(owner, Address::derive("alice"), 500).unwrap();
    p.mint_gbar(owner, 1_000 * ONE_GBAR).unwrap();
    p.gbar_vault_withdraw_to(owner, from, 1_000 * ONE_GBAR).unwrap();
    p.gbar_transfer(from, to, 1_000 * ONE_GBAR).unwrap();

    clock.advance(DAY);
    p.set_payout_values().unwrap();
    p.add_blacklist(owner, company).unwrap();
    let events = p.events().len();
    assert_eq!(p.distribute_rewards(), Err(GoldexError::BlacklistedTransaction));
    assert!(p.distributor().distribute_open());
    assert_eq!(p.gbar().balance_of(&p.deployment().stake_vault), 0);
    assert_eq!(p.events().len(), events);

    p.remove_blacklist(owner, company).unwrap();
    assert!(p.distribute_rewards().unwrap() > 0);
}

#[test]
fn test_late_staker_earns_from_join() {
    let (mut p, clock, owner) = setup();
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let alice = Address::derive("alice");
    let bob = Address::derive("bob");
    p.stake_mint(owner, alice, 500).unwrap();

    clock.advance(DAY);
    for _ in 0..50 {
        random_transfer(&mut p, owner, &mut rng);
    }
    p.set_payout_values().unwrap();
    let reward = p.distribute_rewards().unwrap();
    assert!(reward > 0);

    // halfway through the stream bob joins with the same stake
    clock.advance(DAY / 2);
    p.stake_mint(owner, bob, 500).unwrap();
    assert_eq!(p.earned(&bob), 0);

    clock.advance(DAY);
    let alice_earned = p.earned(&alice);
    let bob_earned = p.earned(&bob);
    assert!(bob_earned > 0);
    assert!(alice_earned > bob_earned * 2);
    assert!(alice_earned + bob_earned <= reward);
}

#[test]
fn test_recover_gbar_from_stake_vault() {
    let (mut p, _, owner) = setup();
    let stake_vault = p.deployment().stake_vault;
    let gbar = p.deployment().gbar;
    p.mint_gbar(owner, 5 * ONE_GBAR).unwrap();
    p.gbar_vault_withdraw_to(owner, stake_vault, 5 * ONE_GBAR).unwrap();

    assert_eq!(p.recover_erc20(Address::derive("alice"), gbar, ONE_GBAR), Err(GoldexError::NotTheOwner));
    assert_eq!(p.recover_erc20(owner, gbar, 5 * ONE_GBAR), Ok(5 * ONE_GBAR));
    assert_eq!(p.gbar().balance_of(&owner), 5 * ONE_GBAR);
}
