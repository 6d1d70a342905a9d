extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    vec, Address, Env, IntoVal, TryIntoVal,
};

use crate::events::{
    BridgeFinished, BridgeInitialized, GoalSet, ManagerTransferred, PeriodSet, RewardsWithdrawn,
    SaleNotified, SaleStarted, TokenChanged,
};
use crate::test::{create_token, mint, notified, setup, ETHER};
use crate::CrowdsaleBridge;

#[test]
fn test_initialized_event() {
    let env = Env::default();
    env.mock_all_auths();
    let creator = Address::generate(&env);
    let token = create_token(&env, &creator);
    let native = create_token(&env, &creator);

    let bridge_id = env.register(
        CrowdsaleBridge,
        (creator.clone(), native.address.clone(), token.address.clone()),
    );

    let expected_topics = vec![&env, symbol_short!("init").into_val(&env)];
    let (_, _, data) = env
        .events()
        .all()
        .iter()
        .find(|(contract, topics, _)| *contract == bridge_id && *topics == expected_topics)
        .expect("No init event found");

    let event_data: BridgeInitialized = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        BridgeInitialized {
            creator,
            native_asset: native.address.clone(),
            token: token.address.clone(),
            decimals: token.decimals(),
        }
    );
}

#[test]
fn test_token_changed_event() {
    let s = setup();
    let replacement = create_token(&s.env, &s.creator);

    s.bridge.change_token(&s.creator, &replacement.address);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, s.bridge.address);
    let expected_topics = vec![&s.env, symbol_short!("token_chg").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: TokenChanged = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        TokenChanged {
            token: replacement.address.clone(),
            decimals: replacement.decimals(),
        }
    );
}

#[test]
fn test_goal_set_event_carries_exact_values() {
    let s = setup();
    let minimal_goal = 10 * ETHER;
    let hard_cap = 1_000 * ETHER;

    s.bridge.set_crowdsale_goal(&s.creator, &minimal_goal, &hard_cap);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    let expected_topics = vec![&s.env, symbol_short!("goal_set").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: GoalSet = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        GoalSet {
            minimal_goal,
            hard_cap,
        }
    );
    let stored = s.bridge.goal().unwrap();
    assert_eq!(stored.minimal, event_data.minimal_goal);
    assert_eq!(stored.hard_cap, event_data.hard_cap);
}

#[test]
fn test_period_set_event_carries_exact_values() {
    let s = setup();
    // Millisecond timestamps, as a JavaScript caller would send them.
    let start_timestamp = 1_700_000_000_123u64;
    let end_timestamp = start_timestamp + 86_400 * 5;

    s.bridge
        .set_crowdsale_period(&s.creator, &start_timestamp, &end_timestamp);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    let expected_topics = vec![&s.env, symbol_short!("period").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: PeriodSet = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        PeriodSet {
            start_timestamp,
            end_timestamp,
        }
    );
}

#[test]
fn test_manager_transferred_event() {
    let s = setup();

    s.bridge.transfer_manager(&s.creator, &s.controller);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    let expected_topics = vec![&s.env, symbol_short!("mgr_xfer").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ManagerTransferred = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        ManagerTransferred {
            previous: s.creator.clone(),
            manager: s.controller.clone(),
        }
    );
}

#[test]
fn test_sale_started_and_notified_events() {
    let s = setup();

    s.bridge.start(&s.creator, &100, &200, &None);
    let last_event = s.env.events().all().last().expect("No events found");
    let started: SaleStarted = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        started,
        SaleStarted {
            start_timestamp: 100,
            end_timestamp: 200,
        }
    );

    s.bridge
        .notify_sale(&s.creator, &(600_000 * ETHER), &(100 * ETHER), &(1_500 * ETHER));
    let last_event = s.env.events().all().last().expect("No events found");
    let expected_topics = vec![&s.env, symbol_short!("notified").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);
    let notified_data: SaleNotified = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        notified_data,
        SaleNotified {
            total_collected: 600_000 * ETHER,
            total_collected_eth: 100 * ETHER,
            total_sold: 1_500 * ETHER,
        }
    );
}

#[test]
fn test_rejected_call_emits_nothing() {
    let s = setup();
    s.bridge.set_crowdsale_goal(&s.creator, &1, &2);

    let _ = s.bridge.try_set_crowdsale_goal(&s.creator, &5, &1);

    // The failed invocation is rolled back together with its events.
    for (_, _, data) in s.env.events().all().iter() {
        let decoded: Result<GoalSet, _> = data.try_into_val(&s.env);
        if let Ok(goal) = decoded {
            assert_ne!(
                goal,
                GoalSet {
                    minimal_goal: 5,
                    hard_cap: 1,
                }
            );
        }
    }
    assert_eq!(s.bridge.goal().unwrap().hard_cap, 2);
}

#[test]
fn test_finished_and_withdrawn_events() {
    let s = notified(0, 0, 0);

    s.bridge.finish(&s.creator);
    let last_event = s.env.events().all().last().expect("No events found");
    let expected_topics = vec![&s.env, symbol_short!("finished").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);
    let finished: BridgeFinished = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(finished, BridgeFinished { successful: true });

    mint(&s.env, &s.token.address, &s.bridge.address, 15 * ETHER);
    mint(&s.env, &s.native.address, &s.bridge.address, ETHER);

    s.bridge.withdraw(&s.creator);
    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, s.bridge.address);
    let expected_topics = vec![&s.env, symbol_short!("withdrawn").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);
    let withdrawn: RewardsWithdrawn = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        withdrawn,
        RewardsWithdrawn {
            beneficiary: s.creator.clone(),
            native_amount: ETHER,
            token_amount: 15 * ETHER,
        }
    );
}
