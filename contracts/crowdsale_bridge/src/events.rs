//! # Events
//!
//! Every externally observable change is published as a contract event with
//! a single leading topic symbol and a typed payload. Payloads carry the
//! exact values written to storage.
//!
//! | Topic       | Payload                |
//! |-------------|------------------------|
//! | `init`      | [`BridgeInitialized`]  |
//! | `token_chg` | [`TokenChanged`]       |
//! | `goal_set`  | [`GoalSet`]            |
//! | `period`    | [`PeriodSet`]          |
//! | `mgr_xfer`  | [`ManagerTransferred`] |
//! | `started`   | [`SaleStarted`]        |
//! | `notified`  | [`SaleNotified`]       |
//! | `finished`  | [`BridgeFinished`]     |
//! | `withdrawn` | [`RewardsWithdrawn`]   |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BridgeInitialized {
    pub creator: Address,
    pub native_asset: Address,
    pub token: Address,
    pub decimals: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenChanged {
    pub token: Address,
    pub decimals: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GoalSet {
    pub minimal_goal: i128,
    pub hard_cap: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeriodSet {
    pub start_timestamp: u64,
    pub end_timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManagerTransferred {
    pub previous: Address,
    pub manager: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleStarted {
    pub start_timestamp: u64,
    pub end_timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleNotified {
    pub total_collected: i128,
    pub total_collected_eth: i128,
    pub total_sold: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BridgeFinished {
    pub successful: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsWithdrawn {
    pub beneficiary: Address,
    pub native_amount: i128,
    pub token_amount: i128,
}

pub fn emit_initialized(env: &Env, creator: Address, native_asset: Address, token: Address, decimals: u32) {
    env.events().publish(
        (symbol_short!("init"),),
        BridgeInitialized {
            creator,
            native_asset,
            token,
            decimals,
        },
    );
}

pub fn emit_token_changed(env: &Env, token: Address, decimals: u32) {
    env.events()
        .publish((symbol_short!("token_chg"),), TokenChanged { token, decimals });
}

pub fn emit_goal_set(env: &Env, minimal_goal: i128, hard_cap: i128) {
    env.events().publish(
        (symbol_short!("goal_set"),),
        GoalSet {
            minimal_goal,
            hard_cap,
        },
    );
}

pub fn emit_period_set(env: &Env, start_timestamp: u64, end_timestamp: u64) {
    env.events().publish(
        (symbol_short!("period"),),
        PeriodSet {
            start_timestamp,
            end_timestamp,
        },
    );
}

pub fn emit_manager_transferred(env: &Env, previous: Address, manager: Address) {
    env.events().publish(
        (symbol_short!("mgr_xfer"),),
        ManagerTransferred { previous, manager },
    );
}

pub fn emit_sale_started(env: &Env, start_timestamp: u64, end_timestamp: u64) {
    env.events().publish(
        (symbol_short!("started"),),
        SaleStarted {
            start_timestamp,
            end_timestamp,
        },
    );
}

pub fn emit_sale_notified(env: &Env, total_collected: i128, total_collected_eth: i128, total_sold: i128) {
    env.events().publish(
        (symbol_short!("notified"),),
        SaleNotified {
            total_collected,
            total_collected_eth,
            total_sold,
        },
    );
}

pub fn emit_finished(env: &Env, successful: bool) {
    env.events()
        .publish((symbol_short!("finished"),), BridgeFinished { successful });
}

pub fn emit_withdrawn(env: &Env, beneficiary: Address, native_amount: i128, token_amount: i128) {
    env.events().publish(
        (symbol_short!("withdrawn"),),
        RewardsWithdrawn {
            beneficiary,
            native_amount,
            token_amount,
        },
    );
}
