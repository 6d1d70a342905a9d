//! # Storage
//!
//! Typed helpers over Soroban instance storage. The bridge is a single
//! state machine, so every entry shares the contract-lifetime TTL.
//!
//! | Key           | Type           | Written                              |
//! |---------------|----------------|--------------------------------------|
//! | `Config`      | `BridgeConfig` | once, by the constructor             |
//! | `Manager`     | `Address`      | constructor, `transfer_manager`      |
//! | `Token`       | `Address`      | constructor, `change_token`          |
//! | `Goal`        | `Goal`         | `set_crowdsale_goal`                 |
//! | `Period`      | `Period`       | `set_crowdsale_period`               |
//! | `StartParams` | `StartParams`  | `start`                              |
//! | `Totals`      | `SaleTotals`   | once, by `notify_sale`               |
//! | `Lifecycle`   | `Lifecycle`    | `start`, `notify_sale`, `finish`     |
//! | `Rewards`     | `Rewards`      | once, by `finish`                    |
//!
//! Instance TTL is bumped by **30 days** whenever it falls below 7 days
//! remaining. A bridge may sit idle between notification and withdrawal for
//! a long time, so it uses the longer persistent-style horizon.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{BridgeConfig, Goal, Lifecycle, Period, Rewards, SaleTotals, StartParams};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    Manager,
    Token,
    Goal,
    Period,
    StartParams,
    Totals,
    Lifecycle,
    Rewards,
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

// ── Configuration ────────────────────────────────────────────────────

pub fn save_config(env: &Env, config: &BridgeConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

/// Load the constructor-time configuration.
/// Panics if the contract was never constructed, which the host rules out.
pub fn load_config(env: &Env) -> BridgeConfig {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("bridge not constructed")
}

pub fn set_manager(env: &Env, manager: &Address) {
    env.storage().instance().set(&DataKey::Manager, manager);
    bump_instance(env);
}

pub fn get_manager(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Manager)
        .expect("bridge not constructed")
}

pub fn set_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::Token, token);
    bump_instance(env);
}

pub fn get_token(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .expect("bridge not constructed")
}

pub fn set_goal(env: &Env, goal: &Goal) {
    env.storage().instance().set(&DataKey::Goal, goal);
    bump_instance(env);
}

/// `None` until the creator configures a goal.
pub fn get_goal(env: &Env) -> Option<Goal> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Goal)
}

pub fn set_period(env: &Env, period: &Period) {
    env.storage().instance().set(&DataKey::Period, period);
    bump_instance(env);
}

pub fn get_period(env: &Env) -> Option<Period> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Period)
}

pub fn set_start_params(env: &Env, params: &StartParams) {
    env.storage().instance().set(&DataKey::StartParams, params);
    bump_instance(env);
}

pub fn get_start_params(env: &Env) -> Option<StartParams> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::StartParams)
}

// ── Accounting & lifecycle ───────────────────────────────────────────

pub fn save_totals(env: &Env, totals: &SaleTotals) {
    env.storage().instance().set(&DataKey::Totals, totals);
    bump_instance(env);
}

/// Returns the zero record until `notify_sale` writes it.
pub fn load_totals(env: &Env) -> SaleTotals {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Totals)
        .unwrap_or_default()
}

pub fn save_lifecycle(env: &Env, lifecycle: &Lifecycle) {
    env.storage().instance().set(&DataKey::Lifecycle, lifecycle);
    bump_instance(env);
}

pub fn load_lifecycle(env: &Env) -> Lifecycle {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Lifecycle)
        .unwrap_or_default()
}

pub fn save_rewards(env: &Env, rewards: &Rewards) {
    env.storage().instance().set(&DataKey::Rewards, rewards);
    bump_instance(env);
}

/// `None` until `finish` freezes the reward record.
pub fn load_rewards(env: &Env) -> Option<Rewards> {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Rewards)
}
