//! # Crowdsale Bridge Contract
//!
//! Settlement bridge between a crowdsale and its post-sale reward payout.
//! The sale controller reports aggregate results exactly once; the bridge
//! records them, derives the native-currency and token rewards, and hands
//! whatever was pre-funded into it back to the creator after finalization.
//!
//! | Phase         | Entry Point(s)                                              |
//! |---------------|-------------------------------------------------------------|
//! | Construction  | `__constructor`                                             |
//! | Configuration | `change_token`, `set_crowdsale_goal`, `set_crowdsale_period` |
//! | Roles         | `transfer_manager`                                          |
//! | Sale          | `start`, [`CrowdsaleBridge::notify_sale`]                   |
//! | Rewards       | [`CrowdsaleBridge::calculate_rewards`], `is_funded`         |
//! | Settlement    | [`CrowdsaleBridge::finish`], [`CrowdsaleBridge::withdraw`]  |
//! | Queries       | `creator`, `manager`, `token`, `goal`, `period`, `totals`, … |
//!
//! ## Architecture
//!
//! Authorization lives in [`access`], storage in [`storage`], reward
//! arithmetic in [`rewards`], and event payloads in [`events`]. This file
//! holds the entry points and the phase checks between them.
//!
//! Deposits need no entry point: funding the bridge is a plain token
//! transfer to its address, on either the native asset or the sale token.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env};

mod access;
pub mod controller;
pub mod events;
mod rewards;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use controller::{ControllerClient, ControllerInterface};
pub use types::{BridgeConfig, Goal, Lifecycle, Period, Rewards, SaleTotals, StartParams};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    Unauthorized          = 1,
    InvalidState          = 2,
    InvalidAsset          = 3,
    InvalidArgument       = 4,
    Overflow              = 5,
    ControllerUnavailable = 6,
}

#[contract]
pub struct CrowdsaleBridge;

#[contractimpl]
impl CrowdsaleBridge {
    // ─────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────

    /// Deploy the bridge.
    ///
    /// - `creator` becomes the permanent creator and the first manager.
    /// - `native_asset` is the token contract fronting the native currency.
    /// - `token` is the initial sale token; its `decimals()` becomes the
    ///   precision every later replacement must match.
    pub fn __constructor(env: Env, creator: Address, native_asset: Address, token: Address) {
        let token_decimals = token::Client::new(&env, &token).decimals();

        storage::save_config(
            &env,
            &BridgeConfig {
                creator: creator.clone(),
                native_asset: native_asset.clone(),
                token_decimals,
            },
        );
        storage::set_manager(&env, &creator);
        storage::set_token(&env, &token);
        storage::save_totals(&env, &SaleTotals::default());
        storage::save_lifecycle(&env, &Lifecycle::default());

        events::emit_initialized(&env, creator, native_asset, token, token_decimals);
    }

    // ─────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────

    /// Hand the manager role to `new_manager` (normally the sale controller).
    ///
    /// Only the creator may move the role, whoever holds it at the time, and
    /// only until the bridge is finished.
    pub fn transfer_manager(env: Env, caller: Address, new_manager: Address) -> Result<(), Error> {
        let previous = access::transfer_manager(&env, &caller, &new_manager)?;
        events::emit_manager_transferred(&env, previous, new_manager);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────

    /// Retarget custody to `new_token`.
    ///
    /// Rejected once the sale has been notified, and rejected with
    /// `InvalidAsset` when the decimals differ from the constructor's token.
    pub fn change_token(env: Env, caller: Address, new_token: Address) -> Result<(), Error> {
        access::require_creator(&env, &caller)?;
        Self::require_not_notified(&env)?;

        let decimals = token::Client::new(&env, &new_token).decimals();
        if decimals != storage::load_config(&env).token_decimals {
            return Err(Error::InvalidAsset);
        }

        storage::set_token(&env, &new_token);
        events::emit_token_changed(&env, new_token, decimals);
        Ok(())
    }

    /// Record the sale's native-currency bounds.
    pub fn set_crowdsale_goal(env: Env, caller: Address, minimal: i128, hard_cap: i128) -> Result<(), Error> {
        access::require_creator(&env, &caller)?;
        Self::require_not_notified(&env)?;

        if minimal < 0 || minimal > hard_cap {
            return Err(Error::InvalidArgument);
        }

        storage::set_goal(&env, &Goal { minimal, hard_cap });
        events::emit_goal_set(&env, minimal, hard_cap);
        Ok(())
    }

    /// Record the sale's time window.
    pub fn set_crowdsale_period(env: Env, caller: Address, start: u64, end: u64) -> Result<(), Error> {
        access::require_creator(&env, &caller)?;
        Self::require_not_notified(&env)?;

        if start >= end {
            return Err(Error::InvalidArgument);
        }

        storage::set_period(&env, &Period { start, end });
        events::emit_period_set(&env, start, end);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Sale
    // ─────────────────────────────────────────────────────────

    /// Mark the sale as started. The parameters are stored as-is for
    /// observers and play no part in accounting.
    pub fn start(
        env: Env,
        caller: Address,
        start_timestamp: u64,
        end_timestamp: u64,
        funding_address: Option<Address>,
    ) -> Result<(), Error> {
        access::require_manager(&env, &caller)?;

        let mut lifecycle = storage::load_lifecycle(&env);
        if lifecycle.started || lifecycle.finished {
            return Err(Error::InvalidState);
        }

        lifecycle.started = true;
        storage::save_lifecycle(&env, &lifecycle);
        storage::set_start_params(
            &env,
            &StartParams {
                start_timestamp,
                end_timestamp,
                funding_address,
            },
        );
        events::emit_sale_started(&env, start_timestamp, end_timestamp);
        Ok(())
    }

    /// Record the sale's aggregate results. Write-once.
    ///
    /// A dedicated flag guards the record, so an all-zero sale is a valid
    /// notification and still blocks a second one.
    pub fn notify_sale(
        env: Env,
        caller: Address,
        total_collected: i128,
        total_collected_eth: i128,
        total_sold: i128,
    ) -> Result<(), Error> {
        access::require_manager(&env, &caller)?;

        let mut lifecycle = storage::load_lifecycle(&env);
        if lifecycle.notified || lifecycle.finished {
            return Err(Error::InvalidState);
        }
        if total_collected < 0 || total_collected_eth < 0 || total_sold < 0 {
            return Err(Error::InvalidArgument);
        }

        storage::save_totals(
            &env,
            &SaleTotals {
                total_collected,
                total_collected_eth,
                total_sold,
            },
        );
        lifecycle.notified = true;
        storage::save_lifecycle(&env, &lifecycle);

        events::emit_sale_notified(&env, total_collected, total_collected_eth, total_sold);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Rewards
    // ─────────────────────────────────────────────────────────

    /// Rewards owed for the recorded totals.
    ///
    /// Once finished this is the record frozen by `finish`. Before that it is
    /// computed at the current manager's rates, which requires the manager to
    /// implement [`ControllerInterface`]; anything else is
    /// `ControllerUnavailable`.
    pub fn calculate_rewards(env: Env) -> Result<Rewards, Error> {
        if let Some(frozen) = storage::load_rewards(&env) {
            return Ok(frozen);
        }
        Self::live_rewards(&env)
    }

    /// `true` when the bridge holds at least the computed rewards in both
    /// the native asset and the sale token.
    pub fn is_funded(env: Env) -> Result<bool, Error> {
        let rewards = Self::calculate_rewards(env.clone())?;
        let config = storage::load_config(&env);
        let this = env.current_contract_address();

        let native = token::Client::new(&env, &config.native_asset).balance(&this);
        let tokens = token::Client::new(&env, &storage::get_token(&env)).balance(&this);
        Ok(native >= rewards.eth_reward && tokens >= rewards.token_reward)
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Finalize the bridge. Terminal.
    ///
    /// The sale counts as successful when the native basis falls inside the
    /// configured goal, or unconditionally when no goal was configured. The
    /// reward record is computed here and frozen.
    pub fn finish(env: Env, caller: Address) -> Result<(), Error> {
        access::require_creator(&env, &caller)?;

        let mut lifecycle = storage::load_lifecycle(&env);
        if !lifecycle.notified || lifecycle.finished {
            return Err(Error::InvalidState);
        }

        let basis = storage::load_totals(&env).native_basis();
        let successful = storage::get_goal(&env).map_or(true, |goal| goal.is_met_by(basis));

        lifecycle.finished = true;
        lifecycle.successful = successful;
        storage::save_lifecycle(&env, &lifecycle);

        // Nothing to freeze without a reachable controller.
        if let Ok(rewards) = Self::live_rewards(&env) {
            storage::save_rewards(&env, &rewards);
        }

        events::emit_finished(&env, successful);
        Ok(())
    }

    /// Move the bridge's entire native and token balances to the creator.
    ///
    /// Repeatable: once drained, later calls find zero balances and move
    /// nothing.
    pub fn withdraw(env: Env, caller: Address) -> Result<(), Error> {
        access::require_creator(&env, &caller)?;
        if !storage::load_lifecycle(&env).finished {
            return Err(Error::InvalidState);
        }

        let config = storage::load_config(&env);
        let this = env.current_contract_address();

        let native_amount = Self::drain(&env, &config.native_asset, &this, &config.creator);
        let token_amount = Self::drain(&env, &storage::get_token(&env), &this, &config.creator);

        events::emit_withdrawn(&env, config.creator, native_amount, token_amount);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn creator(env: Env) -> Address {
        storage::load_config(&env).creator
    }

    pub fn manager(env: Env) -> Address {
        storage::get_manager(&env)
    }

    pub fn token(env: Env) -> Address {
        storage::get_token(&env)
    }

    pub fn native_asset(env: Env) -> Address {
        storage::load_config(&env).native_asset
    }

    pub fn token_decimals(env: Env) -> u32 {
        storage::load_config(&env).token_decimals
    }

    pub fn goal(env: Env) -> Option<Goal> {
        storage::get_goal(&env)
    }

    pub fn period(env: Env) -> Option<Period> {
        storage::get_period(&env)
    }

    pub fn start_params(env: Env) -> Option<StartParams> {
        storage::get_start_params(&env)
    }

    pub fn totals(env: Env) -> SaleTotals {
        storage::load_totals(&env)
    }

    pub fn total_collected(env: Env) -> i128 {
        storage::load_totals(&env).total_collected
    }

    pub fn total_collected_eth(env: Env) -> i128 {
        storage::load_totals(&env).total_collected_eth
    }

    pub fn total_sold(env: Env) -> i128 {
        storage::load_totals(&env).total_sold
    }

    pub fn is_started(env: Env) -> bool {
        storage::load_lifecycle(&env).started
    }

    pub fn is_notified(env: Env) -> bool {
        storage::load_lifecycle(&env).notified
    }

    pub fn is_finished(env: Env) -> bool {
        storage::load_lifecycle(&env).finished
    }

    pub fn is_successful(env: Env) -> bool {
        storage::load_lifecycle(&env).successful
    }

    /// Finished without meeting the goal.
    pub fn is_failed(env: Env) -> bool {
        let lifecycle = storage::load_lifecycle(&env);
        lifecycle.finished && !lifecycle.successful
    }

    /// Started and not yet finished.
    pub fn is_active(env: Env) -> bool {
        let lifecycle = storage::load_lifecycle(&env);
        lifecycle.started && !lifecycle.finished
    }

    // ─────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────

    /// Rewards at the rates the current manager reports right now.
    fn live_rewards(env: &Env) -> Result<Rewards, Error> {
        let controller = ControllerClient::new(env, &storage::get_manager(env));
        let eth_rate = match controller.try_eth_reward_part() {
            Ok(Ok(rate)) => rate,
            _ => return Err(Error::ControllerUnavailable),
        };
        let token_rate = match controller.try_token_reward_part() {
            Ok(Ok(rate)) => rate,
            _ => return Err(Error::ControllerUnavailable),
        };
        rewards::compute(&storage::load_totals(env), eth_rate, token_rate)
    }

    fn require_not_notified(env: &Env) -> Result<(), Error> {
        let lifecycle = storage::load_lifecycle(env);
        if lifecycle.notified || lifecycle.finished {
            return Err(Error::InvalidState);
        }
        Ok(())
    }

    /// Transfer the whole balance of `asset` held by `from` to `to`.
    /// Returns the amount moved; zero balances make no call.
    fn drain(env: &Env, asset: &Address, from: &Address, to: &Address) -> i128 {
        let client = token::Client::new(env, asset);
        let balance = client.balance(from);
        if balance > 0 {
            client.transfer(from, to, &balance);
        }
        balance
    }
}
