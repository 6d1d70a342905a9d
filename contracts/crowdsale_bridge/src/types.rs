//! # Types
//!
//! Shared data structures used across all modules of the bridge.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! The bridge keeps its configuration (token, goal, period) apart from the
//! accounting record and the lifecycle flags. Configuration may be edited
//! until the sale is notified; [`SaleTotals`] is written exactly once; the
//! [`Lifecycle`] flags only ever move from `false` to `true`.
//!
//! ### Lifecycle as a Finite-State Machine
//!
//! ```text
//! Configuring ──► Notified ──► Finished
//!      │             ▲
//!      └─ started ───┘   (start is informational and may happen at any
//!                         point before finish)
//! ```
//!
//! There is no backward transition. Once `finished` is set the bridge only
//! accepts `withdraw` and queries.

use soroban_sdk::{contracttype, Address};

/// Native-currency thresholds bounding an acceptable sale outcome.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Goal {
    pub minimal: i128,
    pub hard_cap: i128,
}

impl Goal {
    /// `true` when `collected` lies inside `[minimal, hard_cap]`.
    pub fn is_met_by(&self, collected: i128) -> bool {
        self.minimal <= collected && collected <= self.hard_cap
    }
}

/// Sale time window as epoch timestamps.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Period {
    pub start: u64,
    pub end: u64,
}

/// Opaque values handed to `start`. Stored for observers, never interpreted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartParams {
    pub start_timestamp: u64,
    pub end_timestamp: u64,
    pub funding_address: Option<Address>,
}

/// Aggregate sale results reported once by the manager.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SaleTotals {
    /// Value raised in the sale's unit of account.
    pub total_collected: i128,
    /// Native currency actually raised (0 when none was collected directly).
    pub total_collected_eth: i128,
    /// Quantity of token sold.
    pub total_sold: i128,
}

impl SaleTotals {
    /// Native-currency basis used for both the native reward and the goal
    /// check. Falls back to `total_collected` when no native currency was
    /// collected directly.
    pub fn native_basis(&self) -> i128 {
        if self.total_collected_eth != 0 {
            self.total_collected_eth
        } else {
            self.total_collected
        }
    }
}

/// Lifecycle flags. Each flag is monotonic.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Lifecycle {
    pub started: bool,
    pub notified: bool,
    pub finished: bool,
    pub successful: bool,
}

/// Reward amounts derived from [`SaleTotals`] and the controller's rates.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rewards {
    pub eth_reward: i128,
    pub token_reward: i128,
}

/// Immutable bridge configuration fixed by the constructor.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BridgeConfig {
    /// Principal that deployed the bridge and receives custody on withdraw.
    pub creator: Address,
    /// Token contract fronting the native currency.
    pub native_asset: Address,
    /// Decimal precision every custodied token must match.
    pub token_decimals: u32,
}
