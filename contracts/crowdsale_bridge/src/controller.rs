//! Read interface of the sale controller that holds the manager role.
//!
//! The bridge never stores the reward rates itself; it asks whichever
//! contract currently holds the manager role.

use soroban_sdk::{contractclient, Env};

/// Denominator of every reward rate (parts per million).
pub const RATE_DENOMINATOR: i128 = 1_000_000;

#[contractclient(name = "ControllerClient")]
pub trait ControllerInterface {
    /// Native-currency reward rate in parts per million.
    fn eth_reward_part(env: Env) -> u32;

    /// Token reward rate in parts per million.
    fn token_reward_part(env: Env) -> u32;
}
