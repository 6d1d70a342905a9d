//! Reward arithmetic.
//!
//! `floor(amount * rate / 1_000_000)` computed without forming the full
//! product: splitting `amount` into quotient and remainder by the
//! denominator keeps every intermediate no larger than the result (plus a
//! term bounded by `rate`), so the only possible overflow is a result that
//! genuinely does not fit in `i128`.

use crate::controller::RATE_DENOMINATOR;
use crate::types::{Rewards, SaleTotals};
use crate::Error;

/// Exact `floor(amount * rate_ppm / 1_000_000)` for non-negative `amount`.
pub fn apply_rate(amount: i128, rate_ppm: u32) -> Result<i128, Error> {
    if amount < 0 {
        return Err(Error::InvalidArgument);
    }
    let rate = i128::from(rate_ppm);
    let whole = (amount / RATE_DENOMINATOR)
        .checked_mul(rate)
        .ok_or(Error::Overflow)?;
    // remainder < 1e6 and rate < 2^32, so this product cannot overflow.
    let fraction = (amount % RATE_DENOMINATOR) * rate / RATE_DENOMINATOR;
    whole.checked_add(fraction).ok_or(Error::Overflow)
}

/// Rewards owed for `totals` at the given rates.
pub fn compute(totals: &SaleTotals, eth_rate_ppm: u32, token_rate_ppm: u32) -> Result<Rewards, Error> {
    Ok(Rewards {
        eth_reward: apply_rate(totals.native_basis(), eth_rate_ppm)?,
        token_reward: apply_rate(totals.total_sold, token_rate_ppm)?,
    })
}
