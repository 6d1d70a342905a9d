//! # Access control
//!
//! Two roles, both plain addresses compared by value:
//!
//! | Role      | Holder                     | May call                                    |
//! |-----------|----------------------------|---------------------------------------------|
//! | Creator   | fixed at construction      | configuration, `transfer_manager`, `finish`, `withdraw` |
//! | Manager   | creator, then the controller | `start`, `notify_sale`                    |
//!
//! The manager role stops moving once the bridge is finished.
//!
//! Every guard first demands the caller's signature, then checks the role.
//! A role mismatch is reported as [`Error::Unauthorized`] before any state
//! is touched.

use soroban_sdk::{Address, Env};

use crate::storage;
use crate::Error;

/// Caller must sign and be the creator.
pub fn require_creator(env: &Env, caller: &Address) -> Result<(), Error> {
    caller.require_auth();
    if *caller != storage::load_config(env).creator {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

/// Caller must sign and be the current manager.
pub fn require_manager(env: &Env, caller: &Address) -> Result<(), Error> {
    caller.require_auth();
    if *caller != storage::get_manager(env) {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

/// Hand the manager role to `new_manager`. Returns the previous holder.
///
/// The role is frozen once the bridge is finished.
pub fn transfer_manager(env: &Env, caller: &Address, new_manager: &Address) -> Result<Address, Error> {
    require_creator(env, caller)?;
    if storage::load_lifecycle(env).finished {
        return Err(Error::InvalidState);
    }
    let previous = storage::get_manager(env);
    storage::set_manager(env, new_manager);
    Ok(previous)
}
