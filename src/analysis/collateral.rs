//! Collateral checks against the account's registered collateral UTXO.

use crate::decode::Transaction;
use crate::error::Blocker;
use crate::wallet::{Account, Utxo, find_utxo};
use tracing::debug;

/// Every declared collateral input that spends a wallet UTXO must be the
/// account's registered collateral. Foreign collateral inputs are ignored.
pub fn validate_collateral(tx: &Transaction, utxos: &[Utxo], account: &Account) -> Result<(), Blocker> {
    let Some(collateral) = &tx.body.collateral_inputs else {
        return Ok(());
    };

    for input in collateral {
        if find_utxo(utxos, input).is_none() {
            continue;
        }
        debug!(input = %input, "wallet UTXO used as collateral");
        match &account.collateral {
            None => return Err(Blocker::CollateralNotSet),
            Some(registered) if registered != input => return Err(Blocker::InvalidCollateralUsed),
            Some(_) => {}
        }
    }
    Ok(())
}
