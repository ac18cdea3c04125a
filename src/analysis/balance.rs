//! Net value change of the account and what leaves to everyone else.

use crate::asset::AssetRegistry;
use crate::decode::{AccountKeys, Transaction, render_address};
use crate::error::Result;
use crate::hash::{DatumHash, PolicyId};
use crate::value::{Quantity, Unit, Value, retain_nonzero};
use crate::wallet::{Utxo, find_utxo};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A display-ready `(unit, quantity)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetEntry {
    pub unit: Unit,
    pub quantity: i128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyId>,
    /// Asset name bytes as hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

impl AssetEntry {
    /// Attach identity and registry metadata to a flattened quantity.
    ///
    /// A registry miss falls back to the printable UTF-8 asset name.
    pub fn enrich(quantity: Quantity, registry: &dyn AssetRegistry) -> Self {
        let mut entry = AssetEntry {
            unit: quantity.unit,
            quantity: quantity.quantity,
            policy: None,
            asset_name: None,
            fingerprint: None,
            name: None,
            ticker: None,
            decimals: None,
        };

        if let Some(asset) = entry.unit.asset().cloned() {
            let metadata = registry.get_asset(&asset).unwrap_or_default();
            entry.policy = Some(asset.policy);
            entry.asset_name = Some(asset.name_hex());
            entry.fingerprint = asset.fingerprint();
            entry.name = metadata.name.or_else(|| asset.name_utf8());
            entry.ticker = metadata.ticker;
            entry.decimals = metadata.decimals;
        }
        entry
    }

    pub fn is_lovelace(&self) -> bool {
        self.unit == Unit::Lovelace
    }
}

/// Value sent to one external address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub assets: Vec<AssetEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datum_hash: Option<DatumHash>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balance {
    /// Positive quantities leave the wallet.
    pub own_delta: Vec<AssetEntry>,
    /// Keyed by bech32 address (hex for addresses without a bech32 form).
    pub external_recipients: BTreeMap<String, Recipient>,
}

/// Compute the account's value delta and the per-address external outputs.
pub fn analyze_balance(
    tx: &Transaction,
    utxos: &[Utxo],
    keys: &AccountKeys,
    registry: &dyn AssetRegistry,
) -> Result<Balance> {
    let mut input_value = Value::zero();
    for input in &tx.body.inputs {
        if let Some(utxo) = find_utxo(utxos, input) {
            debug!(input = %input, coin = utxo.value.coin, "owned input");
            input_value = input_value.checked_add(&utxo.value)?;
        }
    }

    let mut own_output_value = Value::zero();
    let mut external: BTreeMap<String, (Value, Option<DatumHash>)> = BTreeMap::new();
    for output in &tx.body.outputs {
        if output.address == keys.address {
            own_output_value = own_output_value.checked_add(&output.value)?;
            continue;
        }

        let (value, datum_hash) = external
            .entry(render_address(&output.address))
            .or_insert_with(|| (Value::zero(), None));
        *value = value.checked_add(&output.value)?;
        // One datum hash per recipient; the last one wins.
        if let Some(hash) = output.datum_hash() {
            *datum_hash = Some(hash);
        }
    }

    let own_delta = retain_nonzero(input_value.subtract(&own_output_value)?)
        .into_iter()
        .map(|q| AssetEntry::enrich(q, registry))
        .collect();

    let external_recipients = external
        .into_iter()
        .map(|(address, (value, datum_hash))| {
            let assets = retain_nonzero(value.flatten())
                .into_iter()
                .map(|q| AssetEntry::enrich(q, registry))
                .collect();
            (address, Recipient { assets, datum_hash })
        })
        .collect();

    Ok(Balance {
        own_delta,
        external_recipients,
    })
}
