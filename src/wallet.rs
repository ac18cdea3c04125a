//! Wallet snapshot: the signing account, its UTXOs and known asset metadata.
//!
//! ```json
//! {
//!   "account": { "index": 0, "payment_address": "addr_test1...",
//!                "collateral": { "tx_hash": "...", "index": 0 } },
//!   "utxos": [ { "tx_hash": "...", "index": 0, "address": "addr_test1...",
//!                "value": { "coin": 5000000, "assets": { "<policy><name>": "10" } } } ],
//!   "assets": { "<policy><name>": { "name": "Token", "decimals": 6 } }
//! }
//! ```

use crate::asset::{AssetId, StaticRegistry};
use crate::decode::TransactionInput;
use crate::error::{Error, Result};
use crate::hash::TxHash;
use crate::value::Value;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// The account asked to sign.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub index: u32,
    pub payment_address: String,
    /// The UTXO registered as this account's collateral.
    #[serde(default)]
    pub collateral: Option<TransactionInput>,
}

impl Account {
    pub fn new(payment_address: impl Into<String>) -> Self {
        Self {
            index: 0,
            payment_address: payment_address.into(),
            collateral: None,
        }
    }
}

/// An unspent output controlled by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "SnapshotUtxo")]
pub struct Utxo {
    pub input: TransactionInput,
    pub address: String,
    pub value: Value,
}

#[derive(Deserialize)]
struct SnapshotUtxo {
    tx_hash: TxHash,
    index: u64,
    address: String,
    value: SnapshotValue,
}

#[derive(Deserialize)]
struct SnapshotValue {
    coin: u64,
    #[serde(default)]
    assets: BTreeMap<AssetId, SnapshotQuantity>,
}

/// Token quantity as a JSON number or a decimal string.
#[derive(Deserialize)]
#[serde(try_from = "QuantityRepr")]
struct SnapshotQuantity(u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<QuantityRepr> for SnapshotQuantity {
    type Error = String;

    fn try_from(repr: QuantityRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            QuantityRepr::Number(n) => Ok(Self(n)),
            QuantityRepr::Text(text) => text
                .parse()
                .map(Self)
                .map_err(|e| format!("invalid asset quantity '{text}': {e}")),
        }
    }
}

impl From<SnapshotUtxo> for Utxo {
    fn from(raw: SnapshotUtxo) -> Self {
        let assets = raw
            .value
            .assets
            .into_iter()
            .map(|(asset, SnapshotQuantity(quantity))| (asset, i128::from(quantity)))
            .collect();
        Utxo {
            input: TransactionInput::new(raw.tx_hash, raw.index),
            address: raw.address,
            value: Value {
                coin: raw.value.coin,
                assets,
            },
        }
    }
}

/// Everything known about the wallet for one analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletSnapshot {
    pub account: Account,
    #[serde(default)]
    pub utxos: Vec<Utxo>,
    #[serde(default)]
    pub assets: StaticRegistry,
}

impl WalletSnapshot {
    /// A snapshot with no UTXOs and no asset metadata.
    pub fn for_account(account: Account) -> Self {
        Self {
            account,
            utxos: Vec::new(),
            assets: StaticRegistry::default(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidWallet(e.to_string()))
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| Error::IoError {
            path: Some(path.to_path_buf()),
            source: e,
        })?;
        let snapshot = Self::from_json(&text)?;
        debug!(
            utxos = snapshot.utxos.len(),
            assets = snapshot.assets.len(),
            path = %path.display(),
            "loaded wallet snapshot"
        );
        Ok(snapshot)
    }
}

/// The wallet UTXO an input spends, matched by transaction hash and index.
pub fn find_utxo<'a>(utxos: &'a [Utxo], input: &TransactionInput) -> Option<&'a Utxo> {
    utxos.iter().find(|utxo| utxo.input == *input)
}
