//! Transaction decoding.

use crate::asset::{AssetId, MAX_ASSET_NAME_LEN};
use crate::decode::cbor::{self, malformed};
use crate::decode::certificate::Certificate;
use crate::decode::script::NativeScript;
use crate::error::Result;
use crate::hash::{DatumHash, Hash, KeyHash, TxHash};
use crate::value::Value;
use ciborium::Value as Cbor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Reference to an output of a previous transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionInput {
    pub tx_hash: TxHash,
    pub index: u64,
}

impl TransactionInput {
    pub fn new(tx_hash: TxHash, index: u64) -> Self {
        Self { tx_hash, index }
    }

    fn decode(value: &Cbor, what: &str) -> Result<Self> {
        let items = cbor::array_of(value, 2, what)?;
        Ok(Self {
            tx_hash: cbor::hash(&items[0], what)?,
            index: cbor::uint(&items[1], what)?,
        })
    }
}

impl fmt::Display for TransactionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.index)
    }
}

impl FromStr for TransactionInput {
    type Err = String;

    /// Parse `<tx hash hex>#<index>`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (hash, index) = s
            .split_once('#')
            .ok_or_else(|| format!("expected <tx_hash>#<index>, got '{s}'"))?;
        Ok(Self {
            tx_hash: hash.parse().map_err(|e| format!("invalid tx hash: {e}"))?,
            index: index
                .parse()
                .map_err(|e| format!("invalid output index '{index}': {e}"))?,
        })
    }
}

/// Datum attached to an output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datum {
    Hash(DatumHash),
    /// CBOR of an inline datum.
    Inline(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Raw address bytes (header byte first).
    pub address: Vec<u8>,
    pub value: Value,
    pub datum: Option<Datum>,
    pub has_script_ref: bool,
}

impl TransactionOutput {
    /// Datum hash, when the output carries one (inline datums have none).
    pub fn datum_hash(&self) -> Option<DatumHash> {
        match &self.datum {
            Some(Datum::Hash(hash)) => Some(*hash),
            _ => None,
        }
    }

    fn decode(value: &Cbor) -> Result<Self> {
        const WHAT: &str = "output";
        match value {
            // Pre-Babbage: [address, value, ? datum_hash]
            Cbor::Array(items) => {
                if !(2..=3).contains(&items.len()) {
                    return Err(malformed(format!(
                        "{WHAT}: expected 2 or 3 items, got {}",
                        items.len()
                    )));
                }
                let datum = match items.get(2) {
                    Some(hash) => Some(Datum::Hash(cbor::hash(hash, "output datum hash")?)),
                    None => None,
                };
                Ok(Self {
                    address: cbor::bytes(&items[0], "output address")?.to_vec(),
                    value: decode_value(&items[1])?,
                    datum,
                    has_script_ref: false,
                })
            }
            // Babbage onward: { 0: address, 1: value, ? 2: datum_option, ? 3: script_ref }
            Cbor::Map(_) => {
                let mut address = None;
                let mut amount = None;
                let mut datum = None;
                let mut has_script_ref = false;
                for (key, field) in cbor::uint_keyed(value, WHAT)? {
                    match key {
                        0 => address = Some(cbor::bytes(field, "output address")?.to_vec()),
                        1 => amount = Some(decode_value(field)?),
                        2 => datum = Some(decode_datum_option(field)?),
                        3 => has_script_ref = true,
                        other => return Err(malformed(format!("{WHAT}: unknown key {other}"))),
                    }
                }
                Ok(Self {
                    address: address.ok_or_else(|| malformed("output: missing address"))?,
                    value: amount.ok_or_else(|| malformed("output: missing value"))?,
                    datum,
                    has_script_ref,
                })
            }
            _ => Err(malformed(format!("{WHAT}: expected array or map"))),
        }
    }
}

fn decode_datum_option(value: &Cbor) -> Result<Datum> {
    const WHAT: &str = "datum option";
    let items = cbor::array_of(value, 2, WHAT)?;
    match cbor::uint(&items[0], WHAT)? {
        0 => Ok(Datum::Hash(cbor::hash(&items[1], "datum hash")?)),
        1 => match &items[1] {
            Cbor::Tag(24, inner) => Ok(Datum::Inline(cbor::bytes(inner, "inline datum")?.to_vec())),
            _ => Err(malformed("inline datum: expected tag 24")),
        },
        tag => Err(malformed(format!("{WHAT}: unknown tag {tag}"))),
    }
}

/// `coin` or `[coin, multiasset]`.
fn decode_value(value: &Cbor) -> Result<Value> {
    match value {
        Cbor::Array(items) => {
            cbor::expect_len(items, 2, "value")?;
            let mut out = Value::from_coin(cbor::uint(&items[0], "value coin")?);
            for (asset, quantity) in decode_multiasset(&items[1], |q| {
                cbor::uint(q, "asset quantity").map(i128::from)
            })? {
                out = out.with_asset(asset, quantity)?;
            }
            Ok(out)
        }
        other => Ok(Value::from_coin(cbor::uint(other, "value coin")?)),
    }
}

/// `{ policy_id => { asset_name => quantity } }`, flattened.
fn decode_multiasset(
    value: &Cbor,
    quantity: impl Fn(&Cbor) -> Result<i128>,
) -> Result<Vec<(AssetId, i128)>> {
    let mut out = Vec::new();
    for (policy, assets) in cbor::map(value, "multiasset")? {
        let policy = cbor::hash(policy, "policy id")?;
        for (name, amount) in cbor::map(assets, "multiasset assets")? {
            let name = cbor::bytes(name, "asset name")?;
            if name.len() > MAX_ASSET_NAME_LEN {
                return Err(malformed(format!(
                    "asset name: {} bytes exceeds {MAX_ASSET_NAME_LEN}",
                    name.len()
                )));
            }
            out.push((AssetId::new(policy, name.to_vec()), quantity(amount)?));
        }
    }
    Ok(out)
}

/// A reward withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Raw reward address bytes.
    pub reward_account: Vec<u8>,
    pub amount: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionBody {
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub fee: u64,
    pub ttl: Option<u64>,
    pub certificates: Option<Vec<Certificate>>,
    pub withdrawals: Option<Vec<Withdrawal>>,
    pub validity_start: Option<u64>,
    pub mint: Option<BTreeMap<AssetId, i128>>,
    pub script_data_hash: Option<Hash<32>>,
    pub collateral_inputs: Option<Vec<TransactionInput>>,
    pub required_signers: Option<Vec<KeyHash>>,
    pub network_id: Option<u64>,
    pub collateral_return: Option<TransactionOutput>,
    pub total_collateral: Option<u64>,
    pub reference_inputs: Option<Vec<TransactionInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessSet {
    pub vkey_witnesses: usize,
    pub native_scripts: Option<Vec<NativeScript>>,
    pub has_plutus_scripts: bool,
    pub has_redeemers: bool,
}

/// A decoded transaction. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub body: TransactionBody,
    pub witness_set: WitnessSet,
    pub is_valid: bool,
    pub has_auxiliary_data: bool,
}

/// Decoder for the ledger's binary transaction encoding.
///
/// Holds no state; a single value can decode any number of transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a transaction from CBOR bytes.
    ///
    /// Accepts the 3-item pre-Alonzo envelope `[body, witnesses, metadata]`
    /// and the 4-item `[body, witnesses, is_valid, auxiliary_data]`.
    pub fn decode(&self, bytes: &[u8]) -> Result<Transaction> {
        let root = cbor::parse(bytes)?;
        let items = cbor::array(&root, "transaction")?;

        let (is_valid, auxiliary) = match items.len() {
            3 => (true, &items[2]),
            4 => match &items[2] {
                Cbor::Bool(valid) => (*valid, &items[3]),
                _ => return Err(malformed("transaction: is_valid must be a boolean")),
            },
            n => {
                return Err(malformed(format!(
                    "transaction: expected 3 or 4 items, got {n}"
                )));
            }
        };

        let tx = Transaction {
            body: decode_body(&items[0])?,
            witness_set: decode_witness_set(&items[1])?,
            is_valid,
            has_auxiliary_data: !cbor::is_null(auxiliary),
        };

        debug!(
            inputs = tx.body.inputs.len(),
            outputs = tx.body.outputs.len(),
            fee = tx.body.fee,
            "decoded transaction"
        );
        Ok(tx)
    }
}

/// Decode a transaction with a default [`Decoder`].
pub fn decode_transaction(bytes: &[u8]) -> Result<Transaction> {
    Decoder::new().decode(bytes)
}

fn decode_inputs(value: &Cbor, what: &str) -> Result<Vec<TransactionInput>> {
    cbor::set(value, what)?
        .iter()
        .map(|input| TransactionInput::decode(input, what))
        .collect()
}

fn decode_body(value: &Cbor) -> Result<TransactionBody> {
    let mut body = TransactionBody::default();
    let mut seen = Vec::new();
    let (mut has_inputs, mut has_outputs, mut has_fee) = (false, false, false);

    for (key, field) in cbor::uint_keyed(value, "transaction body")? {
        if seen.contains(&key) {
            return Err(malformed(format!("transaction body: duplicate key {key}")));
        }
        seen.push(key);

        match key {
            0 => {
                body.inputs = decode_inputs(field, "inputs")?;
                has_inputs = true;
            }
            1 => {
                body.outputs = cbor::array(field, "outputs")?
                    .iter()
                    .map(TransactionOutput::decode)
                    .collect::<Result<_>>()?;
                has_outputs = true;
            }
            2 => {
                body.fee = cbor::uint(field, "fee")?;
                has_fee = true;
            }
            3 => body.ttl = Some(cbor::uint(field, "ttl")?),
            4 => {
                body.certificates = Some(
                    cbor::set(field, "certificates")?
                        .iter()
                        .map(Certificate::decode)
                        .collect::<Result<_>>()?,
                )
            }
            5 => {
                body.withdrawals = Some(
                    cbor::map(field, "withdrawals")?
                        .iter()
                        .map(|(account, amount)| {
                            Ok(Withdrawal {
                                reward_account: cbor::bytes(account, "reward account")?.to_vec(),
                                amount: cbor::uint(amount, "withdrawal amount")?,
                            })
                        })
                        .collect::<Result<_>>()?,
                )
            }
            8 => body.validity_start = Some(cbor::uint(field, "validity start")?),
            9 => {
                body.mint = Some(
                    decode_multiasset(field, |q| cbor::int(q, "mint quantity"))?
                        .into_iter()
                        .collect(),
                )
            }
            11 => body.script_data_hash = Some(cbor::hash(field, "script data hash")?),
            13 => body.collateral_inputs = Some(decode_inputs(field, "collateral inputs")?),
            14 => {
                body.required_signers = Some(
                    cbor::set(field, "required signers")?
                        .iter()
                        .map(|signer| cbor::hash(signer, "required signer"))
                        .collect::<Result<_>>()?,
                )
            }
            15 => body.network_id = Some(cbor::uint(field, "network id")?),
            16 => body.collateral_return = Some(TransactionOutput::decode(field)?),
            17 => body.total_collateral = Some(cbor::uint(field, "total collateral")?),
            18 => body.reference_inputs = Some(decode_inputs(field, "reference inputs")?),
            // Protocol updates, auxiliary data hash and governance fields carry
            // nothing a signer summary needs.
            _ => {}
        }
    }

    if !has_inputs {
        return Err(malformed("transaction body: missing inputs"));
    }
    if !has_outputs {
        return Err(malformed("transaction body: missing outputs"));
    }
    if !has_fee {
        return Err(malformed("transaction body: missing fee"));
    }
    Ok(body)
}

fn decode_witness_set(value: &Cbor) -> Result<WitnessSet> {
    let mut witnesses = WitnessSet::default();
    for (key, field) in cbor::uint_keyed(value, "witness set")? {
        match key {
            0 => witnesses.vkey_witnesses = cbor::set(field, "vkey witnesses")?.len(),
            1 => {
                witnesses.native_scripts = Some(
                    cbor::set(field, "native scripts")?
                        .iter()
                        .map(NativeScript::decode)
                        .collect::<Result<_>>()?,
                )
            }
            3 | 6 | 7 => witnesses.has_plutus_scripts = true,
            5 => witnesses.has_redeemers = true,
            _ => {}
        }
    }
    Ok(witnesses)
}
