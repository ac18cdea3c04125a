//! Transaction analysis: everything a signer must see before approving.
//!
//! Decoding and account resolution failures abort the analysis. Signing
//! blockers do not; they are recorded on the [`AnalysisResult`] so value and
//! recipient information can still be shown.

mod balance;
mod collateral;
mod properties;
mod signers;

pub use balance::{AssetEntry, Balance, Recipient, analyze_balance};
pub use collateral::validate_collateral;
pub use properties::{TxDetails, TxProperties};
pub use signers::{
    KeyHashRequirement, KeyKind, RequiredSigners, certificate_signers, resolve, script_signers,
};

use crate::asset::AssetRegistry;
use crate::decode::{AccountKeys, Certificate, Decoder, Transaction};
use crate::error::{Blocker, Result};
use crate::wallet::WalletSnapshot;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// The facts derived from one transaction for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub fee: u64,
    /// Positive quantities leave the wallet.
    pub own_value_delta: Vec<AssetEntry>,
    pub external_recipients: BTreeMap<String, Recipient>,
    pub properties: TxProperties,
    pub details: TxDetails,
    /// Certificate kinds in body order.
    pub certificates: Vec<&'static str>,
    pub required_key_kinds: BTreeSet<KeyKind>,
    pub required_key_hashes: Vec<KeyHashRequirement>,
    /// Inputs whose signers are outside this wallet.
    pub foreign_inputs: usize,
    pub error: Option<Blocker>,
}

impl AnalysisResult {
    /// Whether signing is possible and safe.
    pub fn can_sign(&self) -> bool {
        self.error.is_none()
    }
}

/// Decode `bytes` and analyze the result for the snapshot's account.
pub fn analyze(
    decoder: &Decoder,
    bytes: &[u8],
    wallet: &WalletSnapshot,
    registry: &dyn AssetRegistry,
) -> Result<AnalysisResult> {
    let tx = decoder.decode(bytes)?;
    analyze_transaction(&tx, wallet, registry)
}

/// Analyze an already decoded transaction.
pub fn analyze_transaction(
    tx: &Transaction,
    wallet: &WalletSnapshot,
    registry: &dyn AssetRegistry,
) -> Result<AnalysisResult> {
    let account = &wallet.account;
    let keys = AccountKeys::from_bech32(&account.payment_address)?;
    debug!(
        account = account.index,
        payment = %keys.payment,
        stake = %keys.stake,
        "resolved account keys"
    );

    let signers = resolve(tx, &wallet.utxos, &keys);
    let balance = analyze_balance(tx, &wallet.utxos, &keys, registry)?;

    // A signature blocker takes precedence over a collateral one.
    let error = signers
        .ensure_signable()
        .and_then(|()| validate_collateral(tx, &wallet.utxos, account))
        .err();
    if let Some(blocker) = error {
        warn!(%blocker, "transaction cannot be signed");
    }
    if signers.foreign_inputs > 0 {
        warn!(
            foreign_inputs = signers.foreign_inputs,
            "some inputs are not owned by this wallet"
        );
    }

    Ok(AnalysisResult {
        fee: tx.body.fee,
        own_value_delta: balance.own_delta,
        external_recipients: balance.external_recipients,
        properties: TxProperties::of(tx),
        details: TxDetails::of(tx),
        certificates: tx
            .body
            .certificates
            .iter()
            .flatten()
            .map(Certificate::kind)
            .collect(),
        required_key_kinds: signers.kinds,
        required_key_hashes: signers.requirements,
        foreign_inputs: signers.foreign_inputs,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NoRegistry;
    use crate::decode::TransactionInput;
    use crate::decode::fixtures::{base_address, envelope, input, uint};
    use crate::error::Error;
    use crate::hash::TxHash;
    use crate::value::{Unit, Value};
    use crate::wallet::{Account, Utxo};
    use ciborium::Value as Cbor;

    fn wallet(address: &str, utxos: Vec<Utxo>) -> WalletSnapshot {
        WalletSnapshot {
            utxos,
            ..WalletSnapshot::for_account(Account::new(address))
        }
    }

    fn owned(address: &str, byte: u8, coin: u64) -> Utxo {
        Utxo {
            input: TransactionInput::new(TxHash::new([byte; 32]), 0),
            address: address.to_string(),
            value: Value::from_coin(coin),
        }
    }

    fn output(address: &[u8], coin: u64) -> Cbor {
        Cbor::Array(vec![Cbor::Bytes(address.to_vec()), uint(coin)])
    }

    #[test]
    fn test_spend_to_external_recipient() {
        let (own, _) = base_address(1, 2);
        let (external, external_bytes) = base_address(8, 9);
        let bytes = envelope(
            vec![
                (0, Cbor::Array(vec![input(4, 0)])),
                (1, Cbor::Array(vec![output(&external_bytes, 4_800_000)])),
                (2, uint(200_000)),
            ],
            vec![],
        );

        let wallet = wallet(&own, vec![owned(&own, 4, 5_000_000)]);
        let result = analyze(&Decoder::new(), &bytes, &wallet, &NoRegistry).unwrap();

        assert_eq!(result.fee, 200_000);
        assert_eq!(result.own_value_delta.len(), 1);
        assert_eq!(result.own_value_delta[0].unit, Unit::Lovelace);
        assert_eq!(result.own_value_delta[0].quantity, 5_000_000);
        assert_eq!(result.external_recipients[&external].assets[0].quantity, 4_800_000);
        assert_eq!(result.required_key_kinds, BTreeSet::from([KeyKind::Payment]));
        assert_eq!(result.foreign_inputs, 0);
        assert!(result.can_sign());
    }

    #[test]
    fn test_stake_registration_only() {
        let (own, _) = base_address(1, 2);
        let bytes = envelope(
            vec![
                (0, Cbor::Array(vec![input(4, 0)])),
                (1, Cbor::Array(vec![])),
                (2, uint(200_000)),
                (
                    4,
                    Cbor::Array(vec![Cbor::Array(vec![
                        uint(0),
                        Cbor::Array(vec![uint(0), Cbor::Bytes(vec![2; 28])]),
                    ])]),
                ),
            ],
            vec![],
        );

        let result = analyze(&Decoder::new(), &bytes, &wallet(&own, vec![]), &NoRegistry).unwrap();
        assert!(result.required_key_kinds.contains(&KeyKind::Stake));
        assert_eq!(result.foreign_inputs, 1);
        assert!(result.properties.has_certificate);
        assert_eq!(result.certificates, vec!["Stake Registration"]);
        assert!(result.can_sign());
    }

    #[test]
    fn test_unrelated_transaction_cannot_be_signed() {
        let (own, _) = base_address(1, 2);
        let (_, external_bytes) = base_address(8, 9);
        let bytes = envelope(
            vec![
                (0, Cbor::Array(vec![input(4, 0)])),
                (1, Cbor::Array(vec![output(&external_bytes, 1_000_000)])),
                (2, uint(200_000)),
            ],
            vec![],
        );

        let result = analyze(&Decoder::new(), &bytes, &wallet(&own, vec![]), &NoRegistry).unwrap();
        assert_eq!(result.error, Some(Blocker::SignatureNotPossible));
        assert!(result.own_value_delta.is_empty());
        assert_eq!(result.external_recipients.len(), 1);
    }

    #[test]
    fn test_signature_blocker_overrides_collateral() {
        let (own, _) = base_address(1, 2);
        let bytes = envelope(
            vec![
                (0, Cbor::Array(vec![input(7, 0)])),
                (1, Cbor::Array(vec![])),
                (2, uint(200_000)),
                (13, Cbor::Array(vec![input(4, 0)])),
            ],
            vec![],
        );
        let wallet = wallet(&own, vec![owned(&own, 4, 5_000_000)]);
        let result = analyze(&Decoder::new(), &bytes, &wallet, &NoRegistry).unwrap();
        assert_eq!(result.error, Some(Blocker::SignatureNotPossible));
    }

    #[test]
    fn test_collateral_not_set() {
        let (own, _) = base_address(1, 2);
        let bytes = envelope(
            vec![
                (0, Cbor::Array(vec![input(4, 0)])),
                (1, Cbor::Array(vec![])),
                (2, uint(200_000)),
                (13, Cbor::Array(vec![input(4, 0)])),
            ],
            vec![],
        );
        let wallet = wallet(&own, vec![owned(&own, 4, 5_000_000)]);
        let result = analyze(&Decoder::new(), &bytes, &wallet, &NoRegistry).unwrap();
        assert_eq!(result.error, Some(Blocker::CollateralNotSet));
        assert!(!result.can_sign());
    }

    #[test]
    fn test_script_spend_reports_collateral_details() {
        let (own, own_bytes) = base_address(1, 2);
        let bytes = envelope(
            vec![
                (0, Cbor::Array(vec![input(4, 0)])),
                (1, Cbor::Array(vec![])),
                (2, uint(200_000)),
                (3, uint(90_000)),
                (13, Cbor::Array(vec![input(4, 0)])),
                (16, output(&own_bytes, 4_700_000)),
                (17, uint(300_000)),
            ],
            vec![(5, Cbor::Array(vec![]))],
        );
        let mut wallet = wallet(&own, vec![owned(&own, 4, 5_000_000)]);
        wallet.account.collateral = Some(TransactionInput::new(TxHash::new([4; 32]), 0));

        let result = analyze(&Decoder::new(), &bytes, &wallet, &NoRegistry).unwrap();
        assert!(result.can_sign());
        assert_eq!(result.details.ttl, Some(90_000));
        assert_eq!(result.details.total_collateral, Some(300_000));
        assert_eq!(result.details.collateral_return, Some(4_700_000));
        assert!(result.details.has_redeemers);
        assert!(result.details.runs_scripts());
    }

    #[test]
    fn test_malformed_bytes_abort() {
        let (own, _) = base_address(1, 2);
        let err = analyze(&Decoder::new(), &[0x01, 0x02], &wallet(&own, vec![]), &NoRegistry)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedTransaction(_)));
    }

    #[test]
    fn test_unsupported_account_address_aborts() {
        let bytes = envelope(
            vec![
                (0, Cbor::Array(vec![input(4, 0)])),
                (1, Cbor::Array(vec![])),
                (2, uint(0)),
            ],
            vec![],
        );
        let err = analyze(&Decoder::new(), &bytes, &wallet("stake_test1xyz", vec![]), &NoRegistry)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAddressType(_)));
    }

    #[test]
    fn test_result_serializes() {
        let (own, _) = base_address(1, 2);
        let bytes = envelope(
            vec![
                (0, Cbor::Array(vec![input(4, 0)])),
                (1, Cbor::Array(vec![])),
                (2, uint(170_000)),
            ],
            vec![],
        );
        let wallet = wallet(&own, vec![owned(&own, 4, 1_000_000)]);
        let result = analyze(&Decoder::new(), &bytes, &wallet, &NoRegistry).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["fee"], 170_000);
        assert_eq!(json["required_key_kinds"][0], "payment");
        assert_eq!(json["required_key_hashes"][0]["kind"], "payment");
        assert_eq!(json["own_value_delta"][0]["unit"], "lovelace");
        assert!(json["error"].is_null());
        assert_eq!(json["details"]["vkey_witnesses"], 0);
        assert!(json["details"]["ttl"].is_null());
    }
}
