use crate::decode::{CredentialKind, Transaction, classify_output_credential};
use serde::Serialize;

/// Notable features of a transaction a signer should be told about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TxProperties {
    pub has_metadata: bool,
    pub has_certificate: bool,
    pub has_withdrawal: bool,
    pub has_minting: bool,
    pub has_native_script: bool,
    pub is_contract_interaction: bool,
    pub has_datum: bool,
}

impl TxProperties {
    /// Derive the flags from a decoded transaction.
    ///
    /// Collections count only when present and non-empty. A datum hash on an
    /// output locked by a script marks a contract interaction, as does a
    /// script data hash in the body. Every datum-bearing output is checked,
    /// not only the first one.
    pub fn of(tx: &Transaction) -> Self {
        let body = &tx.body;
        let non_empty = |len: Option<usize>| len.is_some_and(|n| n > 0);

        let datum_outputs = || body.outputs.iter().filter(|out| out.datum_hash().is_some());
        let script_datum = datum_outputs()
            .any(|out| classify_output_credential(&out.address) == CredentialKind::Script);

        Self {
            has_metadata: tx.has_auxiliary_data,
            has_certificate: non_empty(body.certificates.as_ref().map(Vec::len)),
            has_withdrawal: non_empty(body.withdrawals.as_ref().map(Vec::len)),
            has_minting: non_empty(body.mint.as_ref().map(|m| m.len())),
            has_native_script: non_empty(tx.witness_set.native_scripts.as_ref().map(Vec::len)),
            is_contract_interaction: script_datum || body.script_data_hash.is_some(),
            has_datum: datum_outputs().next().is_some(),
        }
    }

    /// Labels of the flags that are set, in display order.
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.has_metadata, "metadata"),
            (self.has_certificate, "certificate"),
            (self.has_withdrawal, "withdrawal"),
            (self.has_minting, "minting"),
            (self.has_native_script, "native script"),
            (self.is_contract_interaction, "contract interaction"),
            (self.has_datum, "datum"),
        ]
        .into_iter()
        .filter_map(|(set, label)| set.then_some(label))
        .collect()
    }
}

/// Body and witness fields a signer sees next to the analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TxDetails {
    pub network_id: Option<u64>,
    /// First slot the transaction is valid in.
    pub validity_start: Option<u64>,
    /// Slot after which the transaction is invalid.
    pub ttl: Option<u64>,
    pub total_collateral: Option<u64>,
    /// Lovelace of the collateral return output.
    pub collateral_return: Option<u64>,
    pub reference_inputs: usize,
    pub vkey_witnesses: usize,
    pub has_plutus_scripts: bool,
    pub has_redeemers: bool,
}

impl TxDetails {
    pub fn of(tx: &Transaction) -> Self {
        let body = &tx.body;
        Self {
            network_id: body.network_id,
            validity_start: body.validity_start,
            ttl: body.ttl,
            total_collateral: body.total_collateral,
            collateral_return: body.collateral_return.as_ref().map(|out| out.value.coin),
            reference_inputs: body.reference_inputs.as_ref().map_or(0, Vec::len),
            vkey_witnesses: tx.witness_set.vkey_witnesses,
            has_plutus_scripts: tx.witness_set.has_plutus_scripts,
            has_redeemers: tx.witness_set.has_redeemers,
        }
    }

    /// Whether the transaction runs Plutus validators.
    pub fn runs_scripts(&self) -> bool {
        self.has_plutus_scripts || self.has_redeemers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetId;
    use crate::decode::{
        Certificate, Credential, Datum, NativeScript, TransactionBody, TransactionOutput,
        WitnessSet,
    };
    use crate::hash::{DatumHash, Hash, KeyHash};
    use crate::value::Value;
    use std::collections::BTreeMap;

    fn tx(body: TransactionBody) -> Transaction {
        Transaction {
            body,
            witness_set: WitnessSet::default(),
            is_valid: true,
            has_auxiliary_data: false,
        }
    }

    fn datum_output(header: u8) -> TransactionOutput {
        TransactionOutput {
            address: vec![header; 29],
            value: Value::from_coin(2_000_000),
            datum: Some(Datum::Hash(DatumHash::new([3; 32]))),
            has_script_ref: false,
        }
    }

    #[test]
    fn test_plain_payment_has_no_flags() {
        let props = TxProperties::of(&tx(TransactionBody::default()));
        assert_eq!(props, TxProperties::default());
        assert!(props.labels().is_empty());
    }

    #[test]
    fn test_empty_collections_do_not_count() {
        let body = TransactionBody {
            certificates: Some(vec![]),
            withdrawals: Some(vec![]),
            mint: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert_eq!(TxProperties::of(&tx(body)), TxProperties::default());
    }

    #[test]
    fn test_datum_to_script_address_is_contract() {
        let body = TransactionBody {
            outputs: vec![datum_output(0x70)],
            ..Default::default()
        };
        let props = TxProperties::of(&tx(body));
        assert!(props.has_datum);
        assert!(props.is_contract_interaction);
    }

    #[test]
    fn test_datum_to_key_address_is_not_contract() {
        let body = TransactionBody {
            outputs: vec![datum_output(0x60)],
            ..Default::default()
        };
        let props = TxProperties::of(&tx(body));
        assert!(props.has_datum);
        assert!(!props.is_contract_interaction);
    }

    #[test]
    fn test_any_datum_output_can_mark_contract() {
        let body = TransactionBody {
            outputs: vec![datum_output(0x60), datum_output(0x10)],
            ..Default::default()
        };
        assert!(TxProperties::of(&tx(body)).is_contract_interaction);
    }

    #[test]
    fn test_script_data_hash_marks_contract() {
        let body = TransactionBody {
            script_data_hash: Some(Hash::new([1; 32])),
            ..Default::default()
        };
        let props = TxProperties::of(&tx(body));
        assert!(props.is_contract_interaction);
        assert!(!props.has_datum);
    }

    #[test]
    fn test_all_flags() {
        let mut mint = BTreeMap::new();
        mint.insert(AssetId::new(Hash::new([5; 28]), vec![]), 1);
        let body = TransactionBody {
            outputs: vec![datum_output(0x30)],
            certificates: Some(vec![Certificate::StakeRegistration {
                credential: Credential::Key(KeyHash::new([1; 28])),
            }]),
            withdrawals: Some(vec![crate::decode::Withdrawal {
                reward_account: vec![0xe0; 29],
                amount: 1,
            }]),
            mint: Some(mint),
            ..Default::default()
        };
        let mut tx = tx(body);
        tx.has_auxiliary_data = true;
        tx.witness_set.native_scripts =
            Some(vec![NativeScript::ScriptPubkey(KeyHash::new([2; 28]))]);

        let props = TxProperties::of(&tx);
        assert_eq!(props.labels().len(), 7);
    }

    #[test]
    fn test_details_of_plain_payment() {
        let details = TxDetails::of(&tx(TransactionBody::default()));
        assert_eq!(details, TxDetails::default());
        assert!(!details.runs_scripts());
    }

    #[test]
    fn test_details_carry_collateral_and_witnesses() {
        let body = TransactionBody {
            ttl: Some(5_000),
            validity_start: Some(4_000),
            network_id: Some(0),
            total_collateral: Some(3_000_000),
            collateral_return: Some(TransactionOutput {
                address: vec![0x60; 29],
                value: Value::from_coin(7_000_000),
                datum: None,
                has_script_ref: false,
            }),
            reference_inputs: Some(vec![crate::decode::TransactionInput::new(
                Hash::new([9; 32]),
                0,
            )]),
            ..Default::default()
        };
        let mut tx = tx(body);
        tx.witness_set.vkey_witnesses = 2;
        tx.witness_set.has_redeemers = true;

        let details = TxDetails::of(&tx);
        assert_eq!(details.ttl, Some(5_000));
        assert_eq!(details.validity_start, Some(4_000));
        assert_eq!(details.network_id, Some(0));
        assert_eq!(details.total_collateral, Some(3_000_000));
        assert_eq!(details.collateral_return, Some(7_000_000));
        assert_eq!(details.reference_inputs, 1);
        assert_eq!(details.vkey_witnesses, 2);
        assert!(!details.has_plutus_scripts);
        assert!(details.runs_scripts());
    }
}
