//! Which keys must sign the transaction, and which of them the account holds.

use crate::decode::{
    AccountKeys, Certificate, Credential, MirTarget, NativeScript, Transaction, reward_credential,
};
use crate::error::Blocker;
use crate::hash::KeyHash;
use crate::wallet::{Utxo, find_utxo};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Role of a required key relative to the signing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    Payment,
    Stake,
    /// Not a key of this account.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyHashRequirement {
    pub hash: KeyHash,
    pub kind: KeyKind,
}

/// Deduplicated signer requirements of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredSigners {
    /// In first-seen order.
    pub requirements: Vec<KeyHashRequirement>,
    /// Account key kinds among the requirements (never `Unknown`).
    pub kinds: BTreeSet<KeyKind>,
    /// Inputs not spending a wallet UTXO; their signers cannot be determined here.
    pub foreign_inputs: usize,
}

impl RequiredSigners {
    pub fn hashes(&self) -> impl Iterator<Item = &KeyHash> {
        self.requirements.iter().map(|r| &r.hash)
    }

    /// Fails when the account holds none of the required keys.
    pub fn ensure_signable(&self) -> Result<(), Blocker> {
        if self.kinds.is_empty() {
            return Err(Blocker::SignatureNotPossible);
        }
        Ok(())
    }
}

/// Collect every key hash the transaction requires a signature from.
pub fn resolve(tx: &Transaction, utxos: &[Utxo], keys: &AccountKeys) -> RequiredSigners {
    let body = &tx.body;
    let mut foreign_inputs = 0;
    let mut collected = Vec::new();

    for input in &body.inputs {
        if find_utxo(utxos, input).is_some() {
            collected.push(keys.payment);
        } else {
            foreign_inputs += 1;
        }
    }

    for cert in body.certificates.iter().flatten() {
        collected.extend(certificate_signers(cert));
    }

    for withdrawal in body.withdrawals.iter().flatten() {
        collected.extend(
            reward_credential(&withdrawal.reward_account).and_then(|cred| cred.key_hash()),
        );
    }

    for script in tx.witness_set.native_scripts.iter().flatten() {
        collected.extend(script_signers(script));
    }

    collected.extend(body.required_signers.iter().flatten().copied());

    let signers = classify(dedup(collected), keys, foreign_inputs);
    debug!(
        required = signers.requirements.len(),
        foreign_inputs = signers.foreign_inputs,
        kinds = ?signers.kinds,
        "resolved required signers"
    );
    signers
}

/// Keys a certificate needs a witness from. Script credentials are skipped.
pub fn certificate_signers(cert: &Certificate) -> Vec<KeyHash> {
    let keys = |creds: &[Credential]| -> Vec<KeyHash> {
        creds.iter().filter_map(Credential::key_hash).collect()
    };

    match cert {
        Certificate::StakeRegistration { credential }
        | Certificate::StakeDeregistration { credential }
        | Certificate::StakeDelegation { credential, .. }
        | Certificate::Registration { credential, .. }
        | Certificate::Unregistration { credential, .. }
        | Certificate::VoteDelegation { credential, .. }
        | Certificate::StakeVoteDelegation { credential, .. }
        | Certificate::StakeRegistrationDelegation { credential, .. }
        | Certificate::VoteRegistrationDelegation { credential, .. }
        | Certificate::StakeVoteRegistrationDelegation { credential, .. }
        | Certificate::DRepRegistration { credential, .. }
        | Certificate::DRepUnregistration { credential, .. }
        | Certificate::DRepUpdate { credential } => keys(&[*credential]),
        Certificate::AuthCommitteeHot { cold, .. } | Certificate::ResignCommitteeCold { cold } => {
            keys(&[*cold])
        }
        Certificate::PoolRegistration(params) => std::iter::once(params.operator)
            .chain(params.owners.iter().copied())
            .collect(),
        Certificate::PoolRetirement { pool, .. } => vec![*pool],
        Certificate::GenesisKeyDelegation { genesis, .. } => vec![*genesis],
        Certificate::MoveInstantaneousRewards { target, .. } => match target {
            MirTarget::StakeCredentials(rewards) => rewards
                .iter()
                .filter_map(|(cred, _)| cred.key_hash())
                .collect(),
            MirTarget::OtherPot(_) => vec![],
        },
    }
}

/// `ScriptPubkey` leaves of a native script, through all/any/n-of-k nodes.
pub fn script_signers(script: &NativeScript) -> Vec<KeyHash> {
    script.key_hashes()
}

fn dedup(hashes: Vec<KeyHash>) -> Vec<KeyHash> {
    let mut seen = HashSet::new();
    hashes.into_iter().filter(|hash| seen.insert(*hash)).collect()
}

fn classify(hashes: Vec<KeyHash>, keys: &AccountKeys, foreign_inputs: usize) -> RequiredSigners {
    let requirements: Vec<KeyHashRequirement> = hashes
        .into_iter()
        .map(|hash| {
            let kind = if hash == keys.payment {
                KeyKind::Payment
            } else if hash == keys.stake {
                KeyKind::Stake
            } else {
                KeyKind::Unknown
            };
            KeyHashRequirement { hash, kind }
        })
        .collect();

    let kinds = requirements
        .iter()
        .map(|r| r.kind)
        .filter(|kind| *kind != KeyKind::Unknown)
        .collect();

    RequiredSigners {
        requirements,
        kinds,
        foreign_inputs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{PoolParams, TransactionBody, TransactionInput, Withdrawal, WitnessSet};
    use crate::hash::{Hash, TxHash};
    use crate::value::Value;

    fn keys() -> AccountKeys {
        AccountKeys {
            address: vec![0x00; 57],
            payment: KeyHash::new([1; 28]),
            stake: KeyHash::new([2; 28]),
        }
    }

    fn tx(body: TransactionBody, witness_set: WitnessSet) -> Transaction {
        Transaction {
            body,
            witness_set,
            is_valid: true,
            has_auxiliary_data: false,
        }
    }

    fn owned_utxo(byte: u8, index: u64) -> Utxo {
        Utxo {
            input: TransactionInput::new(TxHash::new([byte; 32]), index),
            address: "addr_test1own".into(),
            value: Value::from_coin(1_000_000),
        }
    }

    #[test]
    fn test_owned_input_requires_payment_key() {
        let body = TransactionBody {
            inputs: vec![TransactionInput::new(TxHash::new([9; 32]), 0)],
            ..Default::default()
        };
        let signers = resolve(&tx(body, WitnessSet::default()), &[owned_utxo(9, 0)], &keys());
        assert_eq!(
            signers.requirements,
            vec![KeyHashRequirement {
                hash: keys().payment,
                kind: KeyKind::Payment
            }]
        );
        assert_eq!(signers.foreign_inputs, 0);
        assert!(signers.ensure_signable().is_ok());
    }

    #[test]
    fn test_input_matched_by_hash_and_index() {
        let body = TransactionBody {
            inputs: vec![TransactionInput::new(TxHash::new([9; 32]), 1)],
            ..Default::default()
        };
        let signers = resolve(&tx(body, WitnessSet::default()), &[owned_utxo(9, 0)], &keys());
        assert!(signers.requirements.is_empty());
        assert_eq!(signers.foreign_inputs, 1);
        assert_eq!(signers.ensure_signable(), Err(Blocker::SignatureNotPossible));
    }

    #[test]
    fn test_stake_registration_requires_stake_key() {
        let body = TransactionBody {
            certificates: Some(vec![Certificate::StakeRegistration {
                credential: Credential::Key(keys().stake),
            }]),
            ..Default::default()
        };
        let signers = resolve(&tx(body, WitnessSet::default()), &[], &keys());
        assert!(signers.kinds.contains(&KeyKind::Stake));
        assert!(!signers.kinds.contains(&KeyKind::Payment));
    }

    #[test]
    fn test_script_credentials_skipped() {
        let cert = Certificate::StakeDelegation {
            credential: Credential::Script(Hash::new([3; 28])),
            pool: KeyHash::new([4; 28]),
        };
        assert!(certificate_signers(&cert).is_empty());
    }

    #[test]
    fn test_pool_registration_operator_and_owners() {
        let cert = Certificate::PoolRegistration(Box::new(PoolParams {
            operator: KeyHash::new([5; 28]),
            vrf_keyhash: Hash::new([0; 32]),
            pledge: 0,
            cost: 340_000_000,
            margin: (0, 1),
            reward_account: vec![0xe0; 29],
            owners: vec![KeyHash::new([2; 28]), KeyHash::new([6; 28])],
        }));
        assert_eq!(
            certificate_signers(&cert),
            vec![
                KeyHash::new([5; 28]),
                KeyHash::new([2; 28]),
                KeyHash::new([6; 28])
            ]
        );
    }

    #[test]
    fn test_mir_key_credentials() {
        let cert = Certificate::MoveInstantaneousRewards {
            pot: crate::decode::MirPot::Treasury,
            target: MirTarget::StakeCredentials(vec![
                (Credential::Key(KeyHash::new([7; 28])), 10),
                (Credential::Script(Hash::new([8; 28])), 10),
            ]),
        };
        assert_eq!(certificate_signers(&cert), vec![KeyHash::new([7; 28])]);
    }

    #[test]
    fn test_any_script_collects_both_leaves() {
        let script = NativeScript::ScriptAny(vec![
            NativeScript::ScriptPubkey(KeyHash::new([10; 28])),
            NativeScript::ScriptPubkey(KeyHash::new([11; 28])),
        ]);
        let witness_set = WitnessSet {
            native_scripts: Some(vec![script]),
            ..Default::default()
        };
        let signers = resolve(&tx(TransactionBody::default(), witness_set), &[], &keys());
        let hashes: Vec<_> = signers.hashes().copied().collect();
        assert_eq!(hashes, vec![KeyHash::new([10; 28]), KeyHash::new([11; 28])]);
    }

    #[test]
    fn test_nested_scripts_fully_traversed() {
        let script = NativeScript::ScriptAll(vec![
            NativeScript::ScriptAny(vec![NativeScript::ScriptPubkey(KeyHash::new([12; 28]))]),
            NativeScript::ScriptNOfK(
                1,
                vec![
                    NativeScript::InvalidHereafter(100),
                    NativeScript::ScriptPubkey(KeyHash::new([13; 28])),
                ],
            ),
            NativeScript::ScriptPubkey(KeyHash::new([14; 28])),
        ]);
        assert_eq!(script_signers(&script).len(), 3);
    }

    #[test]
    fn test_deduplicates_repeated_hashes() {
        let stake = Credential::Key(keys().stake);
        let body = TransactionBody {
            inputs: vec![
                TransactionInput::new(TxHash::new([9; 32]), 0),
                TransactionInput::new(TxHash::new([9; 32]), 1),
            ],
            certificates: Some(vec![
                Certificate::StakeRegistration { credential: stake },
                Certificate::StakeDelegation {
                    credential: stake,
                    pool: KeyHash::new([4; 28]),
                },
            ]),
            required_signers: Some(vec![keys().payment, keys().stake]),
            ..Default::default()
        };
        let signers = resolve(
            &tx(body, WitnessSet::default()),
            &[owned_utxo(9, 0), owned_utxo(9, 1)],
            &keys(),
        );
        let hashes: Vec<_> = signers.hashes().copied().collect();
        assert_eq!(hashes, vec![keys().payment, keys().stake]);
        assert_eq!(
            signers.kinds,
            BTreeSet::from([KeyKind::Payment, KeyKind::Stake])
        );
    }

    #[test]
    fn test_withdrawal_from_own_reward_account() {
        let body = TransactionBody {
            withdrawals: Some(vec![Withdrawal {
                reward_account: [vec![0xe0], vec![2; 28]].concat(),
                amount: 5_000_000,
            }]),
            ..Default::default()
        };
        let signers = resolve(&tx(body, WitnessSet::default()), &[], &keys());
        assert_eq!(signers.kinds, BTreeSet::from([KeyKind::Stake]));
    }

    #[test]
    fn test_foreign_required_signer_is_unknown() {
        let body = TransactionBody {
            required_signers: Some(vec![KeyHash::new([42; 28])]),
            ..Default::default()
        };
        let signers = resolve(&tx(body, WitnessSet::default()), &[], &keys());
        assert_eq!(signers.requirements[0].kind, KeyKind::Unknown);
        assert!(signers.kinds.is_empty());
    }
}
