//! Certificates and the credentials they carry.

use crate::decode::cbor::{self, malformed};
use crate::error::Result;
use crate::hash::{Hash, KeyHash, ScriptHash};
use ciborium::Value;
use serde::Serialize;

/// A payment, stake, DRep or committee credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", content = "hash", rename_all = "snake_case")]
pub enum Credential {
    Key(KeyHash),
    Script(ScriptHash),
}

impl Credential {
    /// The key hash, if this is a key credential.
    pub fn key_hash(&self) -> Option<KeyHash> {
        match self {
            Credential::Key(hash) => Some(*hash),
            Credential::Script(_) => None,
        }
    }

    pub(crate) fn decode(value: &Value, what: &str) -> Result<Self> {
        let items = cbor::array_of(value, 2, what)?;
        match cbor::uint(&items[0], what)? {
            0 => Ok(Credential::Key(cbor::hash(&items[1], what)?)),
            1 => Ok(Credential::Script(cbor::hash(&items[1], what)?)),
            tag => Err(malformed(format!("{what}: unknown credential tag {tag}"))),
        }
    }
}

/// Delegated representative for governance votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DRep {
    Key(KeyHash),
    Script(ScriptHash),
    AlwaysAbstain,
    AlwaysNoConfidence,
}

impl DRep {
    fn decode(value: &Value) -> Result<Self> {
        const WHAT: &str = "drep";
        let (tag, items) = cbor::tagged(value, WHAT)?;
        match tag {
            0 => {
                cbor::expect_len(items, 2, WHAT)?;
                Ok(DRep::Key(cbor::hash(&items[1], WHAT)?))
            }
            1 => {
                cbor::expect_len(items, 2, WHAT)?;
                Ok(DRep::Script(cbor::hash(&items[1], WHAT)?))
            }
            2 => {
                cbor::expect_len(items, 1, WHAT)?;
                Ok(DRep::AlwaysAbstain)
            }
            3 => {
                cbor::expect_len(items, 1, WHAT)?;
                Ok(DRep::AlwaysNoConfidence)
            }
            tag => Err(malformed(format!("{WHAT}: unknown tag {tag}"))),
        }
    }
}

/// Stake pool registration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolParams {
    pub operator: KeyHash,
    pub vrf_keyhash: Hash<32>,
    pub pledge: u64,
    pub cost: u64,
    pub margin: (u64, u64),
    pub reward_account: Vec<u8>,
    pub owners: Vec<KeyHash>,
}

/// Pot an instantaneous reward is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirPot {
    Reserves,
    Treasury,
}

/// Where an instantaneous reward goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirTarget {
    /// Per-credential reward deltas.
    StakeCredentials(Vec<(Credential, i128)>),
    /// A transfer of coin to the other pot.
    OtherPot(u64),
}

/// All certificate kinds up to and including Conway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Certificate {
    StakeRegistration {
        credential: Credential,
    },
    StakeDeregistration {
        credential: Credential,
    },
    StakeDelegation {
        credential: Credential,
        pool: KeyHash,
    },
    PoolRegistration(Box<PoolParams>),
    PoolRetirement {
        pool: KeyHash,
        epoch: u64,
    },
    GenesisKeyDelegation {
        genesis: Hash<28>,
        delegate: Hash<28>,
    },
    MoveInstantaneousRewards {
        pot: MirPot,
        target: MirTarget,
    },
    Registration {
        credential: Credential,
        deposit: u64,
    },
    Unregistration {
        credential: Credential,
        deposit: u64,
    },
    VoteDelegation {
        credential: Credential,
        drep: DRep,
    },
    StakeVoteDelegation {
        credential: Credential,
        pool: KeyHash,
        drep: DRep,
    },
    StakeRegistrationDelegation {
        credential: Credential,
        pool: KeyHash,
        deposit: u64,
    },
    VoteRegistrationDelegation {
        credential: Credential,
        drep: DRep,
        deposit: u64,
    },
    StakeVoteRegistrationDelegation {
        credential: Credential,
        pool: KeyHash,
        drep: DRep,
        deposit: u64,
    },
    AuthCommitteeHot {
        cold: Credential,
        hot: Credential,
    },
    ResignCommitteeCold {
        cold: Credential,
    },
    DRepRegistration {
        credential: Credential,
        deposit: u64,
    },
    DRepUnregistration {
        credential: Credential,
        deposit: u64,
    },
    DRepUpdate {
        credential: Credential,
    },
}

impl Certificate {
    /// Human readable kind, for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Certificate::StakeRegistration { .. } => "Stake Registration",
            Certificate::StakeDeregistration { .. } => "Stake Deregistration",
            Certificate::StakeDelegation { .. } => "Stake Delegation",
            Certificate::PoolRegistration(_) => "Pool Registration",
            Certificate::PoolRetirement { .. } => "Pool Retirement",
            Certificate::GenesisKeyDelegation { .. } => "Genesis Key Delegation",
            Certificate::MoveInstantaneousRewards { .. } => "Instantaneous Rewards",
            Certificate::Registration { .. } => "Registration (Conway)",
            Certificate::Unregistration { .. } => "Deregistration (Conway)",
            Certificate::VoteDelegation { .. } => "Vote Delegation",
            Certificate::StakeVoteDelegation { .. } => "Stake+Vote Delegation",
            Certificate::StakeRegistrationDelegation { .. } => "Stake Reg+Delegation",
            Certificate::VoteRegistrationDelegation { .. } => "Vote Reg+Delegation",
            Certificate::StakeVoteRegistrationDelegation { .. } => "Stake+Vote Reg+Del",
            Certificate::AuthCommitteeHot { .. } => "Auth Committee Hot",
            Certificate::ResignCommitteeCold { .. } => "Resign Committee Cold",
            Certificate::DRepRegistration { .. } => "Register DRep",
            Certificate::DRepUnregistration { .. } => "Unregister DRep",
            Certificate::DRepUpdate { .. } => "Update DRep",
        }
    }

    pub(crate) fn decode(value: &Value) -> Result<Self> {
        const WHAT: &str = "certificate";
        let (tag, f) = cbor::tagged(value, WHAT)?;
        let len = |n| cbor::expect_len(f, n, WHAT);
        let cred = |i: usize| Credential::decode(&f[i], "certificate credential");
        let pool = |i: usize| cbor::hash::<28>(&f[i], "certificate pool");
        let coin = |i: usize| cbor::uint(&f[i], "certificate deposit");

        let cert = match tag {
            0 => {
                len(2)?;
                Certificate::StakeRegistration { credential: cred(1)? }
            }
            1 => {
                len(2)?;
                Certificate::StakeDeregistration { credential: cred(1)? }
            }
            2 => {
                len(3)?;
                Certificate::StakeDelegation {
                    credential: cred(1)?,
                    pool: pool(2)?,
                }
            }
            3 => {
                len(10)?;
                Certificate::PoolRegistration(Box::new(decode_pool_params(&f[1..])?))
            }
            4 => {
                len(3)?;
                Certificate::PoolRetirement {
                    pool: pool(1)?,
                    epoch: cbor::uint(&f[2], "pool retirement epoch")?,
                }
            }
            5 => {
                len(4)?;
                cbor::hash::<32>(&f[3], "genesis delegation vrf")?;
                Certificate::GenesisKeyDelegation {
                    genesis: cbor::hash(&f[1], "genesis hash")?,
                    delegate: cbor::hash(&f[2], "genesis delegate hash")?,
                }
            }
            6 => {
                len(2)?;
                decode_mir(&f[1])?
            }
            7 => {
                len(3)?;
                Certificate::Registration {
                    credential: cred(1)?,
                    deposit: coin(2)?,
                }
            }
            8 => {
                len(3)?;
                Certificate::Unregistration {
                    credential: cred(1)?,
                    deposit: coin(2)?,
                }
            }
            9 => {
                len(3)?;
                Certificate::VoteDelegation {
                    credential: cred(1)?,
                    drep: DRep::decode(&f[2])?,
                }
            }
            10 => {
                len(4)?;
                Certificate::StakeVoteDelegation {
                    credential: cred(1)?,
                    pool: pool(2)?,
                    drep: DRep::decode(&f[3])?,
                }
            }
            11 => {
                len(4)?;
                Certificate::StakeRegistrationDelegation {
                    credential: cred(1)?,
                    pool: pool(2)?,
                    deposit: coin(3)?,
                }
            }
            12 => {
                len(4)?;
                Certificate::VoteRegistrationDelegation {
                    credential: cred(1)?,
                    drep: DRep::decode(&f[2])?,
                    deposit: coin(3)?,
                }
            }
            13 => {
                len(5)?;
                Certificate::StakeVoteRegistrationDelegation {
                    credential: cred(1)?,
                    pool: pool(2)?,
                    drep: DRep::decode(&f[3])?,
                    deposit: coin(4)?,
                }
            }
            14 => {
                len(3)?;
                Certificate::AuthCommitteeHot {
                    cold: cred(1)?,
                    hot: cred(2)?,
                }
            }
            15 => {
                len(3)?;
                check_anchor(&f[2])?;
                Certificate::ResignCommitteeCold { cold: cred(1)? }
            }
            16 => {
                len(4)?;
                check_anchor(&f[3])?;
                Certificate::DRepRegistration {
                    credential: cred(1)?,
                    deposit: coin(2)?,
                }
            }
            17 => {
                len(3)?;
                Certificate::DRepUnregistration {
                    credential: cred(1)?,
                    deposit: coin(2)?,
                }
            }
            18 => {
                len(3)?;
                check_anchor(&f[2])?;
                Certificate::DRepUpdate { credential: cred(1)? }
            }
            tag => return Err(malformed(format!("{WHAT}: unknown tag {tag}"))),
        };
        Ok(cert)
    }
}

/// Fields 1..=9 of a pool registration certificate.
fn decode_pool_params(f: &[Value]) -> Result<PoolParams> {
    let margin = match &f[4] {
        Value::Tag(30, inner) => inner.as_ref(),
        other => other,
    };
    let margin = cbor::array_of(margin, 2, "pool margin")?;

    let owners = cbor::set(&f[6], "pool owners")?
        .iter()
        .map(|owner| cbor::hash(owner, "pool owner"))
        .collect::<Result<Vec<_>>>()?;

    cbor::array(&f[7], "pool relays")?;
    if !cbor::is_null(&f[8]) {
        cbor::array_of(&f[8], 2, "pool metadata")?;
    }

    Ok(PoolParams {
        operator: cbor::hash(&f[0], "pool operator")?,
        vrf_keyhash: cbor::hash(&f[1], "pool vrf keyhash")?,
        pledge: cbor::uint(&f[2], "pool pledge")?,
        cost: cbor::uint(&f[3], "pool cost")?,
        margin: (
            cbor::uint(&margin[0], "pool margin")?,
            cbor::uint(&margin[1], "pool margin")?,
        ),
        reward_account: cbor::bytes(&f[5], "pool reward account")?.to_vec(),
        owners,
    })
}

fn decode_mir(value: &Value) -> Result<Certificate> {
    const WHAT: &str = "instantaneous rewards";
    let items = cbor::array_of(value, 2, WHAT)?;
    let pot = match cbor::uint(&items[0], WHAT)? {
        0 => MirPot::Reserves,
        1 => MirPot::Treasury,
        other => return Err(malformed(format!("{WHAT}: unknown pot {other}"))),
    };
    let target = match &items[1] {
        Value::Map(entries) => MirTarget::StakeCredentials(
            entries
                .iter()
                .map(|(cred, delta)| {
                    Ok((
                        Credential::decode(cred, "reward credential")?,
                        cbor::int(delta, "reward delta")?,
                    ))
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        other => MirTarget::OtherPot(cbor::uint(other, WHAT)?),
    };
    Ok(Certificate::MoveInstantaneousRewards { pot, target })
}

/// An anchor is `null` or `[url, hash]`.
fn check_anchor(value: &Value) -> Result<()> {
    if !cbor::is_null(value) {
        let items = cbor::array_of(value, 2, "anchor")?;
        cbor::hash::<32>(&items[1], "anchor hash")?;
    }
    Ok(())
}
