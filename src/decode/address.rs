//! Address credentials: what keys an address is controlled by.

use crate::decode::certificate::Credential;
use crate::error::{Error, Result};
use crate::hash::{Hash, KeyHash};
use cml_chain::address::Address;
use cml_chain::certs::Credential as CmlCredential;
use cml_core::serialization::ToBytes;
use cml_crypto::RawBytesEncoding;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Header nibbles (CIP-19) whose payment credential is a script hash:
/// base script/key, base script/script, pointer script, enterprise script.
const SCRIPT_PAYMENT_HEADERS: [u8; 4] = [0b0111, 0b0011, 0b0001, 0b0101];

/// Reward address header nibbles.
const REWARD_KEY_HEADER: u8 = 0b1110;
const REWARD_SCRIPT_HEADER: u8 = 0b1111;

/// Kind of payment credential behind an output address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    Key,
    Script,
}

/// Classify an output address from the top four bits of its header byte.
pub fn classify_output_credential(address: &[u8]) -> CredentialKind {
    match address.first() {
        Some(header) if SCRIPT_PAYMENT_HEADERS.contains(&(header >> 4)) => CredentialKind::Script,
        _ => CredentialKind::Key,
    }
}

/// The stake credential of a raw reward address.
pub fn reward_credential(reward_account: &[u8]) -> Option<Credential> {
    let header = *reward_account.first()?;
    let hash = Hash::<28>::try_from(reward_account.get(1..29)?).ok()?;
    match header >> 4 {
        REWARD_KEY_HEADER => Some(Credential::Key(hash)),
        REWARD_SCRIPT_HEADER => Some(Credential::Script(hash)),
        _ => None,
    }
}

/// Bech32 rendering of raw address bytes, falling back to hex (e.g. Byron).
pub fn render_address(address: &[u8]) -> String {
    Address::from_raw_bytes(address)
        .ok()
        .and_then(|addr| addr.to_bech32(None).ok())
        .unwrap_or_else(|| hex::encode(address))
}

/// The key hashes behind a wallet account's base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountKeys {
    /// Raw bytes of the payment address.
    pub address: Vec<u8>,
    pub payment: KeyHash,
    pub stake: KeyHash,
}

impl AccountKeys {
    /// Resolve a bech32 base address whose payment and stake parts are both keys.
    pub fn from_bech32(address: &str) -> Result<Self> {
        let addr = Address::from_bech32(address)
            .map_err(|e| Error::UnsupportedAddressType(format!("{address}: {e}")))?;

        let Address::Base(base) = &addr else {
            return Err(Error::UnsupportedAddressType(format!(
                "{address}: not a base address"
            )));
        };

        let payment = key_credential(&base.payment)
            .ok_or_else(|| Error::UnsupportedAddressType(format!("{address}: script payment credential")))?;
        let stake = key_credential(&base.stake)
            .ok_or_else(|| Error::UnsupportedAddressType(format!("{address}: script stake credential")))?;

        Ok(Self {
            address: addr.to_raw_bytes().to_vec(),
            payment,
            stake,
        })
    }
}

/// Payment key hash of a key-backed base address.
pub fn payment_key_hash(address: &str) -> Result<KeyHash> {
    AccountKeys::from_bech32(address).map(|keys| keys.payment)
}

/// Stake key hash of a key-backed base address.
pub fn stake_key_hash(address: &str) -> Result<KeyHash> {
    AccountKeys::from_bech32(address).map(|keys| keys.stake)
}

fn to_credential(cred: &CmlCredential) -> Option<Credential> {
    match cred {
        CmlCredential::PubKey { hash, .. } => {
            Hash::try_from(&hash.to_raw_bytes()[..]).ok().map(Credential::Key)
        }
        CmlCredential::Script { hash, .. } => {
            Hash::try_from(&hash.to_raw_bytes()[..]).ok().map(Credential::Script)
        }
    }
}

fn key_credential(cred: &CmlCredential) -> Option<KeyHash> {
    to_credential(cred).and_then(|c| c.key_hash())
}

/// Address type enumeration.
#[derive(Debug, Clone, Copy)]
pub enum AddressType {
    Base,
    Enterprise,
    Reward,
    Pointer,
    Byron,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Base => "base",
            AddressType::Enterprise => "enterprise",
            AddressType::Reward => "reward",
            AddressType::Pointer => "pointer",
            AddressType::Byron => "byron",
        }
    }
}

/// An address broken down into the credentials a signer cares about.
pub struct AddressReport {
    pub address: String,
    pub address_type: AddressType,
    pub mainnet: Option<bool>,
    pub payment: Option<Credential>,
    pub stake: Option<Credential>,
}

impl AddressReport {
    /// Whether a wallet account can use this address as its own.
    pub fn is_account_address(&self) -> bool {
        matches!(self.address_type, AddressType::Base)
            && matches!(self.payment, Some(Credential::Key(_)))
            && matches!(self.stake, Some(Credential::Key(_)))
    }

    pub fn to_json(&self) -> JsonValue {
        let mut json = serde_json::json!({
            "address": self.address,
            "type": self.address_type.as_str(),
            "network": network_name(self.mainnet),
            "account_address": self.is_account_address(),
        });
        if let Some(payment) = &self.payment {
            json["payment_credential"] = serde_json::json!(payment);
        }
        if let Some(stake) = &self.stake {
            json["stake_credential"] = serde_json::json!(stake);
        }
        json
    }

    pub fn to_pretty(&self) -> String {
        use colored::Colorize;

        let mut output = format!("{}\n", "Address".bold().cyan());
        output.push_str(&format!("  {} {}\n", "Address:".dimmed(), self.address));
        output.push_str(&format!(
            "  {} {}\n",
            "Type:".dimmed(),
            self.address_type.as_str().green()
        ));
        output.push_str(&format!(
            "  {} {}\n",
            "Network:".dimmed(),
            network_name(self.mainnet)
        ));

        for (label, cred) in [("Payment:", &self.payment), ("Stake:", &self.stake)] {
            if let Some(cred) = cred {
                let (kind, hash) = match cred {
                    Credential::Key(hash) => ("key", hash.to_string()),
                    Credential::Script(hash) => ("script", hash.to_string()),
                };
                output.push_str(&format!("  {} {} {}\n", label.dimmed(), kind.cyan(), hash));
            }
        }

        let usable = if self.is_account_address() {
            "yes".green()
        } else {
            "no".red()
        };
        output.push_str(&format!("  {} {}\n", "Account address:".dimmed(), usable));
        output
    }
}

fn network_name(mainnet: Option<bool>) -> &'static str {
    match mainnet {
        Some(true) => "mainnet",
        Some(false) => "testnet",
        None => "unknown",
    }
}

/// Break a bech32 address into its credentials.
pub fn describe_address(address: &str) -> Result<AddressReport> {
    let addr = Address::from_bech32(address)
        .map_err(|e| Error::UnsupportedAddressType(format!("{address}: {e}")))?;

    // Bit 0 of a Shelley header is the network id
    let mainnet = addr.to_raw_bytes().first().map(|header| header & 0x01 == 1);

    let (address_type, payment, stake, text) = match &addr {
        Address::Base(base) => (
            AddressType::Base,
            to_credential(&base.payment),
            to_credential(&base.stake),
            address.to_string(),
        ),
        Address::Enterprise(enterprise) => (
            AddressType::Enterprise,
            to_credential(&enterprise.payment),
            None,
            address.to_string(),
        ),
        Address::Ptr(pointer) => (
            AddressType::Pointer,
            to_credential(&pointer.payment),
            None,
            address.to_string(),
        ),
        Address::Reward(reward) => (
            AddressType::Reward,
            None,
            to_credential(&reward.payment),
            address.to_string(),
        ),
        Address::Byron(byron) => (AddressType::Byron, None, None, hex::encode(byron.to_bytes())),
    };

    Ok(AddressReport {
        address: text,
        address_type,
        mainnet: if matches!(address_type, AddressType::Byron) {
            None
        } else {
            mainnet
        },
        payment,
        stake,
    })
}
