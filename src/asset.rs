//! Native asset identifiers, CIP-14 fingerprints and the metadata lookup.

use crate::hash::PolicyId;
use bech32::{Bech32, Hrp};
use blake2::digest::consts::U20;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum length of an asset name in bytes.
pub const MAX_ASSET_NAME_LEN: usize = 32;

const FINGERPRINT_HRP: Hrp = Hrp::parse_unchecked("asset");

/// A native asset: minting policy plus asset name.
///
/// Its unit string is the policy id hex immediately followed by the name hex.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId {
    pub policy: PolicyId,
    pub name: Vec<u8>,
}

impl AssetId {
    pub fn new(policy: PolicyId, name: Vec<u8>) -> Self {
        Self { policy, name }
    }

    /// The `policy‖name` hex unit.
    pub fn unit(&self) -> String {
        format!("{}{}", self.policy, hex::encode(&self.name))
    }

    pub fn name_hex(&self) -> String {
        hex::encode(&self.name)
    }

    /// Asset name as text, when it is printable UTF-8.
    pub fn name_utf8(&self) -> Option<String> {
        let text = std::str::from_utf8(&self.name).ok()?;
        if text.is_empty() || text.chars().any(char::is_control) {
            return None;
        }
        Some(text.to_string())
    }

    /// CIP-14 fingerprint: bech32 (`asset`) of blake2b-160 over policy and name.
    pub fn fingerprint(&self) -> Option<String> {
        let mut hasher = Blake2b::<U20>::new();
        hasher.update(self.policy.as_bytes());
        hasher.update(&self.name);
        let digest = hasher.finalize();
        bech32::encode::<Bech32>(FINGERPRINT_HRP, &digest).ok()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unit())
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.unit())
    }
}

impl FromStr for AssetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 56 || !s.is_char_boundary(56) {
            return Err(format!("asset unit '{s}' is shorter than a policy id"));
        }
        let (policy, name) = s.split_at(56);
        let policy = policy
            .parse::<PolicyId>()
            .map_err(|e| format!("invalid policy id in '{s}': {e}"))?;
        let name = hex::decode(name).map_err(|e| format!("invalid asset name in '{s}': {e}"))?;
        if name.len() > MAX_ASSET_NAME_LEN {
            return Err(format!("asset name in '{s}' exceeds {MAX_ASSET_NAME_LEN} bytes"));
        }
        Ok(Self { policy, name })
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.unit())
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Display metadata for an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

/// Asset metadata lookup.
///
/// Only used to enrich already identified assets for display. A miss is
/// never an error for the analysis.
pub trait AssetRegistry {
    fn get_asset(&self, asset: &AssetId) -> Option<AssetMetadata>;
}

/// Registry that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

impl AssetRegistry for NoRegistry {
    fn get_asset(&self, _asset: &AssetId) -> Option<AssetMetadata> {
        None
    }
}

/// Registry backed by a fixed table, e.g. the `assets` section of a wallet snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticRegistry(BTreeMap<AssetId, AssetMetadata>);

impl StaticRegistry {
    pub fn insert(&mut self, asset: AssetId, metadata: AssetMetadata) {
        self.0.insert(asset, metadata);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AssetRegistry for StaticRegistry {
    fn get_asset(&self, asset: &AssetId) -> Option<AssetMetadata> {
        self.0.get(asset).cloned()
    }
}
