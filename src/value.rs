//! Coin plus multi-asset value arithmetic.
//!
//! Coin is treated as just another unit (`lovelace`) once a value is
//! flattened, so deltas over coin and tokens are computed the same way.

use crate::asset::AssetId;
use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Unit string used for the coin component.
pub const LOVELACE: &str = "lovelace";

/// A coin amount plus native asset quantities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value {
    pub coin: u64,
    pub assets: BTreeMap<AssetId, i128>,
}

/// A flattened value unit: coin or one native asset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    Lovelace,
    Asset(AssetId),
}

impl Unit {
    pub fn asset(&self) -> Option<&AssetId> {
        match self {
            Unit::Lovelace => None,
            Unit::Asset(asset) => Some(asset),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Lovelace => f.write_str(LOVELACE),
            Unit::Asset(asset) => write!(f, "{asset}"),
        }
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One `(unit, quantity)` pair of a flattened value or delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quantity {
    pub unit: Unit,
    pub quantity: i128,
}

impl Value {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_coin(coin: u64) -> Self {
        Self {
            coin,
            assets: BTreeMap::new(),
        }
    }

    /// Builder-style asset insertion; quantities for the same asset accumulate.
    pub fn with_asset(mut self, asset: AssetId, quantity: i128) -> Result<Self> {
        let entry = self.assets.entry(asset).or_insert(0);
        *entry = entry.checked_add(quantity).ok_or(Error::ValueOverflow)?;
        Ok(self)
    }

    pub fn is_zero(&self) -> bool {
        self.coin == 0 && self.assets.values().all(|q| *q == 0)
    }

    /// Sum of two values.
    pub fn checked_add(&self, other: &Value) -> Result<Value> {
        let coin = self
            .coin
            .checked_add(other.coin)
            .ok_or(Error::ValueOverflow)?;
        let mut assets = self.assets.clone();
        for (asset, quantity) in &other.assets {
            let entry = assets.entry(asset.clone()).or_insert(0);
            *entry = entry.checked_add(*quantity).ok_or(Error::ValueOverflow)?;
        }
        Ok(Value { coin, assets })
    }

    /// Lovelace first, then assets in policy/name order.
    pub fn flatten(&self) -> Vec<Quantity> {
        let mut out = Vec::with_capacity(1 + self.assets.len());
        out.push(Quantity {
            unit: Unit::Lovelace,
            quantity: i128::from(self.coin),
        });
        out.extend(self.assets.iter().map(|(asset, quantity)| Quantity {
            unit: Unit::Asset(asset.clone()),
            quantity: *quantity,
        }));
        out
    }

    /// Signed `self - other` over the union of units of both sides.
    ///
    /// A unit missing on one side counts as zero. Zero differences are kept;
    /// use [`retain_nonzero`] for display.
    pub fn subtract(&self, other: &Value) -> Result<Vec<Quantity>> {
        let mut out = vec![Quantity {
            unit: Unit::Lovelace,
            quantity: i128::from(self.coin) - i128::from(other.coin),
        }];

        let units: BTreeSet<&AssetId> = self.assets.keys().chain(other.assets.keys()).collect();
        for asset in units {
            let left = self.assets.get(asset).copied().unwrap_or(0);
            let right = other.assets.get(asset).copied().unwrap_or(0);
            let quantity = left.checked_sub(right).ok_or(Error::ValueOverflow)?;
            out.push(Quantity {
                unit: Unit::Asset(asset.clone()),
                quantity,
            });
        }
        Ok(out)
    }
}

/// Drop zero-quantity entries.
pub fn retain_nonzero(quantities: Vec<Quantity>) -> Vec<Quantity> {
    quantities.into_iter().filter(|q| q.quantity != 0).collect()
}
