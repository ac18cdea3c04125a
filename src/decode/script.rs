//! Native scripts.

use crate::decode::cbor::{self, malformed};
use crate::error::Result;
use crate::hash::KeyHash;
use ciborium::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeScript {
    ScriptPubkey(KeyHash),
    ScriptAll(Vec<NativeScript>),
    ScriptAny(Vec<NativeScript>),
    ScriptNOfK(u32, Vec<NativeScript>),
    InvalidBefore(u64),
    InvalidHereafter(u64),
}

impl NativeScript {
    pub(crate) fn decode(value: &Value) -> Result<Self> {
        const WHAT: &str = "native script";
        let (tag, f) = cbor::tagged(value, WHAT)?;
        let children = |v: &Value| -> Result<Vec<NativeScript>> {
            cbor::array(v, WHAT)?.iter().map(NativeScript::decode).collect()
        };

        let script = match tag {
            0 => {
                cbor::expect_len(f, 2, WHAT)?;
                NativeScript::ScriptPubkey(cbor::hash(&f[1], "script pubkey")?)
            }
            1 => {
                cbor::expect_len(f, 2, WHAT)?;
                NativeScript::ScriptAll(children(&f[1])?)
            }
            2 => {
                cbor::expect_len(f, 2, WHAT)?;
                NativeScript::ScriptAny(children(&f[1])?)
            }
            3 => {
                cbor::expect_len(f, 3, WHAT)?;
                let n = cbor::uint(&f[1], "script n-of-k")?;
                let n = u32::try_from(n)
                    .map_err(|_| malformed(format!("{WHAT}: n-of-k threshold {n} too large")))?;
                NativeScript::ScriptNOfK(n, children(&f[2])?)
            }
            4 => {
                cbor::expect_len(f, 2, WHAT)?;
                NativeScript::InvalidBefore(cbor::uint(&f[1], "script invalid before")?)
            }
            5 => {
                cbor::expect_len(f, 2, WHAT)?;
                NativeScript::InvalidHereafter(cbor::uint(&f[1], "script invalid hereafter")?)
            }
            tag => return Err(malformed(format!("{WHAT}: unknown tag {tag}"))),
        };
        Ok(script)
    }

    /// Every `ScriptPubkey` key hash in this script tree, depth first.
    pub fn key_hashes(&self) -> Vec<KeyHash> {
        match self {
            NativeScript::ScriptPubkey(hash) => vec![*hash],
            NativeScript::ScriptAll(scripts)
            | NativeScript::ScriptAny(scripts)
            | NativeScript::ScriptNOfK(_, scripts) => {
                scripts.iter().flat_map(NativeScript::key_hashes).collect()
            }
            NativeScript::InvalidBefore(_) | NativeScript::InvalidHereafter(_) => vec![],
        }
    }
}
