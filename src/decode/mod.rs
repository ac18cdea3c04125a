//! Transaction decoding and address credential resolution.

mod address;
mod cbor;
mod certificate;
mod script;
mod transaction;

pub use address::{
    AccountKeys, AddressReport, AddressType, CredentialKind, classify_output_credential,
    describe_address, payment_key_hash, render_address, reward_credential, stake_key_hash,
};
pub use certificate::{Certificate, Credential, DRep, MirPot, MirTarget, PoolParams};
pub use script::NativeScript;
pub use transaction::{
    Datum, Decoder, Transaction, TransactionBody, TransactionInput, TransactionOutput,
    WitnessSet, Withdrawal, decode_transaction,
};
