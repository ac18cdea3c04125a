//! Error types for txi.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for txi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a decoded transaction must not be signed by this wallet.
///
/// These never abort an analysis; they are recorded on the result so the
/// value and recipient information can still be shown.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Blocker {
    /// None of the required signers belongs to the account.
    #[error("Signature not possible")]
    SignatureNotPossible,

    /// A wallet UTXO is used as collateral but the account has none registered.
    #[error("Collateral not set")]
    CollateralNotSet,

    /// A wallet UTXO other than the registered collateral is used as collateral.
    #[error("Invalid collateral used")]
    InvalidCollateralUsed,
}

/// Errors that can occur in txi.
#[derive(Error, Debug)]
pub enum Error {
    /// No input was provided (no file, no stdin, no hex).
    #[error("No input provided. Use: txi <file>, txi <hex>, or pipe CBOR to stdin")]
    NoInput,

    /// The specified file was not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// An I/O error occurred.
    #[error("IO error{}: {source}", path.as_ref().map(|p| format!(" reading {}", p.display())).unwrap_or_default())]
    IoError {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Invalid hex input.
    #[error("Invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The bytes do not form a transaction we can decode.
    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    /// The account address is not a key-backed base address.
    #[error("Unsupported address type: {0}")]
    UnsupportedAddressType(String),

    /// Value arithmetic left the representable range.
    #[error("Value overflow")]
    ValueOverflow,

    /// The wallet snapshot could not be used.
    #[error("Invalid wallet: {0}")]
    InvalidWallet(String),

    /// Output formatting error.
    #[error("Format error: {0}")]
    FormatError(String),

    /// Signing was refused by the analysis (only raised in check mode).
    #[error(transparent)]
    Blocked(#[from] Blocker),
}

impl Error {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Transaction could not be analyzed
            Error::MalformedTransaction(_) | Error::ValueOverflow => 1,
            Error::InvalidHex(_) => 2,
            // I/O errors
            Error::NoInput | Error::FileNotFound(_) | Error::IoError { .. } => 3,
            // Account setup errors
            Error::InvalidWallet(_) | Error::UnsupportedAddressType(_) => 4,
            Error::FormatError(_) => 5,
            Error::Blocked(_) => 6,
        }
    }
}
