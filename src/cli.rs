//! CLI argument parsing for txi.

use crate::decode::TransactionInput;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Transaction introspection for Cardano wallet signers.
///
/// Decodes a transaction and reports what it does to your wallet before
/// you sign it: value leaving the account, external recipients, notable
/// properties, required signers and collateral problems.
#[derive(Parser, Debug)]
#[command(
    name = "txi",
    version,
    about = "Transaction introspection for Cardano wallet signers",
    after_help = r#"EXAMPLES:
    txi tx.cbor --wallet wallet.json         Analyze a transaction file
    txi 84a400... --wallet wallet.json       Auto-detect hex input
    cat tx.cbor | txi --wallet wallet.json   Read from stdin
    txi tx.cbor --address addr1q8mnd...      Analyze with no known UTXOs
    txi tx.cbor --json                       JSON output
    txi tx.cbor --check                      Exit 6 if signing is blocked
    txi addr addr1q8mnd...                   Show an address's credentials

ENVIRONMENT:
    TXI_WALLET   Wallet snapshot used when --wallet is not given
    RUST_LOG     Log filter (e.g. txi=debug); logs go to stderr"#
)]
pub struct Args {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Transaction file or hex string. Reads stdin when omitted.
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Wallet snapshot (JSON) with the account, its UTXOs and asset metadata.
    #[arg(long, short = 'w', env = "TXI_WALLET", value_name = "FILE")]
    pub wallet: Option<PathBuf>,

    /// Account payment address, overriding the wallet snapshot's.
    #[arg(long, value_name = "ADDRESS")]
    pub address: Option<String>,

    /// Registered collateral UTXO, overriding the wallet snapshot's.
    #[arg(long, value_name = "TXHASH#INDEX")]
    pub collateral: Option<TransactionInput>,

    /// Output as JSON.
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Display ADA amounts instead of lovelace.
    #[arg(long, short = 'a')]
    pub ada: bool,

    /// Print nothing; exit 6 if signing is blocked.
    #[arg(long, short = 'c')]
    pub check: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode and display a Cardano address.
    ///
    /// Shows the address type, network, payment and stake credentials, and
    /// whether it can serve as a wallet account address.
    #[command(name = "addr")]
    Address {
        /// The bech32 address to decode (e.g., addr1..., stake1..., addr_test1...).
        address: String,

        /// Output as JSON.
        #[arg(long, short = 'j')]
        json: bool,
    },
}

/// Specifies how to obtain input bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// Read from stdin.
    Stdin,
    /// Read from a file path.
    File(PathBuf),
    /// Parse hex string directly.
    Hex(String),
}

impl Args {
    /// Where the transaction bytes come from.
    pub fn input_spec(&self) -> InputSpec {
        match &self.input {
            None => InputSpec::Stdin,
            Some(input) => InputSpec::detect(input),
        }
    }
}

impl InputSpec {
    /// Detect input type from a string argument.
    pub fn detect(s: &str) -> Self {
        let hex_candidate = s.strip_prefix("0x").unwrap_or(s);

        // Hex when every character is a hex digit and it opens with a CBOR
        // array header of 3 or 4 items (the two transaction envelopes).
        if hex_candidate.len() >= 8
            && hex_candidate.chars().all(|c| c.is_ascii_hexdigit())
            && (hex_candidate.starts_with("84") || hex_candidate.starts_with("83"))
        {
            return InputSpec::Hex(hex_candidate.to_string());
        }

        InputSpec::File(PathBuf::from(s))
    }
}
