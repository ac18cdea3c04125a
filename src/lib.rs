//! txi - transaction introspection for Cardano wallet signers.
//!
//! Decodes a transaction and derives what a signer must see before
//! approving it.
//!
//! # Features
//!
//! - Read transactions from file, hex string, text envelope, or stdin
//! - Net value change of the signing account, tokens included
//! - Outgoing value per external recipient, with attached datum hashes
//! - Property flags (metadata, certificates, withdrawals, minting, scripts)
//! - Required signer key hashes classified against the account's keys
//! - Collateral checks against the account's registered collateral
//! - Pretty terminal report or JSON, and a `--check` mode for scripts

pub mod analysis;
pub mod asset;
pub mod cli;
pub mod decode;
pub mod error;
pub mod format;
pub mod hash;
pub mod input;
pub mod value;
pub mod wallet;

pub use analysis::{AnalysisResult, analyze};
pub use cli::{Args, Command};
pub use error::{Blocker, Error, Result};

use decode::{Decoder, describe_address};
use format::format_output;
use input::read_input;
use tracing::info;
use wallet::{Account, WalletSnapshot};

/// Run txi with the given arguments.
pub fn run(args: &Args) -> Result<()> {
    if let Some(Command::Address { address, json }) = &args.command {
        let report = describe_address(address)?;
        let output = if *json {
            serde_json::to_string_pretty(&report.to_json())
                .map_err(|e| Error::FormatError(e.to_string()))?
        } else {
            report.to_pretty()
        };
        println!("{}", output);
        return Ok(());
    }

    let wallet = load_wallet(args)?;
    let bytes = read_input(&args.input_spec())?;

    let result = analyze(&Decoder::new(), &bytes, &wallet, &wallet.assets)?;
    info!(
        fee = result.fee,
        recipients = result.external_recipients.len(),
        can_sign = result.can_sign(),
        "analysis complete"
    );

    // Check mode: the exit code is the answer
    if args.check {
        return match result.error {
            Some(blocker) => Err(blocker.into()),
            None => Ok(()),
        };
    }

    let output = format_output(&result, args)?;
    println!("{}", output);

    Ok(())
}

/// The wallet snapshot with command-line overrides applied.
fn load_wallet(args: &Args) -> Result<WalletSnapshot> {
    let mut wallet = match (&args.wallet, &args.address) {
        (Some(path), _) => WalletSnapshot::load(path)?,
        (None, Some(address)) => WalletSnapshot::for_account(Account::new(address.as_str())),
        (None, None) => {
            return Err(Error::InvalidWallet(
                "no wallet given; use --wallet <FILE>, TXI_WALLET, or --address <ADDRESS>".into(),
            ));
        }
    };

    if let Some(address) = &args.address {
        wallet.account.payment_address = address.clone();
    }
    if let Some(collateral) = args.collateral {
        wallet.account.collateral = Some(collateral);
    }
    Ok(wallet)
}
