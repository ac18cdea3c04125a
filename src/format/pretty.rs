//! Pretty terminal output with colors and tables.

use crate::analysis::{AnalysisResult, AssetEntry, KeyKind, TxDetails};
use crate::cli::Args;
use crate::error::Result;
use colored::Colorize;
use comfy_table::{Cell, ContentArrangement, Table, presets};

const LOVELACE_DECIMALS: u8 = 6;

/// Format an analysis as a terminal report.
pub fn format_pretty(result: &AnalysisResult, args: &Args) -> Result<String> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let mut output = String::new();

    output.push_str(&format!("{}\n", "Transaction".bold().cyan()));
    output.push_str(&format!(
        "  {} {}\n",
        "Fee:".dimmed(),
        format_lovelace(i128::from(result.fee), args)
    ));
    let status = match result.error {
        None => "yes".green().to_string(),
        Some(blocker) => format!("{} ({})", "no".red(), blocker),
    };
    output.push_str(&format!("  {} {}\n", "Can sign:".dimmed(), status));

    let labels = result.properties.labels();
    if !labels.is_empty() {
        output.push_str(&format!(
            "  {} {}\n",
            "Properties:".dimmed(),
            labels.join(", ").yellow()
        ));
    }
    if !result.certificates.is_empty() {
        output.push_str(&format!(
            "  {} {}\n",
            "Certificates:".dimmed(),
            result.certificates.join(", ")
        ));
    }
    output.push_str(&format_details(&result.details, args));
    output.push('\n');

    output.push_str(&format!("{}\n", "Your Wallet".bold().cyan()));
    if result.own_value_delta.is_empty() {
        output.push_str(&format!("  {}\n\n", "no change".dimmed()));
    } else {
        output.push_str(&format_delta_table(&result.own_value_delta, args));
        output.push('\n');
    }

    if !result.external_recipients.is_empty() {
        output.push_str(&format!(
            "{} ({})\n",
            "Recipients".bold().cyan(),
            result.external_recipients.len()
        ));
        output.push_str(&format_recipients_table(result, args));
        output.push('\n');
    }

    output.push_str(&format!(
        "{} ({})\n",
        "Required Signers".bold().cyan(),
        result.required_key_hashes.len()
    ));
    for requirement in &result.required_key_hashes {
        let kind = match requirement.kind {
            KeyKind::Payment => "payment".green(),
            KeyKind::Stake => "stake".green(),
            KeyKind::Unknown => "unknown".dimmed(),
        };
        output.push_str(&format!(
            "  {} {}\n",
            truncate_hash(&requirement.hash.to_string(), 24),
            kind
        ));
    }
    if result.foreign_inputs > 0 {
        output.push_str(&format!(
            "  {} {} input(s) spent from outside this wallet\n",
            "!".yellow(),
            result.foreign_inputs
        ));
    }

    if let Some(blocker) = result.error {
        output.push_str(&format!("\n{}: {}\n", "blocked".red().bold(), blocker));
    }

    Ok(output)
}

/// Validity, collateral and script lines; each only when there is something to say.
fn format_details(details: &TxDetails, args: &Args) -> String {
    let mut output = String::new();

    let validity = match (details.validity_start, details.ttl) {
        (Some(start), Some(ttl)) => Some(format!("slots {} to {}", start, ttl)),
        (Some(start), None) => Some(format!("from slot {}", start)),
        (None, Some(ttl)) => Some(format!("until slot {}", ttl)),
        (None, None) => None,
    };
    if let Some(validity) = validity {
        output.push_str(&format!("  {} {}\n", "Valid:".dimmed(), validity));
    }

    let mut collateral = Vec::new();
    if let Some(total) = details.total_collateral {
        collateral.push(format!("total {}", format_lovelace(i128::from(total), args)));
    }
    if let Some(back) = details.collateral_return {
        collateral.push(format!("return {}", format_lovelace(i128::from(back), args)));
    }
    if !collateral.is_empty() {
        output.push_str(&format!(
            "  {} {}\n",
            "Collateral:".dimmed(),
            collateral.join(", ")
        ));
    }

    if details.runs_scripts() {
        let mut parts = Vec::new();
        if details.has_plutus_scripts {
            parts.push("plutus scripts");
        }
        if details.has_redeemers {
            parts.push("redeemers");
        }
        output.push_str(&format!(
            "  {} {}\n",
            "Scripts:".dimmed(),
            parts.join(", ").yellow()
        ));
    }
    if details.reference_inputs > 0 {
        output.push_str(&format!(
            "  {} {}\n",
            "Reference inputs:".dimmed(),
            details.reference_inputs
        ));
    }
    output
}

/// Own value delta, shown from the wallet's point of view: what leaves is negative.
fn format_delta_table(entries: &[AssetEntry], args: &Args) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Asset").fg(comfy_table::Color::DarkGrey),
        Cell::new("Fingerprint").fg(comfy_table::Color::DarkGrey),
        Cell::new("Amount").fg(comfy_table::Color::DarkGrey),
    ]);

    for entry in entries {
        let change = entry.quantity.saturating_neg();
        let amount = format_signed(format_amount(change, entry, args), change);
        let amount = if change < 0 {
            amount.red().to_string()
        } else {
            amount.green().to_string()
        };
        table.add_row(vec![
            Cell::new(asset_label(entry)),
            Cell::new(entry.fingerprint.as_deref().unwrap_or("-")),
            Cell::new(amount),
        ]);
    }

    format!("{}\n", table)
}

fn format_recipients_table(result: &AnalysisResult, args: &Args) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Address").fg(comfy_table::Color::DarkGrey),
        Cell::new("Value").fg(comfy_table::Color::DarkGrey),
        Cell::new("Datum").fg(comfy_table::Color::DarkGrey),
    ]);

    for (address, recipient) in &result.external_recipients {
        let value = recipient
            .assets
            .iter()
            .map(|entry| {
                if entry.is_lovelace() {
                    format_amount(entry.quantity, entry, args)
                } else {
                    format!("{} {}", format_amount(entry.quantity, entry, args), asset_label(entry))
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let datum = match &recipient.datum_hash {
            Some(hash) => format!("hash: {}", truncate_hash(&hash.to_string(), 16)),
            None => "-".dimmed().to_string(),
        };
        table.add_row(vec![
            Cell::new(truncate_address(address, 32)),
            Cell::new(value),
            Cell::new(datum),
        ]);
    }

    format!("{}\n", table)
}

/// Ticker, then name, then the truncated unit.
fn asset_label(entry: &AssetEntry) -> String {
    if entry.is_lovelace() {
        return "ADA".to_string();
    }
    entry
        .ticker
        .clone()
        .or_else(|| entry.name.clone())
        .unwrap_or_else(|| truncate_hash(&entry.unit.to_string(), 24))
}

/// Amount without a sign, scaled by the entry's decimals.
fn format_amount(quantity: i128, entry: &AssetEntry, args: &Args) -> String {
    if entry.is_lovelace() {
        format_lovelace(quantity.saturating_abs(), args)
    } else {
        format_scaled(quantity.unsigned_abs(), entry.decimals.unwrap_or(0))
    }
}

fn format_signed(amount: String, quantity: i128) -> String {
    if quantity < 0 {
        format!("-{}", amount)
    } else {
        format!("+{}", amount)
    }
}

/// Format a lovelace amount according to the `--ada` flag.
fn format_lovelace(lovelace: i128, args: &Args) -> String {
    let sign = if lovelace < 0 { "-" } else { "" };
    if args.ada {
        format!(
            "{}{} ADA",
            sign,
            format_scaled(lovelace.unsigned_abs(), LOVELACE_DECIMALS)
        )
    } else {
        format!(
            "{}{} lovelace",
            sign,
            format_number_with_separators(lovelace.unsigned_abs())
        )
    }
}

/// Fixed-point rendering of an integer quantity with `decimals` fractional digits.
fn format_scaled(n: u128, decimals: u8) -> String {
    let Some(scale) = 10u128.checked_pow(u32::from(decimals)) else {
        return format_number_with_separators(n);
    };
    if decimals == 0 {
        return format_number_with_separators(n);
    }
    format!(
        "{}.{:0width$}",
        format_number_with_separators(n / scale),
        n % scale,
        width = usize::from(decimals)
    )
}

/// Format a number with thousand separators.
fn format_number_with_separators(n: u128) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Truncate a hash for display.
fn truncate_hash(hash: &str, max_len: usize) -> String {
    if hash.len() <= max_len {
        hash.to_string()
    } else {
        let half = (max_len - 3) / 2;
        format!("{}...{}", &hash[..half], &hash[hash.len() - half..])
    }
}

/// Truncate an address for display, keeping the human-readable prefix.
fn truncate_address(addr: &str, max_len: usize) -> String {
    if addr.len() <= max_len {
        return addr.to_string();
    }
    let prefix_end = addr.find('1').map(|i| i + 1).unwrap_or(5);
    let suffix_len = 8;
    let prefix_len = (max_len - suffix_len - 3).max(prefix_end);
    format!("{}...{}", &addr[..prefix_len], &addr[addr.len() - suffix_len..])
}
