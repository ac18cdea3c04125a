//! Output formatting module.

mod json;
mod pretty;

use crate::analysis::AnalysisResult;
use crate::cli::Args;
use crate::error::Result;

pub use json::format_json;
pub use pretty::format_pretty;

/// Format an analysis according to the output flags.
pub fn format_output(result: &AnalysisResult, args: &Args) -> Result<String> {
    if args.json {
        format_json(result)
    } else {
        format_pretty(result, args)
    }
}
