//! JSON output formatting.

use crate::analysis::AnalysisResult;
use crate::error::{Error, Result};

/// Format an analysis as pretty-printed JSON.
pub fn format_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result).map_err(|e| Error::FormatError(e.to_string()))
}
