//! Reading and unwrapping transaction bytes.

use crate::cli::InputSpec;
use crate::error::{Error, Result};
use crate::input::InputSource;
use serde::Deserialize;
use std::fs;
use std::io::{self, Read};

/// cardano-cli `TextEnvelope`, as written by `transaction build`.
#[derive(Deserialize)]
struct TextEnvelope {
    #[serde(rename = "cborHex")]
    cbor_hex: String,
}

/// Read transaction bytes from the specified source.
pub fn read_input(spec: &InputSpec) -> Result<Vec<u8>> {
    match InputSource::from_spec(spec)? {
        InputSource::Bytes(bytes) => Ok(bytes),
        InputSource::File(path) => {
            let buffer = fs::read(&path).map_err(|e| Error::IoError {
                path: Some(path),
                source: e,
            })?;
            decode_text_input(buffer)
        }
        InputSource::Stdin => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| Error::IoError {
                    path: None,
                    source: e,
                })?;
            decode_text_input(buffer)
        }
    }
}

/// Unwrap hex or a text envelope; anything else is taken as raw CBOR.
pub fn decode_text_input(buffer: Vec<u8>) -> Result<Vec<u8>> {
    let Ok(text) = std::str::from_utf8(&buffer) else {
        return Ok(buffer);
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::NoInput);
    }

    if trimmed.starts_with('{') {
        let envelope: TextEnvelope = serde_json::from_str(trimmed)
            .map_err(|e| Error::MalformedTransaction(format!("text envelope: {e}")))?;
        return Ok(hex::decode(envelope.cbor_hex.trim())?);
    }

    let hex_candidate = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if hex_candidate.len() >= 4 && hex_candidate.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(hex::decode(hex_candidate)?);
    }
    Ok(buffer)
}
