//! Input source detection.

use crate::cli::InputSpec;
use crate::error::{Error, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;

/// Resolved input source ready for reading.
#[derive(Debug)]
pub enum InputSource {
    File(PathBuf),
    /// Hex argument already decoded to bytes.
    Bytes(Vec<u8>),
    Stdin,
}

impl InputSource {
    pub fn from_spec(spec: &InputSpec) -> Result<Self> {
        let source = match spec {
            InputSpec::Stdin => {
                // Nothing piped in
                if std::io::stdin().is_terminal() {
                    return Err(Error::NoInput);
                }
                InputSource::Stdin
            }
            InputSpec::File(path) => {
                if !path.exists() {
                    return Err(Error::FileNotFound(path.clone()));
                }
                InputSource::File(path.clone())
            }
            InputSpec::Hex(hex_str) => InputSource::Bytes(hex::decode(hex_str)?),
        };
        debug!(?spec, "resolved transaction input");
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_input() {
        let spec = InputSpec::Hex("84a400".to_string());
        match InputSource::from_spec(&spec).unwrap() {
            InputSource::Bytes(b) => assert_eq!(b, vec![0x84, 0xa4, 0x00]),
            other => panic!("expected bytes, got {other:?}"),
        }
    }

    #[test]
    fn test_odd_length_hex() {
        let spec = InputSpec::Hex("84a40".to_string());
        assert!(matches!(
            InputSource::from_spec(&spec),
            Err(Error::InvalidHex(_))
        ));
    }

    #[test]
    fn test_file_not_found() {
        let spec = InputSpec::File(PathBuf::from("/nonexistent/tx.cbor"));
        assert!(matches!(
            InputSource::from_spec(&spec),
            Err(Error::FileNotFound(_))
        ));
    }
}
