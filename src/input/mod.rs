//! Where transaction bytes come from.
//!
//! Files and stdin may hold raw CBOR, a hex string, or a cardano-cli text
//! envelope (`{"type": ..., "cborHex": ...}`).

mod detect;
mod read;

pub use detect::InputSource;
pub use read::{decode_text_input, read_input};
