//! FTP Transfer modes
//!
//! Handles the representation type selected with TYPE.

use crate::error::ProtocolError;

/// Representation used when moving file bytes over the data connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferType {
    /// Bytes are copied verbatim (`TYPE I`, `TYPE L 8`)
    Binary,
    /// Line endings are normalised to CRLF (`TYPE A`, `TYPE A N`)
    #[default]
    Text,
}

impl TransferType {
    /// Resolves the TYPE argument tokens into a transfer type.
    pub fn from_args(args: &[String]) -> Result<Self, ProtocolError> {
        let joined = args.join(" ").to_ascii_uppercase();
        match joined.as_str() {
            "A" | "A N" => Ok(TransferType::Text),
            "I" | "L 8" => Ok(TransferType::Binary),
            _ => Err(ProtocolError::UnsupportedType(joined)),
        }
    }
}
