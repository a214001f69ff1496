//! FTP Response handling
//!
//! Defines FTP response codes and formatting.

use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Standard FTP response codes
pub const OPENING_DATA: u16 = 150;
pub const OK: u16 = 200;
pub const SYSTEM_TYPE: u16 = 215;
pub const GOODBYE: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const LOGIN_SUCCESS: u16 = 230;
pub const DIRECTORY_CHANGED: u16 = 250;
pub const CANNOT_OPEN_DATA_CONNECTION: u16 = 425;
pub const TRANSFER_ABORTED: u16 = 450;
pub const BAD_ARGUMENTS: u16 = 501;
pub const NOT_IMPLEMENTED: u16 = 502;
pub const UNSUPPORTED_TYPE: u16 = 504;

/// Format an FTP response message
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Writes one reply line to the control connection and flushes it.
pub async fn send_response<W>(writer: &mut W, code: u16, message: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(format_response(code, message).as_bytes())
        .await?;
    writer.flush().await
}
