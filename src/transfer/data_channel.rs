//! Module `data_channel`
//!
//! Opens the outbound data connection used by LIST, RETR and STOR.
//! Only active mode exists: the server always dials the address the
//! client advertised with PORT.

use log::{debug, error, info};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::client::Session;
use crate::error::TransferError;

/// Dials the data address stored on `session`.
///
/// Permitted only when the command executed immediately before the current
/// one was PORT; a PORT followed by any other command must be re-issued.
/// The returned stream is owned by the caller and closed when dropped.
pub async fn open_data_connection(session: &Session) -> Result<TcpStream, TransferError> {
    if session.last_command() != Some("PORT") {
        return Err(TransferError::NoPriorAddress);
    }
    let data_socket = session.data_addr().ok_or(TransferError::NoPriorAddress)?;

    match TcpStream::connect(data_socket).await {
        Ok(stream) => {
            info!("Active mode: connected to data socket {}", data_socket);
            Ok(stream)
        }
        Err(e) => {
            error!("Failed to connect to data socket {}: {}", data_socket, e);
            Err(TransferError::DialFailure(data_socket, e))
        }
    }
}

/// Shuts down the write half so the peer sees end of stream, then drops
/// the connection.
pub async fn close_data_connection(mut stream: TcpStream) {
    if let Err(e) = stream.shutdown().await {
        debug!("Data connection shutdown failed: {}", e);
    }
}
