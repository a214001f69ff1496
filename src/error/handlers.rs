//! Error handlers
//!
//! Maps domain errors onto FTP reply codes.

use crate::error::types::{FtpServerError, ProtocolError, TransferError};
use crate::protocol::responses::{
    BAD_ARGUMENTS, CANNOT_OPEN_DATA_CONNECTION, TRANSFER_ABORTED, UNSUPPORTED_TYPE,
};
use log::error;

/// Handle an FTP server error
pub fn handle_error(err: &FtpServerError) {
    error!("FTP Server Error: {}", err);
}

/// Reply code for a rejected command argument
pub fn protocol_error_code(err: &ProtocolError) -> u16 {
    match err {
        ProtocolError::MalformedAddress(_) => BAD_ARGUMENTS,
        ProtocolError::UnsupportedType(_) => UNSUPPORTED_TYPE,
    }
}

/// Reply code for a failed transfer command
pub fn transfer_error_code(err: &TransferError) -> u16 {
    match err {
        TransferError::NoPriorAddress | TransferError::DialFailure(..) => {
            CANNOT_OPEN_DATA_CONNECTION
        }
        TransferError::FileOpen(..) => BAD_ARGUMENTS,
        TransferError::Io(_) => TRANSFER_ABORTED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn data_connection_errors_are_transient() {
        assert_eq!(transfer_error_code(&TransferError::NoPriorAddress), 425);

        let dial = TransferError::DialFailure(
            "127.0.0.1:1".parse().unwrap(),
            io::Error::from(io::ErrorKind::ConnectionRefused),
        );
        assert_eq!(transfer_error_code(&dial), 425);
    }

    #[test]
    fn file_and_stream_errors() {
        let open = TransferError::FileOpen(
            PathBuf::from("/nope"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert_eq!(transfer_error_code(&open), 501);
        let mid = TransferError::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(transfer_error_code(&mid), 450);
    }

    #[test]
    fn protocol_errors_are_permanent() {
        let err = ProtocolError::UnsupportedType("E".into());
        assert_eq!(protocol_error_code(&err), 504);
        let err = ProtocolError::MalformedAddress("1,2".into());
        assert_eq!(protocol_error_code(&err), 501);
    }
}
