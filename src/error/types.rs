//! Error types
//!
//! Defines domain-specific error types for each module of the FTP server.

use std::fmt;
use std::io;
use std::net::SocketAddrV4;
use std::path::PathBuf;

/// Errors caused by malformed client input on the control connection
#[derive(Debug)]
pub enum ProtocolError {
    MalformedAddress(String),
    UnsupportedType(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MalformedAddress(a) => write!(f, "Malformed address: {}", a),
            ProtocolError::UnsupportedType(t) => write!(f, "Unsupported type: {}", t),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Data connection and file transfer errors
#[derive(Debug)]
pub enum TransferError {
    NoPriorAddress,
    DialFailure(SocketAddrV4, io::Error),
    FileOpen(PathBuf, io::Error),
    Io(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::NoPriorAddress => write!(f, "previous command not PORT"),
            TransferError::DialFailure(addr, e) => {
                write!(f, "Failed to connect to {}: {}", addr, e)
            }
            TransferError::FileOpen(path, e) => {
                write!(f, "Cannot open {}: {}", path.display(), e)
            }
            TransferError::Io(e) => write!(f, "Transfer failed: {}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::DialFailure(_, e)
            | TransferError::FileOpen(_, e)
            | TransferError::Io(e) => Some(e),
            TransferError::NoPriorAddress => None,
        }
    }
}

impl From<io::Error> for TransferError {
    fn from(error: io::Error) -> Self {
        TransferError::Io(error)
    }
}

/// General FTP server error that encompasses all error types
#[derive(Debug)]
pub enum FtpServerError {
    Protocol(ProtocolError),
    Transfer(TransferError),
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for FtpServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpServerError::Protocol(e) => write!(f, "Protocol error: {}", e),
            FtpServerError::Transfer(e) => write!(f, "Transfer error: {}", e),
            FtpServerError::Config(e) => write!(f, "Configuration error: {}", e),
            FtpServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FtpServerError {}

impl From<ProtocolError> for FtpServerError {
    fn from(error: ProtocolError) -> Self {
        FtpServerError::Protocol(error)
    }
}

impl From<TransferError> for FtpServerError {
    fn from(error: TransferError) -> Self {
        FtpServerError::Transfer(error)
    }
}

impl From<config::ConfigError> for FtpServerError {
    fn from(error: config::ConfigError) -> Self {
        FtpServerError::Config(error)
    }
}

impl From<io::Error> for FtpServerError {
    fn from(error: io::Error) -> Self {
        FtpServerError::IoError(error)
    }
}
