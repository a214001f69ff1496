//! Module `state`
//!
//! Defines the per-connection `Session`: working directory, transfer type,
//! the verb of the last executed command and the pending active-mode
//! data address.

use std::net::SocketAddrV4;
use std::path::{Path, PathBuf};

use crate::error::ProtocolError;
use crate::protocol::address::decode_address;
use crate::transfer::TransferType;

/// State of one control connection.
///
/// Owned exclusively by the task serving that connection.
#[derive(Debug)]
pub struct Session {
    working_dir: PathBuf,
    transfer_type: TransferType,
    last_command: Option<String>,
    data_addr: Option<SocketAddrV4>,
}

impl Session {
    /// Creates a session rooted at `working_dir`.
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            transfer_type: TransferType::default(),
            last_command: None,
            data_addr: None,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    /// Verb of the most recently executed command, if any.
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// Address stored by the last successful PORT command.
    pub fn data_addr(&self) -> Option<SocketAddrV4> {
        self.data_addr
    }

    /// Resolves `name` against the working directory.
    ///
    /// This is a plain join: `..` segments are kept and an absolute `name`
    /// replaces the working directory.
    pub fn resolve(&self, name: Option<&str>) -> PathBuf {
        match name {
            Some(name) => self.working_dir.join(name),
            None => self.working_dir.clone(),
        }
    }

    // --------------------
    // Command state transitions
    // --------------------

    /// PORT: decodes and stores the data address.
    ///
    /// A malformed address leaves any previously stored address in place.
    pub fn set_data_address(&mut self, arg: &str) -> Result<SocketAddrV4, ProtocolError> {
        let addr = decode_address(arg)?;
        self.data_addr = Some(addr);
        Ok(addr)
    }

    /// TYPE: switches the representation type. Unchanged on error.
    pub fn set_transfer_type(&mut self, args: &[String]) -> Result<TransferType, ProtocolError> {
        self.transfer_type = TransferType::from_args(args)?;
        Ok(self.transfer_type)
    }

    /// CWD: joins `dir` onto the working directory without checking that
    /// it exists.
    pub fn change_dir(&mut self, dir: Option<&str>) -> &Path {
        self.working_dir = self.resolve(dir);
        &self.working_dir
    }

    /// Records `verb` as the last executed command.
    pub fn record_command(&mut self, verb: &str) {
        self.last_command = Some(verb.to_string());
    }
}
