//! Transfer module for FTP server
//!
//! Handles data channel establishment, directory listings and file
//! transfers in binary or text representation.

pub mod data_channel;
pub mod file_ops;
pub mod lines;
pub mod listing;
pub mod modes;

// Re-export key types and functions
pub use data_channel::{close_data_connection, open_data_connection};
pub use file_ops::{handle_file_download, handle_file_upload, open_for_download, open_for_upload};
pub use listing::{ListingProvider, LsListing, send_listing};
pub use modes::TransferType;
