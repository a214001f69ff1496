//! Directory listing facility
//!
//! LIST output comes from an injected [`ListingProvider`] so the transfer
//! path can be exercised without spawning processes.

use log::warn;
use std::future::Future;
use std::io;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::process::Command;

/// Produces the long-form textual listing of a path.
pub trait ListingProvider: Send + Sync + 'static {
    fn list(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;
}

/// Lists directories by running `ls -l`.
///
/// A non-zero exit status is not an error: whatever was written to stdout
/// is returned and stderr is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LsListing;

impl ListingProvider for LsListing {
    async fn list(&self, path: &Path) -> io::Result<String> {
        let output = Command::new("ls").arg("-l").arg(path).output().await?;
        if !output.status.success() {
            warn!(
                "ls -l {} exited with {}: {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim_end()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Writes each line of `listing` to `writer` terminated with CRLF.
///
/// Trailing whitespace of the whole listing is dropped first, so an empty
/// listing writes nothing.
pub async fn send_listing<W>(listing: &str, writer: &mut W) -> io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut out = BufWriter::new(writer);
    let mut written = 0u64;
    for line in listing.trim_end().lines() {
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\r\n").await?;
        written += line.len() as u64 + 2;
    }
    out.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_lines_get_crlf() {
        let mut out = Vec::new();
        let n = send_listing("total 0\n-rw-r--r-- 1 a a 0 x\n\n  ", &mut out)
            .await
            .unwrap();
        assert_eq!(out, b"total 0\r\n-rw-r--r-- 1 a a 0 x\r\n");
        assert_eq!(n, out.len() as u64);
    }

    #[tokio::test]
    async fn empty_listing_sends_nothing() {
        let mut out = Vec::new();
        send_listing("", &mut out).await.unwrap();
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn ls_lists_directory_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hi").unwrap();
        let listing = LsListing.list(dir.path()).await.unwrap();
        assert!(listing.contains("hello.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn ls_failure_degrades_to_captured_output() {
        let dir = tempfile::tempdir().unwrap();
        let listing = LsListing.list(&dir.path().join("missing")).await.unwrap();
        assert!(listing.is_empty());
    }
}
