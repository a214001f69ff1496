//! Module `file_ops`
//!
//! Moves file contents between the filesystem and a data connection, either
//! verbatim (binary) or with line endings normalised to CRLF (text).

use log::{error, info, warn};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::TransferError;
use crate::transfer::TransferType;
use crate::transfer::lines::copy_lines_crlf;

/// Opens the file named by a RETR command.
pub async fn open_for_download(path: &Path) -> Result<File, TransferError> {
    File::open(path).await.map_err(|e| {
        error!("Failed to open file {}: {}", path.display(), e);
        TransferError::FileOpen(path.to_path_buf(), e)
    })
}

/// Creates or truncates the file named by a STOR command.
pub async fn open_for_upload(path: &Path) -> Result<File, TransferError> {
    File::create(path).await.map_err(|e| {
        error!("Failed to create file {}: {}", path.display(), e);
        TransferError::FileOpen(path.to_path_buf(), e)
    })
}

/// Copies everything from `reader` to `writer` using `transfer_type`.
///
/// The writer is flushed before returning. On error, bytes already written
/// stay written.
pub async fn copy_data<R, W>(
    reader: R,
    writer: &mut W,
    transfer_type: TransferType,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match transfer_type {
        TransferType::Binary => {
            let mut reader = reader;
            let n = tokio::io::copy(&mut reader, writer).await?;
            writer.flush().await?;
            Ok(n)
        }
        TransferType::Text => copy_lines_crlf(BufReader::new(reader), writer).await,
    }
}

/// Sends an opened file over the data connection.
pub async fn handle_file_download<W>(
    file: File,
    data_stream: &mut W,
    transfer_type: TransferType,
    filename: &Path,
) -> Result<u64, TransferError>
where
    W: AsyncWrite + Unpin,
{
    let sent = copy_data(file, data_stream, transfer_type).await.map_err(|e| {
        error!("Download of {} aborted: {}", filename.display(), e);
        TransferError::Io(e)
    })?;
    info!(
        "File download completed: {} ({} bytes, {:?})",
        filename.display(),
        sent,
        transfer_type
    );
    Ok(sent)
}

/// Receives the data connection's contents into an opened file.
///
/// If the data connection fails part-way, what arrived so far is flushed
/// and the partial file is left in place.
pub async fn handle_file_upload<R>(
    data_stream: R,
    mut file: File,
    transfer_type: TransferType,
    filename: &Path,
) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin,
{
    let received = match copy_data(data_stream, &mut file, transfer_type).await {
        Ok(n) => n,
        Err(e) => {
            error!("Upload of {} aborted: {}", filename.display(), e);
            if let Err(flush_err) = file.flush().await {
                warn!("Failed to flush partial {}: {}", filename.display(), flush_err);
            }
            return Err(TransferError::Io(e));
        }
    };
    info!(
        "File upload completed: {} ({} bytes, {:?})",
        filename.display(),
        received,
        transfer_type
    );
    Ok(received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Accepts `limit` bytes, then fails every write like a reset peer.
    struct BrokenAfter {
        written: usize,
        limit: usize,
    }

    impl AsyncWrite for BrokenAfter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if self.written >= self.limit {
                return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
            }
            let n = buf.len().min(self.limit - self.written);
            self.written += n;
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Yields `data` once, then fails like a reset connection.
    struct ResetAfter {
        data: Option<Vec<u8>>,
    }

    impl AsyncRead for ResetAfter {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.data.take() {
                Some(data) => {
                    buf.put_slice(&data);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::ErrorKind::ConnectionReset.into())),
            }
        }
    }

    #[tokio::test]
    async fn binary_copy_is_verbatim() {
        let payload = [0u8, 13, 10, 255, 10, 0xde, 0xad];
        let mut out = Vec::new();
        let n = copy_data(&payload[..], &mut out, TransferType::Binary)
            .await
            .unwrap();
        assert_eq!(out, payload);
        assert_eq!(n, payload.len() as u64);
    }

    #[tokio::test]
    async fn text_copy_normalises() {
        let mut out = Vec::new();
        copy_data(&b"a\nb\r\nc"[..], &mut out, TransferType::Text)
            .await
            .unwrap();
        assert_eq!(out, b"a\r\nb\r\nc\r\n");
    }

    #[tokio::test]
    async fn upload_then_download_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();

        let file = open_for_upload(&path).await.unwrap();
        handle_file_upload(&payload[..], file, TransferType::Binary, &path)
            .await
            .unwrap();

        let file = open_for_download(&path).await.unwrap();
        let mut out = Vec::new();
        handle_file_download(file, &mut out, TransferType::Binary, &path)
            .await
            .unwrap();
        assert_eq!(out, payload);
    }

    #[tokio::test]
    async fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_for_download(&dir.path().join("absent")).await;
        assert!(matches!(result, Err(TransferError::FileOpen(..))));
    }

    #[tokio::test]
    async fn download_into_failing_connection_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "line\n".repeat(50_000)).unwrap();

        for transfer_type in [TransferType::Binary, TransferType::Text] {
            let file = open_for_download(&path).await.unwrap();
            let mut peer = BrokenAfter { written: 0, limit: 1000 };
            let result = handle_file_download(file, &mut peer, transfer_type, &path).await;
            match result {
                Err(TransferError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
                other => panic!("expected an I/O error, got {other:?}"),
            }
            assert_eq!(peer.written, 1000);
        }
    }

    #[tokio::test]
    async fn failed_upload_leaves_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.bin");
        let received = vec![7u8; 100];

        let file = open_for_upload(&path).await.unwrap();
        let peer = ResetAfter { data: Some(received.clone()) };
        let result = handle_file_upload(peer, file, TransferType::Binary, &path).await;

        assert!(matches!(result, Err(TransferError::Io(_))));
        assert_eq!(std::fs::read(&path).unwrap(), received);
    }
}
