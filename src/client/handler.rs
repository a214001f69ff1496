use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufReader};

use crate::client::Session;
use crate::protocol::responses::{BAD_ARGUMENTS, OK, send_response};
use crate::protocol::{CommandStatus, handle_command, parse_command};
use crate::transfer::ListingProvider;

/// Longest command line accepted, terminator included.
pub const MAX_COMMAND_LENGTH: usize = 512;

/// Lifecycle of one control connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Greeting,
    Active,
    Terminated,
}

/// Handles an FTP client session using Tokio async runtime.
///
/// - Sends the ready greeting.
/// - Uses BufReader to read newline-terminated command lines; a trailing
///   carriage return is tolerated. Lines over `MAX_COMMAND_LENGTH` are
///   skipped up to their newline and answered with 501.
/// - Dispatches each non-blank line with `handle_command` and only reads
///   the next line once that command, including any transfer, is done.
///
/// Returns when the client sends QUIT, closes the stream, or the control
/// stream fails. The caller owns (and closes) the underlying connection.
pub async fn handle_client<S, L>(
    cmd_stream: S,
    client_addr: SocketAddr,
    mut session: Session,
    listing: &L,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    L: ListingProvider,
{
    let (read_half, mut write_half) = tokio::io::split(cmd_stream);
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();
    let mut state = LoopState::Greeting;

    while state != LoopState::Terminated {
        state = match state {
            LoopState::Greeting => {
                send_response(&mut write_half, OK, "Ready.").await?;
                LoopState::Active
            }
            LoopState::Active => {
                line.clear();
                match read_command_line(&mut reader, &mut line).await {
                    Ok(CommandLine::Eof) => {
                        info!("Connection closed by client {}", client_addr);
                        LoopState::Terminated
                    }
                    Ok(CommandLine::TooLong) => {
                        warn!("Discarded over-long command line from {}", client_addr);
                        send_response(&mut write_half, BAD_ARGUMENTS, "Command line too long.")
                            .await?;
                        LoopState::Active
                    }
                    Ok(CommandLine::Complete) => {
                        let text = String::from_utf8_lossy(&line);
                        let Some(command) = parse_command(&text) else {
                            continue;
                        };
                        debug!("Received from {}: {:?}", client_addr, command);

                        match handle_command(&mut session, &command, &mut write_half, listing)
                            .await?
                        {
                            CommandStatus::CloseConnection => {
                                info!("Client {} requested to quit", client_addr);
                                LoopState::Terminated
                            }
                            CommandStatus::Failure(reason) => {
                                debug!("{} from {} failed: {}", command.verb(), client_addr, reason);
                                LoopState::Active
                            }
                            CommandStatus::Success => LoopState::Active,
                        }
                    }
                    Err(e) => {
                        error!("Failed to read from {}: {}", client_addr, e);
                        return Err(e);
                    }
                }
            }
            LoopState::Terminated => LoopState::Terminated,
        };
    }

    Ok(())
}

enum CommandLine {
    Complete,
    TooLong,
    Eof,
}

/// Reads one command line into `line`, never buffering more than
/// `MAX_COMMAND_LENGTH` bytes of it.
async fn read_command_line<R>(reader: &mut R, line: &mut Vec<u8>) -> io::Result<CommandLine>
where
    R: AsyncBufRead + Unpin,
{
    let n = (&mut *reader)
        .take(MAX_COMMAND_LENGTH as u64)
        .read_until(b'\n', line)
        .await?;

    if n == 0 {
        return Ok(CommandLine::Eof);
    }
    if n < MAX_COMMAND_LENGTH || line.last() == Some(&b'\n') {
        return Ok(CommandLine::Complete);
    }

    line.clear();
    skip_past_newline(reader).await?;
    Ok(CommandLine::TooLong)
}

async fn skip_past_newline<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (used, done) = {
            let buf = reader.fill_buf().await?;
            if buf.is_empty() {
                return Ok(());
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (buf.len(), false),
            }
        };
        reader.consume(used);
        if done {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::LsListing;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    fn peer() -> SocketAddr {
        "127.0.0.1:4000".parse().unwrap()
    }

    async fn converse(input: &[u8]) -> String {
        let (mut client, server) = duplex(4096);
        let task = tokio::spawn(async move {
            handle_client(server, peer(), Session::new(PathBuf::from("/")), &LsListing).await
        });
        client.write_all(input).await.unwrap();
        client.shutdown().await.unwrap();

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        task.await.unwrap().unwrap();
        out
    }

    #[tokio::test]
    async fn greets_then_ends_on_eof() {
        assert_eq!(converse(b"").await, "200 Ready.\r\n");
    }

    #[tokio::test]
    async fn blank_lines_get_no_reply() {
        assert_eq!(converse(b"\r\n   \nNOOP\n").await, "200 Ready.\r\n200 Ready.\r\n");
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let out = converse(b"SYST\r\nQUIT\r\nNOOP\r\n").await;
        assert_eq!(out, "200 Ready.\r\n215 UNIX Type: L8\r\n221 Goodbye.\r\n");
    }

    #[tokio::test]
    async fn unknown_commands_keep_session_alive() {
        let out = converse(b"FOO\r\nNOOP\r\n").await;
        assert_eq!(
            out,
            "200 Ready.\r\n502 Command \"FOO\" not implemented.\r\n200 Ready.\r\n"
        );
    }

    #[tokio::test]
    async fn final_line_without_newline_is_handled() {
        let out = converse(b"USER bob").await;
        assert_eq!(out, "200 Ready.\r\n230 Login successful.\r\n");
    }

    #[tokio::test]
    async fn over_long_line_is_rejected_and_skipped() {
        let mut input = b"NOOP ".to_vec();
        input.extend(std::iter::repeat_n(b'x', 4 * 1024 * 1024));
        input.extend_from_slice(b"\r\nSYST\r\n");

        let out = converse(&input).await;
        assert_eq!(
            out,
            "200 Ready.\r\n501 Command line too long.\r\n215 UNIX Type: L8\r\n"
        );
    }

    #[tokio::test]
    async fn line_at_the_limit_is_accepted() {
        let mut input = b"USER ".to_vec();
        input.extend(std::iter::repeat_n(b'a', MAX_COMMAND_LENGTH - 7));
        input.extend_from_slice(b"\r\n");
        assert_eq!(input.len(), MAX_COMMAND_LENGTH);

        let out = converse(&input).await;
        assert_eq!(out, "200 Ready.\r\n230 Login successful.\r\n");
    }

    #[tokio::test]
    async fn over_long_final_line_without_newline() {
        let input = vec![b'y'; MAX_COMMAND_LENGTH * 3];
        let out = converse(&input).await;
        assert_eq!(out, "200 Ready.\r\n501 Command line too long.\r\n");
    }
}
