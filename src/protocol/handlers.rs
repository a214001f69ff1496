//! Command handlers module for the active FTP server.
//!
//! Each supported verb has a `handle_cmd_*` function that validates its own
//! argument count, mutates the session and writes its replies. Transfer
//! handlers own their data connection for the duration of the call, so it
//! is released on every return path.

use log::{debug, info, warn};
use std::io;
use tokio::io::AsyncWrite;

use crate::client::Session;
use crate::error::TransferError;
use crate::error::handlers::{protocol_error_code, transfer_error_code};
use crate::protocol::responses::*;
use crate::protocol::{Command, CommandStatus};
use crate::transfer::{
    ListingProvider, close_data_connection, handle_file_download, handle_file_upload,
    open_data_connection, open_for_download, open_for_upload, send_listing,
};

/// Dispatches a received FTP command to its corresponding handler.
///
/// # Arguments
///
/// * `session` - State of the control connection the command arrived on.
/// * `command` - The parsed command.
/// * `reply` - Writer for the control connection.
/// * `listing` - Directory listing facility used by LIST.
///
/// # Returns
///
/// * `Ok(CommandStatus)` - How the command ended; the session continues
///   unless it is `CloseConnection`.
/// * `Err(io::Error)` - Writing to the control connection failed.
///
/// The command's verb is recorded as the session's last command once its
/// handler has run, whether it succeeded or not.
pub async fn handle_command<W, L>(
    session: &mut Session,
    command: &Command,
    reply: &mut W,
    listing: &L,
) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
    L: ListingProvider,
{
    let status = match command {
        Command::QUIT => handle_cmd_quit(reply).await?,
        Command::USER(_) => handle_cmd_user(reply).await?,
        Command::PORT(args) => handle_cmd_port(session, args, reply).await?,
        Command::TYPE(args) => handle_cmd_type(session, args, reply).await?,
        Command::CWD(args) => handle_cmd_cwd(session, args, reply).await?,
        Command::LIST(args) => handle_cmd_list(session, args, reply, listing).await?,
        Command::RETR(args) => handle_cmd_retr(session, args, reply).await?,
        Command::STOR(args) => handle_cmd_stor(session, args, reply).await?,
        Command::SYST => handle_cmd_syst(reply).await?,
        Command::NOOP => handle_cmd_noop(reply).await?,
        Command::UNKNOWN(verb) => handle_cmd_unknown(verb, reply).await?,
    };

    session.record_command(command.verb());
    Ok(status)
}

/// Sends a failure reply and reports it as the command status.
async fn fail<W>(reply: &mut W, code: u16, message: &str) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    send_response(reply, code, message).await?;
    Ok(CommandStatus::Failure(message.to_string()))
}

/// Replies to a data-connection or file error raised by a transfer handler.
async fn fail_transfer<W>(reply: &mut W, err: TransferError) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    let code = transfer_error_code(&err);
    if code == CANNOT_OPEN_DATA_CONNECTION {
        debug!("Data connection unavailable: {}", err);
        send_response(reply, code, "Can't open data connection.").await?;
        return Ok(CommandStatus::Failure(err.to_string()));
    }
    fail(reply, code, &err.to_string()).await
}

async fn handle_cmd_quit<W>(reply: &mut W) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    send_response(reply, GOODBYE, "Goodbye.").await?;
    Ok(CommandStatus::CloseConnection)
}

/// Any user name is accepted; there is no password step.
async fn handle_cmd_user<W>(reply: &mut W) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    send_response(reply, LOGIN_SUCCESS, "Login successful.").await?;
    Ok(CommandStatus::Success)
}

async fn handle_cmd_port<W>(
    session: &mut Session,
    args: &[String],
    reply: &mut W,
) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    let [arg] = args else {
        return fail(reply, BAD_ARGUMENTS, "Usage: PORT a,b,c,d,p1,p2").await;
    };

    match session.set_data_address(arg) {
        Ok(addr) => {
            info!("Data address set to {}", addr);
            send_response(reply, OK, "PORT command successful.").await?;
            Ok(CommandStatus::Success)
        }
        Err(e) => fail(reply, protocol_error_code(&e), &e.to_string()).await,
    }
}

async fn handle_cmd_type<W>(
    session: &mut Session,
    args: &[String],
    reply: &mut W,
) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    if args.is_empty() || args.len() > 2 {
        return fail(reply, BAD_ARGUMENTS, "Usage: TYPE takes 1 or 2 arguments.").await;
    }

    match session.set_transfer_type(args) {
        Ok(transfer_type) => {
            debug!("Transfer type set to {:?}", transfer_type);
            send_response(reply, OK, "TYPE set").await?;
            Ok(CommandStatus::Success)
        }
        Err(e) => {
            debug!("{}", e);
            fail(
                reply,
                protocol_error_code(&e),
                "Unsupported type. Supported types: A, A N, I, L 8.",
            )
            .await
        }
    }
}

/// Joins the argument onto the working directory; the target is not
/// checked for existence.
async fn handle_cmd_cwd<W>(
    session: &mut Session,
    args: &[String],
    reply: &mut W,
) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    if args.len() > 1 {
        return fail(reply, BAD_ARGUMENTS, "Usage: CWD [directory]").await;
    }

    let dir = session.change_dir(args.first().map(String::as_str));
    info!("Working directory changed to {}", dir.display());
    send_response(reply, DIRECTORY_CHANGED, "Directory successfully changed.").await?;
    Ok(CommandStatus::Success)
}

/// Sends the long-form listing of the working directory (or the given
/// path) over a fresh data connection.
///
/// A failing listing facility degrades to an empty listing.
async fn handle_cmd_list<W, L>(
    session: &mut Session,
    args: &[String],
    reply: &mut W,
    listing: &L,
) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
    L: ListingProvider,
{
    if args.len() > 1 {
        return fail(reply, BAD_ARGUMENTS, "Usage: LIST [path]").await;
    }
    let path = session.resolve(args.first().map(String::as_str));

    let mut data_stream = match open_data_connection(session).await {
        Ok(stream) => stream,
        Err(e) => return fail_transfer(reply, e).await,
    };

    let text = match listing.list(&path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Listing {} failed: {}", path.display(), e);
            String::new()
        }
    };

    send_response(reply, OPENING_DATA, "Here comes the directory listing.").await?;
    if let Err(e) = send_listing(&text, &mut data_stream).await {
        return fail_transfer(reply, TransferError::Io(e)).await;
    }
    close_data_connection(data_stream).await;

    info!("Listed {}", path.display());
    send_response(
        reply,
        TRANSFER_COMPLETE,
        "Closing data connection. List successful.",
    )
    .await?;
    Ok(CommandStatus::Success)
}

async fn handle_cmd_retr<W>(
    session: &mut Session,
    args: &[String],
    reply: &mut W,
) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    let [name] = args else {
        return fail(reply, BAD_ARGUMENTS, "Usage: RETR filename").await;
    };

    let mut data_stream = match open_data_connection(session).await {
        Ok(stream) => stream,
        Err(e) => return fail_transfer(reply, e).await,
    };

    let path = session.resolve(Some(name.as_str()));
    let file = match open_for_download(&path).await {
        Ok(file) => file,
        Err(e) => return fail_transfer(reply, e).await,
    };

    send_response(reply, OPENING_DATA, "File ok. Sending.").await?;
    if let Err(e) =
        handle_file_download(file, &mut data_stream, session.transfer_type(), &path).await
    {
        return fail_transfer(reply, e).await;
    }
    close_data_connection(data_stream).await;

    send_response(reply, TRANSFER_COMPLETE, "Transfer complete.").await?;
    Ok(CommandStatus::Success)
}

/// Stores the data connection's contents under the working directory,
/// creating or truncating the target. A failed transfer leaves the partial
/// file in place.
async fn handle_cmd_stor<W>(
    session: &mut Session,
    args: &[String],
    reply: &mut W,
) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    let [name] = args else {
        return fail(reply, BAD_ARGUMENTS, "Usage: STOR filename").await;
    };

    let mut data_stream = match open_data_connection(session).await {
        Ok(stream) => stream,
        Err(e) => return fail_transfer(reply, e).await,
    };

    let path = session.resolve(Some(name.as_str()));
    let file = match open_for_upload(&path).await {
        Ok(file) => file,
        Err(e) => return fail_transfer(reply, e).await,
    };

    send_response(reply, OPENING_DATA, "Ok to send data.").await?;
    if let Err(e) =
        handle_file_upload(&mut data_stream, file, session.transfer_type(), &path).await
    {
        return fail_transfer(reply, e).await;
    }
    close_data_connection(data_stream).await;

    send_response(reply, TRANSFER_COMPLETE, "Transfer complete.").await?;
    Ok(CommandStatus::Success)
}

async fn handle_cmd_syst<W>(reply: &mut W) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    send_response(reply, SYSTEM_TYPE, "UNIX Type: L8").await?;
    Ok(CommandStatus::Success)
}

async fn handle_cmd_noop<W>(reply: &mut W) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    send_response(reply, OK, "Ready.").await?;
    Ok(CommandStatus::Success)
}

async fn handle_cmd_unknown<W>(verb: &str, reply: &mut W) -> io::Result<CommandStatus>
where
    W: AsyncWrite + Unpin,
{
    fail(
        reply,
        NOT_IMPLEMENTED,
        &format!("Command {:?} not implemented.", verb),
    )
    .await
}
