//! Module `command`
//!
//! Defines the FTP command line tokenizer and the data structures used to
//! represent parsed commands and the outcome of running them.

/// Represents an FTP command parsed from the client input.
///
/// Every supported verb keeps its raw argument tokens; each handler checks
/// its own argument count so a bad count becomes a usage reply instead of
/// an unknown command.
#[derive(Debug, PartialEq)]
pub enum Command {
    QUIT,
    USER(Vec<String>),
    PORT(Vec<String>), // Active mode data address
    TYPE(Vec<String>), // Transfer representation
    CWD(Vec<String>),
    LIST(Vec<String>),
    RETR(Vec<String>), // Retrieve/download file
    STOR(Vec<String>), // Store/upload file
    SYST,
    NOOP,
    UNKNOWN(String), // Uppercased verb of an unsupported command
}

impl Command {
    /// The uppercased verb this command was parsed from.
    pub fn verb(&self) -> &str {
        match self {
            Command::QUIT => "QUIT",
            Command::USER(_) => "USER",
            Command::PORT(_) => "PORT",
            Command::TYPE(_) => "TYPE",
            Command::CWD(_) => "CWD",
            Command::LIST(_) => "LIST",
            Command::RETR(_) => "RETR",
            Command::STOR(_) => "STOR",
            Command::SYST => "SYST",
            Command::NOOP => "NOOP",
            Command::UNKNOWN(verb) => verb,
        }
    }
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Parses a raw command line received from a client.
///
/// The line is split on whitespace; the first token is the verb (matched
/// case-insensitively) and the rest are its arguments. Returns `None` for
/// blank lines.
pub fn parse_command(raw: &str) -> Option<Command> {
    let mut tokens = raw.split_whitespace();
    let cmd = tokens.next()?.to_ascii_uppercase();
    let args: Vec<String> = tokens.map(str::to_string).collect();

    let command = match cmd.as_str() {
        "QUIT" => Command::QUIT,
        "USER" => Command::USER(args),
        "PORT" => Command::PORT(args),
        "TYPE" => Command::TYPE(args),
        "CWD" => Command::CWD(args),
        "LIST" => Command::LIST(args),
        "RETR" => Command::RETR(args),
        "STOR" => Command::STOR(args),
        "SYST" => Command::SYST,
        "NOOP" => Command::NOOP,
        _ => Command::UNKNOWN(cmd),
    };
    Some(command)
}
