//! Structured errors and the machine-readable code taxonomy.

use std::io;
use thiserror::Error;

/// type alias for all operations in this crate that could fail with a [`TkvsError`]
pub type Result<T> = std::result::Result<T, TkvsError>;

/// The machine-readable tags carried in the third field of every error reply.
///
/// This is the complete taxonomy; nothing else ever reaches the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// create attempted on a live key
    KeyExists,
    /// lookup or mutation of an absent key, or an absent hash field
    KeyNotFound,
    /// removal of a set element that is not in the set
    ValueNotFound,
    /// pop from an empty queue
    QueueEmpty,
    /// a range or index out of bounds, or a degenerate argument combination
    InvalidArguments,
    /// too few tokens for the chosen command
    BadArgLen,
    /// a non-numeric token where a number was required
    BadCast,
    /// unknown keyword in command dispatch
    CmdUnknown,
    /// catch-all for failures outside the command taxonomy
    Unknown,
}

impl ErrorCode {
    /// the wire spelling of this code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::KeyExists => "KEY_EXISTS",
            ErrorCode::KeyNotFound => "KEY_NOT_FOUND",
            ErrorCode::ValueNotFound => "VALUE_NOT_FOUND",
            ErrorCode::QueueEmpty => "QUEUE_EMPTY",
            ErrorCode::InvalidArguments => "INVALID_ARGUMENTS",
            ErrorCode::BadArgLen => "BAD_ARG_LEN",
            ErrorCode::BadCast => "BAD_CAST",
            ErrorCode::CmdUnknown => "CMD_UNKNOWN",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

/// Error variants used throughout `tkvs`.
/// It wraps any lower level errors from third party crates
#[derive(Error)]
pub enum TkvsError {
    /// variant for errors caused by std::io
    #[error("IO error")]
    Io {
        /// source of the IO Error
        #[from]
        source: io::Error,
    },

    /// a command failed against the store or the parser; `message` and `code`
    /// travel verbatim into the error reply
    #[error("{message}")]
    Command {
        /// human-readable message for the reply payload
        message: String,
        /// machine-readable tag for the reply code field
        code: ErrorCode,
    },

    /// variant for errors when parsing strings or addresses to some other type
    #[error("{}", .0)]
    Parsing(String),

    /// a malformed configuration file line
    #[error("bad config line: {}", .0)]
    Config(String),

    /// a snapshot file that does not decode to a valid store state
    #[error("corrupted snapshot: {}", .0)]
    Corrupted(String),

    /// catch-all variant for reporting error message strings
    #[error("{}", .0)]
    StringErr(String),
}

impl TkvsError {
    /// the wire code this error renders with; anything outside the command
    /// taxonomy surfaces as `UNKNOWN`
    pub fn code(&self) -> ErrorCode {
        match self {
            TkvsError::Command { code, .. } => *code,
            _ => ErrorCode::Unknown,
        }
    }

    /// create attempted on a key that is already live
    pub fn key_exists(name: &str) -> Self {
        TkvsError::Command {
            message: format!("{} already exists", name),
            code: ErrorCode::KeyExists,
        }
    }

    /// lookup or mutation of a key that is not live
    pub fn key_not_found(name: &str) -> Self {
        TkvsError::Command {
            message: format!("{} does not exist", name),
            code: ErrorCode::KeyNotFound,
        }
    }

    /// a hash field that is not present in its hash
    pub fn field_not_found(name: &str, field: &str) -> Self {
        TkvsError::Command {
            message: format!("{} does not exist in {}", field, name),
            code: ErrorCode::KeyNotFound,
        }
    }

    /// removal of a set element that is not in the set
    pub fn value_not_found(name: &str, value: &str) -> Self {
        TkvsError::Command {
            message: format!("{} is not in {}", value, name),
            code: ErrorCode::ValueNotFound,
        }
    }

    /// pop from a queue with no elements
    pub fn queue_empty(name: &str) -> Self {
        TkvsError::Command {
            message: format!("{} is empty", name),
            code: ErrorCode::QueueEmpty,
        }
    }

    /// a range/index precondition failed
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        TkvsError::Command {
            message: message.into(),
            code: ErrorCode::InvalidArguments,
        }
    }

    /// a command was given fewer tokens than its minimum
    pub fn bad_arg_len(command: &str) -> Self {
        TkvsError::Command {
            message: format!("not enough arguments for {}", command),
            code: ErrorCode::BadArgLen,
        }
    }

    /// a token failed to parse as an unsigned 32-bit integer
    pub fn bad_cast(token: &str) -> Self {
        TkvsError::Command {
            message: format!("{} is not a number", token),
            code: ErrorCode::BadCast,
        }
    }

    /// an unrecognized keyword at either dispatch level
    pub fn cmd_unknown(keyword: &str) -> Self {
        TkvsError::Command {
            message: format!("unknown command {}", keyword),
            code: ErrorCode::CmdUnknown,
        }
    }
}

/// a custom Debug implementation that will write the entire error chain
impl std::fmt::Debug for TkvsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// writes the entire error chain of the given error `e`, to the formatter.
fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by: {}", cause)?;
        current = cause.source();
    }
    Ok(())
}
