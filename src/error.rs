use std::error::Error as StdError;
use std::fmt;
use std::result;

use chrono::format::ParseError as DateParseError;

pub type Result<T> = result::Result<T, Error>;

/// A set of errors that can occur while managing a mailbox session
#[derive(Debug)]
pub enum Error {
    /// A derived target string could not be built from the configuration.
    Configuration(String),
    /// A username or password was missing before a connection attempt.
    Credentials(Credential),
    /// The transport failed to open or reopen the mailbox.
    Connection {
        /// Whether the failed attempt was a reconnect against an existing handle.
        reconnect: bool,
        /// The raw diagnostic strings reported by the transport.
        details: Vec<String>,
    },
    /// The transport failed to produce a mailbox summary.
    Summary(Vec<String>),
    /// An unknown configuration option was requested.
    UnknownKey(String),
    /// A listing range fell outside the known mailbox size.
    Range {
        /// The requested 1-based starting sequence number.
        offset: u32,
        /// The mailbox size at the time of the request.
        size: u32,
    },
    /// A transport-supplied date string could not be parsed.
    Parse(DateParseError),
}

impl From<DateParseError> for Error {
    fn from(err: DateParseError) -> Error {
        Error::Parse(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Configuration(ref msg) => write!(f, "cannot build mailbox target: {}", msg),
            Error::Credentials(ref missing) => {
                write!(f, "cannot connect to mailbox: no {} is specified", missing)
            }
            Error::Connection {
                reconnect,
                ref details,
            } => {
                write!(
                    f,
                    "an error occurred while {}connecting to the mailbox",
                    if reconnect { "re" } else { "" }
                )?;
                if !details.is_empty() {
                    write!(f, ": {}", details.join("; "))?;
                }
                Ok(())
            }
            Error::Summary(ref details) => {
                write!(f, "an error occurred while updating the mailbox summary")?;
                if !details.is_empty() {
                    write!(f, ": {}", details.join("; "))?;
                }
                Ok(())
            }
            Error::UnknownKey(ref key) => write!(f, "unknown configuration option: {}", key),
            Error::Range { offset, size } => write!(
                f,
                "listing offset {} is outside the mailbox (size {})",
                offset, size
            ),
            Error::Parse(ref e) => write!(f, "cannot parse mailbox date: {}", e),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Parse(ref e) => Some(e),
            _ => None,
        }
    }
}

/// The credential field found to be missing before a connection attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Credential {
    Username,
    Password,
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Credential::Username => f.write_str("username"),
            Credential::Password => f.write_str("password"),
        }
    }
}
