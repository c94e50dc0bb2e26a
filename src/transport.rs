use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The capability a [`Session`](crate::Session) requires from the layer that
/// actually talks to the message store.
///
/// Implementations wrap whatever does the real protocol work; all calls are
/// blocking and the session serializes them, so no internal locking is
/// expected. Failure detail travels with the result as a [`TransportError`]
/// rather than through shared error state.
pub trait MailTransport {
    /// The open-connection resource the transport hands back. Its validity
    /// is tracked by the owning session alone.
    type Handle;

    /// Opens a new connection against the composed target string.
    fn open(
        &mut self,
        target: &str,
        username: &str,
        password: &str,
    ) -> Result<Self::Handle, TransportError>;

    /// Re-establishes an existing handle against the named mailbox.
    fn reopen(&mut self, handle: &mut Self::Handle, mailbox: &str) -> Result<(), TransportError>;

    /// Lightweight round-trip confirming the handle is still usable.
    fn ping(&mut self, handle: &mut Self::Handle) -> bool;

    /// Requests the aggregate counters and timestamp for the open mailbox.
    fn check(&mut self, handle: &mut Self::Handle) -> Result<MailboxSummary, TransportError>;

    /// Fetches the per-message overview records for an inclusive range.
    fn fetch_overview(&mut self, handle: &mut Self::Handle, range: &SeqRange)
        -> Vec<MessageOverview>;
}

/// A failure reported by the transport, carrying its raw diagnostics.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TransportError {
    pub messages: Vec<String>,
}

impl TransportError {
    pub fn new<I, S>(messages: I) -> TransportError
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TransportError {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            f.write_str("transport failure")
        } else {
            f.write_str(&self.messages.join("; "))
        }
    }
}

impl StdError for TransportError {}

/// Aggregate mailbox state as reported by a transport check.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MailboxSummary {
    /// Total number of messages in the mailbox.
    pub messages: u32,
    /// Number of messages flagged recent.
    pub recent: u32,
    /// Name of the checked mailbox.
    pub mailbox: String,
    /// Server-side timestamp of the check, as an RFC 2822 date string.
    pub date: String,
}

/// A lightweight per-message summary record, without message content.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MessageOverview {
    /// 1-based sequence number within the mailbox.
    pub seq: u32,
    pub uid: Option<u32>,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub message_id: Option<String>,
    /// Message size in bytes.
    pub size: u32,
    pub seen: bool,
    pub recent: bool,
    pub flagged: bool,
    pub answered: bool,
    pub deleted: bool,
    pub draft: bool,
}

/// An inclusive, 1-based sequence number range, rendered as `start:end`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SeqRange {
    start: u32,
    end: u32,
}

impl SeqRange {
    pub fn new(start: u32, end: u32) -> SeqRange {
        SeqRange { start, end }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of sequence numbers the range spans.
    pub fn len(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SeqRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
