//! A scripted [`MailTransport`] for exercising a session without a real
//! message store.
//!
//! Enable the `test_helpers` feature to use this module from your own tests:
//!
//! ```toml
//! [dependencies]
//! mailbox-session = { version = "0.1" }
//!
//! [dev-dependencies]
//! # mirror the same configuration and add test_helpers
//! mailbox-session = { version = "0.1", features = ["test_helpers"] }
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::transport::{
    MailTransport, MailboxSummary, MessageOverview, SeqRange, TransportError,
};

/// A single invocation recorded by a [`MockTransport`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    Open {
        target: String,
        username: String,
        password: String,
    },
    Reopen {
        mailbox: String,
    },
    Ping,
    Check,
    FetchOverview {
        range: String,
    },
}

/// The opaque handle a [`MockTransport`] hands out for each open.
///
/// Carries the 1-based ordinal of the open that issued it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MockHandle(pub u32);

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    open: VecDeque<Result<(), TransportError>>,
    reopen: VecDeque<Result<(), TransportError>>,
    ping: VecDeque<bool>,
    check: VecDeque<Result<MailboxSummary, TransportError>>,
    overview: VecDeque<Vec<MessageOverview>>,
    issued: u32,
}

/// A scripted transport with a recorded call log.
///
/// Responses are queued with the `with_*` builders and consumed in order;
/// once a queue runs dry the transport answers with a benign default: opens
/// and reopens succeed, pings report the handle alive, checks report an
/// empty `INBOX`, and overview fetches synthesize one record per sequence
/// number in the requested range.
///
/// Cloning shares the underlying script, so a clone kept outside the
/// session can inspect the call log after driving it:
///
/// ```
/// use mailbox_session::testing::MockTransport;
/// use mailbox_session::Session;
///
/// let mock = MockTransport::new().with_ping(false);
/// let session = Session::new(mock.clone());
/// // ... drive the session, then assert on mock.calls()
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Rc<RefCell<Script>>,
}

impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport::default()
    }

    /// Queues a failure for the next open.
    pub fn with_open_error<I, S>(self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .borrow_mut()
            .open
            .push_back(Err(TransportError::new(messages)));
        self
    }

    /// Queues a failure for the next reopen.
    pub fn with_reopen_error<I, S>(self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .borrow_mut()
            .reopen
            .push_back(Err(TransportError::new(messages)));
        self
    }

    /// Queues the outcome of the next liveness probe.
    pub fn with_ping(self, alive: bool) -> Self {
        self.script.borrow_mut().ping.push_back(alive);
        self
    }

    /// Queues a summary for the next check.
    pub fn with_summary(self, messages: u32, recent: u32, mailbox: &str, date: &str) -> Self {
        self.script.borrow_mut().check.push_back(Ok(MailboxSummary {
            messages,
            recent,
            mailbox: mailbox.to_string(),
            date: date.to_string(),
        }));
        self
    }

    /// Queues a failure for the next check.
    pub fn with_check_error<I, S>(self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .borrow_mut()
            .check
            .push_back(Err(TransportError::new(messages)));
        self
    }

    /// Queues the records returned by the next overview fetch.
    pub fn with_overview(self, records: Vec<MessageOverview>) -> Self {
        self.script.borrow_mut().overview.push_back(records);
        self
    }

    /// Every call made against this transport so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.script.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.borrow().calls.len()
    }
}

fn default_summary() -> MailboxSummary {
    MailboxSummary {
        messages: 0,
        recent: 0,
        mailbox: "INBOX".to_string(),
        date: "Thu, 06 Aug 2026 09:15:00 +0000".to_string(),
    }
}

impl MailTransport for MockTransport {
    type Handle = MockHandle;

    fn open(
        &mut self,
        target: &str,
        username: &str,
        password: &str,
    ) -> Result<MockHandle, TransportError> {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call::Open {
            target: target.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        });
        match script.open.pop_front() {
            Some(Err(err)) => Err(err),
            _ => {
                script.issued += 1;
                Ok(MockHandle(script.issued))
            }
        }
    }

    fn reopen(&mut self, _handle: &mut MockHandle, mailbox: &str) -> Result<(), TransportError> {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call::Reopen {
            mailbox: mailbox.to_string(),
        });
        script.reopen.pop_front().unwrap_or(Ok(()))
    }

    fn ping(&mut self, _handle: &mut MockHandle) -> bool {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call::Ping);
        script.ping.pop_front().unwrap_or(true)
    }

    fn check(&mut self, _handle: &mut MockHandle) -> Result<MailboxSummary, TransportError> {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call::Check);
        script
            .check
            .pop_front()
            .unwrap_or_else(|| Ok(default_summary()))
    }

    fn fetch_overview(
        &mut self,
        _handle: &mut MockHandle,
        range: &SeqRange,
    ) -> Vec<MessageOverview> {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call::FetchOverview {
            range: range.to_string(),
        });
        script.overview.pop_front().unwrap_or_else(|| {
            (range.start()..=range.end())
                .map(|seq| MessageOverview {
                    seq,
                    uid: Some(seq),
                    ..MessageOverview::default()
                })
                .collect()
        })
    }
}
