//! Mailbox session management over a pluggable mail-retrieval transport.
//!
//! This crate tracks the lifecycle of a single logical connection to a
//! remote message store: composing the connection target from configuration,
//! connecting and reconnecting when the link goes stale, and maintaining the
//! mailbox summary (message count, recent count, last refresh time) that
//! paginated listings depend on. The wire protocol itself is not part of the
//! crate; it is supplied as a [`MailTransport`] implementation.
//!
//! # Usage
//!
//! ```
//! use mailbox_session::{ConfigUpdate, MailTransport, Result, Session};
//!
//! fn list_first_page<T: MailTransport>(transport: T) -> Result<()> {
//!     let mut session = Session::new(transport);
//!     session.configure(ConfigUpdate {
//!         server: Some("imap.example.com".to_string()),
//!         port: Some(993),
//!         protocol: Some("imaps".to_string()),
//!         username: Some("user".to_string()),
//!         password: Some("secret".to_string()),
//!         ..ConfigUpdate::default()
//!     });
//!
//!     session.connect(false)?;
//!     for message in session.message_listing(1, Some(50))? {
//!         println!("{}: {:?}", message.seq, message.subject);
//!     }
//!     println!("{}", session.status());
//!     Ok(())
//! }
//! ```
//!
//! Listing operations refresh the session first: a dead handle is detected
//! by a liveness probe and reconnected exactly once before the summary is
//! updated and the page fetched. The diagnostics of the most recent
//! transport failure stay available through [`Session::errors`].

mod config;
mod error;
mod session;
mod status;
mod transport;

pub use crate::config::{Config, ConfigUpdate};
pub use crate::error::{Credential, Error, Result};
pub use crate::session::Session;
pub use crate::status::{SessionState, SessionStatus, StatusUpdate};
pub use crate::transport::{
    MailTransport, MailboxSummary, MessageOverview, SeqRange, TransportError,
};

#[cfg(any(test, feature = "test_helpers"))]
pub mod testing;
