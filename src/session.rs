use std::cmp;

use chrono::{DateTime, FixedOffset};
use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

use crate::config::{Config, ConfigUpdate};
use crate::error::{Credential, Error, Result};
use crate::status::{SessionState, SessionStatus, StatusUpdate};
use crate::transport::{MailTransport, MessageOverview, SeqRange, TransportError};

lazy_static! {
    // Servers commonly append a parenthesized zone name ("(UTC)", "(BST)")
    // that the RFC 2822 parser rejects.
    static ref TRAILING_ZONE_COMMENT: Regex = Regex::new(r"\s*\([^)]*\)\s*$").unwrap();
}

fn parse_summary_date(date: &str) -> Result<DateTime<FixedOffset>> {
    let cleaned = TRAILING_ZONE_COMMENT.replace(date.trim(), "");
    DateTime::parse_from_rfc2822(&cleaned).map_err(Error::from)
}

/// A single logical session against a remote message store.
///
/// The session owns its [`Config`], its [`SessionStatus`] and at most one
/// open transport handle. It orchestrates connecting, reconnecting when the
/// link goes stale, summary refreshes, and paginated overview listings, and
/// retains the diagnostics of the most recent transport failure.
///
/// A session is built for sequential use by a single owner: operations take
/// `&mut self` and block until the transport answers.
pub struct Session<T: MailTransport> {
    transport: T,
    config: Config,
    status: SessionStatus,
    handle: Option<T::Handle>,
    errors: Vec<String>,
    index: Vec<MessageOverview>,
}

impl<T: MailTransport> Session<T> {
    /// Creates a session over the given transport with default configuration.
    pub fn new(transport: T) -> Session<T> {
        Session::with_config(transport, Config::default())
    }

    /// Creates a session over the given transport with a prepared configuration.
    pub fn with_config(transport: T, config: Config) -> Session<T> {
        Session {
            transport,
            config,
            status: SessionStatus::default(),
            handle: None,
            errors: Vec::new(),
            index: Vec::new(),
        }
    }

    /// Merges a bulk configuration update into the session.
    pub fn configure(&mut self, update: ConfigUpdate) -> &mut Self {
        self.config.apply(update);
        self
    }

    /// Sets a single configuration option from its string form.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        self.config.set(key, value)?;
        Ok(self)
    }

    /// Composes the transport target string for the current configuration.
    ///
    /// When the target is derived from discrete fields the session moves to
    /// [`SessionState::Ready`]; a pre-built `path` leaves the state
    /// untouched. The string itself is assembled by
    /// [`Config::target_path`], which stays free of side effects.
    pub fn target_path(&mut self) -> Result<String> {
        let target = self.config.target_path()?;
        if !self.config.has_path() {
            self.status.set_state(SessionState::Ready);
        }
        Ok(target)
    }

    /// Attempts to connect (or reconnect) to the configured mailbox.
    ///
    /// Both forms require a username and password and fail with
    /// [`Error::Credentials`] before any transport call otherwise. A fresh
    /// connect composes the target string and opens a new handle. A
    /// reconnect reopens the existing handle against the configured mailbox
    /// name, falling back to a fresh connect when no handle exists yet; a
    /// failed reopen discards the handle.
    ///
    /// On success the session is `Connected`. On failure it is
    /// `ConnectionError`, the retained error list is replaced with the
    /// transport's diagnostics, and the same diagnostics travel with the
    /// returned [`Error::Connection`].
    pub fn connect(&mut self, reconnect: bool) -> Result<&mut Self> {
        if self.config.username().is_empty() {
            return Err(Error::Credentials(Credential::Username));
        }
        if self.config.password().is_empty() {
            return Err(Error::Credentials(Credential::Password));
        }

        let mut failure = None;
        if !reconnect {
            let target = self.target_path()?;
            debug!("opening mailbox session against {}", target);
            match self
                .transport
                .open(&target, self.config.username(), self.config.password())
            {
                Ok(handle) => self.handle = Some(handle),
                Err(err) => {
                    self.handle = None;
                    failure = Some(err);
                }
            }
        } else if self.handle.is_none() {
            debug!("reconnect requested without an open handle, connecting fresh");
            return self.connect(false);
        } else if let Some(handle) = self.handle.as_mut() {
            debug!("reopening mailbox {}", self.config.mailbox());
            if let Err(err) = self.transport.reopen(handle, self.config.mailbox()) {
                self.handle = None;
                failure = Some(err);
            }
        }

        if self.handle.is_some() {
            self.status.set_state(SessionState::Connected);
            Ok(self)
        } else {
            self.status.set_state(SessionState::ConnectionError);
            let details = failure.map(|err| err.messages).unwrap_or_default();
            self.errors = details.clone();
            Err(Error::Connection { reconnect, details })
        }
    }

    /// Brings the session back to a live, up-to-date state.
    ///
    /// A missing handle or a failed liveness probe triggers exactly one
    /// reconnect attempt and returns; otherwise the mailbox summary is
    /// refreshed in place.
    pub fn refresh(&mut self) -> Result<&mut Self> {
        if !self.probe() {
            debug!("liveness probe failed, reconnecting");
            return self.connect(true);
        }
        self.update_summary()
    }

    /// Fetches a fresh mailbox summary from the transport.
    ///
    /// Liveness is re-checked first and a reconnect attempted if needed,
    /// even though [`Session::refresh`] already does so; the summary must
    /// never be requested over a dead handle. Failure replaces the retained
    /// error list and surfaces as [`Error::Summary`]. Success updates the
    /// size, recent count, mailbox name echo and refresh timestamp in one
    /// step.
    pub fn update_summary(&mut self) -> Result<&mut Self> {
        if !self.probe() {
            self.connect(true)?;
        }
        let result = match self.handle.as_mut() {
            Some(handle) => self.transport.check(handle),
            // a successful reconnect always leaves a handle behind
            None => Err(TransportError::default()),
        };
        match result {
            Ok(summary) => {
                trace!("mailbox summary: {:?}", summary);
                let last_updated = parse_summary_date(&summary.date)?;
                self.status.update(StatusUpdate {
                    size: Some(summary.messages),
                    recent: Some(summary.recent),
                    mailbox: Some(summary.mailbox),
                    last_updated: Some(last_updated),
                    ..StatusUpdate::default()
                });
                Ok(self)
            }
            Err(err) => {
                self.errors = err.messages.clone();
                Err(Error::Summary(err.messages))
            }
        }
    }

    /// Returns a page of message overviews, refreshing the session first.
    ///
    /// The page is the inclusive 1-based range starting at `offset` and
    /// running through the last known message, or through `offset + limit -
    /// 1` if that comes first. An empty mailbox (or a `limit` of zero)
    /// yields an empty page without touching the transport; an `offset` of
    /// zero or beyond the mailbox size fails with [`Error::Range`]. The
    /// fetched page is retained as the current index.
    pub fn message_listing(
        &mut self,
        offset: u32,
        limit: Option<u32>,
    ) -> Result<&[MessageOverview]> {
        self.refresh()?;
        let size = self.status.size();
        if size == 0 || limit == Some(0) {
            self.index.clear();
            return Ok(&self.index);
        }
        if offset == 0 || offset > size {
            return Err(Error::Range { offset, size });
        }
        let end = match limit {
            Some(limit) => cmp::min(offset.saturating_add(limit - 1), size),
            None => size,
        };
        let range = SeqRange::new(offset, end);
        trace!("fetching message overview for {}", range);
        self.index = match self.handle.as_mut() {
            Some(handle) => self.transport.fetch_overview(handle, &range),
            // refresh leaves a handle behind on success
            None => Vec::new(),
        };
        Ok(&self.index)
    }

    /// The diagnostics of the most recent transport failure, empty if none.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The last fetched page of message overviews.
    pub fn index(&self) -> &[MessageOverview] {
        &self.index
    }

    /// The current status snapshot.
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.status.state()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn probe(&mut self) -> bool {
        match self.handle.as_mut() {
            Some(handle) => self.transport.ping(handle),
            None => false,
        }
    }
}
