use std::fmt;

use chrono::{DateTime, FixedOffset};

/// Lifecycle state of a mailbox session.
///
/// A session starts out `Initialized`, becomes `Ready` once a target string
/// has been derived from discrete configuration fields, and then moves
/// between `Connected` and `ConnectionError` as connection attempts succeed
/// or fail. There is no explicit disconnected state; a lost handle surfaces
/// as a failed liveness probe on the next refresh.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    Initialized,
    Ready,
    Connected,
    ConnectionError,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SessionState::Initialized => f.write_str("initialized"),
            SessionState::Ready => f.write_str("ready"),
            SessionState::Connected => f.write_str("connected"),
            SessionState::ConnectionError => f.write_str("connection_error"),
        }
    }
}

/// A snapshot of the last known mailbox state.
///
/// Holds the lifecycle state plus the counters and timestamp captured by the
/// most recent summary update. Only the owning session mutates it, through
/// [`SessionStatus::update`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionStatus {
    state: SessionState,
    size: u32,
    recent: u32,
    mailbox: Option<String>,
    last_updated: Option<DateTime<FixedOffset>>,
}

impl Default for SessionStatus {
    fn default() -> SessionStatus {
        SessionStatus {
            state: SessionState::Initialized,
            size: 0,
            recent: 0,
            mailbox: None,
            last_updated: None,
        }
    }
}

/// A selective update to a [`SessionStatus`].
///
/// Only the `Some` fields overwrite the corresponding status fields; the
/// rest are left untouched.
#[derive(Clone, Debug, Default)]
pub struct StatusUpdate {
    pub state: Option<SessionState>,
    pub size: Option<u32>,
    pub recent: Option<u32>,
    pub mailbox: Option<String>,
    pub last_updated: Option<DateTime<FixedOffset>>,
}

impl SessionStatus {
    /// Overwrites exactly the fields the update carries, in one step.
    pub fn update(&mut self, update: StatusUpdate) {
        if let Some(state) = update.state {
            self.state = state;
        }
        if let Some(size) = update.size {
            self.size = size;
        }
        if let Some(recent) = update.recent {
            self.recent = recent;
        }
        if let Some(mailbox) = update.mailbox {
            self.mailbox = Some(mailbox);
        }
        if let Some(last_updated) = update.last_updated {
            self.last_updated = Some(last_updated);
        }
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Total number of messages at the last summary update.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of messages marked recent at the last summary update.
    pub fn recent(&self) -> u32 {
        self.recent
    }

    /// Name of the mailbox the last summary was taken against.
    pub fn mailbox(&self) -> Option<&str> {
        self.mailbox.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<FixedOffset>> {
        self.last_updated
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State: {}, Size: {}, Recent: {}, Last updated: ",
            self.state, self.size, self.recent
        )?;
        match self.last_updated {
            Some(ref at) => write!(f, "{}", at.format("%d/%m/%Y %-I:%M%P")),
            None => f.write_str("never"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn starts_initialized_and_empty() {
        let status = SessionStatus::default();
        assert_eq!(status.state(), SessionState::Initialized);
        assert_eq!(status.size(), 0);
        assert_eq!(status.recent(), 0);
        assert_eq!(status.mailbox(), None);
        assert!(status.last_updated().is_none());
    }

    #[test]
    fn update_overwrites_only_the_carried_fields() {
        let mut status = SessionStatus::default();
        status.update(StatusUpdate {
            size: Some(42),
            recent: Some(3),
            ..StatusUpdate::default()
        });
        status.update(StatusUpdate {
            state: Some(SessionState::Connected),
            mailbox: Some("Archive".to_string()),
            ..StatusUpdate::default()
        });
        assert_eq!(status.state(), SessionState::Connected);
        assert_eq!(status.size(), 42);
        assert_eq!(status.recent(), 3);
        assert_eq!(status.mailbox(), Some("Archive"));
    }

    #[test]
    fn renders_the_timestamp_in_day_month_year_form() {
        let mut status = SessionStatus::default();
        status.update(StatusUpdate {
            state: Some(SessionState::Connected),
            size: Some(12),
            recent: Some(2),
            last_updated: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2026, 8, 6, 9, 15, 0)
                .single(),
            ..StatusUpdate::default()
        });
        assert_eq!(
            status.to_string(),
            "State: connected, Size: 12, Recent: 2, Last updated: 06/08/2026 9:15am"
        );
    }

    #[test]
    fn renders_an_afternoon_timestamp_with_pm() {
        let mut status = SessionStatus::default();
        status.update(StatusUpdate {
            last_updated: FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2026, 12, 25, 15, 4, 0)
                .single(),
            ..StatusUpdate::default()
        });
        assert!(status.to_string().ends_with("25/12/2026 3:04pm"));
    }

    #[test]
    fn renders_never_before_the_first_summary() {
        let status = SessionStatus::default();
        assert_eq!(
            status.to_string(),
            "State: initialized, Size: 0, Recent: 0, Last updated: never"
        );
    }

    #[test]
    fn states_render_as_snake_case() {
        assert_eq!(SessionState::Initialized.to_string(), "initialized");
        assert_eq!(SessionState::Ready.to_string(), "ready");
        assert_eq!(SessionState::Connected.to_string(), "connected");
        assert_eq!(SessionState::ConnectionError.to_string(), "connection_error");
    }
}
