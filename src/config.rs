use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Connection parameters for a mailbox session.
///
/// A `Config` is owned by exactly one [`Session`](crate::Session) and holds
/// everything needed to compose the target string the transport opens a
/// connection against. Options can be set one at a time with [`Config::set`]
/// or merged in bulk with [`Config::apply`]:
///
/// ```
/// use mailbox_session::{Config, ConfigUpdate};
///
/// let mut config = Config::default();
/// config.apply(ConfigUpdate {
///     server: Some("imap.example.com".to_string()),
///     port: Some(993),
///     protocol: Some("imaps".to_string()),
///     flags: Some(vec!["ssl".to_string()]),
///     ..ConfigUpdate::default()
/// });
/// assert_eq!(
///     config.target_path().unwrap(),
///     "{imaps://imap.example.com:993/ssl/readonly}INBOX"
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Pre-built target override. When non-empty this wins over every
    /// discrete field below.
    path: String,
    username: String,
    password: String,
    server: String,
    port: Option<u16>,
    protocol: String,
    mailbox: String,
    flags: Vec<String>,
    readonly: bool,
    /// Options this crate does not recognize. Accepted and retrievable, but
    /// without any effect on the built target.
    extras: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            path: String::new(),
            username: String::new(),
            password: String::new(),
            server: String::new(),
            port: None,
            protocol: String::new(),
            mailbox: "INBOX".to_string(),
            flags: Vec::new(),
            readonly: true,
            extras: BTreeMap::new(),
        }
    }
}

/// A bulk configuration update.
///
/// Every recognized option is optional; only the `Some` fields overwrite the
/// corresponding option when applied. Unrecognized keys in a deserialized
/// payload are collected into `extras` rather than rejected.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfigUpdate {
    pub path: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub mailbox: Option<String>,
    pub flags: Option<Vec<String>>,
    pub readonly: Option<bool>,
    #[serde(flatten)]
    pub extras: BTreeMap<String, String>,
}

impl Config {
    /// Merges a bulk update into this configuration, overwriting only the
    /// options the update carries. Applying the same update twice leaves the
    /// configuration unchanged after the first application.
    pub fn apply(&mut self, update: ConfigUpdate) -> &mut Self {
        if let Some(path) = update.path {
            self.path = path;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(password) = update.password {
            self.password = password;
        }
        if let Some(server) = update.server {
            self.server = server;
        }
        if let Some(port) = update.port {
            self.port = Some(port);
        }
        if let Some(protocol) = update.protocol {
            self.protocol = protocol;
        }
        if let Some(mailbox) = update.mailbox {
            self.mailbox = mailbox;
        }
        if let Some(flags) = update.flags {
            self.flags = flags;
        }
        if let Some(readonly) = update.readonly {
            self.readonly = readonly;
        }
        self.extras.extend(update.extras);
        self
    }

    /// Sets a single option from its string form.
    ///
    /// `port` must parse as an integer, `readonly` as a boolean (`true`,
    /// `false`, `1` or `0`), and `flags` is split on commas. Keys outside the
    /// recognized set are stored as extras.
    pub fn set(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        match key {
            "path" => self.path = value.to_string(),
            "username" => self.username = value.to_string(),
            "password" => self.password = value.to_string(),
            "server" => self.server = value.to_string(),
            "port" => {
                self.port = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        Error::Configuration(format!("invalid port value {:?}", value))
                    })?)
                }
            }
            "protocol" => self.protocol = value.to_string(),
            "mailbox" => self.mailbox = value.to_string(),
            "flags" => {
                self.flags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|flag| !flag.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            "readonly" => {
                self.readonly = match value {
                    "true" | "1" => true,
                    "false" | "0" => false,
                    other => {
                        return Err(Error::Configuration(format!(
                            "invalid readonly value {:?}",
                            other
                        )))
                    }
                }
            }
            _ => {
                self.extras.insert(key.to_string(), value.to_string());
            }
        }
        Ok(self)
    }

    /// Returns the string rendering of a single option.
    ///
    /// Unset optional values render as the empty string and `flags` as a
    /// comma-separated list. Requesting a key that is neither recognized nor
    /// stored as an extra fails with [`Error::UnknownKey`].
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "path" => self.path.clone(),
            "username" => self.username.clone(),
            "password" => self.password.clone(),
            "server" => self.server.clone(),
            "port" => self.port.map(|p| p.to_string()).unwrap_or_default(),
            "protocol" => self.protocol.clone(),
            "mailbox" => self.mailbox.clone(),
            "flags" => self.flags.join(","),
            "readonly" => self.readonly.to_string(),
            other => match self.extras.get(other) {
                Some(extra) => extra.clone(),
                None => return Err(Error::UnknownKey(other.to_string())),
            },
        };
        Ok(value)
    }

    /// Returns the full option mapping in its string rendering, including
    /// any stored extras. Recognized options win over extras sharing their
    /// name.
    pub fn options(&self) -> BTreeMap<String, String> {
        let mut options = self.extras.clone();
        options.insert("path".to_string(), self.path.clone());
        options.insert("username".to_string(), self.username.clone());
        options.insert("password".to_string(), self.password.clone());
        options.insert("server".to_string(), self.server.clone());
        options.insert(
            "port".to_string(),
            self.port.map(|p| p.to_string()).unwrap_or_default(),
        );
        options.insert("protocol".to_string(), self.protocol.clone());
        options.insert("mailbox".to_string(), self.mailbox.clone());
        options.insert("flags".to_string(), self.flags.join(","));
        options.insert("readonly".to_string(), self.readonly.to_string());
        options
    }

    /// Composes the target string used to open a transport connection.
    ///
    /// A non-empty `path` short-circuits everything else and is returned
    /// trimmed and bracket-wrapped. Otherwise the target is derived from the
    /// discrete fields and requires `server` to be set:
    ///
    /// ```text
    /// {protocol://server:port/flag1/flag2/readonly}mailbox
    /// ```
    ///
    /// Each flag is trimmed of leading and trailing slashes before joining.
    pub fn target_path(&self) -> Result<String> {
        let path = self.path.trim();
        if !path.is_empty() {
            return Ok(format!("{{{}}}", path));
        }
        if self.server.is_empty() {
            return Err(Error::Configuration(
                "server address is not set".to_string(),
            ));
        }
        let mut target = String::from("{");
        if !self.protocol.is_empty() {
            target.push_str(&self.protocol);
            target.push_str("://");
        }
        target.push_str(&self.server);
        if let Some(port) = self.port {
            target.push(':');
            target.push_str(&port.to_string());
        }
        for flag in &self.flags {
            target.push('/');
            target.push_str(flag.trim_matches('/'));
        }
        if self.readonly {
            target.push_str("/readonly");
        }
        target.push('}');
        target.push_str(&self.mailbox);
        Ok(target)
    }

    /// Whether a pre-built target path has been configured.
    pub fn has_path(&self) -> bool {
        !self.path.trim().is_empty()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn mailbox(&self) -> &str {
        &self.mailbox
    }

    pub fn readonly(&self) -> bool {
        self.readonly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discrete_config() -> Config {
        let mut config = Config::default();
        config.apply(ConfigUpdate {
            server: Some("imap.example.com".to_string()),
            port: Some(993),
            protocol: Some("imaps".to_string()),
            flags: Some(vec!["ssl".to_string()]),
            readonly: Some(true),
            mailbox: Some("INBOX".to_string()),
            ..ConfigUpdate::default()
        });
        config
    }

    #[test]
    fn discrete_fields_compose_the_target() {
        assert_eq!(
            discrete_config().target_path().unwrap(),
            "{imaps://imap.example.com:993/ssl/readonly}INBOX"
        );
    }

    #[test]
    fn explicit_path_overrides_discrete_fields() {
        let mut config = discrete_config();
        config.set("path", "  mail.example.org:143/notls  ").unwrap();
        assert_eq!(
            config.target_path().unwrap(),
            "{mail.example.org:143/notls}"
        );
    }

    #[test]
    fn missing_server_fails_the_derived_target() {
        let mut config = Config::default();
        config
            .set("username", "user")
            .unwrap()
            .set("password", "secret")
            .unwrap();
        match config.target_path() {
            Err(Error::Configuration(msg)) => assert_eq!(msg, "server address is not set"),
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }

    #[test]
    fn each_discrete_field_toggles_its_own_substring() {
        let mut config = Config::default();
        config.set("server", "mail.example.org").unwrap();
        config.set("readonly", "false").unwrap();
        assert_eq!(config.target_path().unwrap(), "{mail.example.org}INBOX");

        config.set("protocol", "imap").unwrap();
        assert_eq!(
            config.target_path().unwrap(),
            "{imap://mail.example.org}INBOX"
        );

        config.set("port", "143").unwrap();
        assert_eq!(
            config.target_path().unwrap(),
            "{imap://mail.example.org:143}INBOX"
        );

        config.set("flags", "tls,novalidate-cert").unwrap();
        assert_eq!(
            config.target_path().unwrap(),
            "{imap://mail.example.org:143/tls/novalidate-cert}INBOX"
        );

        config.set("readonly", "true").unwrap();
        assert_eq!(
            config.target_path().unwrap(),
            "{imap://mail.example.org:143/tls/novalidate-cert/readonly}INBOX"
        );
    }

    #[test]
    fn flags_are_trimmed_of_surrounding_slashes() {
        let mut config = Config::default();
        config.set("server", "mail.example.org").unwrap();
        config.apply(ConfigUpdate {
            flags: Some(vec!["/ssl/".to_string(), "secure".to_string()]),
            readonly: Some(false),
            ..ConfigUpdate::default()
        });
        assert_eq!(
            config.target_path().unwrap(),
            "{mail.example.org/ssl/secure}INBOX"
        );
    }

    #[test]
    fn apply_is_idempotent() {
        let update = ConfigUpdate {
            server: Some("imap.example.com".to_string()),
            port: Some(993),
            username: Some("user".to_string()),
            ..ConfigUpdate::default()
        };
        let mut once = Config::default();
        once.apply(update.clone());
        let mut twice = Config::default();
        twice.apply(update.clone()).apply(update);
        assert_eq!(once, twice);
    }

    #[test]
    fn apply_keeps_options_the_update_does_not_carry() {
        let mut config = discrete_config();
        config.apply(ConfigUpdate {
            port: Some(143),
            ..ConfigUpdate::default()
        });
        assert_eq!(config.get("port").unwrap(), "143");
        assert_eq!(config.get("server").unwrap(), "imap.example.com");
        assert_eq!(config.get("protocol").unwrap(), "imaps");
    }

    #[test]
    fn invalid_port_and_readonly_values_are_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("port", "ninety-nine"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            config.set("readonly", "maybe"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn unknown_options_are_kept_as_extras() {
        let mut config = Config::default();
        config.set("idle-timeout", "60").unwrap();
        assert_eq!(config.get("idle-timeout").unwrap(), "60");
        match config.get("keepalive") {
            Err(Error::UnknownKey(key)) => assert_eq!(key, "keepalive"),
            other => panic!("expected an unknown key error, got {:?}", other),
        }
    }

    #[test]
    fn deserialized_updates_collect_unknown_keys() {
        let update: ConfigUpdate = serde_json::from_str(
            r#"{"server": "imap.example.com", "port": 993, "certificate": "pinned"}"#,
        )
        .unwrap();
        let mut config = Config::default();
        config.apply(update);
        assert_eq!(config.get("server").unwrap(), "imap.example.com");
        assert_eq!(config.get("certificate").unwrap(), "pinned");
    }

    #[test]
    fn the_full_mapping_covers_every_option_and_extra() {
        let mut config = discrete_config();
        config.set("certificate", "pinned").unwrap();
        let options = config.options();
        assert_eq!(options.len(), 10);
        assert_eq!(options["server"], "imap.example.com");
        assert_eq!(options["port"], "993");
        assert_eq!(options["flags"], "ssl");
        assert_eq!(options["readonly"], "true");
        assert_eq!(options["certificate"], "pinned");
        assert_eq!(options["username"], "");
    }

    #[test]
    fn default_mailbox_is_inbox_and_readonly() {
        let config = Config::default();
        assert_eq!(config.mailbox(), "INBOX");
        assert!(config.readonly());
    }
}
