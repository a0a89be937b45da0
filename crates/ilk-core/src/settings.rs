//! Tracker settings: registration, validation and the in-memory store.
//!
//! Validation is decoupled from application. The host's pre-update hook calls
//! [`SettingsStore::validate`] and keeps the old value on rejection; the
//! post-update hook calls [`SettingsStore::apply`], which never validates and is
//! safe to run again with the same value.

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{logging::mask_secret, ports::SettingsHost, Result};

/// Identifiers of the settings owned by the linker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingsKey {
    JiraDomain,
    JiraUser,
    JiraToken,
}

impl SettingsKey {
    pub const ALL: [SettingsKey; 3] = [Self::JiraDomain, Self::JiraUser, Self::JiraToken];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::JiraDomain => "jira_domain",
            Self::JiraUser => "jira_user",
            Self::JiraToken => "jira_token",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == id)
    }

    /// Host registration for this setting (required, private, empty default).
    pub fn definition(self) -> SettingDefinition {
        let (kind, label, description) = match self {
            Self::JiraDomain => (
                SettingType::String,
                "settings_jira_domain_label",
                "settings_jira_domain_description",
            ),
            Self::JiraUser => (
                SettingType::String,
                "settings_jira_user_email_label",
                "settings_jira_user_email_description",
            ),
            Self::JiraToken => (
                SettingType::Code,
                "settings_jira_user_token_label",
                "settings_jira_user_token_description",
            ),
        };

        SettingDefinition {
            id: self.as_str().to_string(),
            kind,
            required: true,
            public: false,
            i18n_label: label.to_string(),
            i18n_description: description.to_string(),
            package_value: String::new(),
        }
    }
}

impl fmt::Display for SettingsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input widget type of a setting in the host's settings UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    String,
    /// Multi-line/secret input; used for the API token.
    Code,
}

/// Registration record handed to the host at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SettingType,
    pub required: bool,
    pub public: bool,
    pub i18n_label: String,
    pub i18n_description: String,
    /// Default value used until an administrator sets one.
    pub package_value: String,
}

/// A setting value as persisted / proposed by the host.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub id: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl Setting {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: Some(value.into()),
            required: true,
        }
    }

    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    fn is_secret(&self) -> bool {
        SettingsKey::from_id(&self.id) == Some(SettingsKey::JiraToken)
    }
}

impl fmt::Debug for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.is_secret() {
            mask_secret(self.value())
        } else {
            self.value().to_string()
        };
        f.debug_struct("Setting")
            .field("id", &self.id)
            .field("value", &value)
            .field("required", &self.required)
            .finish()
    }
}

/// Snapshot of the tracker configuration handed to a rewrite pass.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TrackerSettings {
    pub domain: String,
    pub user: String,
    pub token: String,
}

impl TrackerSettings {
    pub fn new(
        domain: impl Into<String>,
        user: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            user: user.into(),
            token: token.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.domain.is_empty() && !self.user.is_empty() && !self.token.is_empty()
    }
}

impl fmt::Debug for TrackerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerSettings")
            .field("domain", &self.domain)
            .field("user", &self.user)
            .field("token", &mask_secret(&self.token))
            .finish()
    }
}

fn domain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Labels: 1-63 chars of [A-Za-z0-9-], no leading/trailing hyphen.
        // Final label: 2-6 letters.
        Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,6}$")
            .expect("valid regex")
    })
}

pub fn is_valid_domain(value: &str) -> bool {
    !value.is_empty() && domain_re().is_match(value)
}

/// Process-lifetime holder of the validated tracker settings.
#[derive(Clone, Debug, Default)]
pub struct SettingsStore {
    current: TrackerSettings,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the settings with the host and load their persisted values.
    pub async fn initialize(&mut self, host: &dyn SettingsHost) -> Result<()> {
        for key in SettingsKey::ALL {
            host.provide_setting(key.definition()).await?;
        }

        for key in SettingsKey::ALL {
            match host.get_by_id(key.as_str()).await? {
                Some(setting) if self.validate(&setting) => self.apply(&setting),
                Some(setting) => {
                    tracing::warn!(?setting, "ignoring invalid persisted setting")
                }
                None => tracing::warn!(setting = %key, "setting not found in host store"),
            }
        }

        if !self.current.is_configured() {
            tracing::warn!("tracker settings incomplete; issue lookups will fail until configured");
        }
        Ok(())
    }

    /// Whether `setting` may be persisted.
    pub fn validate(&self, setting: &Setting) -> bool {
        let value = setting.value();
        match SettingsKey::from_id(&setting.id) {
            Some(SettingsKey::JiraDomain) => is_valid_domain(value),
            Some(SettingsKey::JiraUser) | Some(SettingsKey::JiraToken) => !value.is_empty(),
            None => !setting.required || !value.is_empty(),
        }
    }

    /// Overwrite the in-memory value. Unknown ids are ignored.
    pub fn apply(&mut self, setting: &Setting) {
        let Some(key) = SettingsKey::from_id(&setting.id) else {
            return;
        };
        tracing::debug!(?setting, "updating setting");

        let value = setting.value().to_string();
        match key {
            SettingsKey::JiraDomain => self.current.domain = value,
            SettingsKey::JiraUser => self.current.user = value,
            SettingsKey::JiraToken => self.current.token = value,
        }
    }

    pub fn domain(&self) -> &str {
        &self.current.domain
    }

    pub fn user(&self) -> &str {
        &self.current.user
    }

    pub fn token(&self) -> &str {
        &self.current.token
    }

    pub fn snapshot(&self) -> TrackerSettings {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use async_trait::async_trait;
    use std::{collections::HashMap, sync::Mutex};

    #[derive(Default)]
    struct FakeHost {
        provided: Mutex<Vec<SettingDefinition>>,
        persisted: HashMap<String, Setting>,
        fail_reads: bool,
    }

    #[async_trait]
    impl SettingsHost for FakeHost {
        async fn provide_setting(&self, definition: SettingDefinition) -> Result<()> {
            self.provided.lock().unwrap().push(definition);
            Ok(())
        }

        async fn get_by_id(&self, id: &str) -> Result<Option<Setting>> {
            if self.fail_reads {
                return Err(Error::Settings("store offline".to_string()));
            }
            Ok(self.persisted.get(id).cloned())
        }
    }

    #[test]
    fn domain_grammar() {
        assert!(is_valid_domain("example.atlassian.net"));
        assert!(is_valid_domain("my-team.atlassian.net"));
        assert!(is_valid_domain("a.io"));
        assert!(!is_valid_domain("not a domain"));
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain("localhost"));
        assert!(!is_valid_domain("-bad.example.com"));
        assert!(!is_valid_domain("bad-.example.com"));
        assert!(!is_valid_domain("example.c0m"));
        assert!(!is_valid_domain("example.toolongtld"));
        assert!(!is_valid_domain(&format!("{}.com", "a".repeat(64))));
        assert!(is_valid_domain(&format!("{}.com", "a".repeat(63))));
    }

    #[test]
    fn rejected_domain_keeps_previous_value() {
        let mut store = SettingsStore::new();
        let good = Setting::new("jira_domain", "example.atlassian.net");
        assert!(store.validate(&good));
        store.apply(&good);

        let bad = Setting::new("jira_domain", "not a domain");
        assert!(!store.validate(&bad));
        assert_eq!(store.domain(), "example.atlassian.net");
    }

    #[test]
    fn required_user_must_be_non_empty() {
        let store = SettingsStore::new();
        assert!(!store.validate(&Setting::new("jira_user", "")));
        assert!(store.validate(&Setting::new("jira_user", "bot@example.com")));
        assert!(!store.validate(&Setting {
            id: "jira_token".to_string(),
            value: None,
            required: true,
        }));
    }

    #[test]
    fn unknown_settings_validate_by_required_flag_and_are_not_applied() {
        let mut store = SettingsStore::new();
        let optional = Setting {
            id: "something_else".to_string(),
            value: None,
            required: false,
        };
        assert!(store.validate(&optional));
        assert!(!store.validate(&Setting::new("something_else", "")));

        store.apply(&Setting::new("something_else", "x"));
        assert_eq!(store.snapshot(), TrackerSettings::default());
    }

    #[test]
    fn debug_output_masks_token() {
        let settings = TrackerSettings::new("example.atlassian.net", "bot", "supersecrettoken1234");
        let dbg = format!("{settings:?}");
        assert!(!dbg.contains("supersecrettoken"));
        assert!(dbg.contains("1234"));

        let setting = Setting::new("jira_token", "supersecrettoken1234");
        assert!(!format!("{setting:?}").contains("supersecret"));
    }

    #[tokio::test]
    async fn initialize_registers_and_loads_persisted_values() {
        let mut persisted = HashMap::new();
        for (id, value) in [
            ("jira_domain", "example.atlassian.net"),
            ("jira_user", "bot@example.com"),
            ("jira_token", "secret"),
        ] {
            persisted.insert(id.to_string(), Setting::new(id, value));
        }
        let host = FakeHost {
            persisted,
            ..Default::default()
        };

        let mut store = SettingsStore::new();
        store.initialize(&host).await.unwrap();

        let provided = host.provided.lock().unwrap();
        assert_eq!(provided.len(), 3);
        assert!(provided.iter().all(|d| d.required && !d.public));
        assert!(provided.iter().all(|d| d.package_value.is_empty()));
        assert_eq!(provided[2].kind, SettingType::Code);

        assert_eq!(store.domain(), "example.atlassian.net");
        assert_eq!(store.user(), "bot@example.com");
        assert_eq!(store.token(), "secret");
    }

    #[tokio::test]
    async fn initialize_skips_invalid_persisted_values() {
        let mut persisted = HashMap::new();
        for (id, value) in [
            ("jira_domain", "not a domain"),
            ("jira_user", ""),
            ("jira_token", "secret"),
        ] {
            persisted.insert(id.to_string(), Setting::new(id, value));
        }
        let host = FakeHost {
            persisted,
            ..Default::default()
        };

        let mut store = SettingsStore::new();
        store.initialize(&host).await.unwrap();

        assert_eq!(store.domain(), "");
        assert_eq!(store.user(), "");
        assert_eq!(store.token(), "secret");
    }

    #[tokio::test]
    async fn initialize_propagates_host_read_errors() {
        let host = FakeHost {
            fail_reads: true,
            ..Default::default()
        };
        let mut store = SettingsStore::new();
        assert!(store.initialize(&host).await.is_err());
    }
}
