use std::{env, fmt, fs, path::Path, time::Duration};

use crate::{
    errors::Error,
    logging::mask_secret,
    settings::{Setting, SettingsKey},
    Result,
};

/// Typed process configuration.
///
/// The tracker values here only seed the host's persisted settings; they are
/// validated through the regular settings path at startup.
#[derive(Clone)]
pub struct Config {
    // Tracker settings (seed values)
    pub jira_domain: String,
    pub jira_user: String,
    pub jira_token: String,

    // Tracker client
    pub http_timeout: Duration,
    /// Overrides `https://{domain}` for REST calls (proxies, tests).
    pub jira_api_base: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let jira_domain = get("JIRA_DOMAIN").unwrap_or_default();
        let jira_user = get("JIRA_USER").unwrap_or_default();
        let jira_token = get("JIRA_TOKEN").unwrap_or_default();

        let http_timeout = match get("ILK_HTTP_TIMEOUT_MS").and_then(non_empty) {
            Some(raw) => {
                let ms = raw.parse::<u64>().map_err(|_| {
                    Error::Config(format!("ILK_HTTP_TIMEOUT_MS must be an integer, got {raw:?}"))
                })?;
                Duration::from_millis(ms.max(1))
            }
            None => Duration::from_millis(10_000),
        };

        let jira_api_base = get("ILK_JIRA_API_BASE")
            .and_then(non_empty)
            .map(|s| s.trim_end_matches('/').to_string());

        Ok(Self {
            jira_domain,
            jira_user,
            jira_token,
            http_timeout,
            jira_api_base,
        })
    }

    /// Seed values as host settings, in registration order.
    pub fn seed_settings(&self) -> Vec<Setting> {
        SettingsKey::ALL
            .into_iter()
            .map(|key| {
                let value = match key {
                    SettingsKey::JiraDomain => &self.jira_domain,
                    SettingsKey::JiraUser => &self.jira_user,
                    SettingsKey::JiraToken => &self.jira_token,
                };
                Setting::new(key.as_str(), value.clone())
            })
            .collect()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("jira_domain", &self.jira_domain)
            .field("jira_user", &self.jira_user)
            .field("jira_token", &mask_secret(&self.jira_token))
            .field("http_timeout", &self.http_timeout)
            .field("jira_api_base", &self.jira_api_base)
            .finish()
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert!(cfg.jira_domain.is_empty());
        assert_eq!(cfg.http_timeout, Duration::from_millis(10_000));
        assert!(cfg.jira_api_base.is_none());
    }

    #[test]
    fn reads_tracker_values_and_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("JIRA_DOMAIN", " example.atlassian.net "),
            ("JIRA_USER", "bot@example.com"),
            ("JIRA_TOKEN", "tok"),
            ("ILK_HTTP_TIMEOUT_MS", "2500"),
            ("ILK_JIRA_API_BASE", "http://127.0.0.1:9000/"),
        ]))
        .unwrap();
        assert_eq!(cfg.jira_domain, "example.atlassian.net");
        assert_eq!(cfg.http_timeout, Duration::from_millis(2500));
        assert_eq!(cfg.jira_api_base.as_deref(), Some("http://127.0.0.1:9000"));

        let seeds = cfg.seed_settings();
        assert_eq!(seeds.len(), 3);
        assert_eq!(seeds[0].id, "jira_domain");
        assert_eq!(seeds[2].value(), "tok");
        assert!(!format!("{cfg:?}").contains("\"tok\""));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = Config::from_lookup(lookup(&[("ILK_HTTP_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("ILK_HTTP_TIMEOUT_MS"));
    }

    #[test]
    fn parses_dotenv_lines() {
        let parsed = parse_dotenv(
            "# comment\nJIRA_USER=\"bot@example.com\"\n\nnoequals\n =x\nJIRA_TOKEN='t'\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("JIRA_USER".to_string(), "bot@example.com".to_string()),
                ("JIRA_TOKEN".to_string(), "t".to_string()),
            ]
        );
    }
}
