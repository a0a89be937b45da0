//! Jira Cloud adapter (issue existence checks).
//!
//! Uses the REST v3 `issue/{key}` endpoint with basic auth (`user:api-token`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use ilk_core::{
    errors::Error,
    ports::IssueVerifier,
    settings::TrackerSettings,
    verify::{LookupFailure, VerificationResult},
    Result,
};

#[derive(Debug, Deserialize)]
struct IssueRef {
    key: String,
}

#[derive(Clone, Debug)]
pub struct JiraClient {
    http: reqwest::Client,
    /// Replaces `https://{domain}` in request URLs when set.
    api_base: Option<String>,
}

impl JiraClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("jira client build error: {e}")))?;
        Ok(Self {
            http,
            api_base: None,
        })
    }

    pub fn with_api_base(mut self, api_base: Option<String>) -> Self {
        self.api_base = api_base.map(|s| s.trim_end_matches('/').to_string());
        self
    }

    pub fn issue_url(&self, domain: &str, key: &str) -> String {
        match &self.api_base {
            Some(base) => format!("{base}/rest/api/3/issue/{key}"),
            None => format!("https://{domain}/rest/api/3/issue/{key}"),
        }
    }
}

#[async_trait]
impl IssueVerifier for JiraClient {
    async fn verify(&self, token: &str, settings: &TrackerSettings) -> VerificationResult {
        let url = self.issue_url(&settings.domain, token);

        let resp = match self
            .http
            .get(&url)
            .basic_auth(&settings.user, Some(&settings.token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                return VerificationResult::unverified(token, LookupFailure::unreachable(url, e))
            }
        };

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return VerificationResult::unverified(
                token,
                LookupFailure::status(url, status.as_u16()),
            );
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                return VerificationResult::unverified(
                    token,
                    LookupFailure::body(url, status.as_u16(), format!("body read error: {e}")),
                )
            }
        };

        match serde_json::from_str::<IssueRef>(&body) {
            Ok(issue) if !issue.key.is_empty() => VerificationResult::verified(token, issue.key),
            Ok(_) => VerificationResult::unverified(
                token,
                LookupFailure::body(url, status.as_u16(), "empty issue key"),
            ),
            Err(e) => VerificationResult::unverified(
                token,
                LookupFailure::body(url, status.as_u16(), format!("unparseable body: {e}")),
            ),
        }
    }
}
