use async_trait::async_trait;

use crate::{
    settings::{Setting, SettingDefinition, TrackerSettings},
    verify::VerificationResult,
    Result,
};

/// Hexagonal port for the issue tracker.
///
/// Implementations never fail the pass: every problem (status, body, network)
/// is folded into an unverified [`VerificationResult`].
#[async_trait]
pub trait IssueVerifier: Send + Sync {
    async fn verify(&self, token: &str, settings: &TrackerSettings) -> VerificationResult;
}

/// Hexagonal port for the host's settings persistence.
#[async_trait]
pub trait SettingsHost: Send + Sync {
    /// Register a setting with the host's settings UI.
    async fn provide_setting(&self, definition: SettingDefinition) -> Result<()>;

    /// Read the persisted value of a setting, if the host has one.
    async fn get_by_id(&self, id: &str) -> Result<Option<Setting>>;
}
