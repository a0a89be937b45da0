//! Platform-facing entry points.
//!
//! Host adapters translate their event callbacks into these functions; all of
//! them take the tracker configuration explicitly.

use crate::{
    domain::Message,
    extract::extract_issue_keys,
    messaging::{port::MessageUpdater, types::MessageBuilder},
    ports::IssueVerifier,
    rewrite::rewrite_message,
    settings::{Setting, SettingsStore, TrackerSettings},
    Result,
};

/// Whether a message mentions at least one candidate issue key.
pub fn should_process(message: &Message) -> bool {
    !extract_issue_keys(message.text.as_deref()).is_empty()
}

/// "Message about to be updated": rewrite into the host-supplied builder.
pub async fn pre_message_update(
    message: &Message,
    builder: &mut MessageBuilder,
    settings: &TrackerSettings,
    verifier: &dyn IssueVerifier,
) -> Message {
    if !should_process(message) {
        return builder.message().clone();
    }
    rewrite_message(message, builder, settings, verifier).await
}

/// "Message was sent": open an edit as the original sender, rewrite, commit.
///
/// Returns whether an edit was committed.
pub async fn post_message_sent(
    message: &Message,
    settings: &TrackerSettings,
    verifier: &dyn IssueVerifier,
    updater: &dyn MessageUpdater,
) -> Result<bool> {
    if !should_process(message) {
        return Ok(false);
    }
    let Some(id) = message.id.as_ref() else {
        return Ok(false);
    };

    let editor = message.sender.clone();
    let mut builder = updater.open(id, &editor).await?;

    let updated = rewrite_message(message, &mut builder, settings, verifier).await;
    let (Some(text), Some(_)) = (updated.text, updated.id) else {
        return Ok(false);
    };

    builder.set_text(text).set_editor(editor);
    updater.finish(builder).await?;
    Ok(true)
}

/// Proposed settings change, as delivered by the host before commit.
#[derive(Clone, Debug)]
pub struct SettingUpdateContext {
    pub old_setting: Setting,
    pub new_setting: Setting,
}

/// Settings pre-update: the setting the host should persist.
pub fn pre_setting_update(store: &SettingsStore, ctx: SettingUpdateContext) -> Setting {
    if store.validate(&ctx.new_setting) {
        ctx.new_setting
    } else {
        tracing::info!(setting = %ctx.new_setting.id, "rejected invalid setting value");
        ctx.old_setting
    }
}

/// Settings updated: apply the committed value.
pub fn setting_updated(store: &mut SettingsStore, setting: &Setting) {
    store.apply(setting);
}
