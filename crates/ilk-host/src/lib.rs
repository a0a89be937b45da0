//! Stdio host adapter.
//!
//! The chat platform talks to the linker over newline-delimited JSON on
//! stdin/stdout. This crate implements the `ilk-core` ports on top of that
//! protocol: a persisted-settings store and a message updater whose commits
//! become outbound records.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ilk_core::{
    domain::{Message, MessageId, User},
    errors::Error,
    messaging::{port::MessageUpdater, types::MessageBuilder},
    ports::SettingsHost,
    settings::{Setting, SettingDefinition},
    Result,
};

pub mod handlers;
pub mod router;

/// Event delivered by the platform.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A message was committed.
    MessageSent { message: Message },
    /// A message edit is about to be committed.
    MessageUpdating { message: Message },
    /// A settings change awaits validation.
    SettingUpdating {
        old_setting: Setting,
        new_setting: Setting,
    },
    /// A settings change was committed.
    SettingUpdated { setting: Setting },
}

/// Record emitted back to the platform.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundRecord {
    SettingsRegistered {
        settings: Vec<SettingDefinition>,
    },
    /// Commit of an edit opened after `message_sent`.
    MessageEdit {
        message_id: MessageId,
        editor: User,
        text: String,
    },
    /// Result of a `message_updating` hook.
    MessageUpdate { message: Message },
    /// Setting the platform should persist (`accepted == false` keeps the old one).
    SettingDecision { setting: Setting, accepted: bool },
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Records waiting to be written to stdout.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Mutex<Vec<OutboundRecord>>,
}

impl Outbox {
    pub fn push(&self, record: OutboundRecord) {
        lock(&self.pending).push(record);
    }

    pub fn drain(&self) -> Vec<OutboundRecord> {
        std::mem::take(&mut *lock(&self.pending))
    }
}

/// Persisted settings as the platform would keep them.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    definitions: Mutex<Vec<SettingDefinition>>,
    values: Mutex<HashMap<String, Setting>>,
}

impl InMemorySettings {
    pub fn seeded(seeds: impl IntoIterator<Item = Setting>) -> Self {
        let values = seeds.into_iter().map(|s| (s.id.clone(), s)).collect();
        Self {
            definitions: Mutex::new(Vec::new()),
            values: Mutex::new(values),
        }
    }

    pub fn persist(&self, setting: Setting) {
        lock(&self.values).insert(setting.id.clone(), setting);
    }

    pub fn definitions(&self) -> Vec<SettingDefinition> {
        lock(&self.definitions).clone()
    }
}

#[async_trait]
impl SettingsHost for InMemorySettings {
    async fn provide_setting(&self, definition: SettingDefinition) -> Result<()> {
        lock(&self.values)
            .entry(definition.id.clone())
            .or_insert_with(|| Setting {
                id: definition.id.clone(),
                value: Some(definition.package_value.clone()),
                required: definition.required,
            });
        lock(&self.definitions).push(definition);
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Setting>> {
        Ok(lock(&self.values).get(id).cloned())
    }
}

/// Message updater whose commits become `message_edit` records.
#[derive(Debug)]
pub struct StdioUpdater {
    known: Mutex<HashMap<MessageId, Message>>,
    outbox: Arc<Outbox>,
}

impl StdioUpdater {
    pub fn new(outbox: Arc<Outbox>) -> Self {
        Self {
            known: Mutex::new(HashMap::new()),
            outbox,
        }
    }

    /// Remember the committed state of a message so an edit can be opened on it.
    pub fn track(&self, message: &Message) {
        if let Some(id) = &message.id {
            lock(&self.known).insert(id.clone(), message.clone());
        }
    }

    /// Drop a tracked message; a no-op when it was never tracked or already committed.
    pub fn forget(&self, message_id: &MessageId) {
        lock(&self.known).remove(message_id);
    }

    #[cfg(test)]
    pub(crate) fn tracked_len(&self) -> usize {
        lock(&self.known).len()
    }
}

#[async_trait]
impl MessageUpdater for StdioUpdater {
    async fn open(&self, message_id: &MessageId, editor: &User) -> Result<MessageBuilder> {
        let message = lock(&self.known)
            .get(message_id)
            .cloned()
            .ok_or_else(|| Error::External(format!("unknown message id: {}", message_id.0)))?;
        let mut builder = MessageBuilder::new(message);
        builder.set_editor(editor.clone());
        Ok(builder)
    }

    async fn finish(&self, builder: MessageBuilder) -> Result<()> {
        let editor = builder
            .editor()
            .cloned()
            .ok_or_else(|| Error::External("edit has no editor".to_string()))?;
        let message = builder.into_message();
        let (Some(message_id), Some(text)) = (message.id.clone(), message.text.clone()) else {
            return Err(Error::External("edit has no message id or text".to_string()));
        };

        lock(&self.known).remove(&message_id);
        self.outbox.push(OutboundRecord::MessageEdit {
            message_id,
            editor,
            text,
        });
        Ok(())
    }
}
