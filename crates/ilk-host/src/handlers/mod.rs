//! Platform event handlers.
//!
//! Each handler is a thin adapter that pulls what the hook needs out of
//! [`AppState`], calls into `ilk-core::hooks`, and queues the outbound record.

use crate::{router::AppState, InboundEvent};

mod message;
mod settings;

pub async fn handle_event(state: &mut AppState, event: InboundEvent) -> ilk_core::Result<()> {
    match event {
        InboundEvent::MessageSent { message } => message::handle_message_sent(state, message).await,
        InboundEvent::MessageUpdating { message } => {
            message::handle_message_updating(state, message).await;
            Ok(())
        }
        InboundEvent::SettingUpdating {
            old_setting,
            new_setting,
        } => {
            settings::handle_setting_updating(state, old_setting, new_setting);
            Ok(())
        }
        InboundEvent::SettingUpdated { setting } => {
            settings::handle_setting_updated(state, setting);
            Ok(())
        }
    }
}
