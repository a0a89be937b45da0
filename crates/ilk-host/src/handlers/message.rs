use ilk_core::{
    domain::Message,
    hooks::{post_message_sent, pre_message_update, should_process},
    messaging::types::MessageBuilder,
    Result,
};

use crate::{router::AppState, OutboundRecord};

pub(super) async fn handle_message_sent(state: &mut AppState, message: Message) -> Result<()> {
    let Some(id) = message.id.clone() else {
        return Ok(());
    };
    if !should_process(&message) {
        return Ok(());
    }

    state.updater.track(&message);
    let settings = state.store.snapshot();
    let committed = post_message_sent(
        &message,
        &settings,
        state.verifier.as_ref(),
        state.updater.as_ref(),
    )
    .await;
    state.updater.forget(&id);

    if committed? {
        tracing::info!(
            id = %id.0,
            room = %message.room.0,
            "linked issue keys in sent message"
        );
    }
    Ok(())
}

pub(super) async fn handle_message_updating(state: &mut AppState, message: Message) {
    let settings = state.store.snapshot();
    let mut builder = MessageBuilder::new(message.clone());
    let updated =
        pre_message_update(&message, &mut builder, &settings, state.verifier.as_ref()).await;

    state
        .outbox
        .push(OutboundRecord::MessageUpdate { message: updated });
}
