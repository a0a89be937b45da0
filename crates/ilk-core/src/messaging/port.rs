use async_trait::async_trait;

use crate::{
    domain::{MessageId, User},
    messaging::types::MessageBuilder,
    Result,
};

/// Chat platform port for editing messages that were already committed.
///
/// Mirrors the platform's "updater" contract: an edit transaction is opened
/// for one message on behalf of an editor, staged through the returned
/// builder, and committed explicitly with [`MessageUpdater::finish`].
#[async_trait]
pub trait MessageUpdater: Send + Sync {
    async fn open(&self, message_id: &MessageId, editor: &User) -> Result<MessageBuilder>;
    async fn finish(&self, builder: MessageBuilder) -> Result<()>;
}
