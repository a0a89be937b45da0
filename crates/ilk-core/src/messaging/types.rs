use crate::domain::{Message, User};

/// Host-supplied mutable proxy that stages changes to one message.
///
/// Nothing reaches the platform until the builder is handed back (either as the
/// return value of a pre-update hook or through [`super::port::MessageUpdater::finish`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBuilder {
    message: Message,
    editor: Option<User>,
}

impl MessageBuilder {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            editor: None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.message.text = Some(text.into());
        self
    }

    pub fn set_editor(&mut self, editor: User) -> &mut Self {
        self.editor = Some(editor);
        self
    }

    pub fn editor(&self) -> Option<&User> {
        self.editor.as_ref()
    }

    /// Staged view of the message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageId, RoomId, UserId};

    fn user(id: &str) -> User {
        User {
            id: UserId(id.to_string()),
            username: None,
        }
    }

    #[test]
    fn stages_text_and_editor_without_touching_identity() {
        let msg = Message {
            id: Some(MessageId("m1".to_string())),
            sender: user("u1"),
            room: RoomId("r1".to_string()),
            text: Some("old".to_string()),
        };
        let mut builder = MessageBuilder::new(msg);
        builder.set_text("new").set_editor(user("u2"));

        assert_eq!(builder.message().text.as_deref(), Some("new"));
        assert_eq!(builder.message().id, Some(MessageId("m1".to_string())));
        assert_eq!(builder.editor(), Some(&user("u2")));
    }
}
