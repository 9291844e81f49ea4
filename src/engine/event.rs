use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChatKind {
    #[default]
    Private,
    Group,
}

/// One inbound message, stripped of transport types.
#[derive(Clone, Debug, Default)]
pub struct InboundEvent {
    pub user_id: u64,
    pub chat_kind: ChatKind,
    /// Message text, or the caption of a photo.
    pub text: Option<String>,
    pub photo: Option<Vec<u8>>,
    pub reply_to_bot: bool,
    pub bot_username: Option<String>,
}

impl InboundEvent {
    #[cfg(test)]
    pub fn text(user_id: u64, text: impl Into<String>) -> Self {
        Self {
            user_id,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_command(&self) -> bool {
        self.text.as_deref().is_some_and(|t| t.trim_start().starts_with('/'))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Text(String),
    /// Text with a one-time reply keyboard.
    Choices { text: String, rows: Vec<Vec<String>> },
    Document { filename: String, bytes: Vec<u8> },
    /// Sent once `after` has elapsed.
    Delayed { after: Duration, text: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }
}
