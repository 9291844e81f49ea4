use teloxide::{
    net::Download,
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, InputFile, Me, Message},
    Bot,
};

use crate::{
    engine::{AssistError, ChatKind, InboundEvent, Reply},
    error::HandlerResult,
    state::AppState,
};

use super::keyboard::get_choices_keyboard;

/// Telegram rejects longer messages.
const MAX_MESSAGE_CHARS: usize = 4096;

pub async fn handle_message(bot: Bot, me: Me, msg: Message, state: AppState) -> HandlerResult<()> {
    let Some(user) = msg.from.as_ref() else {
        debug!("Ignoring message without sender in chat {}", msg.chat.id);
        return Ok(());
    };

    let reply_to_bot = msg
        .reply_to_message()
        .and_then(|reply| reply.from.as_ref())
        .is_some_and(|sender| sender.id == me.id);

    let mut event = InboundEvent {
        user_id: user.id.0,
        chat_kind: if msg.chat.is_private() {
            ChatKind::Private
        } else {
            ChatKind::Group
        },
        text: msg.text().or(msg.caption()).map(str::to_string),
        photo: None,
        reply_to_bot,
        bot_username: me.username.clone(),
    };

    if let Some(size) = msg.photo().and_then(|sizes| sizes.last()) {
        // Photos the engine would ignore or refuse go through without their bytes.
        event.photo = Some(Vec::new());
        if state.engine.wants_photo(&event).await {
            match download_photo(&bot, &size.file.id).await {
                Ok(bytes) => event.photo = Some(bytes),
                Err(e) => {
                    warn!("Failed to download photo from user {}: {}", user.id, e);
                    return deliver(&bot, msg.chat.id, vec![AssistError::PhotoUnavailable.into()]).await;
                }
            }
        }
    }

    let replies = state.engine.handle(event).await;
    deliver(&bot, msg.chat.id, replies).await
}

async fn download_photo(bot: &Bot, file_id: &str) -> HandlerResult<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let mut buf = Vec::new();
    bot.download_file(&file.path, &mut buf).await?;
    Ok(buf)
}

async fn deliver(bot: &Bot, chat_id: ChatId, replies: Vec<Reply>) -> HandlerResult<()> {
    for reply in replies {
        match reply {
            Reply::Text(text) => {
                for chunk in split_message(&text, MAX_MESSAGE_CHARS) {
                    bot.send_message(chat_id, chunk).await?;
                }
            }
            Reply::Choices { text, rows } => {
                bot.send_message(chat_id, text)
                    .reply_markup(get_choices_keyboard(&rows))
                    .await?;
            }
            Reply::Document { filename, bytes } => {
                bot.send_document(chat_id, InputFile::memory(bytes).file_name(filename))
                    .await?;
            }
            Reply::Delayed { after, text } => {
                let bot = bot.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    if let Err(e) = bot.send_message(chat_id, text).await {
                        error!("Failed to deliver reminder to {}: {}", chat_id, e);
                    }
                });
            }
        }
    }

    Ok(())
}

/// Splits on character boundaries, preferring the last line break inside each chunk.
fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let end = rest.char_indices().nth(limit).map_or(rest.len(), |(i, _)| i);
        let cut = rest[..end].rfind('\n').filter(|&i| i > 0).unwrap_or(end);
        chunks.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start_matches('\n');
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_message() {
        assert_eq!(split_message("short", 10), vec!["short"]);
        assert_eq!(split_message("abc\ndefgh\nij", 8), vec!["abc", "defgh\nij"]);
        assert_eq!(split_message("ąčęėįšųū", 3), vec!["ąčę", "ėįš", "ųū"]);
    }
}
