//! Telegram client using teloxide.
//!
//! Turns [`RenderInstruction`]s into Telegram calls: new messages for
//! commands and broadcasts, edits of the pressed message for callbacks.

use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, InputMedia, InputMediaPhoto, MessageId,
    ParseMode,
};
use teloxide::{ApiError, RequestError};
use tracing::{debug, info, warn};

use crate::bot::callback::MAX_TOKEN_BYTES;
use crate::bot::render::{Keyboard, RenderInstruction};

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Send `render` as a new message.
    pub async fn send(&self, chat_id: ChatId, render: &RenderInstruction) -> Result<i64, String> {
        let sent = match render {
            RenderInstruction::Text { text, keyboard } => {
                let mut request = self.bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
                if let Some(rows) = keyboard {
                    request = request.reply_markup(markup(rows));
                }
                request.await
            }
            RenderInstruction::Photo { url, keyboard } => {
                let photo = photo_file(url)?;
                let mut request = self.bot.send_photo(chat_id, photo);
                if let Some(rows) = keyboard {
                    request = request.reply_markup(markup(rows));
                }
                request.await
            }
            RenderInstruction::Notice { text } => self.bot.send_message(chat_id, text).await,
        };

        sent.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Answer a button press.
    ///
    /// Notices become the callback's toast and leave the message alone.
    /// Screens replace the pressed message, falling back to a new message
    /// when it cannot be edited (e.g. text over a photo).
    pub async fn respond(&self, query: &CallbackQuery, render: &RenderInstruction) -> Result<(), String> {
        let mut answer = self.bot.answer_callback_query(query.id.clone());
        if let RenderInstruction::Notice { text } = render {
            answer = answer.text(text.clone());
        }
        if let Err(e) = answer.await {
            warn!("Failed to answer callback: {e}");
        }

        if !render.replaces_screen() {
            return Ok(());
        }

        let Some(message) = query.message.as_ref() else {
            debug!("Callback without an accessible message, nothing to edit");
            return Ok(());
        };
        let chat_id = message.chat().id;

        match self.edit(chat_id, message.id(), render).await {
            Ok(()) => Ok(()),
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => {
                info!("Cannot edit message {} in chat {} ({e}), sending instead", message.id(), chat_id);
                self.send(chat_id, render).await.map(|_| ())
            }
        }
    }

    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        render: &RenderInstruction,
    ) -> Result<(), RequestError> {
        match render {
            RenderInstruction::Text { text, keyboard } => {
                let mut request = self
                    .bot
                    .edit_message_text(chat_id, message_id, text)
                    .parse_mode(ParseMode::Html);
                if let Some(rows) = keyboard {
                    request = request.reply_markup(markup(rows));
                }
                request.await.map(|_| ())
            }
            RenderInstruction::Photo { url, keyboard } => {
                let photo = photo_file(url).map_err(|e| RequestError::Io(std::io::Error::other(e).into()))?;
                let media = InputMedia::Photo(InputMediaPhoto::new(photo));
                let mut request = self.bot.edit_message_media(chat_id, message_id, media);
                if let Some(rows) = keyboard {
                    request = request.reply_markup(markup(rows));
                }
                request.await.map(|_| ())
            }
            RenderInstruction::Notice { .. } => Ok(()),
        }
    }
}

/// Inline keyboard for `rows`. Buttons whose token Telegram would reject are dropped.
pub fn markup(rows: &Keyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|button| {
                    let token = button.action.token();
                    if token.len() > MAX_TOKEN_BYTES {
                        warn!("⚠ Dropping button '{}': token is {} bytes", button.label, token.len());
                        return None;
                    }
                    Some(InlineKeyboardButton::callback(button.label.clone(), token))
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn photo_file(url: &str) -> Result<InputFile, String> {
    reqwest::Url::parse(url)
        .map(InputFile::url)
        .map_err(|e| format!("Invalid photo url '{url}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::callback::Action;
    use crate::bot::render::Button;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<Vec<String>> {
        markup
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| match &b.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                        other => panic!("unexpected button kind {other:?}"),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_markup_encodes_tokens() {
        let rows = vec![
            vec![Button::new("Animales", Action::JokeCategory("animales".into()))],
            vec![Button::new("⬅️", Action::JokeCategoryPage(0)), Button::home()],
        ];
        assert_eq!(
            callback_data(&markup(&rows)),
            vec![vec!["cat_animales".to_string()], vec!["categorias_page_0".into(), "home".into()]]
        );
    }

    #[test]
    fn test_markup_drops_oversized_tokens() {
        let long = "x".repeat(MAX_TOKEN_BYTES);
        let rows = vec![
            vec![Button::new("largo", Action::TriviaAnswer(long))],
            vec![Button::home()],
        ];
        assert_eq!(callback_data(&markup(&rows)), vec![vec!["home".to_string()]]);
    }

    #[test]
    fn test_photo_file_rejects_bad_url() {
        assert!(photo_file("not a url").is_err());
        assert!(photo_file("https://i.redd.it/x.png").is_ok());
    }
}
