//! Inbound webhook payload shapes, limited to the fields the pipeline reads.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub edited_message: Option<Message>,
}

impl Update {
    /// Edited messages are processed exactly like new ones.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.edited_message.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
    /// Ordered smallest to largest; the last entry is the highest resolution.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
}

impl Message {
    /// Text content: the message text, or the caption for photo messages.
    pub fn text_content(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or_default()
    }

    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo.as_ref().and_then(|sizes| sizes.last())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl TelegramUser {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    /// Telegram id of the contact's owner; absent for address-book contacts
    /// that are not Telegram users.
    #[serde(default)]
    pub user_id: Option<i64>,
    pub phone_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_prefers_message_over_edited_message() {
        let update: Update = serde_json::from_str(
            r#"{
                "message": {"chat": {"id": 1}, "text": "novo"},
                "edited_message": {"chat": {"id": 1}, "text": "editado"}
            }"#,
        )
        .unwrap();
        assert_eq!(update.message().unwrap().text_content(), "novo");
    }

    #[test]
    fn edited_message_is_used_when_message_is_absent() {
        let update: Update =
            serde_json::from_str(r#"{"edited_message": {"chat": {"id": 1}, "text": "editado"}}"#)
                .unwrap();
        assert_eq!(update.message().unwrap().text_content(), "editado");
    }

    #[test]
    fn caption_stands_in_for_text() {
        let message: Message = serde_json::from_str(
            r#"{"chat": {"id": 1}, "caption": "nota fiscal", "photo": [
                {"file_id": "small"}, {"file_id": "large"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(message.text_content(), "nota fiscal");
        assert_eq!(message.largest_photo().unwrap().file_id, "large");
    }

    #[test]
    fn full_name_joins_present_parts() {
        let user = TelegramUser {
            id: 1,
            first_name: Some("Ana".to_string()),
            last_name: None,
        };
        assert_eq!(user.full_name(), "Ana");

        let user = TelegramUser {
            id: 1,
            first_name: Some("Ana".to_string()),
            last_name: Some("Souza".to_string()),
        };
        assert_eq!(user.full_name(), "Ana Souza");
    }

    #[test]
    fn empty_update_has_no_message() {
        let update: Update = serde_json::from_str(r#"{"update_id": 7}"#).unwrap();
        assert!(update.message().is_none());
    }
}
