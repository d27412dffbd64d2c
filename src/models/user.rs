use serde::{Deserialize, Serialize};

use super::Id;

/// A registered chat user.
///
/// Created on the first contact-sharing event, keyed on the immutable
/// Telegram id. The 6-digit `password` doubles as the web dashboard login
/// credential and is stored verbatim, exactly as the user typed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub telegram_id: i64,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Shared-ledger group, when the user belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<Id>,
}

impl User {
    /// Users without a password are still in the setup flow and must not
    /// reach transaction processing.
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn first_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
    }
}

/// Upsert payload built from a shared contact, keyed on `telegram_id`.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub telegram_id: i64,
    pub phone_number: String,
    pub full_name: String,
}
