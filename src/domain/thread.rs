use std::collections::HashMap;

use super::message::Message;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParticipantInfo {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// A conversation between two or more marketplace users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: String,
    pub participant_ids: Vec<String>,
    pub participant_info: HashMap<String, ParticipantInfo>,
    pub messages: Vec<Message>,
    pub unread_count: u32,
    /// Booking/task the conversation is about, shown for context only.
    pub task_id: Option<String>,
}

impl Thread {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participant_ids.iter().any(|id| id == user_id)
    }

    /// The participant a message from `user_id` is addressed to.
    pub fn counterpart_of(&self, user_id: &str) -> Option<&str> {
        self.participant_ids
            .iter()
            .map(String::as_str)
            .find(|id| *id != user_id)
    }

    pub fn display_name_for(&self, participant_id: &str) -> String {
        self.participant_info
            .get(participant_id)
            .map(|info| info.display_name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(participant_id)
            .to_owned()
    }

    pub fn avatar_for(&self, participant_id: &str) -> Option<&str> {
        self.participant_info
            .get(participant_id)
            .and_then(|info| info.avatar_url.as_deref())
    }

    /// Title as seen by `user_id`: the other participants' names.
    pub fn title_for(&self, user_id: &str) -> String {
        let names: Vec<String> = self
            .participant_ids
            .iter()
            .filter(|id| id.as_str() != user_id)
            .map(|id| self.display_name_for(id))
            .collect();

        if names.is_empty() {
            self.id.clone()
        } else {
            names.join(", ")
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
