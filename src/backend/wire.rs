//! JSON shapes exchanged with the marketplace chat API and their validation
//! into domain types. Records that fail validation are skipped with a
//! warning; a body that is not the expected JSON shape fails as a whole.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    domain::{
        message::{Attachment, AttachmentKind, DeliveryState, Message, MessageId},
        thread::{ParticipantInfo, Thread},
    },
    usecases::{create_thread::CreateThreadRequest, send_message::SendRequest},
};

const WIRE_RECORD_REJECTED: &str = "BACKEND_WIRE_RECORD_REJECTED";

#[derive(Debug, Error)]
pub enum WireError {
    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of {0}")]
    NotAnArray(&'static str),
    #[error("invalid {record}: {reason}")]
    InvalidRecord {
        record: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireThread {
    #[serde(alias = "_id")]
    id: Option<String>,
    #[serde(default)]
    participant_ids: Vec<String>,
    #[serde(default)]
    participant_info: HashMap<String, WireParticipantInfo>,
    #[serde(default)]
    unread_count: Option<u32>,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    messages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WireParticipantInfo {
    #[serde(default, alias = "displayName")]
    name: Option<String>,
    #[serde(default, alias = "avatarUrl")]
    avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(alias = "_id")]
    id: Option<String>,
    sender_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    file_type: Option<String>,
    #[serde(alias = "createdAt")]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCreatedThread {
    #[serde(rename = "chatId", alias = "_id", alias = "id")]
    chat_id: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireSendBody<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<&'a str>,
    pub sender_type: &'a str,
}

impl<'a> From<&'a SendRequest> for WireSendBody<'a> {
    fn from(request: &'a SendRequest) -> Self {
        Self {
            chat_id: &request.thread_id,
            text: &request.text,
            file_url: request.file_url.as_deref(),
            sender_type: &request.sender_type,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireCreateBody<'a> {
    pub participant_ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<&'a str>,
}

impl<'a> From<&'a CreateThreadRequest> for WireCreateBody<'a> {
    fn from(request: &'a CreateThreadRequest) -> Self {
        Self {
            participant_ids: &request.participant_ids,
            task_id: request.task_id.as_deref(),
        }
    }
}

pub fn decode_threads(body: &str) -> Result<Vec<Thread>, WireError> {
    let records = decode_array(body, "threads")?;

    Ok(records
        .into_iter()
        .filter_map(|record| {
            serde_json::from_value::<WireThread>(record)
                .map_err(WireError::from)
                .and_then(validate_thread)
                .map_err(|error| report_rejected("thread", &error))
                .ok()
        })
        .collect())
}

/// Decodes a thread's messages. Sender membership is checked later against
/// the thread in the store, which knows the participants.
pub fn decode_messages(body: &str) -> Result<Vec<Message>, WireError> {
    let records = decode_array(body, "messages")?;
    Ok(validate_messages(records, None))
}

pub fn decode_message(body: &str) -> Result<Message, WireError> {
    let record: WireMessage = serde_json::from_str(body)?;
    validate_message(record)
}

pub fn decode_created_thread_id(body: &str) -> Result<String, WireError> {
    let created: WireCreatedThread = serde_json::from_str(body)?;

    created
        .chat_id
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty())
        .ok_or(WireError::InvalidRecord {
            record: "created thread",
            reason: "missing chat id",
        })
}

fn decode_array(body: &str, what: &'static str) -> Result<Vec<Value>, WireError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(records) => Ok(records),
        _ => Err(WireError::NotAnArray(what)),
    }
}

fn report_rejected(record: &'static str, error: &WireError) {
    tracing::warn!(code = WIRE_RECORD_REJECTED, record, error = %error, "skipping malformed record");
}

fn validate_thread(wire: WireThread) -> Result<Thread, WireError> {
    let id = non_blank(wire.id).ok_or(WireError::InvalidRecord {
        record: "thread",
        reason: "missing id",
    })?;

    let mut seen = HashSet::new();
    let participant_ids: Vec<String> = wire
        .participant_ids
        .into_iter()
        .map(|participant| participant.trim().to_owned())
        .filter(|participant| !participant.is_empty() && seen.insert(participant.clone()))
        .collect();

    if participant_ids.len() < 2 {
        return Err(WireError::InvalidRecord {
            record: "thread",
            reason: "fewer than two participants",
        });
    }

    let participant_info = wire
        .participant_info
        .into_iter()
        .map(|(participant, info)| {
            (
                participant,
                ParticipantInfo {
                    display_name: info.name.unwrap_or_default(),
                    avatar_url: non_blank(info.avatar),
                },
            )
        })
        .collect();

    let messages = validate_messages(wire.messages, Some(&participant_ids));

    Ok(Thread {
        id,
        participant_ids,
        participant_info,
        messages,
        unread_count: wire.unread_count.unwrap_or(0),
        task_id: non_blank(wire.task_id),
    })
}

fn validate_messages(records: Vec<Value>, participants: Option<&[String]>) -> Vec<Message> {
    records
        .into_iter()
        .filter_map(|record| {
            serde_json::from_value::<WireMessage>(record)
                .map_err(WireError::from)
                .and_then(validate_message)
                .and_then(|message| match participants {
                    Some(ids) if !ids.contains(&message.sender_id) => {
                        Err(WireError::InvalidRecord {
                            record: "message",
                            reason: "sender is not a participant",
                        })
                    }
                    _ => Ok(message),
                })
                .map_err(|error| report_rejected("message", &error))
                .ok()
        })
        .collect()
}

fn validate_message(wire: WireMessage) -> Result<Message, WireError> {
    let invalid = |reason| WireError::InvalidRecord {
        record: "message",
        reason,
    };

    let id = non_blank(wire.id).ok_or_else(|| invalid("missing id"))?;
    let sender_id = non_blank(wire.sender_id).ok_or_else(|| invalid("missing sender"))?;
    let timestamp = wire
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or_else(|| invalid("missing or unparsable timestamp"))?;

    let attachment = non_blank(wire.file_url).map(|url| Attachment {
        url,
        kind: AttachmentKind::from_file_type(wire.file_type.as_deref()),
    });

    Ok(Message {
        id: MessageId::Durable(id),
        sender_id,
        text: wire.text.unwrap_or_default(),
        attachment,
        timestamp,
        delivery: DeliveryState::Confirmed,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
