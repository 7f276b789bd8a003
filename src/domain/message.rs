use chrono::{DateTime, Utc};

/// Kind of file attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    Document,
    #[default]
    Other,
}

impl AttachmentKind {
    /// Maps the backend `fileType` value (a MIME type or a bare keyword).
    pub fn from_file_type(file_type: Option<&str>) -> Self {
        let Some(raw) = file_type else {
            return Self::Other;
        };

        let lowered = raw.trim().to_ascii_lowercase();
        let family = lowered.split('/').next().unwrap_or_default();

        match family {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "application" | "text" | "pdf" | "document" => Self::Document,
            _ => Self::Other,
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "[Image]",
            AttachmentKind::Video => "[Video]",
            AttachmentKind::Audio => "[Audio]",
            AttachmentKind::Document => "[Document]",
            AttachmentKind::Other => "[File]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub kind: AttachmentKind,
}

/// Identity of a message in the store.
///
/// Provisional ids belong to optimistic sends that the backend has not
/// confirmed yet. The correlation id survives until the confirmed copy
/// replaces the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageId {
    Durable(String),
    Provisional {
        temp_id: String,
        correlation_id: String,
    },
}

impl MessageId {
    pub fn provisional(now: DateTime<Utc>) -> Self {
        Self::Provisional {
            temp_id: format!("temp-{}", now.timestamp_millis()),
            correlation_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessageId::Durable(id) => id,
            MessageId::Provisional { temp_id, .. } => temp_id,
        }
    }

    pub fn durable(&self) -> Option<&str> {
        match self {
            MessageId::Durable(id) => Some(id),
            MessageId::Provisional { .. } => None,
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            MessageId::Durable(_) => None,
            MessageId::Provisional { correlation_id, .. } => Some(correlation_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryState {
    #[default]
    Confirmed,
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: String,
    pub text: String,
    pub attachment: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
    pub delivery: DeliveryState,
}

impl Message {
    /// Builds the local copy of an outgoing message before the backend has seen it.
    pub fn provisional(
        sender_id: impl Into<String>,
        text: impl Into<String>,
        attachment: Option<Attachment>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::provisional(now),
            sender_id: sender_id.into(),
            text: text.into(),
            attachment,
            timestamp: now,
            delivery: DeliveryState::Pending,
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self.id, MessageId::Provisional { .. })
    }

    /// Returns the display content: attachment label + text, or just text.
    pub fn display_content(&self) -> String {
        match (&self.attachment, self.text.is_empty()) {
            (Some(attachment), true) => attachment.kind.display_label().to_owned(),
            (Some(attachment), false) => {
                format!("{} {}", attachment.kind.display_label(), self.text)
            }
            (None, _) => self.text.clone(),
        }
    }
}
