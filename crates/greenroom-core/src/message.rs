//! In-app messages.
//!
//! One row per addressed event. Rows are append-only except for the `read`
//! flag, which only the recipient flips.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
  System,
  Application,
  Private,
  Forum,
  Global,
}

impl MessageKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::System => "system",
      Self::Application => "application",
      Self::Private => "private",
      Self::Forum => "forum",
      Self::Global => "global",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "system" => Some(Self::System),
      "application" => Some(Self::Application),
      "private" => Some(Self::Private),
      "forum" => Some(Self::Forum),
      "global" => Some(Self::Global),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub message_id:   Uuid,
  pub recipient_id: Uuid,
  /// `None` for system-originated messages.
  pub sender_id:    Option<Uuid>,
  pub kind:         MessageKind,
  pub subject:      String,
  pub body:         String,
  pub read:         bool,
  /// Slug of a related entity, used by clients for deep links.
  pub related_slug: Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::CurationStore::insert_message`].
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub recipient_id: Uuid,
  pub sender_id:    Option<Uuid>,
  pub kind:         MessageKind,
  pub subject:      String,
  pub body:         String,
  pub related_slug: Option<String>,
}

impl NewMessage {
  /// A system message with no sender.
  pub fn system(
    recipient_id: Uuid,
    subject: impl Into<String>,
    body: impl Into<String>,
  ) -> Self {
    Self {
      recipient_id,
      sender_id: None,
      kind: MessageKind::System,
      subject: subject.into(),
      body: body.into(),
      related_slug: None,
    }
  }
}
