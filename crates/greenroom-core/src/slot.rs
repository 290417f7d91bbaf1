//! Fixed-id configuration slots.
//!
//! The `promo_slots` table is keyed by a reserved numeric id; most ids hold
//! homepage promo content (out of scope here), two are repurposed for the
//! curation mail templates. The workflow reads slots and falls back to
//! builtin text when a slot is absent; editing is an admin concern outside
//! this core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::MediaRef;

/// Slot holding the approval email template.
pub const APPROVAL_MAIL_SLOT: i64 = 201;

/// Slot holding the rejection email template.
pub const REJECTION_MAIL_SLOT: i64 = 202;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSlot {
  pub slot_id:    i64,
  pub subject:    String,
  pub body:       String,
  pub media:      Option<MediaRef>,
  pub updated_at: DateTime<Utc>,
}
