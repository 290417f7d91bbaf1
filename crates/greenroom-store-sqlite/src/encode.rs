//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Structured fields
//! (MediaRef, social links, string lists) are stored as compact JSON. UUIDs
//! are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use greenroom_core::{
  credential::Credential,
  media::MediaRef,
  message::{Message, MessageKind},
  profile::{OnboardingStatus, Profile, Role, SocialLinks, Visibility},
  slot::TemplateSlot,
  song::Song,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  Role::parse(s).ok_or_else(|| Error::Decode(format!("unknown role: {s:?}")))
}

pub fn decode_visibility(s: &str) -> Result<Visibility> {
  Visibility::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown visibility: {s:?}")))
}

pub fn decode_status(s: &str) -> Result<OnboardingStatus> {
  OnboardingStatus::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown onboarding status: {s:?}")))
}

pub fn decode_message_kind(s: &str) -> Result<MessageKind> {
  MessageKind::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown message kind: {s:?}")))
}

// ─── Structured columns ──────────────────────────────────────────────────────

pub fn encode_media(media: &MediaRef) -> Result<String> {
  Ok(serde_json::to_string(media)?)
}

pub fn decode_media(s: &str) -> Result<MediaRef> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_strings(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_strings(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_social(links: &SocialLinks) -> Result<String> {
  Ok(serde_json::to_string(links)?)
}

/// Stored social links go through the defensive core parser so legacy
/// string-typed rows still load.
pub fn decode_social(s: &str) -> Result<SocialLinks> {
  let value: serde_json::Value = serde_json::from_str(s)?;
  Ok(SocialLinks::from_json(value))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id:        String,
  pub display_name:      String,
  pub bio:               Option<String>,
  pub tech_stack:        String,
  pub social_links:      String,
  pub avatar:            Option<String>,
  pub visibility:        String,
  pub onboarding_status: String,
  pub role:              String,
  pub slug:              Option<String>,
  pub terms_accepted_at: Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id:        decode_uuid(&self.profile_id)?,
      display_name:      self.display_name,
      bio:               self.bio,
      tech_stack:        decode_strings(&self.tech_stack)?,
      social_links:      decode_social(&self.social_links)?,
      avatar:            self.avatar.as_deref().map(decode_media).transpose()?,
      visibility:        decode_visibility(&self.visibility)?,
      onboarding_status: decode_status(&self.onboarding_status)?,
      role:              decode_role(&self.role)?,
      slug:              self.slug,
      terms_accepted_at: self
        .terms_accepted_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `songs` row.
pub struct RawSong {
  pub song_id:     String,
  pub owner_id:    String,
  pub title:       String,
  pub genres:      String,
  pub audio:       String,
  pub is_probe:    bool,
  pub price_cents: i64,
  pub created_at:  String,
}

impl RawSong {
  pub fn into_song(self) -> Result<Song> {
    Ok(Song {
      song_id:     decode_uuid(&self.song_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      title:       self.title,
      genres:      decode_strings(&self.genres)?,
      audio:       decode_media(&self.audio)?,
      is_probe:    self.is_probe,
      price_cents: self.price_cents,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `messages` row.
pub struct RawMessage {
  pub message_id:   String,
  pub recipient_id: String,
  pub sender_id:    Option<String>,
  pub kind:         String,
  pub subject:      String,
  pub body:         String,
  pub read:         bool,
  pub related_slug: Option<String>,
  pub created_at:   String,
}

impl RawMessage {
  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      message_id:   decode_uuid(&self.message_id)?,
      recipient_id: decode_uuid(&self.recipient_id)?,
      sender_id:    self.sender_id.as_deref().map(decode_uuid).transpose()?,
      kind:         decode_message_kind(&self.kind)?,
      subject:      self.subject,
      body:         self.body,
      read:         self.read,
      related_slug: self.related_slug,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `promo_slots` row.
pub struct RawSlot {
  pub slot_id:    i64,
  pub subject:    String,
  pub body:       String,
  pub media:      Option<String>,
  pub updated_at: String,
}

impl RawSlot {
  pub fn into_slot(self) -> Result<TemplateSlot> {
    Ok(TemplateSlot {
      slot_id:    self.slot_id,
      subject:    self.subject,
      body:       self.body,
      media:      self.media.as_deref().map(decode_media).transpose()?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `credentials` row.
pub struct RawCredential {
  pub login:         String,
  pub profile_id:    String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawCredential {
  pub fn into_credential(self) -> Result<Credential> {
    Ok(Credential {
      login:         self.login,
      profile_id:    decode_uuid(&self.profile_id)?,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
