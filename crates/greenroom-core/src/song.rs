//! Song — an audio submission owned by a profile.
//!
//! Songs created during onboarding carry `is_probe = true` and are excluded
//! from the public shop until the owner is approved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::media::MediaRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
  pub song_id:     Uuid,
  pub owner_id:    Uuid,
  pub title:       String,
  pub genres:      Vec<String>,
  pub audio:       MediaRef,
  /// Hidden from the public shop while `true`.
  pub is_probe:    bool,
  pub price_cents: i64,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::CurationStore::add_song`].
/// `song_id` and `created_at` are set by the store.
#[derive(Debug, Clone)]
pub struct NewSong {
  pub owner_id:    Uuid,
  pub title:       String,
  pub genres:      Vec<String>,
  pub audio:       MediaRef,
  pub is_probe:    bool,
  pub price_cents: i64,
}
