//! Profile — one row per registered identity.
//!
//! A profile is created at registration and driven through the curation
//! lifecycle by the candidate (`pending → submitted`) and an admin
//! (`submitted → approved | rejected`). Approved profiles keep evolving via
//! self-service edits; rejected profiles keep only their row envelope after
//! erasure.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::media::MediaRef;

// ─── Role ────────────────────────────────────────────────────────────────────

/// The role claim attached to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Creator,
  Admin,
  Moderator,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Creator => "creator",
      Self::Admin => "admin",
      Self::Moderator => "moderator",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "user" => Some(Self::User),
      "creator" => Some(Self::Creator),
      "admin" => Some(Self::Admin),
      "moderator" => Some(Self::Moderator),
      _ => None,
    }
  }
}

// ─── Visibility ──────────────────────────────────────────────────────────────

/// Whether the public storefront may show the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  Pending,
  Public,
  Rejected,
}

impl Visibility {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Public => "public",
      Self::Rejected => "rejected",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "pending" => Some(Self::Pending),
      "public" => Some(Self::Public),
      "rejected" => Some(Self::Rejected),
      _ => None,
    }
  }
}

// ─── Onboarding status ───────────────────────────────────────────────────────

/// Position in the curation lifecycle.
///
/// `Completed` is reached by post-approval self-service flows outside this
/// core; it is modelled so stored rows round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingStatus {
  Pending,
  Submitted,
  Approved,
  Rejected,
  Completed,
}

impl OnboardingStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Submitted => "submitted",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
      Self::Completed => "completed",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "pending" => Some(Self::Pending),
      "submitted" => Some(Self::Submitted),
      "approved" => Some(Self::Approved),
      "rejected" => Some(Self::Rejected),
      "completed" => Some(Self::Completed),
      _ => None,
    }
  }

  /// Whether a candidate may still (re-)submit in this state.
  pub fn accepts_submission(self) -> bool {
    matches!(self, Self::Pending | Self::Submitted)
  }
}

impl fmt::Display for OnboardingStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Social links ────────────────────────────────────────────────────────────

/// The fixed set of external platforms a profile may link to.
///
/// Stored as a JSON object. Legacy rows drifted between a bare URL string
/// and an object with arbitrary keys; [`SocialLinks::from_json`] is the one
/// place that tolerance lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub website:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub instagram:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub youtube:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub soundcloud: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub spotify:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bandcamp:   Option<String>,
}

impl SocialLinks {
  pub fn is_empty(&self) -> bool {
    self.website.is_none()
      && self.instagram.is_none()
      && self.youtube.is_none()
      && self.soundcloud.is_none()
      && self.spotify.is_none()
      && self.bandcamp.is_none()
  }

  /// Parse from loosely-typed JSON.
  ///
  /// Accepts an object (unknown keys dropped, non-string values dropped) or
  /// a bare string, which is treated as the website URL. Anything else
  /// yields the empty map.
  pub fn from_json(value: serde_json::Value) -> Self {
    match value {
      serde_json::Value::String(url) => Self {
        website: Some(url),
        ..Self::default()
      },
      serde_json::Value::Object(map) => {
        let get = |key: &str| {
          map
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
        };
        Self {
          website:    get("website"),
          instagram:  get("instagram"),
          youtube:    get("youtube"),
          soundcloud: get("soundcloud"),
          spotify:    get("spotify"),
          bandcamp:   get("bandcamp"),
        }
      }
      _ => Self::default(),
    }
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id:        Uuid,
  pub display_name:      String,
  pub bio:               Option<String>,
  /// Declared tools and technologies, e.g. "Ableton", "modular".
  pub tech_stack:        Vec<String>,
  pub social_links:      SocialLinks,
  pub avatar:            Option<MediaRef>,
  pub visibility:        Visibility,
  pub onboarding_status: OnboardingStatus,
  pub role:              Role,
  /// Non-null once approved; unique among public profiles.
  pub slug:              Option<String>,
  pub terms_accepted_at: Option<DateTime<Utc>>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input to [`crate::store::CurationStore::create_profile`].
/// Timestamps are set by the store; new profiles start `pending`/`pending`.
#[derive(Debug, Clone)]
pub struct NewProfile {
  pub display_name: String,
  pub role:         Role,
}

/// Candidate-supplied fields persisted while a submission is in flight.
///
/// Applied with a state guard so a concurrently decided profile is never
/// silently overwritten.
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
  pub display_name:      String,
  pub bio:               Option<String>,
  pub tech_stack:        Vec<String>,
  pub social_links:      SocialLinks,
  pub avatar:            Option<MediaRef>,
  /// Slug candidate precomputed from the name; finalised at approval.
  pub slug:              Option<String>,
  pub terms_accepted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn social_links_from_object() {
    let links = SocialLinks::from_json(serde_json::json!({
      "website": "https://example.com",
      "spotify": "https://open.spotify.com/artist/x",
      "myspace": "https://myspace.com/legacy",
      "youtube": 42,
    }));
    assert_eq!(links.website.as_deref(), Some("https://example.com"));
    assert_eq!(
      links.spotify.as_deref(),
      Some("https://open.spotify.com/artist/x")
    );
    // unknown key dropped, non-string value dropped
    assert!(links.youtube.is_none());
  }

  #[test]
  fn social_links_from_bare_string() {
    let links =
      SocialLinks::from_json(serde_json::json!("https://example.com"));
    assert_eq!(links.website.as_deref(), Some("https://example.com"));
    assert!(links.instagram.is_none());
  }

  #[test]
  fn social_links_from_garbage_is_empty() {
    assert!(SocialLinks::from_json(serde_json::json!(17)).is_empty());
    assert!(SocialLinks::from_json(serde_json::json!(null)).is_empty());
    assert!(SocialLinks::from_json(serde_json::json!([1, 2])).is_empty());
  }

  #[test]
  fn status_roundtrip() {
    for status in [
      OnboardingStatus::Pending,
      OnboardingStatus::Submitted,
      OnboardingStatus::Approved,
      OnboardingStatus::Rejected,
      OnboardingStatus::Completed,
    ] {
      assert_eq!(OnboardingStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(OnboardingStatus::parse("nope"), None);
  }
}
