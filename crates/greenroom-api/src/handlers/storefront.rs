//! Public storefront reads — no authentication.
//!
//! Only `visibility = public` profiles and non-probe songs ever leave these
//! handlers; probe material stays invisible until approval.

use axum::{
  Json,
  extract::{Path, State},
};
use greenroom_core::{
  media::MediaStore,
  profile::{Profile, SocialLinks, Visibility},
  song::Song,
  store::{CurationStore, ProfileQuery},
};
use greenroom_curation::mailer::Mailer;
use serde::Serialize;

use crate::{AppState, error::ApiError};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PublicProfile {
  pub display_name: String,
  pub slug:         String,
  pub bio:          Option<String>,
  pub tech_stack:   Vec<String>,
  pub social_links: SocialLinks,
  pub avatar_url:   Option<String>,
}

impl PublicProfile {
  fn from_profile(profile: &Profile) -> Option<Self> {
    Some(Self {
      display_name: profile.display_name.clone(),
      slug:         profile.slug.clone()?,
      bio:          profile.bio.clone(),
      tech_stack:   profile.tech_stack.clone(),
      social_links: profile.social_links.clone(),
      avatar_url:   profile.avatar.as_ref().map(|a| a.url.clone()),
    })
  }
}

#[derive(Debug, Serialize)]
pub struct PublicSong {
  pub title:       String,
  pub genres:      Vec<String>,
  pub price_cents: i64,
  pub audio_url:   String,
}

impl PublicSong {
  fn from_song(song: &Song) -> Self {
    Self {
      title:       song.title.clone(),
      genres:      song.genres.clone(),
      price_cents: song.price_cents,
      audio_url:   song.audio.url.clone(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct CreatorPage {
  pub profile: PublicProfile,
  pub songs:   Vec<PublicSong>,
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /api/creators`
pub async fn list<S, M, E>(
  State(state): State<AppState<S, M, E>>,
) -> Result<Json<Vec<PublicProfile>>, ApiError>
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  let profiles = state
    .store
    .list_profiles(&ProfileQuery {
      visibility: Some(Visibility::Public),
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  let creators = profiles
    .iter()
    .filter_map(PublicProfile::from_profile)
    .collect();
  Ok(Json(creators))
}

/// `GET /api/creators/{slug}`
pub async fn get_one<S, M, E>(
  State(state): State<AppState<S, M, E>>,
  Path(slug): Path<String>,
) -> Result<Json<CreatorPage>, ApiError>
where
  S: CurationStore + 'static,
  M: MediaStore + 'static,
  E: Mailer + 'static,
{
  let profile = state
    .store
    .get_profile_by_slug(&slug)
    .await
    .map_err(ApiError::store)?
    .filter(|p| p.visibility == Visibility::Public)
    .ok_or_else(|| ApiError::NotFound(format!("creator {slug:?} not found")))?;

  let songs = state
    .store
    .list_songs(profile.profile_id, false)
    .await
    .map_err(ApiError::store)?;

  let page = CreatorPage {
    profile: PublicProfile::from_profile(&profile)
      .ok_or_else(|| ApiError::NotFound(format!("creator {slug:?} not found")))?,
    songs:   songs.iter().map(PublicSong::from_song).collect(),
  };
  Ok(Json(page))
}
