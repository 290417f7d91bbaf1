//! Onboarding state machine — candidate submission.
//!
//! `pending → submitted`. The steps run as a saga: artifacts are stored
//! before any row references them, the transition to `submitted` is the
//! commit point, and a failure in between compensates by deleting whatever
//! this run already wrote. Resubmission before a decision replaces the
//! previous probe set.

use bytes::Bytes;
use chrono::Utc;
use greenroom_core::{
  Error as DomainError,
  filter::blocked_word,
  media::{MediaRef, MediaStore},
  profile::{SocialLinks, SubmissionDraft},
  slug::{slug_or_id, slugify},
  song::NewSong,
  store::CurationStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{CurationService, Error, Result, mailer::Mailer, notify};

pub(crate) const SONG_BUCKET: &str = "songs";
pub(crate) const AVATAR_BUCKET: &str = "avatars";

// ─── Request types ───────────────────────────────────────────────────────────

/// One probe song in a submission.
#[derive(Debug, Clone)]
pub struct ProbeUpload {
  pub title:       String,
  pub genres:      Vec<String>,
  pub price_cents: i64,
  pub media_type:  String,
  pub bytes:       Bytes,
}

/// An uploaded avatar image.
#[derive(Debug, Clone)]
pub struct MediaUpload {
  pub media_type: String,
  pub bytes:      Bytes,
}

/// A candidate's application to become a public creator.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
  pub artist_name:      String,
  pub bio:              Option<String>,
  pub tech_stack:       Vec<String>,
  pub social_links:     SocialLinks,
  /// Terms of service accepted.
  pub accepted_terms:   bool,
  /// The candidate holds the rights to the uploaded material.
  pub confirmed_rights: bool,
  pub probes:           Vec<ProbeUpload>,
  pub avatar:           Option<MediaUpload>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionOutcome {
  pub profile_id:      Uuid,
  pub probe_count:     usize,
  pub admins_notified: usize,
}

// ─── Submission ──────────────────────────────────────────────────────────────

impl<S, M, E> CurationService<S, M, E>
where
  S: CurationStore,
  M: MediaStore,
  E: Mailer,
{
  /// Validate and persist a creator application.
  ///
  /// All validation happens before the first write; a validation failure
  /// leaves no trace. The caller is responsible for authentication —
  /// `identity` is trusted to be the signed-in profile.
  pub async fn submit(
    &self,
    identity: Uuid,
    request: SubmitRequest,
  ) -> Result<SubmissionOutcome> {
    let name = request.artist_name.trim().to_owned();
    if name.is_empty() {
      return Err(DomainError::NameMissing.into());
    }
    if !(request.accepted_terms && request.confirmed_rights) {
      return Err(DomainError::LegalConsentMissing.into());
    }
    if !(1..=2).contains(&request.probes.len()) {
      return Err(DomainError::ProbeCount(request.probes.len()).into());
    }
    let limit = self.config().max_probe_bytes;
    for probe in &request.probes {
      if probe.bytes.len() > limit {
        return Err(
          DomainError::ProbeTooLarge {
            title: probe.title.clone(),
            size:  probe.bytes.len(),
            limit,
          }
          .into(),
        );
      }
    }

    // Content safety over everything the public could eventually see.
    let denylist = self
      .store()
      .active_filter_words()
      .await
      .map_err(Error::store)?;
    let mut combined = name.clone();
    if let Some(bio) = &request.bio {
      combined.push('\n');
      combined.push_str(bio);
    }
    for probe in &request.probes {
      combined.push('\n');
      combined.push_str(&probe.title);
    }
    if let Some(word) =
      blocked_word(&combined, denylist.iter().map(String::as_str))
    {
      return Err(DomainError::BlockedContent(word).into());
    }

    let profile = self
      .store()
      .get_profile(identity)
      .await
      .map_err(Error::store)?
      .ok_or(DomainError::ProfileNotFound(identity))?;
    if !profile.onboarding_status.accepts_submission() {
      return Err(
        DomainError::NotAwaitingReview {
          id:     identity,
          status: profile.onboarding_status,
        }
        .into(),
      );
    }

    // ── Artifacts first: no row may ever reference a missing file ──────
    let mut uploaded: Vec<MediaRef> = Vec::new();

    let avatar_ref = match &request.avatar {
      Some(upload) => {
        let path = format!("{identity}/{}", Uuid::new_v4());
        match self
          .media()
          .store(AVATAR_BUCKET, &path, upload.bytes.clone(), &upload.media_type)
          .await
        {
          Ok(reference) => {
            uploaded.push(reference.clone());
            Some(reference)
          }
          Err(e) => {
            self.discard(&uploaded).await;
            return Err(Error::media(e));
          }
        }
      }
      None => profile.avatar.clone(),
    };

    let mut song_refs = Vec::with_capacity(request.probes.len());
    for probe in &request.probes {
      let path = format!("{identity}/{}", Uuid::new_v4());
      match self
        .media()
        .store(SONG_BUCKET, &path, probe.bytes.clone(), &probe.media_type)
        .await
      {
        Ok(reference) => {
          uploaded.push(reference.clone());
          song_refs.push(reference);
        }
        Err(e) => {
          self.discard(&uploaded).await;
          return Err(Error::media(e));
        }
      }
    }

    // Resubmission replaces the previous probe set.
    let replaced = match self.store().delete_songs(identity).await {
      Ok(songs) => songs,
      Err(e) => {
        self.discard(&uploaded).await;
        return Err(Error::store(e));
      }
    };

    let draft = SubmissionDraft {
      display_name:      name.clone(),
      bio:               request.bio.clone(),
      tech_stack:        request.tech_stack.clone(),
      social_links:      request.social_links.clone(),
      avatar:            avatar_ref,
      slug:              slugify(&name),
      terms_accepted_at: Utc::now(),
    };

    match self.store().apply_submission(identity, draft).await {
      Ok(true) => {}
      Ok(false) => {
        self.discard(&uploaded).await;
        return Err(DomainError::StaleTransition(identity).into());
      }
      Err(e) => {
        self.discard(&uploaded).await;
        return Err(Error::store(e));
      }
    }

    for (probe, audio) in request.probes.iter().zip(song_refs) {
      let insert = self
        .store()
        .add_song(NewSong {
          owner_id:    identity,
          title:       probe.title.clone(),
          genres:      probe.genres.clone(),
          audio,
          is_probe:    true,
          price_cents: probe.price_cents,
        })
        .await;

      if let Err(e) = insert {
        self.unwind_submission(identity, &uploaded).await;
        return Err(Error::store(e));
      }
    }

    // Commit point: the application becomes visible to admins.
    match self.store().mark_submitted(identity).await {
      Ok(true) => {}
      Ok(false) => {
        self.unwind_submission(identity, &uploaded).await;
        return Err(DomainError::StaleTransition(identity).into());
      }
      Err(e) => {
        self.unwind_submission(identity, &uploaded).await;
        return Err(Error::store(e));
      }
    }

    // Only now is it safe to drop the artifacts this submission replaced.
    let mut replaced_refs: Vec<MediaRef> =
      replaced.into_iter().map(|song| song.audio).collect();
    if request.avatar.is_some()
      && let Some(old_avatar) = profile.avatar
    {
      replaced_refs.push(old_avatar);
    }
    self.discard(&replaced_refs).await;

    let admins_notified = notify::notify_admins(
      self.store(),
      identity,
      "New creator application",
      &format!(
        "{name} submitted {count} probe song(s) for review.",
        count = request.probes.len()
      ),
      Some(&slug_or_id(&name, identity)),
    )
    .await;

    Ok(SubmissionOutcome {
      profile_id: identity,
      probe_count: request.probes.len(),
      admins_notified,
    })
  }

  /// Compensate a submission that failed after its song rows started to
  /// land: remove the rows, then the artifacts of this run.
  async fn unwind_submission(&self, identity: Uuid, uploaded: &[MediaRef]) {
    if let Err(e) = self.store().delete_songs(identity).await {
      tracing::warn!(profile = %identity, "submission row cleanup failed: {e}");
    }
    self.discard(uploaded).await;
  }

  /// Best-effort removal of stored artifacts. Returns how many deletes
  /// failed (and were logged).
  pub(crate) async fn discard(&self, refs: &[MediaRef]) -> usize {
    let mut failures = 0;
    for reference in refs {
      if let Err(e) =
        self.media().delete(&reference.bucket, &reference.path).await
      {
        tracing::warn!(
          bucket = %reference.bucket,
          path = %reference.path,
          "artifact delete failed: {e}"
        );
        failures += 1;
      }
    }
    failures
  }
}
