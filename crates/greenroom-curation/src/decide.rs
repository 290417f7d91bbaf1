//! Curation decision processor — the admin-triggered transition
//! `submitted → approved | rejected`.
//!
//! The conditional store update means that of two racing admins exactly one
//! decision applies; the loser sees `StaleTransition` and causes no side
//! effects. Email is best-effort and never rolls a decision back; the
//! recipient address is resolved before any erasure could make it
//! unreachable.

use greenroom_core::{
  Error as DomainError,
  media::{MediaRef, MediaStore},
  profile::{OnboardingStatus, Profile, Role},
  slot::{APPROVAL_MAIL_SLOT, REJECTION_MAIL_SLOT},
  slug::slug_or_id,
  store::CurationStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  CurationService, Error, Result,
  mailer::{EmailOutcome, Mailer},
  notify, template,
};

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
  Approve,
  Reject,
}

/// What a decision did, reported back to the deciding admin.
#[derive(Debug, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum DecisionOutcome {
  Approved {
    slug:            String,
    songs_published: usize,
    email:           EmailOutcome,
  },
  Rejected {
    songs_deleted: usize,
    email:         EmailOutcome,
  },
}

// ─── Processor ───────────────────────────────────────────────────────────────

impl<S, M, E> CurationService<S, M, E>
where
  S: CurationStore,
  M: MediaStore,
  E: Mailer,
{
  /// Apply an admin decision to a submitted application.
  ///
  /// Re-deciding an already-decided profile is a hard error, never a silent
  /// re-run — that is what keeps decision emails from going out twice.
  pub async fn decide(
    &self,
    admin: Uuid,
    target: Uuid,
    decision: Decision,
  ) -> Result<DecisionOutcome> {
    let admin_profile = self
      .store()
      .get_profile(admin)
      .await
      .map_err(Error::store)?
      .ok_or(DomainError::ProfileNotFound(admin))?;
    if admin_profile.role != Role::Admin {
      return Err(DomainError::AdminRequired.into());
    }

    let profile = self
      .store()
      .get_profile(target)
      .await
      .map_err(Error::store)?
      .ok_or(DomainError::ProfileNotFound(target))?;
    if profile.onboarding_status != OnboardingStatus::Submitted {
      return Err(
        DomainError::NotAwaitingReview {
          id:     target,
          status: profile.onboarding_status,
        }
        .into(),
      );
    }

    // Resolve the address now; rejection erases the data it comes from.
    let recipient = self
      .store()
      .email_for(target)
      .await
      .map_err(Error::store)?;

    match decision {
      Decision::Approve => self.approve(admin, profile, recipient).await,
      Decision::Reject => self.reject(admin, profile, recipient).await,
    }
  }

  async fn approve(
    &self,
    admin: Uuid,
    profile: Profile,
    recipient: Option<String>,
  ) -> Result<DecisionOutcome> {
    let target = profile.profile_id;
    let base = profile
      .slug
      .clone()
      .unwrap_or_else(|| slug_or_id(&profile.display_name, target));
    let slug = self.unique_slug(&base).await?;

    if !self
      .store()
      .approve_profile(target, &slug)
      .await
      .map_err(Error::store)?
    {
      return Err(DomainError::StaleTransition(target).into());
    }

    let songs_published = self
      .store()
      .set_probe_flag(target, false)
      .await
      .map_err(Error::store)?;

    let url = self.config().creator_url(&slug);
    notify::system_message(
      self.store(),
      target,
      "Your application was approved",
      &format!("Welcome aboard! Your creator page is now public: {url}"),
      Some(&slug),
    )
    .await;

    let email = match recipient {
      Some(to) => {
        let slot = self.read_slot(APPROVAL_MAIL_SLOT).await;
        let mail =
          template::approval_mail(slot, &to, &profile.display_name, &url);
        self.mailer().send(&mail).await
      }
      None => EmailOutcome::not_sent("no_recipient_address"),
    };
    if let EmailOutcome::NotSent { reason } = &email {
      notify::note_email_failure(self.store(), admin, target, reason).await;
    }

    Ok(DecisionOutcome::Approved { slug, songs_published, email })
  }

  async fn reject(
    &self,
    admin: Uuid,
    profile: Profile,
    recipient: Option<String>,
  ) -> Result<DecisionOutcome> {
    let target = profile.profile_id;

    if !self
      .store()
      .reject_profile(target)
      .await
      .map_err(Error::store)?
    {
      return Err(DomainError::StaleTransition(target).into());
    }

    // Erasure: song rows first, then every stored artifact.
    let deleted = self
      .store()
      .delete_songs(target)
      .await
      .map_err(Error::store)?;
    let mut refs: Vec<MediaRef> =
      deleted.iter().map(|song| song.audio.clone()).collect();
    if let Some(avatar) = profile.avatar.clone() {
      refs.push(avatar);
    }
    let failed_deletes = self.discard(&refs).await;
    if failed_deletes > 0 {
      notify::system_message(
        self.store(),
        admin,
        "Artifact cleanup incomplete",
        &format!(
          "{failed_deletes} stored artifact(s) of rejected profile {target} \
           could not be deleted and need manual removal."
        ),
        None,
      )
      .await;
    }

    let email = match recipient {
      Some(to) => {
        let slot = self.read_slot(REJECTION_MAIL_SLOT).await;
        let mail = template::rejection_mail(slot, &to, &profile.display_name);
        self.mailer().send(&mail).await
      }
      None => EmailOutcome::not_sent("no_recipient_address"),
    };
    if let EmailOutcome::NotSent { reason } = &email {
      notify::note_email_failure(self.store(), admin, target, reason).await;
    }

    Ok(DecisionOutcome::Rejected { songs_deleted: deleted.len(), email })
  }

  /// First free slug: `base`, then `base-2`, `base-3`, …
  /// Issued slugs are never overwritten.
  async fn unique_slug(&self, base: &str) -> Result<String> {
    if !self.store().slug_in_use(base).await.map_err(Error::store)? {
      return Ok(base.to_owned());
    }
    let mut n: u32 = 2;
    loop {
      let candidate = format!("{base}-{n}");
      if !self
        .store()
        .slug_in_use(&candidate)
        .await
        .map_err(Error::store)?
      {
        return Ok(candidate);
      }
      n += 1;
    }
  }

  /// Slot read for mail templates; a failed read degrades to the builtin
  /// fallback instead of failing the decision.
  async fn read_slot(
    &self,
    slot_id: i64,
  ) -> Option<greenroom_core::slot::TemplateSlot> {
    match self.store().get_slot(slot_id).await {
      Ok(slot) => slot,
      Err(e) => {
        tracing::warn!(slot_id, "template slot read failed, using builtin: {e}");
        None
      }
    }
  }
}
