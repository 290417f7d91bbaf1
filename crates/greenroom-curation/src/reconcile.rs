//! Resume-or-compensate pass for interrupted multi-step operations.
//!
//! The workflow has no cross-call transactions, so a crash can strand a
//! profile between steps. Two stranded shapes are detectable from state
//! alone and repaired here: a `submitted` profile with zero songs (crash
//! before the song rows landed) is rolled back to `pending`, and an
//! `approved` profile whose songs still carry the probe flag (crash after
//! the transition, before the flip) is completed. The pass is idempotent
//! and safe to run at every startup.

use greenroom_core::{
  media::MediaStore,
  profile::OnboardingStatus,
  store::{CurationStore, ProfileQuery},
};
use serde::Serialize;

use crate::{CurationService, Error, Result, mailer::Mailer};

#[derive(Debug, Default, Clone, Serialize)]
pub struct ReconcileReport {
  /// Submitted profiles with no songs, rolled back to `pending`.
  pub rolled_back: usize,
  /// Approved profiles whose probe flags were still set, completed.
  pub completed:   usize,
}

impl<S, M, E> CurationService<S, M, E>
where
  S: CurationStore,
  M: MediaStore,
  E: Mailer,
{
  pub async fn reconcile(&self) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();

    let submitted = self
      .store()
      .list_profiles(&ProfileQuery {
        status: Some(OnboardingStatus::Submitted),
        limit: Some(10_000),
        ..Default::default()
      })
      .await
      .map_err(Error::store)?;

    for profile in submitted {
      let id = profile.profile_id;
      if self.store().count_songs(id).await.map_err(Error::store)? > 0 {
        continue;
      }
      if self.store().revert_to_pending(id).await.map_err(Error::store)? {
        tracing::info!(profile = %id, "rolled back interrupted submission");
        report.rolled_back += 1;
      }
    }

    let approved = self
      .store()
      .list_profiles(&ProfileQuery {
        status: Some(OnboardingStatus::Approved),
        limit: Some(10_000),
        ..Default::default()
      })
      .await
      .map_err(Error::store)?;

    for profile in approved {
      let id = profile.profile_id;
      let flipped =
        self.store().set_probe_flag(id, false).await.map_err(Error::store)?;
      if flipped > 0 {
        tracing::info!(profile = %id, songs = flipped, "completed interrupted approval");
        report.completed += 1;
      }
    }

    Ok(report)
  }
}
