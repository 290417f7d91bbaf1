//! The `CurationStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `greenroom-store-sqlite`). The workflow engine and the HTTP layer depend
//! on this abstraction, not on any concrete backend.
//!
//! Multi-step operations issue these calls with no cross-call transaction,
//! so every state transition is a *conditional* update — it applies only if
//! the row is still in the expected state and reports whether it won. That
//! is what guarantees at-most-one decision between racing admins.

use std::future::Future;

use uuid::Uuid;

use crate::{
  credential::{Credential, NewCredential},
  filter::{ContentFilterEntry, Severity},
  media::MediaRef,
  message::{Message, NewMessage},
  profile::{NewProfile, OnboardingStatus, Profile, Role, SubmissionDraft, Visibility},
  slot::TemplateSlot,
  song::{NewSong, Song},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`CurationStore::list_profiles`].
#[derive(Debug, Clone, Default)]
pub struct ProfileQuery {
  pub visibility: Option<Visibility>,
  pub status:     Option<OnboardingStatus>,
  pub role:       Option<Role>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a greenroom storage backend.
///
/// Methods returning `bool` are conditional writes: `true` means the guard
/// held and the write applied, `false` means the row was not in the expected
/// state (stale caller). All methods return `Send` futures so the trait can
/// be used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CurationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create and persist a profile in the initial `pending`/`pending` state.
  fn create_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Retrieve a profile by id. Returns `None` if not found.
  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Retrieve a profile by slug. Returns `None` if not found.
  fn get_profile_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// List profiles matching `query`, ordered by creation time.
  fn list_profiles<'a>(
    &'a self,
    query: &'a ProfileQuery,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + 'a;

  /// Whether `slug` is already held by a public profile.
  fn slug_in_use<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Write the candidate-supplied submission fields.
  /// Guard: `onboarding_status` is still `pending` or `submitted`.
  fn apply_submission(
    &self,
    id: Uuid,
    draft: SubmissionDraft,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Commit point of a submission: transition to `submitted`.
  /// Guard: `onboarding_status` is still `pending` or `submitted`.
  fn mark_submitted(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Approve a submitted candidate: `role = creator`,
  /// `visibility = public`, `onboarding_status = approved`, slug set.
  /// Guard: `onboarding_status = submitted`.
  fn approve_profile<'a>(
    &'a self,
    id: Uuid,
    slug: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Reject a submitted candidate: mark `rejected` and clear every
  /// personal field (name, bio, tech stack, social links, slug, avatar).
  /// The row itself is kept. Guard: `onboarding_status = submitted`.
  fn reject_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Roll an interrupted submission back to `pending`.
  /// Guard: `onboarding_status = submitted`.
  fn revert_to_pending(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Songs ─────────────────────────────────────────────────────────────

  /// Persist a new song and return it.
  fn add_song(
    &self,
    input: NewSong,
  ) -> impl Future<Output = Result<Song, Self::Error>> + Send + '_;

  /// List songs owned by `owner`; probe songs are included only when
  /// `include_probes` is set.
  fn list_songs(
    &self,
    owner: Uuid,
    include_probes: bool,
  ) -> impl Future<Output = Result<Vec<Song>, Self::Error>> + Send + '_;

  /// Number of songs owned by `owner`, probes included.
  fn count_songs(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Set the probe flag on every song owned by `owner`.
  /// Returns the number of rows that actually changed.
  fn set_probe_flag(
    &self,
    owner: Uuid,
    is_probe: bool,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete every song owned by `owner`, returning the deleted rows so the
  /// caller can clean up the referenced artifacts.
  fn delete_songs(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<Song>, Self::Error>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  /// Insert an in-app message.
  fn insert_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// List messages addressed to `recipient`, newest first.
  fn list_messages(
    &self,
    recipient: Uuid,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Mark a message read. Guard: the message is addressed to `recipient`.
  fn mark_read(
    &self,
    message_id: Uuid,
    recipient: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Content filter ────────────────────────────────────────────────────

  /// Active denylist words, for [`crate::filter::blocked_word`].
  fn active_filter_words(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Add (or reactivate) a denylist word.
  fn add_filter_word<'a>(
    &'a self,
    word: &'a str,
    severity: Severity,
  ) -> impl Future<Output = Result<ContentFilterEntry, Self::Error>> + Send + 'a;

  // ── Template slots ────────────────────────────────────────────────────

  /// Read a configuration slot. Returns `None` when the slot is unset and
  /// the caller should use its builtin fallback.
  fn get_slot(
    &self,
    slot_id: i64,
  ) -> impl Future<Output = Result<Option<TemplateSlot>, Self::Error>> + Send + '_;

  /// Create or replace a configuration slot.
  fn upsert_slot<'a>(
    &'a self,
    slot_id: i64,
    subject: &'a str,
    body: &'a str,
    media: Option<MediaRef>,
  ) -> impl Future<Output = Result<TemplateSlot, Self::Error>> + Send + 'a;

  // ── Credentials ───────────────────────────────────────────────────────

  /// Persist a login credential for a profile.
  fn add_credential(
    &self,
    input: NewCredential,
  ) -> impl Future<Output = Result<Credential, Self::Error>> + Send + '_;

  /// Look up a credential by login. Returns `None` if not found.
  fn get_credential<'a>(
    &'a self,
    login: &'a str,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + 'a;

  /// The notification address for a profile — its credential login.
  /// `None` when the profile has no credential.
  fn email_for(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}
